use serde::{Deserialize, Serialize};

/// A carrier as exposed to the browser: a display label and the storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    pub label: String,
    pub value: String,
}

impl Carrier {
    pub fn from_key(key: impl Into<String>) -> Self {
        let value = key.into();
        Self {
            label: display_label(&value),
            value,
        }
    }

    /// Builds a carrier from a listed common prefix such as `processados/aurora_saude/`.
    ///
    /// Returns `None` for prefixes outside `root` or with an empty key.
    pub fn from_prefix(prefix: &str, root: &str) -> Option<Self> {
        let key = prefix.strip_prefix(root)?.trim_end_matches('/');
        if key.is_empty() {
            return None;
        }
        Some(Self::from_key(key))
    }
}

/// Entry of the `operadoras` collection used to ground the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// `aurora_saude` -> `Aurora Saude`.
pub fn display_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len());
    let mut at_word_start = true;

    for c in key.chars().map(|c| if c == '_' { ' ' } else { c }) {
        if at_word_start && c.is_alphanumeric() {
            label.extend(c.to_uppercase());
        } else {
            label.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }

    label
}
