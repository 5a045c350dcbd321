//! Carrier plan documents as extracted from the carriers' price sheets.
//!
//! Field names follow the stored documents (`empresa`, `planos`, ...), which
//! are shared with the extraction pipeline and the `planos_saude_extraidos`
//! collection.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// All plans of one carrier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarrierPlans {
    #[serde(default, deserialize_with = "null_as_default")]
    pub empresa: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub planos: Vec<Plan>,
}

impl CarrierPlans {
    pub fn plan(&self, produto: &str) -> Option<&Plan> {
        self.planos.iter().find(|plan| plan.produto == produto)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, deserialize_with = "null_as_default")]
    pub produto: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub acomodacao: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub acomodacao_preco: AccommodationPrices,
}

impl Plan {
    /// First price table of the first tier in `priority` that has one.
    pub fn prices(&self, priority: &[Accommodation]) -> Option<&PriceTable> {
        priority
            .iter()
            .find_map(|tier| self.acomodacao_preco.tier(*tier).first())
    }
}

/// Price tables grouped by accommodation tier. Each tier holds a list, of
/// which only the first table is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccommodationPrices {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub enfermaria: Vec<PriceTable>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub apartamento: Vec<PriceTable>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub nenhum: Vec<PriceTable>,
}

impl AccommodationPrices {
    pub fn tier(&self, tier: Accommodation) -> &[PriceTable] {
        match tier {
            Accommodation::Enfermaria => &self.enfermaria,
            Accommodation::Apartamento => &self.apartamento,
            Accommodation::Nenhum => &self.nenhum,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accommodation {
    Enfermaria,
    Apartamento,
    Nenhum,
}

impl Accommodation {
    /// Tier order used when feeding prices to the assistant.
    pub const ASSISTANT_PRIORITY: [Accommodation; 3] = [
        Accommodation::Enfermaria,
        Accommodation::Apartamento,
        Accommodation::Nenhum,
    ];

    /// Tier order used by the plan detail page.
    pub const DISPLAY_PRIORITY: [Accommodation; 3] = [
        Accommodation::Nenhum,
        Accommodation::Enfermaria,
        Accommodation::Apartamento,
    ];
}

/// Age band label -> amount, exactly as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable(pub Map<String, Value>);

impl PriceTable {
    /// Rows ordered by the numeric lower bound of their age band.
    ///
    /// Bands without a leading number go last; ties keep storage order.
    pub fn sorted_rows(&self) -> Vec<PriceRow> {
        let mut rows: Vec<PriceRow> = self
            .0
            .iter()
            .map(|(faixa, valor)| PriceRow {
                faixa: faixa.clone(),
                valor: valor.clone(),
            })
            .collect();

        rows.sort_by(|a, b| {
            match (
                age_band_lower_bound(&a.faixa),
                age_band_lower_bound(&b.faixa),
            ) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });

        rows
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    pub faixa: String,
    pub valor: Value,
}

impl PriceRow {
    /// The amount as the carrier wrote it: numbers and strings verbatim.
    pub fn amount(&self) -> String {
        match &self.valor {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// `00-18` -> `00 a 18`; used when talking about the band in prose.
    pub fn spoken_band(&self) -> String {
        self.faixa.replacen('-', " a ", 1)
    }
}

/// Leading integer of an age band label (`"19-23"` -> 19, `"59+"` -> 59).
///
/// Numbers too long for `u64` saturate, so they still sort after every
/// smaller band instead of among the unnumbered ones.
pub fn age_band_lower_bound(label: &str) -> Option<u64> {
    let digits: String = label
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// Stored documents sometimes carry an explicit `null` where a value is
/// optional; it reads the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
