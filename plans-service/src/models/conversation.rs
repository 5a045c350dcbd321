use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

/// One assistant exchange, appended to `conversas_chat` for analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationLog {
    pub empresa: String,
    pub pergunta_usuario: String,
    pub resposta_ia: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl ConversationLog {
    pub fn new(carrier: &str, question: &str, answer: &str) -> Self {
        Self {
            empresa: carrier.to_string(),
            pergunta_usuario: question.to_string(),
            resposta_ia: answer.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Body of `POST /api/chat`. The message stays untyped so that a missing,
/// empty or non-string value maps to the same 400.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl ChatRequest {
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|value| value.as_str())
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}
