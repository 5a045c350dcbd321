//! Conversational assistant: identify the carrier, then answer from its prices.
//!
//! Stage 1 asks the model for a structured classification. When that comes
//! back unresolved a local heuristic looks for a carrier name in the message.
//! Stage 2 runs only for an identified carrier and answers from a text
//! rendering of that carrier's price tables.

use super::database::ChatStore;
use super::metrics::{
    record_chat_outcome, record_provider_error, record_provider_latency, record_tokens,
};
use super::prompts::{
    answer_prompt, clarification_message, identification_prompt, identification_schema,
    NO_CARRIER, NO_PRICE_CONTEXT,
};
use super::providers::{GenerationParams, ProviderResponse, TextProvider};
use crate::models::{Accommodation, CarrierPlans, ConversationLog};
use serde::Deserialize;
use service_core::error::AppError;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of carrier identification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Carrier(String),
    Unresolved,
}

/// How the carrier of a reply was found, as reported in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Model,
    Fallback,
    Unresolved,
}

impl Resolution {
    fn as_str(self) -> &'static str {
        match self {
            Resolution::Model => "model",
            Resolution::Fallback => "fallback",
            Resolution::Unresolved => "unresolved",
        }
    }
}

#[derive(Clone)]
pub struct Assistant {
    store: Arc<dyn ChatStore>,
    provider: Arc<dyn TextProvider>,
}

impl Assistant {
    pub fn new(store: Arc<dyn ChatStore>, provider: Arc<dyn TextProvider>) -> Self {
        Self { store, provider }
    }

    pub async fn reply(&self, message: &str) -> Result<String, AppError> {
        let labels = self.store.carrier_labels().await?;

        let (carrier, resolution) = match self.classify(&labels, message).await? {
            Classification::Carrier(label) => (Some(label), Resolution::Model),
            Classification::Unresolved => match fallback_match(&labels, message) {
                Some(label) => (Some(label.to_string()), Resolution::Fallback),
                None => (None, Resolution::Unresolved),
            },
        };

        let Some(carrier) = carrier else {
            tracing::info!(known_carriers = labels.len(), "No carrier identified; asking for clarification");
            record_chat_outcome("clarified", resolution.as_str());
            return Ok(clarification_message(&labels));
        };

        tracing::info!(carrier = %carrier, resolution = resolution.as_str(), "Carrier identified");

        let price_context = self
            .store
            .find_carrier_plans(&carrier)
            .await?
            .as_ref()
            .and_then(linearize_plans)
            .unwrap_or_else(|| NO_PRICE_CONTEXT.to_string());

        let prompt = answer_prompt(&carrier, &price_context, message);
        let answer = self
            .generate("answer", &prompt, &GenerationParams::default())
            .await?
            .text;

        // Best-effort: the reply is returned even when the log write fails.
        if let Err(e) = self
            .store
            .append_conversation(ConversationLog::new(&carrier, message, &answer))
            .await
        {
            tracing::warn!(carrier = %carrier, error = %e, "Failed to log conversation");
        }

        record_chat_outcome("answered", resolution.as_str());
        Ok(answer)
    }

    /// Stage 1. An empty catalog short-circuits without a model call.
    pub async fn classify(
        &self,
        labels: &[String],
        message: &str,
    ) -> Result<Classification, AppError> {
        if labels.is_empty() {
            return Ok(Classification::Unresolved);
        }

        let params = GenerationParams {
            temperature: Some(0.0),
            output_schema: Some(identification_schema(labels)),
        };
        let response = self
            .generate("identify", &identification_prompt(labels, message), &params)
            .await?;

        Ok(parse_classification(&response.text, labels))
    }

    async fn generate(
        &self,
        stage: &'static str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, AppError> {
        let provider = self.provider.name();
        let start = Instant::now();
        let result = self.provider.generate(prompt, params).await;
        record_provider_latency(provider, stage, start.elapsed().as_secs_f64());

        match result {
            Ok(response) => {
                record_tokens(stage, response.input_tokens, response.output_tokens);
                Ok(response)
            }
            Err(e) => {
                record_provider_error(provider, e.kind());
                Err(AppError::ProviderError(anyhow::anyhow!(
                    "{} stage failed: {}",
                    stage,
                    e
                )))
            }
        }
    }
}

#[derive(Deserialize)]
struct ClassificationPayload {
    operadora: String,
}

/// Reads the classifier output into a catalog label.
///
/// Accepts the JSON contract, and a bare label for models that ignore it.
/// Anything that is not a known label counts as unresolved.
pub fn parse_classification(raw: &str, labels: &[String]) -> Classification {
    let trimmed = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let candidate = match serde_json::from_str::<ClassificationPayload>(trimmed) {
        Ok(payload) => payload.operadora,
        Err(_) => trimmed.trim_matches('"').to_string(),
    };
    let candidate = candidate.trim();

    if candidate.eq_ignore_ascii_case(NO_CARRIER) {
        return Classification::Unresolved;
    }

    labels
        .iter()
        .find(|label| label.as_str() == candidate)
        .or_else(|| {
            labels
                .iter()
                .find(|label| label.to_lowercase() == candidate.to_lowercase())
        })
        .map(|label| Classification::Carrier(label.clone()))
        .unwrap_or(Classification::Unresolved)
}

/// First label whose first word occurs in the message, case-insensitively.
pub fn fallback_match<'a>(labels: &'a [String], message: &str) -> Option<&'a str> {
    let message = message.to_lowercase();
    labels
        .iter()
        .find(|label| {
            label
                .to_lowercase()
                .split_whitespace()
                .next()
                .is_some_and(|first_word| message.contains(first_word))
        })
        .map(String::as_str)
}

/// Compact text rendering of a carrier's plans for the answer prompt.
///
/// Returns `None` when the document has no plans.
pub fn linearize_plans(plans: &CarrierPlans) -> Option<String> {
    let mut text = String::new();

    for plan in &plans.planos {
        let _ = write!(
            text,
            "\nPlano: \"{}\"\nAcomodação: {}\n",
            plan.produto, plan.acomodacao
        );

        if let Some(prices) = plan.prices(&Accommodation::ASSISTANT_PRIORITY) {
            text.push_str("Preços por faixa etária:\n");
            for row in prices.sorted_rows() {
                let _ = writeln!(text, "- {} anos: R$ {}", row.spoken_band(), row.amount());
            }
        }
    }

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
