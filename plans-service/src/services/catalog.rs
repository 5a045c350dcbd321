//! Carrier listing and plan document retrieval over object storage.
//!
//! Layout: `{root}{carrier}/...json`, one folder per carrier holding the
//! processed price sheet.

use super::metrics::record_storage_operation;
use super::storage::Storage;
use crate::models::{Carrier, CarrierPlans};
use serde_json::Value;
use service_core::error::AppError;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct PlanCatalog {
    storage: Arc<dyn Storage>,
    root_prefix: String,
}

impl PlanCatalog {
    pub fn new(storage: Arc<dyn Storage>, root_prefix: impl Into<String>) -> Self {
        Self {
            storage,
            root_prefix: root_prefix.into(),
        }
    }

    pub fn carrier_prefix(&self, carrier: &str) -> String {
        format!("{}{}/", self.root_prefix, carrier)
    }

    /// Every carrier folder under the root, labelled for display.
    ///
    /// An empty root yields an empty list.
    pub async fn list_carriers(&self) -> Result<Vec<Carrier>, AppError> {
        let prefixes = timed("list_prefixes", self.storage.list_prefixes(&self.root_prefix)).await?;

        Ok(prefixes
            .iter()
            .filter_map(|prefix| Carrier::from_prefix(prefix, &self.root_prefix))
            .collect())
    }

    /// The carrier's plan document, parsed but otherwise untouched.
    ///
    /// `Ok(None)` means the carrier has no data file.
    pub async fn fetch_plan_document(&self, carrier: &str) -> Result<Option<Value>, AppError> {
        let prefix = self.carrier_prefix(carrier);
        let keys = timed("list_keys", self.storage.list_keys(&prefix)).await?;

        let Some(object_key) = select_data_file(carrier, &prefix, &keys) else {
            tracing::warn!(carrier = %carrier, prefix = %prefix, "No data file found for carrier");
            return Ok(None);
        };
        tracing::info!(carrier = %carrier, object_key = %object_key, "Data file found in storage");

        let body = timed("download", self.storage.download(object_key)).await?;
        let document: Value = serde_json::from_slice(&body).map_err(|e| {
            AppError::StorageError(anyhow::anyhow!(
                "Data file {} is not valid JSON: {}",
                object_key,
                e
            ))
        })?;

        Ok(Some(document))
    }

    /// Typed view of [`fetch_plan_document`](Self::fetch_plan_document) for rendering.
    pub async fn fetch_carrier_plans(&self, carrier: &str) -> Result<Option<CarrierPlans>, AppError> {
        match self.fetch_plan_document(carrier).await? {
            Some(document) => Ok(Some(serde_json::from_value(document)?)),
            None => Ok(None),
        }
    }
}

/// Picks the carrier's data file among the keys listed under its prefix.
///
/// Only `.json` objects qualify. `{prefix}{carrier}.json` wins when present,
/// otherwise the lexicographically first candidate is used.
pub fn select_data_file<'a>(carrier: &str, prefix: &str, keys: &'a [String]) -> Option<&'a str> {
    let mut candidates: Vec<&'a str> = keys
        .iter()
        .map(String::as_str)
        .filter(|key| key.to_ascii_lowercase().ends_with(".json"))
        .collect();
    candidates.sort_unstable();

    if candidates.len() > 1 {
        tracing::warn!(
            carrier = %carrier,
            candidates = candidates.len(),
            "Several data files under carrier prefix"
        );
    }

    let conventional = format!("{}{}.json", prefix, carrier);
    candidates
        .iter()
        .find(|key| **key == conventional)
        .or_else(|| candidates.first())
        .copied()
}

async fn timed<T>(
    operation: &'static str,
    call: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    let start = Instant::now();
    let result = call.await;
    record_storage_operation(operation, start.elapsed().as_secs_f64(), result.is_ok());
    result
}
