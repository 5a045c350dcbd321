//! Document database access for the assistant.
//!
//! Three collections are involved: the carrier catalog (`operadoras`), the
//! extracted plan documents (`planos_saude_extraidos`, one per carrier, keyed
//! by `empresa`) and the append-only conversation log (`conversas_chat`).

use crate::models::{CarrierPlans, CatalogEntry, ConversationLog};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc, options::FindOneOptions, options::IndexOptions, Client as MongoClient, Collection,
    Database, IndexModel,
};
use service_core::error::AppError;
use std::sync::Mutex;

pub const CATALOG_COLLECTION: &str = "operadoras";
pub const PLANS_COLLECTION: &str = "planos_saude_extraidos";
pub const CONVERSATIONS_COLLECTION: &str = "conversas_chat";

/// What the assistant needs from the document database.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Labels of every known carrier, in catalog order.
    async fn carrier_labels(&self) -> Result<Vec<String>, AppError>;

    /// The plan document whose `empresa` equals `label` exactly.
    async fn find_carrier_plans(&self, label: &str) -> Result<Option<CarrierPlans>, AppError>;

    async fn append_conversation(&self, entry: ConversationLog) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PlansDb {
    client: MongoClient,
    db: Database,
}

impl PlansDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for plans-service");

        let empresa_index = IndexModel::builder()
            .keys(doc! { "empresa": 1 })
            .options(
                IndexOptions::builder()
                    .name("empresa_lookup".to_string())
                    .build(),
            )
            .build();

        self.plans()
            .create_index(empresa_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create empresa index on plans collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on {}.empresa", PLANS_COLLECTION);

        let timestamp_index = IndexModel::builder()
            .keys(doc! { "timestamp": -1 })
            .options(
                IndexOptions::builder()
                    .name("timestamp_desc".to_string())
                    .build(),
            )
            .build();

        self.conversations()
            .create_index(timestamp_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create timestamp index on conversations: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on {}.timestamp", CONVERSATIONS_COLLECTION);

        Ok(())
    }

    pub fn catalog(&self) -> Collection<CatalogEntry> {
        self.db.collection(CATALOG_COLLECTION)
    }

    pub fn plans(&self) -> Collection<CarrierPlans> {
        self.db.collection(PLANS_COLLECTION)
    }

    pub fn conversations(&self) -> Collection<ConversationLog> {
        self.db.collection(CONVERSATIONS_COLLECTION)
    }
}

#[async_trait]
impl ChatStore for PlansDb {
    async fn carrier_labels(&self) -> Result<Vec<String>, AppError> {
        let entries: Vec<CatalogEntry> = self
            .catalog()
            .find(None, None)
            .await?
            .try_collect()
            .await?;
        Ok(entries.into_iter().map(|entry| entry.label).collect())
    }

    async fn find_carrier_plans(&self, label: &str) -> Result<Option<CarrierPlans>, AppError> {
        let plans = self
            .plans()
            .find_one(doc! { "empresa": label }, FindOneOptions::builder().build())
            .await?;
        Ok(plans)
    }

    async fn append_conversation(&self, entry: ConversationLog) -> Result<(), AppError> {
        self.conversations().insert_one(entry, None).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }
}

/// Process-local store for development and tests.
///
/// Keeps every call observable: plan lookups are recorded in order and the
/// conversation log can be inspected.
#[derive(Default)]
pub struct InMemoryChatStore {
    labels: Vec<String>,
    plans: Vec<CarrierPlans>,
    lookups: Mutex<Vec<String>>,
    conversations: Mutex<Vec<ConversationLog>>,
    fail_logging: bool,
}

impl InMemoryChatStore {
    pub fn new(labels: Vec<String>, plans: Vec<CarrierPlans>) -> Self {
        Self {
            labels,
            plans,
            ..Self::default()
        }
    }

    /// Makes every `append_conversation` fail, to exercise best-effort logging.
    pub fn with_failing_log(mut self) -> Self {
        self.fail_logging = true;
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn conversations(&self) -> Vec<ConversationLog> {
        self.conversations
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn carrier_labels(&self) -> Result<Vec<String>, AppError> {
        Ok(self.labels.clone())
    }

    async fn find_carrier_plans(&self, label: &str) -> Result<Option<CarrierPlans>, AppError> {
        self.lookups
            .lock()
            .map_err(|_| AppError::DatabaseError(anyhow::anyhow!("lookup log poisoned")))?
            .push(label.to_string());
        Ok(self.plans.iter().find(|p| p.empresa == label).cloned())
    }

    async fn append_conversation(&self, entry: ConversationLog) -> Result<(), AppError> {
        if self.fail_logging {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "conversation log unavailable"
            )));
        }
        self.conversations
            .lock()
            .map_err(|_| AppError::DatabaseError(anyhow::anyhow!("conversation log poisoned")))?
            .push(entry);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
