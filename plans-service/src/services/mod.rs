pub mod assistant;
pub mod catalog;
pub mod database;
pub mod metrics;
pub mod prompts;
pub mod providers;
pub mod storage;

pub use assistant::{Assistant, Classification};
pub use catalog::PlanCatalog;
pub use database::{ChatStore, InMemoryChatStore, PlansDb};
pub use storage::{LocalStorage, S3Storage, Storage};
