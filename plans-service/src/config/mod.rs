use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Default model for both assistant stages.
const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Key prefix under which every carrier has its own folder.
const DEFAULT_ROOT_PREFIX: &str = "processados/";

#[derive(Debug, Clone)]
pub struct PlansConfig {
    pub common: core_config::Config,
    pub storage: StorageConfig,
    pub mongodb: MongoConfig,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub root_prefix: String,
    pub local_path: String,
    pub s3_bucket: Option<String>,
    pub s3_region: String,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub text_model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Local,
    S3,
}

impl PlansConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let backend: StorageBackend = get_env("STORAGE_BACKEND", Some("s3"), is_prod)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let s3_bucket = match backend {
            StorageBackend::S3 => Some(get_env("S3_BUCKET_NAME", None, is_prod)?),
            StorageBackend::Local => env::var("S3_BUCKET_NAME").ok(),
        };

        Ok(PlansConfig {
            common: common_config,
            storage: StorageConfig {
                backend,
                root_prefix: normalize_prefix(&get_env(
                    "STORAGE_ROOT_PREFIX",
                    Some(DEFAULT_ROOT_PREFIX),
                    is_prod,
                )?),
                local_path: get_env("STORAGE_LOCAL_PATH", Some("storage"), is_prod)?,
                s3_bucket,
                s3_region: get_env("AWS_REGION", Some("us-east-1"), is_prod)?,
            },
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("planos_db"), is_prod)?,
            },
            google: GoogleConfig {
                api_key: Secret::new(get_env("GEMINI_API_KEY", None, is_prod)?),
            },
            models: ModelConfig {
                text_model: get_env("GENAI_TEXT_MODEL", Some(DEFAULT_TEXT_MODEL), is_prod)?,
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
        })
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "s3" => Ok(StorageBackend::S3),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

/// Root prefixes always end in exactly one `/` (or are empty for the bucket root).
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
