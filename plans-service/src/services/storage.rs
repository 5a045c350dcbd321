use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use service_core::error::AppError;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Read-only view over the bucket holding the processed carrier files.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Immediate sub-prefixes of `prefix` (delimiter `/`), each ending in `/`.
    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>, AppError>;

    /// Keys of every object under `prefix`, in listing order.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, AppError>;

    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError>;
}

pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .delimiter("/")
            .into_paginator()
            .send();

        let mut prefixes = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                AppError::StorageError(anyhow::anyhow!("S3 list prefixes failed: {}", e))
            })?;
            prefixes.extend(
                page.common_prefixes()
                    .iter()
                    .filter_map(|common| common.prefix().map(str::to_string)),
            );
        }

        Ok(prefixes)
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                AppError::StorageError(anyhow::anyhow!("S3 list objects failed: {}", e))
            })?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );
        }

        Ok(keys)
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::StorageError(anyhow::anyhow!("S3 download failed: {}", e)))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| {
                AppError::StorageError(anyhow::anyhow!("S3 body collection failed: {}", e))
            })?
            .into_bytes()
            .to_vec();

        Ok(data)
    }
}

/// Filesystem mirror of the bucket layout, for local runs and tests.
///
/// Keys map to paths below `base_path`; directories play the part of prefixes.
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::StorageError(anyhow::anyhow!(
                "Invalid storage key: {}",
                key
            )));
        }
        Ok(self.base_path.join(relative))
    }

    /// Splits `a/b/c` into the directory `a/b/` and the name filter `c`.
    fn split_prefix(prefix: &str) -> (&str, &str) {
        match prefix.rfind('/') {
            Some(idx) => (&prefix[..=idx], &prefix[idx + 1..]),
            None => ("", prefix),
        }
    }

    async fn read_dir_sorted(&self, dir_key: &str) -> Result<Vec<(String, bool)>, AppError> {
        let dir = self.resolve(dir_key)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::StorageError(anyhow::Error::new(e))),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let is_dir = entry.file_type().await?.is_dir();
            names.push((entry.file_name().to_string_lossy().into_owned(), is_dir));
        }
        names.sort();
        Ok(names)
    }

    async fn collect_keys(&self, dir_key: String, keys: &mut Vec<String>) -> Result<(), AppError> {
        let mut pending = vec![dir_key];
        while let Some(dir) = pending.pop() {
            for (name, is_dir) in self.read_dir_sorted(&dir).await? {
                if is_dir {
                    pending.push(format!("{}{}/", dir, name));
                } else {
                    keys.push(format!("{}{}", dir, name));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let (dir, name_filter) = Self::split_prefix(prefix);
        let prefixes = self
            .read_dir_sorted(dir)
            .await?
            .into_iter()
            .filter(|(name, is_dir)| *is_dir && name.starts_with(name_filter))
            .map(|(name, _)| format!("{}{}/", dir, name))
            .collect();
        Ok(prefixes)
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let (dir, name_filter) = Self::split_prefix(prefix);
        let mut keys = Vec::new();
        for (name, is_dir) in self.read_dir_sorted(dir).await? {
            if !name.starts_with(name_filter) {
                continue;
            }
            if is_dir {
                self.collect_keys(format!("{}{}/", dir, name), &mut keys)
                    .await?;
            } else {
                keys.push(format!("{}{}", dir, name));
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(key)?;
        let data = fs::read(path)
            .await
            .map_err(|e| AppError::StorageError(anyhow::Error::new(e)))?;
        Ok(data)
    }
}
