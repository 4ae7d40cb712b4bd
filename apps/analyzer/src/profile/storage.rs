//! Durable slot backends for the skill profile.
//!
//! A slot holds one opaque payload (the serialized profile). `write` must not
//! return until the payload is durable.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use redis::AsyncCommands;
use thiserror::Error;
use tempfile::NamedTempFile;

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[async_trait]
pub trait ProfileSlot: Send + Sync {
    /// Returns `None` if the slot has never been written.
    async fn read(&self) -> Result<Option<String>, SlotError>;

    async fn write(&self, payload: &str) -> Result<(), SlotError>;

    /// Short human-readable location, for logs.
    fn describe(&self) -> String;
}

// ────────────────────────────────────────────────────────────────────────────
// FileSlot
// ────────────────────────────────────────────────────────────────────────────

/// `<dir>/<name>.json` on the local filesystem.
pub struct FileSlot {
    dir: PathBuf,
    path: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>, name: &str) -> Self {
        let dir = dir.into();
        let path = dir.join(format!("{name}.json"));
        Self { dir, path }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl ProfileSlot for FileSlot {
    async fn read(&self) -> Result<Option<String>, SlotError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SlotError::Io(e)),
        }
    }

    /// Writes to a temp file beside the target, syncs it, then renames over the target.
    async fn write(&self, payload: &str) -> Result<(), SlotError> {
        let dir = self.dir.clone();
        let path = self.path.clone();
        let payload = payload.to_owned();

        tokio::task::spawn_blocking(move || -> Result<(), SlotError> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(payload.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await?
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RedisSlot
// ────────────────────────────────────────────────────────────────────────────

/// A single Redis key.
pub struct RedisSlot {
    client: redis::Client,
    key: String,
}

impl RedisSlot {
    pub fn new(client: redis::Client, key: impl Into<String>) -> Self {
        Self {
            client,
            key: key.into(),
        }
    }
}

#[async_trait]
impl ProfileSlot for RedisSlot {
    async fn read(&self) -> Result<Option<String>, SlotError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(&self.key).await?;
        Ok(payload)
    }

    async fn write(&self, payload: &str) -> Result<(), SlotError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(&self.key, payload).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("redis key {}", self.key)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemorySlot
// ────────────────────────────────────────────────────────────────────────────

/// Process-local slot. Lost on exit.
#[derive(Default)]
pub struct MemorySlot {
    payload: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Mutex::new(Some(payload.into())),
        }
    }

    pub fn snapshot(&self) -> Option<String> {
        self.payload
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ProfileSlot for MemorySlot {
    async fn read(&self) -> Result<Option<String>, SlotError> {
        Ok(self.snapshot())
    }

    async fn write(&self, payload: &str) -> Result<(), SlotError> {
        *self
            .payload
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(payload.to_owned());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
