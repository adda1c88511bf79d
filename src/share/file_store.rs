use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use super::{is_well_formed_code, ShareError, ShareRecord, ShareStore};

/// Share store keeping one pretty-printed `{code}.json` file per record
#[derive(Debug, Clone)]
pub struct JsonDirShareStore {
    dir: PathBuf,
}

impl JsonDirShareStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, code: &str) -> PathBuf {
        self.dir.join(format!("{}.json", code))
    }
}

#[async_trait]
impl ShareStore for JsonDirShareStore {
    async fn insert(&self, record: ShareRecord) -> Result<(), ShareError> {
        if !is_well_formed_code(&record.code) {
            return Err(ShareError::InvalidPayload(format!(
                "malformed share code: {}",
                record.code
            )));
        }

        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(&record.code);
        if fs::try_exists(&path).await? {
            return Err(ShareError::Conflict(record.code));
        }

        let json = serde_json::to_string_pretty(&record)?;
        fs::write(&path, json).await?;
        debug!("Wrote share {}", path.display());
        Ok(())
    }

    async fn get(&self, code: &str) -> Result<Option<ShareRecord>, ShareError> {
        if !is_well_formed_code(code) {
            return Ok(None);
        }

        let content = match fs::read_to_string(self.path_for(code)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn remove(&self, code: &str) -> Result<bool, ShareError> {
        if !is_well_formed_code(code) {
            return Ok(false);
        }

        match fs::remove_file(self.path_for(code)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<usize, ShareError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let content = fs::read_to_string(&path).await?;
            let record: ShareRecord = match serde_json::from_str(&content) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable share {}: {}", path.display(), e);
                    continue;
                }
            };

            if record.is_expired_at(now) {
                fs::remove_file(&path).await?;
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("Removed {} expired shares from {}", removed, self.dir.display());
        }
        Ok(removed)
    }
}
