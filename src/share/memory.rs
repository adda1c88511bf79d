use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ShareError, ShareRecord, ShareStore};

/// In-process share store; records are lost on restart
#[derive(Debug, Default)]
pub struct MemoryShareStore {
    records: RwLock<HashMap<String, ShareRecord>>,
}

impl MemoryShareStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ShareStore for MemoryShareStore {
    async fn insert(&self, record: ShareRecord) -> Result<(), ShareError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.code) {
            return Err(ShareError::Conflict(record.code));
        }
        records.insert(record.code.clone(), record);
        Ok(())
    }

    async fn get(&self, code: &str) -> Result<Option<ShareRecord>, ShareError> {
        Ok(self.records.read().await.get(code).cloned())
    }

    async fn remove(&self, code: &str) -> Result<bool, ShareError> {
        Ok(self.records.write().await.remove(code).is_some())
    }

    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<usize, ShareError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| !r.is_expired_at(now));
        Ok(before - records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BetLine, BonusType, CalculatorMode, ExtractionInput, LimitationLine, Lines};
    use crate::share::ShareCodec;
    use chrono::Duration;
    use serde_json::json;

    fn record(code: &str, expires_at: DateTime<Utc>) -> ShareRecord {
        ShareRecord {
            code: code.to_string(),
            kind: CalculatorMode::Dutching,
            data: json!([{"odds": 2.0, "stake": 0}, {"odds": 2.0, "stake": 0}]),
            total_stake: Some(100.0),
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_share() {
        let codec = ShareCodec::new(MemoryShareStore::new());
        let lines = Lines::Limitation(vec![
            LimitationLine::back(2.0, 100.0),
            LimitationLine::lay(2.05, 97.56),
        ]);

        let code = codec.create_share(&lines, None).await.unwrap();
        assert!(code.starts_with("LM"));

        let shared = codec.get_share(&code).await.unwrap();
        assert_eq!(shared.code, code);
        assert_eq!(shared.lines, lines);
        assert_eq!(shared.total_stake, 0.0);
    }

    #[tokio::test]
    async fn test_share_expires_after_ttl() {
        let codec = ShareCodec::new(MemoryShareStore::new());
        let input = ExtractionInput::new(BonusType::Freebet, 50.0, 3.0, 3.1, 5.0);
        let lines = Lines::Extraction(input);
        let now = Utc::now();

        let code = codec.create_share_at(&lines, None, now).await.unwrap();

        let inside = now + Duration::days(4);
        assert!(codec.get_share_at(&code, inside).await.is_ok());

        let after = now + Duration::days(5) + Duration::seconds(1);
        let err = codec.get_share_at(&code, after).await.unwrap_err();
        assert!(matches!(err, ShareError::Expired(_)));
    }

    #[tokio::test]
    async fn test_expired_read_evicts_record() {
        let codec = ShareCodec::new(MemoryShareStore::new());
        let lines = Lines::Dutching(vec![BetLine::new(2.0, 0.0), BetLine::new(2.0, 0.0)]);
        let created = Utc::now() - Duration::days(30);

        let mut codes = Vec::new();
        for _ in 0..4 {
            codes.push(codec.create_share_at(&lines, None, created).await.unwrap());
        }
        assert_eq!(codec.store().len().await, 4);

        let err = codec.get_share(&codes[0]).await.unwrap_err();
        assert!(matches!(err, ShareError::Expired(_)));
        assert_eq!(codec.store().len().await, 3);

        // Once evicted, the code is simply unknown
        let err = codec.get_share(&codes[0]).await.unwrap_err();
        assert!(matches!(err, ShareError::NotFound(_)));

        assert_eq!(codec.purge_expired(Utc::now()).await.unwrap(), 3);
        assert!(codec.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryShareStore::new();
        store
            .insert(record("DTCCCC4444", Utc::now() + Duration::days(1)))
            .await
            .unwrap();

        assert!(store.remove("DTCCCC4444").await.unwrap());
        assert!(!store.remove("DTCCCC4444").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let codec = ShareCodec::new(MemoryShareStore::new());
        let err = codec.get_share("DTNOPE2345").await.unwrap_err();
        assert!(matches!(err, ShareError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_code() {
        let store = MemoryShareStore::new();
        let expires = Utc::now() + Duration::days(1);
        store.insert(record("DTAAAA2222", expires)).await.unwrap();

        let err = store.insert(record("DTAAAA2222", expires)).await.unwrap_err();
        assert!(matches!(err, ShareError::Conflict(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_restore_coerces_stored_strings() {
        let store = MemoryShareStore::new();
        let mut raw = record("DTBBBB3333", Utc::now() + Duration::days(1));
        raw.data = json!([{"odds": "2,10", "stake": ""}, {"odds": "1.95", "stake": "abc"}]);
        store.insert(raw).await.unwrap();

        let codec = ShareCodec::new(store);
        let shared = codec.get_share("DTBBBB3333").await.unwrap();

        let Lines::Dutching(lines) = shared.lines else {
            panic!("expected dutching lines");
        };
        assert!((lines[0].odds - 2.10).abs() < 1e-12);
        assert_eq!(lines[0].stake, 0.0);
        assert!((lines[1].odds - 1.95).abs() < 1e-12);
        assert_eq!(lines[1].stake, 0.0);
        assert!((shared.total_stake - 100.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_remove_expired() {
        let store = MemoryShareStore::new();
        let now = Utc::now();
        store.insert(record("DTOLD22222", now - Duration::days(1))).await.unwrap();
        store.insert(record("DTNEW22222", now + Duration::days(1))).await.unwrap();

        assert_eq!(store.remove_expired(now).await.unwrap(), 1);
        assert!(store.get("DTOLD22222").await.unwrap().is_none());
        assert!(store.get("DTNEW22222").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_shared_dutching_keeps_total() {
        let codec = ShareCodec::new(MemoryShareStore::new());
        let lines = Lines::Dutching(vec![BetLine::new(2.0, 50.0), BetLine::new(2.0, 50.0)]);

        let code = codec.create_share(&lines, Some(100.0)).await.unwrap();
        let shared = codec.get_share(&code).await.unwrap();
        assert!((shared.total_stake - 100.0).abs() < 1e-12);
    }
}
