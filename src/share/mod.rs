//! Share links for calculator configurations
//!
//! A share snapshots the lines of one calculator tab under a short random
//! code and keeps it for [`ShareConfig::ttl_days`] days. Records go through
//! a [`ShareStore`], which is treated as a dumb key-value store: the payload
//! is kept as untyped JSON and every numeric field is coerced back to a
//! number when the share is restored.
//!
//! # Example
//!
//! ```no_run
//! use surebet::core::{BetLine, Lines};
//! use surebet::share::{MemoryShareStore, ShareCodec};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let codec = ShareCodec::new(MemoryShareStore::new());
//!     let lines = Lines::Dutching(vec![BetLine::new(2.1, 0.0), BetLine::new(2.0, 0.0)]);
//!
//!     let code = codec.create_share(&lines, Some(100.0)).await?;
//!     let restored = codec.get_share(&code).await?;
//!     println!("{} lines restored", restored.lines.len());
//!     Ok(())
//! }
//! ```

mod file_store;
mod memory;

pub use file_store::JsonDirShareStore;
pub use memory::MemoryShareStore;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::input::parse_lenient;
use crate::core::{CalculatorMode, Lines, MAX_LINES, MIN_LINES};

/// Characters used in share codes (no 0/O or 1/I lookalikes)
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Attempts at finding an unused code before giving up
const MAX_CODE_ATTEMPTS: u32 = 5;

/// Share errors
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Share not found: {0}")]
    NotFound(String),

    #[error("Share expired: {0}")]
    Expired(String),

    #[error("Share code already in use: {0}")]
    Conflict(String),

    #[error("Invalid share payload: {0}")]
    InvalidPayload(String),

    #[error("Share storage failed: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Share serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Share configuration
#[derive(Debug, Clone)]
pub struct ShareConfig {
    /// Days a share stays readable
    pub ttl_days: i64,
    /// Random characters after the mode prefix
    pub code_length: usize,
}

impl ShareConfig {
    /// Expiry of a share created at `now`
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(self.ttl_days)
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            ttl_days: 5,
            code_length: 8,
        }
    }
}

/// Stored share, as written to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: CalculatorMode,
    pub data: Value,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub total_stake: Option<f64>,
    pub expires_at: DateTime<Utc>,
}

impl ShareRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Restored share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedCalculation {
    pub code: String,
    pub lines: Lines,
    pub total_stake: f64,
    pub expires_at: DateTime<Utc>,
}

/// Keyed blob store for share records
#[async_trait]
pub trait ShareStore: Send + Sync {
    /// Insert a new record; `ShareError::Conflict` if the code exists
    async fn insert(&self, record: ShareRecord) -> Result<(), ShareError>;

    async fn get(&self, code: &str) -> Result<Option<ShareRecord>, ShareError>;

    /// Delete one record, returning whether it existed
    async fn remove(&self, code: &str) -> Result<bool, ShareError>;

    /// Drop records that expired before `now`, returning how many
    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<usize, ShareError>;
}

#[async_trait]
impl<T: ShareStore + ?Sized> ShareStore for Arc<T> {
    async fn insert(&self, record: ShareRecord) -> Result<(), ShareError> {
        (**self).insert(record).await
    }

    async fn get(&self, code: &str) -> Result<Option<ShareRecord>, ShareError> {
        (**self).get(code).await
    }

    async fn remove(&self, code: &str) -> Result<bool, ShareError> {
        (**self).remove(code).await
    }

    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<usize, ShareError> {
        (**self).remove_expired(now).await
    }
}

/// Code prefix identifying the calculator a share belongs to
pub fn code_prefix(mode: CalculatorMode) -> &'static str {
    match mode {
        CalculatorMode::Dutching => "DT",
        CalculatorMode::Aumentada => "AU",
        CalculatorMode::Limitation => "LM",
        CalculatorMode::Extraction => "EX",
    }
}

/// Random share code: mode prefix + `length` characters
pub fn generate_code(mode: CalculatorMode, length: usize) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..length)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", code_prefix(mode), suffix)
}

/// Whether `code` could have been produced by [`generate_code`]
///
/// Stores use this to reject codes before they reach a key or path.
pub fn is_well_formed_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= 64 && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Creates and restores shares through a store
pub struct ShareCodec<S: ShareStore> {
    store: S,
    config: ShareConfig,
}

impl<S: ShareStore> ShareCodec<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, ShareConfig::default())
    }

    pub fn with_config(store: S, config: ShareConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    /// Snapshot `lines` and return the new share code
    pub async fn create_share(
        &self,
        lines: &Lines,
        total_stake: Option<f64>,
    ) -> Result<String, ShareError> {
        self.create_share_at(lines, total_stake, Utc::now()).await
    }

    pub async fn create_share_at(
        &self,
        lines: &Lines,
        total_stake: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<String, ShareError> {
        let kind = lines.mode();
        let data = encode_lines(lines)?;
        let expires_at = self.config.expires_at(now);

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code(kind, self.config.code_length);
            let record = ShareRecord {
                code: code.clone(),
                kind,
                data: data.clone(),
                total_stake,
                expires_at,
            };

            match self.store.insert(record).await {
                Ok(()) => {
                    info!("Created {} share {} (expires {})", kind, code, expires_at);
                    return Ok(code);
                }
                Err(ShareError::Conflict(_)) => {
                    warn!("Share code {} already taken, drawing another", code);
                }
                Err(e) => return Err(e),
            }
        }

        Err(ShareError::Conflict(format!(
            "no free code after {} attempts",
            MAX_CODE_ATTEMPTS
        )))
    }

    /// Restore a share; fails when it is unknown or expired
    ///
    /// An expired record is deleted from the store when it is read.
    pub async fn get_share(&self, code: &str) -> Result<SharedCalculation, ShareError> {
        self.get_share_at(code, Utc::now()).await
    }

    /// Delete every record that expired before `now`
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, ShareError> {
        let removed = self.store.remove_expired(now).await?;
        if removed > 0 {
            info!("Removed {} expired shares", removed);
        }
        Ok(removed)
    }

    pub async fn get_share_at(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<SharedCalculation, ShareError> {
        let code = code.trim();
        let record = self
            .store
            .get(code)
            .await?
            .ok_or_else(|| ShareError::NotFound(code.to_string()))?;

        if record.is_expired_at(now) {
            warn!("Share {} expired at {}", code, record.expires_at);
            if let Err(e) = self.store.remove(code).await {
                warn!("Failed to remove expired share {}: {}", code, e);
            }
            return Err(ShareError::Expired(code.to_string()));
        }

        let lines = decode_lines(record.kind, record.data)?;
        info!("Restored {} share {}", record.kind, code);

        Ok(SharedCalculation {
            code: record.code,
            lines,
            total_stake: record.total_stake.unwrap_or(0.0),
            expires_at: record.expires_at,
        })
    }
}

/// Payload stored for `lines`: the bare line array (or extraction record)
pub fn encode_lines(lines: &Lines) -> Result<Value, ShareError> {
    let value = match lines {
        Lines::Dutching(l) => serde_json::to_value(l)?,
        Lines::Aumentada(l) => serde_json::to_value(l)?,
        Lines::Limitation(l) => serde_json::to_value(l)?,
        Lines::Extraction(input) => serde_json::to_value(input)?,
    };
    Ok(value)
}

/// Rebuild typed lines from an untyped payload
///
/// Line arrays must hold between [`MIN_LINES`] and [`MAX_LINES`] entries.
pub fn decode_lines(kind: CalculatorMode, mut data: Value) -> Result<Lines, ShareError> {
    let (numbers, flags) = coerced_fields(kind);
    match &mut data {
        Value::Array(items) => {
            if !(MIN_LINES..=MAX_LINES).contains(&items.len()) {
                return Err(ShareError::InvalidPayload(format!(
                    "expected {} to {} lines, got {}",
                    MIN_LINES,
                    MAX_LINES,
                    items.len()
                )));
            }
            for item in items.iter_mut() {
                coerce_object(item, numbers, flags);
            }
        }
        object @ Value::Object(_) => coerce_object(object, numbers, flags),
        other => {
            return Err(ShareError::InvalidPayload(format!(
                "expected an array or object, got {}",
                other
            )))
        }
    }

    let invalid = |e: serde_json::Error| ShareError::InvalidPayload(e.to_string());
    let lines = match kind {
        CalculatorMode::Dutching => {
            Lines::Dutching(serde_json::from_value(data).map_err(invalid)?)
        }
        CalculatorMode::Aumentada => {
            Lines::Aumentada(serde_json::from_value(data).map_err(invalid)?)
        }
        CalculatorMode::Limitation => {
            Lines::Limitation(serde_json::from_value(data).map_err(invalid)?)
        }
        CalculatorMode::Extraction => {
            Lines::Extraction(serde_json::from_value(data).map_err(invalid)?)
        }
    };
    Ok(lines)
}

/// Numeric and boolean field names (both spellings) for each mode
fn coerced_fields(kind: CalculatorMode) -> (&'static [&'static str], &'static [&'static str]) {
    match kind {
        CalculatorMode::Dutching => (&["odds", "stake"], &["auto_punctuate", "autoPunctuate"]),
        CalculatorMode::Aumentada => (
            &["odds", "stake", "increase"],
            &["auto_punctuate", "autoPunctuate", "is_fixed", "isFixed"],
        ),
        CalculatorMode::Limitation => (
            &["odds", "stake", "lay_odd", "layOdd"],
            &[
                "auto_punctuate",
                "autoPunctuate",
                "is_editing",
                "isEditing",
                "is_freebet",
                "isFreebet",
            ],
        ),
        CalculatorMode::Extraction => (
            &["stake", "back_odd", "backOdd", "lay_odd", "layOdd", "commission"],
            &[],
        ),
    }
}

fn coerce_object(item: &mut Value, numbers: &[&str], flags: &[&str]) {
    let Value::Object(map) = item else {
        return;
    };
    for key in numbers {
        if let Some(v) = map.get_mut(*key) {
            *v = Value::from(coerce_number(v));
        }
    }
    for key in flags {
        if let Some(v) = map.get_mut(*key) {
            *v = Value::Bool(coerce_bool(v));
        }
    }
}

/// Best-effort number from an untyped JSON value (0 when it is not one)
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_lenient(s),
        _ => 0.0,
    }
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    }
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_null()).map(|v| coerce_number(&v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AumentadaLine, BetLine, BetMode, BonusType, ExtractionInput, LimitationLine};
    use serde_json::json;

    #[test]
    fn test_generate_code_prefix_and_length() {
        let code = generate_code(CalculatorMode::Limitation, 8);
        assert!(code.starts_with("LM"));
        assert_eq!(code.len(), 10);
        assert!(is_well_formed_code(&code));
    }

    #[test]
    fn test_is_well_formed_code() {
        assert!(is_well_formed_code("DTABC234"));
        assert!(!is_well_formed_code(""));
        assert!(!is_well_formed_code("../etc/passwd"));
        assert!(!is_well_formed_code("DT ABC"));
    }

    #[test]
    fn test_decode_coerces_strings() {
        let data = json!([
            {"odds": "2.5", "stake": "100"},
            {"odds": 3, "stake": null}
        ]);
        let lines = decode_lines(CalculatorMode::Dutching, data).unwrap();

        match lines {
            Lines::Dutching(l) => {
                assert!((l[0].odds - 2.5).abs() < 1e-12);
                assert!((l[0].stake - 100.0).abs() < 1e-12);
                assert!((l[1].odds - 3.0).abs() < 1e-12);
                assert_eq!(l[1].stake, 0.0);
            }
            other => panic!("unexpected lines: {:?}", other),
        }
    }

    #[test]
    fn test_decode_limitation_camel_case() {
        let data = json!([
            {"odds": "3,0", "stake": "100", "isFreebet": "true", "betMode": "back"},
            {"odds": 0, "stake": 0, "layOdd": "2.95", "betMode": "lay", "isEditing": 0}
        ]);
        let lines = decode_lines(CalculatorMode::Limitation, data).unwrap();

        match lines {
            Lines::Limitation(l) => {
                assert!(l[0].is_freebet);
                assert_eq!(l[1].bet_mode, BetMode::Lay);
                assert!((l[1].lay_odd - 2.95).abs() < 1e-12);
                assert!(!l[1].is_editing);
            }
            other => panic!("unexpected lines: {:?}", other),
        }
    }

    #[test]
    fn test_decode_extraction_object() {
        let data = json!({
            "betType": "normal", "stake": "100", "backOdd": "2.5",
            "layOdd": 2.55, "commission": "6,5"
        });
        let lines = decode_lines(CalculatorMode::Extraction, data).unwrap();
        assert_eq!(
            lines,
            Lines::Extraction(ExtractionInput::new(BonusType::Normal, 100.0, 2.5, 2.55, 6.5))
        );
    }

    #[test]
    fn test_decode_rejects_scalars() {
        let err = decode_lines(CalculatorMode::Dutching, json!(42)).unwrap_err();
        assert!(matches!(err, ShareError::InvalidPayload(_)));
    }

    #[test]
    fn test_decode_rejects_line_count_out_of_range() {
        let line = json!({"odds": 2.0, "stake": 0});
        for count in [0, 1, 8] {
            let data = Value::Array(vec![line.clone(); count]);
            let err = decode_lines(CalculatorMode::Dutching, data).unwrap_err();
            assert!(
                matches!(err, ShareError::InvalidPayload(_)),
                "{} lines",
                count
            );
        }

        let five = Value::Array(vec![line; 5]);
        assert_eq!(decode_lines(CalculatorMode::Limitation, five).unwrap().len(), 5);
    }

    #[test]
    fn test_record_lenient_total_stake() {
        let record: ShareRecord = serde_json::from_value(json!({
            "code": "DTAAAA2222",
            "type": "dutching",
            "data": [],
            "total_stake": "150.5",
            "expires_at": "2030-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(record.total_stake, Some(150.5));
        assert_eq!(record.kind, CalculatorMode::Dutching);
    }

    #[test]
    fn test_encode_round_trips_every_mode() {
        let cases = vec![
            Lines::Dutching(vec![BetLine::new(2.0, 50.0), BetLine::new(2.0, 50.0)]),
            Lines::Aumentada(vec![
                AumentadaLine::new(2.0, 10.0).with_stake(100.0),
                AumentadaLine::new(2.1, 0.0),
            ]),
            Lines::Limitation(vec![
                LimitationLine::freebet(3.0, 100.0),
                LimitationLine::lay(2.95, 67.8),
            ]),
            Lines::Extraction(ExtractionInput::new(BonusType::Freebet, 25.0, 4.0, 4.1, 2.0)),
        ];

        for lines in cases {
            let data = encode_lines(&lines).unwrap();
            let decoded = decode_lines(lines.mode(), data).unwrap();
            assert_eq!(decoded, lines);
        }
    }
}
