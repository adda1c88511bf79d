use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{
    AumentadaLine, BetLine, CalculationResult, CalculatorMode, ExtractionResult, LimitationLine,
    Lines, RecomputeMode,
};

/// Dutching request: split `total_stake` over the lines
#[derive(Debug, Serialize, Deserialize)]
pub struct DutchingRequest {
    pub lines: Vec<BetLine>,
    #[serde(default)]
    pub total_stake: f64,
}

/// Odds-boost request; `total_stake` is ignored when a line is fixed
#[derive(Debug, Serialize, Deserialize)]
pub struct AumentadaRequest {
    pub lines: Vec<AumentadaLine>,
    #[serde(default)]
    pub total_stake: f64,
}

/// Back/lay request
#[derive(Debug, Serialize, Deserialize)]
pub struct LimitationRequest {
    pub lines: Vec<LimitationLine>,
    #[serde(default)]
    pub recompute_mode: RecomputeMode,
}

/// Result of any calculator
#[derive(Debug, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub mode: CalculatorMode,
    /// Lines with the solved stakes written back
    pub lines: Lines,
    pub total_stake: f64,
    pub result: CalculationResult,
    /// Closed-form figures, extraction only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionResult>,
    pub ledger_url: String,
}

/// Ledger URL request
#[derive(Debug, Serialize, Deserialize)]
pub struct LedgerUrlRequest {
    #[serde(flatten)]
    pub lines: Lines,
    /// Overrides the server's form URL
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LedgerUrlResponse {
    pub url: String,
}

/// Share creation request
#[derive(Debug, Serialize, Deserialize)]
pub struct ShareRequest {
    #[serde(flatten)]
    pub lines: Lines,
    #[serde(default)]
    pub total_stake: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShareResponse {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub share_store: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
