//! Stake allocation engine
//!
//! Four calculators share one line model and one result shape:
//! - [`dutching`]: equal return across outcomes for a fixed total
//! - [`aumentada`]: dutching over boosted odds, optionally around a fixed stake
//! - [`limitation`]: back/lay/freebet lines, automatic or manual
//! - [`extraction`]: closed-form freebet / bonus conversion
//!
//! [`Calculator`] holds the state of one calculator tab and applies edits.

pub mod aumentada;
pub mod dutching;
pub mod extraction;
pub mod input;
pub mod limitation;
pub mod lines;
pub mod result;
pub mod rounding;
pub mod session;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use extraction::{BonusType, ExtractionInput, ExtractionResult};
pub use limitation::RecomputeMode;
pub use lines::{AumentadaLine, BetLine, BetMode, LimitationLine, MAX_LINES, MIN_LINES};
pub use result::{CalculationResult, Roi};
pub use session::{Calculator, Lines};

/// Calculator tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculatorMode {
    #[default]
    Dutching,
    Aumentada,
    Limitation,
    Extraction,
}

impl CalculatorMode {
    pub const ALL: [CalculatorMode; 4] = [
        CalculatorMode::Dutching,
        CalculatorMode::Aumentada,
        CalculatorMode::Limitation,
        CalculatorMode::Extraction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalculatorMode::Dutching => "dutching",
            CalculatorMode::Aumentada => "aumentada",
            CalculatorMode::Limitation => "limitation",
            CalculatorMode::Extraction => "extraction",
        }
    }
}

impl fmt::Display for CalculatorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculatorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dutching" => Ok(CalculatorMode::Dutching),
            "aumentada" | "boost" => Ok(CalculatorMode::Aumentada),
            "limitation" | "limitacao" => Ok(CalculatorMode::Limitation),
            "extraction" | "extracao" => Ok(CalculatorMode::Extraction),
            other => Err(format!("unknown calculator mode: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Dutching".parse::<CalculatorMode>(), Ok(CalculatorMode::Dutching));
        assert_eq!("boost".parse::<CalculatorMode>(), Ok(CalculatorMode::Aumentada));
        assert_eq!("extracao".parse::<CalculatorMode>(), Ok(CalculatorMode::Extraction));
        assert!("poker".parse::<CalculatorMode>().is_err());
    }

    #[test]
    fn test_mode_display_matches_serde() {
        for mode in CalculatorMode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode));
        }
    }
}
