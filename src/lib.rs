//! Surebet - multi-mode betting calculator
//!
//! This library provides:
//! - Dutching: equal-return stake split over mutually exclusive outcomes
//! - Aumentada: dutching over boosted odds, with an optional fixed-stake line
//! - Limitation: back/lay/freebet hedging, automatic or manual
//! - Extraction: freebet and deposit bonus conversion
//! - Share links and the bet ledger hand-off URL
//!
//! # Example
//!
//! ```
//! use surebet::core::{Calculator, CalculatorMode};
//!
//! let mut calc = Calculator::new(CalculatorMode::Dutching);
//! calc.set_odds_input(0, "2.0");
//! calc.set_odds_input(1, "2.0");
//! calc.set_total_stake_input("100");
//!
//! assert_eq!(calc.result().stakes, vec![50.0, 50.0]);
//! println!("Guaranteed profit: {}", calc.result().profit);
//! ```

pub mod core;
pub mod ledger;
pub mod models;
pub mod share;

// API-specific modules (only available with api feature)
#[cfg(feature = "api")]
pub mod error;

// Re-export commonly used types
pub use core::{
    AumentadaLine, BetLine, BetMode, BonusType, CalculationResult, Calculator, CalculatorMode,
    ExtractionInput, ExtractionResult, LimitationLine, Lines, RecomputeMode, Roi,
};
pub use ledger::build_ledger_url;
pub use share::{
    JsonDirShareStore, MemoryShareStore, ShareCodec, ShareConfig, ShareError, ShareStore,
    SharedCalculation,
};
