//! Bonus extraction (freebet / deposit bonus conversion)
//!
//! Converts a bookmaker bonus into cash by backing at the bookmaker and
//! laying the same selection on an exchange that charges `commission` on
//! net winnings.
//!
//! With `c = commission / 100`:
//!     freebet: lay = stake * (back - 1) / (lay_odd - c), profit = lay * (1 - c)
//!     normal:  lay = stake * back / (lay_odd - c),       profit = lay * (1 - c) - stake
//!
//! The liability is `lay * (lay_odd - 1)`. Retention is the profit as a
//! percentage of the stake (freebet) or of stake plus liability (normal).

use serde::{Deserialize, Serialize};

use super::input::parse_lenient;
use super::result::{CalculationResult, Roi};
use super::rounding::safe_div;

/// Kind of bonus being converted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusType {
    /// Stake is not returned with the winnings
    #[default]
    Freebet,
    /// Stake is returned (deposit bonus, qualifying bet)
    Normal,
}

/// Extraction inputs; every field is clamped to be non-negative
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionInput {
    #[serde(default, alias = "betType")]
    pub bet_type: BonusType,
    #[serde(default)]
    pub stake: f64,
    #[serde(default, alias = "backOdd")]
    pub back_odd: f64,
    #[serde(default, alias = "layOdd")]
    pub lay_odd: f64,
    /// Exchange commission in percent (6.5 = 6.5%)
    #[serde(default)]
    pub commission: f64,
}

impl ExtractionInput {
    pub fn new(
        bet_type: BonusType,
        stake: f64,
        back_odd: f64,
        lay_odd: f64,
        commission: f64,
    ) -> Self {
        Self {
            bet_type,
            stake: clamp_input(stake),
            back_odd: clamp_input(back_odd),
            lay_odd: clamp_input(lay_odd),
            commission: clamp_input(commission),
        }
    }

    /// Build from raw form text; blanks and garbage read as 0
    pub fn from_raw(
        bet_type: BonusType,
        stake: &str,
        back_odd: &str,
        lay_odd: &str,
        commission: &str,
    ) -> Self {
        Self::new(
            bet_type,
            parse_lenient(stake),
            parse_lenient(back_odd),
            parse_lenient(lay_odd),
            parse_lenient(commission),
        )
    }

    /// Copy with every field clamped
    pub fn sanitized(&self) -> Self {
        Self::new(
            self.bet_type,
            self.stake,
            self.back_odd,
            self.lay_odd,
            self.commission,
        )
    }
}

fn clamp_input(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Extraction figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub lay_stake: f64,
    pub liability: f64,
    pub profit: f64,
    /// Profit as a percentage of the money the conversion ties up
    pub retention: f64,
    pub profit_if_back_wins: f64,
    pub profit_if_lay_wins: f64,
}

/// Closed-form extraction
///
/// # Examples
/// ```
/// use surebet::core::extraction::{calculate, BonusType, ExtractionInput};
/// let input = ExtractionInput::new(BonusType::Freebet, 100.0, 3.0, 3.0, 0.0);
/// let result = calculate(&input);
/// assert!((result.lay_stake - 66.6667).abs() < 1e-3);
/// ```
pub fn calculate(input: &ExtractionInput) -> ExtractionResult {
    let input = input.sanitized();
    let rate = input.commission / 100.0;
    let denominator = input.lay_odd - rate;

    if input.stake <= 0.0 || input.back_odd <= 0.0 || denominator <= 0.0 {
        return ExtractionResult::default();
    }

    let (back_winnings, outlay) = match input.bet_type {
        BonusType::Freebet => ((input.back_odd - 1.0).max(0.0), 0.0),
        BonusType::Normal => (input.back_odd, input.stake),
    };

    let lay_stake = input.stake * back_winnings / denominator;
    let liability = lay_stake * (input.lay_odd - 1.0).max(0.0);
    let profit = lay_stake * (1.0 - rate) - outlay;

    let retention_base = match input.bet_type {
        BonusType::Freebet => input.stake,
        BonusType::Normal => input.stake + liability,
    };
    let retention = safe_div(profit, retention_base) * 100.0;

    // Either bonus type nets the back winnings when the selection wins; the
    // lay liability is lost
    let profit_if_back_wins = input.stake * (input.back_odd - 1.0) - liability;
    let profit_if_lay_wins = profit;

    ExtractionResult {
        lay_stake,
        liability,
        profit,
        retention,
        profit_if_back_wins,
        profit_if_lay_wins,
    }
}

impl ExtractionResult {
    /// Express the two hedge legs in the shared result shape
    /// (`[back, lay]` order)
    pub fn to_calculation(&self, input: &ExtractionInput) -> CalculationResult {
        let input = input.sanitized();
        let total_investment = match input.bet_type {
            BonusType::Freebet => 0.0,
            BonusType::Normal => input.stake,
        };
        let back_return = match input.bet_type {
            BonusType::Freebet => input.stake * (input.back_odd - 1.0).max(0.0),
            BonusType::Normal => input.stake * input.back_odd,
        };
        let rate = input.commission / 100.0;

        CalculationResult {
            stakes: vec![input.stake, self.lay_stake],
            returns: vec![back_return, self.lay_stake * (1.0 - rate)],
            profits: vec![self.profit_if_back_wins, self.profit_if_lay_wins],
            total_return: self.profit + total_investment,
            profit: self.profit,
            total_investment,
            roi: Roi::from_profit(self.profit, total_investment),
            liability: self.liability,
        }
    }
}
