//! Limitation (back/lay) calculator
//!
//! Lines can be back bets, freebets or a single lay bet on an exchange.
//! What a line costs and what it pays if its outcome happens:
//!
//! | line           | investment              | return if it wins   |
//! |----------------|-------------------------|---------------------|
//! | back           | stake                   | odds * stake        |
//! | back, freebet  | 0                       | (odds - 1) * stake  |
//! | lay            | stake * (lay_odd - 1)   | stake               |
//!
//! In manual mode the stakes are whatever the user typed and only the
//! figures are derived. In automatic mode the line being edited drives the
//! others: every other stake is solved so that its line returns what the
//! driver returns. A back line hedged by a lay line (exactly two lines) is
//! the classic extraction and is solved on its own.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::lines::LimitationLine;
use super::result::{CalculationResult, Roi};
use super::rounding::{round2, safe_div};

/// How stakes are recomputed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecomputeMode {
    #[default]
    Automatic,
    Manual,
}

/// Recompute for the given mode
///
/// The returned `stakes` are the stakes the lines should hold afterwards;
/// in manual mode (and whenever there is nothing to drive from) they are
/// the current stakes unchanged.
pub fn calculate(lines: &[LimitationLine], mode: RecomputeMode) -> CalculationResult {
    match mode {
        RecomputeMode::Manual => settle(lines),
        RecomputeMode::Automatic => recompute(lines),
    }
}

/// Figures for the current stakes, without touching them
///
/// Every line with usable odds is an outcome that can happen, staked or
/// not; an unstaked one returns 0. The guaranteed return is the worst of
/// them. Lines without odds are left out.
pub fn settle(lines: &[LimitationLine]) -> CalculationResult {
    if !lines.iter().any(|l| l.stake() > 0.0) {
        return CalculationResult::zeroed(lines.len());
    }

    let stakes: Vec<f64> = lines.iter().map(|l| l.stake()).collect();
    let counted: Vec<bool> = lines.iter().map(|l| l.has_valid_odds()).collect();
    let returns: Vec<f64> = lines
        .iter()
        .zip(&counted)
        .map(|(l, c)| if *c { round2(l.return_if_win()) } else { 0.0 })
        .collect();
    let total_investment: f64 = lines.iter().map(|l| l.investment()).sum();
    let liability: f64 = lines.iter().map(|l| l.liability()).sum();

    CalculationResult::guaranteed(stakes, returns, &counted, total_investment, liability)
}

fn recompute(lines: &[LimitationLine]) -> CalculationResult {
    let driver = lines
        .iter()
        .position(|l| l.is_editing)
        .filter(|&d| lines[d].stake() > 0.0 && lines[d].has_valid_odds());

    let Some(driver) = driver else {
        return settle(lines);
    };

    if let Some((back, lay)) = extraction_pair(lines) {
        return extraction(lines, back, lay, driver);
    }

    equalize(lines, driver)
}

/// `(back, lay)` indexes when the lines are exactly one back and one lay
pub fn extraction_pair(lines: &[LimitationLine]) -> Option<(usize, usize)> {
    if lines.len() != 2 {
        return None;
    }
    match (lines[0].is_lay(), lines[1].is_lay()) {
        (false, true) => Some((0, 1)),
        (true, false) => Some((1, 0)),
        _ => None,
    }
}

/// Two-line back/lay hedge
fn extraction(
    lines: &[LimitationLine],
    back_idx: usize,
    lay_idx: usize,
    driver: usize,
) -> CalculationResult {
    let back = &lines[back_idx];
    let lay = &lines[lay_idx];
    let back_odd = back.line.odds;
    let lay_odd = lay.lay_odd;
    let freebet = back.is_freebet;

    // Winnings per unit of back stake: a freebet does not pay its stake back
    let back_factor = if freebet { back_odd - 1.0 } else { back_odd };

    let (back_stake, lay_stake) = if driver == back_idx {
        let lay_stake = round2(safe_div(back.stake() * back_factor, lay_odd)).max(0.0);
        (back.stake(), lay_stake)
    } else {
        if back_factor <= 0.0 {
            debug!("back odds {} cannot be solved from the lay side", back_odd);
            return settle(lines);
        }
        (round2(lay.stake() * lay_odd / back_factor), lay.stake())
    };

    let liability = if lay_odd > 1.0 {
        round2(lay_stake * (lay_odd - 1.0))
    } else {
        0.0
    };
    let gross_back = round2(back_stake * back_factor.max(0.0));
    let total_investment = if freebet { 0.0 } else { back_stake };

    let profit_if_back_wins = round2(gross_back - total_investment - liability);
    let profit_if_lay_wins = round2(lay_stake - total_investment);
    let profit = profit_if_back_wins.min(profit_if_lay_wins);

    let mut stakes = vec![0.0; 2];
    let mut returns = vec![0.0; 2];
    let mut profits = vec![0.0; 2];
    stakes[back_idx] = back_stake;
    stakes[lay_idx] = lay_stake;
    returns[back_idx] = gross_back;
    returns[lay_idx] = lay_stake;
    profits[back_idx] = profit_if_back_wins;
    profits[lay_idx] = profit_if_lay_wins;

    CalculationResult {
        stakes,
        returns,
        profits,
        total_return: round2(profit + total_investment),
        profit,
        total_investment,
        roi: Roi::from_profit(profit, total_investment),
        liability,
    }
}

/// Generic case: every other line returns what the driver returns
fn equalize(lines: &[LimitationLine], driver: usize) -> CalculationResult {
    let target = lines[driver].return_if_win();

    let mut solved = lines.to_vec();
    for (i, line) in solved.iter_mut().enumerate() {
        if i == driver {
            continue;
        }
        let factor = line.return_factor();
        let stake = if line.has_valid_odds() && factor > 0.0 {
            round2(target / factor)
        } else {
            0.0
        };
        line.line.stake = stake;
    }

    settle(&solved)
}
