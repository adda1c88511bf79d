//! Hand-off of calculator lines to the external bet-entry form
//!
//! The form reads one group of query parameters per line, suffixed `a` to
//! `e`: `odds_a`, `investment_a`, `is_freebet_a`, `bet_mode_a`, `increase_a`.
//! Only non-zero numbers and set flags are written; the receiver fills the
//! rest with its own defaults.

use serde::{Deserialize, Serialize};

use crate::core::extraction::{self, BonusType};
use crate::core::{BetMode, Lines, MAX_LINES};

const SUFFIXES: [char; MAX_LINES] = ['a', 'b', 'c', 'd', 'e'];

/// One bet as the ledger form sees it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerLine {
    pub odds: f64,
    pub investment: f64,
    pub is_freebet: bool,
    pub bet_mode: BetMode,
    pub increase: f64,
}

/// Flatten calculator lines into ledger bets (at most five)
pub fn ledger_lines(lines: &Lines) -> Vec<LedgerLine> {
    let mut out: Vec<LedgerLine> = match lines {
        Lines::Dutching(l) => l
            .iter()
            .map(|l| LedgerLine {
                odds: l.odds,
                investment: l.stake,
                ..Default::default()
            })
            .collect(),
        Lines::Aumentada(l) => l
            .iter()
            .map(|l| LedgerLine {
                odds: l.line.odds,
                investment: l.line.stake,
                increase: l.increase,
                ..Default::default()
            })
            .collect(),
        Lines::Limitation(l) => l
            .iter()
            .map(|l| LedgerLine {
                odds: l.effective_odds(),
                investment: l.stake(),
                is_freebet: l.is_freebet && !l.is_lay(),
                bet_mode: l.bet_mode,
                increase: 0.0,
            })
            .collect(),
        Lines::Extraction(input) => {
            let result = extraction::calculate(input);
            vec![
                LedgerLine {
                    odds: input.back_odd,
                    investment: input.stake,
                    is_freebet: input.bet_type == BonusType::Freebet,
                    ..Default::default()
                },
                LedgerLine {
                    odds: input.lay_odd,
                    investment: result.lay_stake,
                    bet_mode: BetMode::Lay,
                    ..Default::default()
                },
            ]
        }
    };
    out.truncate(MAX_LINES);
    out
}

/// Query string for `lines` (no leading `?`)
pub fn ledger_query(lines: &Lines) -> String {
    let mut params: Vec<String> = Vec::new();

    for (line, suffix) in ledger_lines(lines).iter().zip(SUFFIXES) {
        if has_value(line.odds) {
            params.push(format!("odds_{}={:.2}", suffix, line.odds));
        }
        if has_value(line.investment) {
            params.push(format!("investment_{}={:.2}", suffix, line.investment));
        }
        if line.is_freebet {
            params.push(format!("is_freebet_{}=true", suffix));
        }
        if line.bet_mode == BetMode::Lay {
            params.push(format!("bet_mode_{}={}", suffix, line.bet_mode.as_str()));
        }
        if has_value(line.increase) {
            params.push(format!("increase_{}={:.2}", suffix, line.increase));
        }
    }

    params.join("&")
}

/// Full URL of the bet-entry form prefilled with `lines`
///
/// # Examples
/// ```
/// use surebet::core::{BetLine, Lines};
/// use surebet::ledger::build_ledger_url;
///
/// let lines = Lines::Dutching(vec![BetLine::new(2.1, 47.62), BetLine::new(1.9, 52.38)]);
/// let url = build_ledger_url("/bets/new", &lines);
/// assert_eq!(
///     url,
///     "/bets/new?odds_a=2.10&investment_a=47.62&odds_b=1.90&investment_b=52.38"
/// );
/// ```
pub fn build_ledger_url(base: &str, lines: &Lines) -> String {
    let query = ledger_query(lines);
    if query.is_empty() {
        return base.to_string();
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, separator, query)
}

fn has_value(v: f64) -> bool {
    v.is_finite() && v.abs() >= 0.005
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AumentadaLine, BetLine, ExtractionInput, LimitationLine};

    #[test]
    fn test_zero_values_are_omitted() {
        let lines = Lines::Dutching(vec![BetLine::new(2.0, 0.0), BetLine::default()]);
        assert_eq!(build_ledger_url("/bets/new", &lines), "/bets/new?odds_a=2.00");

        let empty = Lines::Dutching(vec![BetLine::default(); 2]);
        assert_eq!(build_ledger_url("/bets/new", &empty), "/bets/new");
    }

    #[test]
    fn test_limitation_flags() {
        let lines = Lines::Limitation(vec![
            LimitationLine::freebet(3.0, 100.0),
            LimitationLine::lay(2.95, 67.8),
        ]);
        let query = ledger_query(&lines);
        assert_eq!(
            query,
            "odds_a=3.00&investment_a=100.00&is_freebet_a=true\
             &odds_b=2.95&investment_b=67.80&bet_mode_b=lay"
        );
    }

    #[test]
    fn test_aumentada_increase() {
        let lines = Lines::Aumentada(vec![
            AumentadaLine::new(2.0, 25.0).with_stake(50.0),
            AumentadaLine::new(2.5, 0.0),
        ]);
        let query = ledger_query(&lines);
        assert!(query.contains("increase_a=25.00"));
        assert!(!query.contains("increase_b"));
    }

    #[test]
    fn test_extraction_emits_back_and_lay() {
        let input = ExtractionInput::new(BonusType::Freebet, 100.0, 3.0, 3.0, 0.0);
        let query = ledger_query(&Lines::Extraction(input));
        assert_eq!(
            query,
            "odds_a=3.00&investment_a=100.00&is_freebet_a=true\
             &odds_b=3.00&investment_b=66.67&bet_mode_b=lay"
        );
    }

    #[test]
    fn test_existing_query_string() {
        let lines = Lines::Dutching(vec![BetLine::new(2.0, 10.0), BetLine::new(2.0, 10.0)]);
        let url = build_ledger_url("/bets/new?source=calc", &lines);
        assert!(url.starts_with("/bets/new?source=calc&odds_a=2.00"));
    }

    #[test]
    fn test_at_most_five_lines() {
        let lines = Lines::Dutching(vec![BetLine::new(2.0, 1.0); 7]);
        assert_eq!(ledger_lines(&lines).len(), 5);
        assert!(!ledger_query(&lines).contains("odds_f"));
    }
}
