//! Dutching
//!
//! Split one total investment across mutually exclusive outcomes so that
//! every outcome pays the same amount.
//!
//! With `S = Σ 1/odds_i` over the lines that have odds:
//!     stake_i = total / (odds_i * S)
//!
//! Every stake is rounded to cents and the rounding leftover goes to the
//! last line with odds, so the stakes always add up to the total.

use super::lines::BetLine;
use super::result::CalculationResult;
use super::rounding::{distribute_residual, round2};

/// Proportional-to-inverse-odds split of `total_stake`
///
/// Lines whose odds are not positive get a stake of 0 and take no part in
/// the split. Returns all zeros when no line has odds or the total is not
/// positive.
///
/// # Examples
/// ```
/// use surebet::core::dutching::split_stakes;
/// let stakes = split_stakes(&[2.0, 2.0], 100.0);
/// assert_eq!(stakes, vec![50.0, 50.0]);
/// ```
pub fn split_stakes(odds: &[f64], total_stake: f64) -> Vec<f64> {
    let participating: Vec<bool> = odds.iter().map(|o| *o > 0.0 && o.is_finite()).collect();

    let sum_inverse: f64 = odds
        .iter()
        .zip(&participating)
        .filter(|(_, p)| **p)
        .map(|(o, _)| 1.0 / o)
        .sum();

    if total_stake <= 0.0 || sum_inverse <= 0.0 {
        return vec![0.0; odds.len()];
    }

    let mut stakes: Vec<f64> = odds
        .iter()
        .zip(&participating)
        .map(|(o, p)| {
            if *p {
                round2(total_stake / (o * sum_inverse))
            } else {
                0.0
            }
        })
        .collect();

    distribute_residual(&mut stakes, &participating, total_stake);
    stakes
}

/// Full dutching calculation over `lines` for `total_stake`
///
/// The guaranteed return is the smallest of the per-line returns (they only
/// differ by rounding).
pub fn calculate(lines: &[BetLine], total_stake: f64) -> CalculationResult {
    let odds: Vec<f64> = lines.iter().map(|l| l.odds).collect();
    evaluate(&odds, total_stake)
}

/// Dutching over plain odds values; shared with the boosted-odds calculator
pub(crate) fn evaluate(odds: &[f64], total_stake: f64) -> CalculationResult {
    let stakes = split_stakes(odds, total_stake);

    if stakes.iter().all(|s| *s == 0.0) {
        return CalculationResult::zeroed(odds.len());
    }

    let counted: Vec<bool> = odds.iter().map(|o| *o > 0.0 && o.is_finite()).collect();
    let returns: Vec<f64> = odds
        .iter()
        .zip(&stakes)
        .zip(&counted)
        .map(|((o, s), c)| if *c { round2(o * s) } else { 0.0 })
        .collect();
    let total_investment: f64 = stakes.iter().sum();

    CalculationResult::guaranteed(stakes, returns, &counted, total_investment, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::result::Roi;

    fn assert_conserved(stakes: &[f64], total: f64) {
        let sum: f64 = stakes.iter().sum();
        assert!(
            (sum - total).abs() < 0.005,
            "stakes {:?} sum to {} instead of {}",
            stakes,
            sum,
            total
        );
    }

    #[test]
    fn test_split_even_odds() {
        let stakes = split_stakes(&[2.0, 2.0], 100.0);
        assert_eq!(stakes, vec![50.0, 50.0]);
    }

    #[test]
    fn test_split_conserves_total() {
        let cases: Vec<(Vec<f64>, f64)> = vec![
            (vec![3.0, 3.0, 3.0], 100.0),
            (vec![2.1, 3.4, 4.75], 250.0),
            (vec![1.01, 51.0], 10.0),
            (vec![1.5, 4.2, 7.0, 13.0, 21.0], 333.33),
            (vec![2.37, 1.93], 0.07),
        ];

        for (odds, total) in cases {
            let stakes = split_stakes(&odds, total);
            assert_conserved(&stakes, total);
        }
    }

    #[test]
    fn test_split_equalizes_returns() {
        let odds = vec![2.1, 3.4, 4.75];
        let stakes = split_stakes(&odds, 250.0);
        let returns: Vec<f64> = odds.iter().zip(&stakes).map(|(o, s)| o * s).collect();

        let max = returns.iter().cloned().fold(f64::MIN, f64::max);
        let min = returns.iter().cloned().fold(f64::MAX, f64::min);
        // One cent per line, scaled by the largest odds
        assert!(max - min <= 0.01 * odds.len() as f64 * 4.75);
    }

    #[test]
    fn test_split_residual_lands_on_last_valid_line() {
        // 100 / 3 = 33.33 each; the missing cent goes to line 2, not line 3
        let stakes = split_stakes(&[3.0, 3.0, 3.0, 0.0], 100.0);
        assert_eq!(stakes, vec![33.33, 33.33, 33.34, 0.0]);
    }

    #[test]
    fn test_split_ignores_invalid_odds() {
        let stakes = split_stakes(&[2.0, 0.0, -1.0, 2.0], 100.0);
        assert_eq!(stakes, vec![50.0, 0.0, 0.0, 50.0]);
    }

    #[test]
    fn test_split_degenerate_inputs() {
        assert_eq!(split_stakes(&[2.0, 3.0], 0.0), vec![0.0, 0.0]);
        assert_eq!(split_stakes(&[2.0, 3.0], -10.0), vec![0.0, 0.0]);
        assert_eq!(split_stakes(&[0.0, 0.0], 100.0), vec![0.0, 0.0]);
    }

    #[test]
    fn test_calculate_surebet_profit() {
        // 1/2.1 + 1/2.1 < 1, a sure bet
        let lines = vec![BetLine::new(2.1, 0.0), BetLine::new(2.1, 0.0)];
        let result = calculate(&lines, 100.0);

        assert_eq!(result.stakes, vec![50.0, 50.0]);
        assert_eq!(result.total_investment, 100.0);
        assert_eq!(result.total_return, 105.0);
        assert_eq!(result.profit, 5.0);
        assert!((result.roi.as_f64() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_no_valid_lines() {
        let lines = vec![BetLine::default(), BetLine::default()];
        let result = calculate(&lines, 100.0);
        assert_eq!(result, CalculationResult::zeroed(2));
        assert_eq!(result.roi, Roi::Percent(0.0));
    }

    #[test]
    fn test_calculate_idempotent() {
        let lines = vec![
            BetLine::new(1.87, 0.0),
            BetLine::new(3.9, 0.0),
            BetLine::new(6.25, 0.0),
        ];
        let first = calculate(&lines, 187.45);
        let second = calculate(&lines, 187.45);
        assert_eq!(first, second);
    }
}
