//! Odds boost ("aumentada")
//!
//! Bookmakers advertise boosts as a percentage on the winnings, so a line is
//! priced at its boosted odds:
//!     final_odds = odds + (odds - 1) * increase / 100
//!
//! Without a fixed line the total investment is dutched over the boosted
//! odds. With a fixed line, that line's stake is taken as given and every
//! other stake is solved so all lines return what the fixed line returns;
//! the total investment is then an output.

use super::dutching;
use super::lines::AumentadaLine;
use super::result::CalculationResult;
use super::rounding::{round2, safe_div};

fn is_valid(line: &AumentadaLine) -> bool {
    line.line.has_valid_odds() && line.final_odds() > 0.0
}

/// Index of the fixed-stake pivot, if any
pub fn fixed_index(lines: &[AumentadaLine]) -> Option<usize> {
    lines.iter().position(|l| l.is_fixed)
}

/// Stakes for every line
///
/// `total_stake` is only used when no line is fixed.
pub fn solve_stakes(lines: &[AumentadaLine], total_stake: f64) -> Vec<f64> {
    match fixed_index(lines) {
        None => {
            let odds: Vec<f64> = lines
                .iter()
                .map(|l| if is_valid(l) { l.final_odds() } else { 0.0 })
                .collect();
            dutching::split_stakes(&odds, total_stake)
        }
        Some(pivot) => solve_from_pivot(lines, pivot),
    }
}

fn solve_from_pivot(lines: &[AumentadaLine], pivot: usize) -> Vec<f64> {
    let fixed = &lines[pivot];
    let fixed_stake = fixed.line.stake.max(0.0);

    if !is_valid(fixed) || fixed_stake <= 0.0 {
        return lines
            .iter()
            .enumerate()
            .map(|(i, _)| if i == pivot { fixed_stake } else { 0.0 })
            .collect();
    }

    let fixed_return = fixed_stake * fixed.final_odds();

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == pivot {
                fixed_stake
            } else if is_valid(line) {
                round2(safe_div(fixed_return, line.final_odds()))
            } else {
                0.0
            }
        })
        .collect()
}

/// Full odds-boost calculation
pub fn calculate(lines: &[AumentadaLine], total_stake: f64) -> CalculationResult {
    let stakes = solve_stakes(lines, total_stake);

    if stakes.iter().all(|s| *s == 0.0) {
        return CalculationResult::zeroed(lines.len());
    }

    let counted: Vec<bool> = lines
        .iter()
        .zip(&stakes)
        .map(|(l, s)| is_valid(l) && *s > 0.0)
        .collect();
    let returns: Vec<f64> = lines
        .iter()
        .zip(&stakes)
        .zip(&counted)
        .map(|((l, s), c)| if *c { round2(l.final_odds() * s) } else { 0.0 })
        .collect();
    let total_investment: f64 = stakes.iter().sum();

    CalculationResult::guaranteed(stakes, returns, &counted, total_investment, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lines::set_fixed;

    #[test]
    fn test_no_fixed_line_dutches_boosted_odds() {
        let lines = vec![AumentadaLine::new(2.0, 10.0), AumentadaLine::new(2.1, 0.0)];
        let result = calculate(&lines, 100.0);

        // Both lines price at 2.10, so the split is even
        assert_eq!(result.stakes, vec![50.0, 50.0]);
        assert_eq!(result.total_return, 105.0);
        assert_eq!(result.profit, 5.0);
    }

    #[test]
    fn test_no_fixed_line_conserves_total() {
        let lines = vec![
            AumentadaLine::new(2.5, 25.0),
            AumentadaLine::new(3.1, 0.0),
            AumentadaLine::new(4.4, 0.0),
        ];
        let result = calculate(&lines, 150.0);
        let sum: f64 = result.stakes.iter().sum();
        assert!((sum - 150.0).abs() < 0.005);
    }

    #[test]
    fn test_fixed_pivot_consistency() {
        let mut lines = vec![
            AumentadaLine::new(2.0, 0.0).with_stake(100.0),
            AumentadaLine::new(2.1, 0.0),
            AumentadaLine::new(3.3, 20.0),
            AumentadaLine::new(0.0, 0.0),
        ];
        set_fixed(&mut lines, 0);

        let result = calculate(&lines, 0.0);
        assert_eq!(result.stakes[0], 100.0);
        assert_eq!(result.stakes[3], 0.0);

        for (line, stake) in lines.iter().zip(&result.stakes).skip(1).take(2) {
            assert!((stake * line.final_odds() - 200.0).abs() <= 0.01 * line.final_odds());
        }

        let sum: f64 = result.stakes.iter().sum();
        assert!((result.total_investment - round2(sum)).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_pivot_ignores_total_stake() {
        let mut lines = vec![
            AumentadaLine::new(2.0, 0.0).with_stake(100.0),
            AumentadaLine::new(2.0, 0.0),
        ];
        set_fixed(&mut lines, 0);

        assert_eq!(solve_stakes(&lines, 999.0), vec![100.0, 100.0]);
    }

    #[test]
    fn test_fixed_pivot_without_stake() {
        let mut lines = vec![AumentadaLine::new(2.0, 0.0), AumentadaLine::new(2.0, 0.0)];
        set_fixed(&mut lines, 1);

        let result = calculate(&lines, 100.0);
        assert_eq!(result, CalculationResult::zeroed(2));
    }

    #[test]
    fn test_calculate_idempotent() {
        let mut lines = vec![
            AumentadaLine::new(1.95, 30.0).with_stake(73.5),
            AumentadaLine::new(2.2, 0.0),
            AumentadaLine::new(5.0, 0.0),
        ];
        set_fixed(&mut lines, 0);
        assert_eq!(calculate(&lines, 0.0), calculate(&lines, 0.0));
    }
}
