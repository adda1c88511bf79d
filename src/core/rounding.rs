//! Monetary rounding
//!
//! Every stake shown to the user is rounded to cents. Proportional splits
//! round each line independently, so the rounded stakes no longer add up to
//! the amount being split. [`distribute_residual`] moves that leftover onto
//! the last participating line so the total is conserved to the cent.

/// Round to 2 decimals (cents)
///
/// # Examples
/// ```
/// use surebet::core::rounding::round2;
/// assert_eq!(round2(97.5609), 97.56);
/// assert_eq!(round2(0.005), 0.01);
/// ```
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    // The epsilon nudges values like 1.005 (stored as 1.00499..) up to the cent
    // a person would write down.
    (value * 100.0 + value.signum() * 1e-9).round() / 100.0
}

/// Divide, yielding 0 instead of NaN/Infinity when the divisor is not positive
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    numerator / denominator
}

/// Add `target_total - Σ stakes` to the last stake marked as participating.
///
/// `participating[i]` tells whether line `i` took part in the split. Lines
/// that did not participate are left untouched (normally they hold 0). Does
/// nothing when no line participated.
pub fn distribute_residual(stakes: &mut [f64], participating: &[bool], target_total: f64) {
    let last = participating
        .iter()
        .enumerate()
        .filter(|(i, p)| **p && *i < stakes.len())
        .map(|(i, _)| i)
        .last();

    let Some(last) = last else {
        return;
    };

    let allocated: f64 = stakes
        .iter()
        .zip(participating)
        .filter(|(_, p)| **p)
        .map(|(s, _)| *s)
        .sum();

    let residual = round2(target_total - allocated);
    if residual != 0.0 {
        stakes[last] = round2(stakes[last] + residual);
    }
}
