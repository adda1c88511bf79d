//! Calculation result shared by every calculator mode

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::rounding::round2;

/// Return on investment, in percent
///
/// A position that costs nothing (only freebets) but still returns a profit
/// has an unbounded ROI. That is kept apart from `Percent(0.0)`, which means
/// nothing to show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Roi {
    Percent(f64),
    Unbounded,
}

impl Roi {
    /// `profit / investment * 100`, guarded against a zero investment
    pub fn from_profit(profit: f64, investment: f64) -> Self {
        if investment > 0.0 {
            Roi::Percent(profit / investment * 100.0)
        } else if profit > 0.0 {
            Roi::Unbounded
        } else {
            Roi::Percent(0.0)
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Roi::Unbounded)
    }

    /// Percent value, with `Unbounded` mapped to `f64::INFINITY`
    pub fn as_f64(&self) -> f64 {
        match self {
            Roi::Percent(p) => *p,
            Roi::Unbounded => f64::INFINITY,
        }
    }
}

impl Default for Roi {
    fn default() -> Self {
        Roi::Percent(0.0)
    }
}

impl std::fmt::Display for Roi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Roi::Percent(p) => write!(f, "{:.2}%", p),
            Roi::Unbounded => write!(f, "∞"),
        }
    }
}

const UNBOUNDED_TAG: &str = "unbounded";

impl Serialize for Roi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Roi::Percent(p) => serializer.serialize_f64(*p),
            Roi::Unbounded => serializer.serialize_str(UNBOUNDED_TAG),
        }
    }
}

impl<'de> Deserialize<'de> for Roi {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(p) => Ok(Roi::Percent(p)),
            Raw::Text(s) if s == UNBOUNDED_TAG => Ok(Roi::Unbounded),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "expected a number or \"{}\", got \"{}\"",
                UNBOUNDED_TAG, s
            ))),
        }
    }
}

/// Derived figures for the current line array
///
/// `stakes`, `returns` and `profits` are indexed like the input lines.
/// `profits[i]` is the net result if outcome `i` is the one that happens.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculationResult {
    pub stakes: Vec<f64>,
    pub returns: Vec<f64>,
    pub profits: Vec<f64>,
    pub total_return: f64,
    pub profit: f64,
    pub total_investment: f64,
    pub roi: Roi,
    pub liability: f64,
}

impl CalculationResult {
    /// All-zero result for `n` lines
    pub fn zeroed(n: usize) -> Self {
        Self {
            stakes: vec![0.0; n],
            returns: vec![0.0; n],
            profits: vec![0.0; n],
            ..Default::default()
        }
    }

    /// Build the result from per-line stakes, returns and investments using
    /// the guaranteed-outcome rule: the realised return is the smallest
    /// return among the lines marked in `counted`.
    pub(crate) fn guaranteed(
        stakes: Vec<f64>,
        returns: Vec<f64>,
        counted: &[bool],
        total_investment: f64,
        liability: f64,
    ) -> Self {
        let total_return = returns
            .iter()
            .zip(counted)
            .filter(|(_, c)| **c)
            .map(|(r, _)| *r)
            .fold(None, |acc: Option<f64>, r| Some(acc.map_or(r, |a| a.min(r))))
            .unwrap_or(0.0);

        let profits = returns
            .iter()
            .zip(counted)
            .map(|(r, c)| if *c { round2(r - total_investment) } else { 0.0 })
            .collect();

        let total_return = round2(total_return);
        let total_investment = round2(total_investment);
        let profit = if counted.iter().any(|c| *c) {
            round2(total_return - total_investment)
        } else {
            0.0
        };

        Self {
            stakes,
            returns,
            profits,
            total_return,
            profit,
            total_investment,
            roi: Roi::from_profit(profit, total_investment),
            liability: round2(liability),
        }
    }
}
