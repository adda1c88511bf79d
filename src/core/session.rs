//! Calculator session
//!
//! Owns the line array of the active calculator tab and is the only place
//! edits are applied. Every edit goes through the same steps: update the
//! edited field (text mirror and number together), enforce the single-flag
//! rules, recompute with the mode's strategy, write the solved stakes back
//! to every line except the one being typed into.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::extraction::{self, ExtractionInput};
use super::input::{display_number, format_input};
use super::limitation::{self, RecomputeMode};
use super::lines::{self, AumentadaLine, BetLine, BetMode, LimitationLine, MAX_LINES, MIN_LINES};
use super::result::CalculationResult;
use super::rounding::round2;
use super::{aumentada, dutching, CalculatorMode};

/// Line array of one calculator tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "lines", rename_all = "lowercase")]
pub enum Lines {
    Dutching(Vec<BetLine>),
    Aumentada(Vec<AumentadaLine>),
    Limitation(Vec<LimitationLine>),
    Extraction(ExtractionInput),
}

impl Lines {
    /// Fresh zeroed lines for `mode`
    pub fn empty(mode: CalculatorMode) -> Self {
        match mode {
            CalculatorMode::Dutching => Lines::Dutching(vec![BetLine::default(); MIN_LINES]),
            CalculatorMode::Aumentada => {
                Lines::Aumentada(vec![AumentadaLine::default(); MIN_LINES])
            }
            CalculatorMode::Limitation => {
                Lines::Limitation(vec![LimitationLine::default(); MIN_LINES])
            }
            CalculatorMode::Extraction => Lines::Extraction(ExtractionInput::default()),
        }
    }

    pub fn mode(&self) -> CalculatorMode {
        match self {
            Lines::Dutching(_) => CalculatorMode::Dutching,
            Lines::Aumentada(_) => CalculatorMode::Aumentada,
            Lines::Limitation(_) => CalculatorMode::Limitation,
            Lines::Extraction(_) => CalculatorMode::Extraction,
        }
    }

    /// Number of bet lines (an extraction is one back/lay pair)
    pub fn len(&self) -> usize {
        match self {
            Lines::Dutching(l) => l.len(),
            Lines::Aumentada(l) => l.len(),
            Lines::Limitation(l) => l.len(),
            Lines::Extraction(_) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn base_mut(&mut self, index: usize) -> Option<&mut BetLine> {
        match self {
            Lines::Dutching(l) => l.get_mut(index),
            Lines::Aumentada(l) => l.get_mut(index).map(|l| &mut l.line),
            Lines::Limitation(l) => l.get_mut(index).map(|l| &mut l.line),
            Lines::Extraction(_) => None,
        }
    }

    fn for_each_base(&mut self, mut f: impl FnMut(usize, &mut BetLine)) {
        match self {
            Lines::Dutching(l) => l.iter_mut().enumerate().for_each(|(i, l)| f(i, l)),
            Lines::Aumentada(l) => l.iter_mut().enumerate().for_each(|(i, l)| f(i, &mut l.line)),
            Lines::Limitation(l) => l.iter_mut().enumerate().for_each(|(i, l)| f(i, &mut l.line)),
            Lines::Extraction(_) => {}
        }
    }
}

/// Stateful calculator for one tab
#[derive(Debug, Clone)]
pub struct Calculator {
    lines: Lines,
    /// Investment to distribute (dutching, boost without a fixed line)
    total_stake: f64,
    total_stake_input: String,
    recompute_mode: RecomputeMode,
    /// Line whose stake text is being typed in dutching/boost tabs
    editing: Option<usize>,
    result: CalculationResult,
}

impl Calculator {
    pub fn new(mode: CalculatorMode) -> Self {
        Self::from_lines(Lines::empty(mode), 0.0)
    }

    /// Restore a calculator from saved lines (e.g. a share link)
    pub fn from_lines(lines: Lines, total_stake: f64) -> Self {
        Self::with_recompute_mode(lines, total_stake, RecomputeMode::Automatic)
    }

    /// Like [`Calculator::from_lines`], recomputing in `recompute_mode`
    /// from the start
    pub fn with_recompute_mode(
        lines: Lines,
        total_stake: f64,
        recompute_mode: RecomputeMode,
    ) -> Self {
        let result = CalculationResult::zeroed(lines.len());
        let mut calc = Self {
            lines,
            total_stake: total_stake.max(0.0),
            total_stake_input: display_number(total_stake.max(0.0)),
            recompute_mode,
            editing: None,
            result,
        };
        calc.lines.for_each_base(|_, line| line.sync_inputs());
        calc.recompute();
        calc
    }

    pub fn mode(&self) -> CalculatorMode {
        self.lines.mode()
    }

    pub fn lines(&self) -> &Lines {
        &self.lines
    }

    pub fn result(&self) -> &CalculationResult {
        &self.result
    }

    pub fn total_stake(&self) -> f64 {
        self.total_stake
    }

    pub fn total_stake_input(&self) -> &str {
        &self.total_stake_input
    }

    pub fn recompute_mode(&self) -> RecomputeMode {
        self.recompute_mode
    }

    /// Whether the total investment is an input
    ///
    /// With a fixed boost line the total is the sum of the solved stakes and
    /// is shown read-only.
    pub fn total_stake_editable(&self) -> bool {
        match &self.lines {
            Lines::Dutching(_) => true,
            Lines::Aumentada(l) => aumentada::fixed_index(l).is_none(),
            Lines::Limitation(_) | Lines::Extraction(_) => false,
        }
    }

    /// Switch tab: the previous lines are discarded
    pub fn switch_mode(&mut self, mode: CalculatorMode) {
        if mode != self.mode() {
            debug!("switching calculator from {} to {}", self.mode(), mode);
            *self = Self::new(mode);
        }
    }

    /// Back to zeroed lines of the same mode
    pub fn reset(&mut self) {
        let recompute_mode = self.recompute_mode;
        *self = Self::new(self.mode());
        self.recompute_mode = recompute_mode;
    }

    /// Append a zeroed line; false when the tab is full
    pub fn add_line(&mut self) -> bool {
        if self.lines.len() >= MAX_LINES {
            return false;
        }
        match &mut self.lines {
            Lines::Dutching(l) => l.push(BetLine::default()),
            Lines::Aumentada(l) => l.push(AumentadaLine::default()),
            Lines::Limitation(l) => l.push(LimitationLine::default()),
            Lines::Extraction(_) => return false,
        }
        self.recompute();
        true
    }

    /// Remove line `index`; false when it would leave fewer than 2 lines
    pub fn remove_line(&mut self, index: usize) -> bool {
        if self.lines.len() <= MIN_LINES || index >= self.lines.len() {
            return false;
        }
        match &mut self.lines {
            Lines::Dutching(l) => {
                l.remove(index);
            }
            Lines::Aumentada(l) => {
                l.remove(index);
            }
            Lines::Limitation(l) => {
                l.remove(index);
            }
            Lines::Extraction(_) => return false,
        }
        self.editing = None;
        self.recompute();
        true
    }

    pub fn set_auto_punctuate(&mut self, index: usize, enabled: bool) {
        if let Some(line) = self.lines.base_mut(index) {
            line.auto_punctuate = enabled;
        }
    }

    pub fn set_odds_input(&mut self, index: usize, raw: &str) {
        if let Some(line) = self.lines.base_mut(index) {
            line.set_odds_input(raw);
            self.recompute();
        }
    }

    /// Type into the stake field of line `index`
    ///
    /// In the dutching tab (and the boost tab without a fixed line) the
    /// typed stake sets the total so that this line receives that stake.
    /// The split still rounds to cents and the last line with odds takes the
    /// leftover, so when that line is the one being typed its stake can sit
    /// a cent away from the typed text until [`Calculator::blur`].
    /// In the limitation tab the line becomes the driver.
    pub fn set_stake_input(&mut self, index: usize, raw: &str) {
        let Some(line) = self.lines.base_mut(index) else {
            return;
        };
        line.set_stake_input(raw);
        let typed = line.stake;

        let split_odds: Option<Vec<f64>> = match &self.lines {
            Lines::Dutching(l) => Some(l.iter().map(|l| l.odds).collect()),
            Lines::Aumentada(l) if aumentada::fixed_index(l).is_none() => Some(
                l.iter()
                    .map(|l| if l.line.has_valid_odds() { l.final_odds() } else { 0.0 })
                    .collect(),
            ),
            _ => None,
        };
        if let Some(odds) = split_odds {
            self.set_total_from_line(&odds, index, typed);
        }
        if let Lines::Limitation(l) = &mut self.lines {
            lines::set_editing(l, index);
        }
        self.editing = Some(index);
        self.recompute();
    }

    fn set_total_from_line(&mut self, odds: &[f64], index: usize, stake: f64) {
        let sum_inverse: f64 = odds.iter().filter(|o| **o > 0.0).map(|o| 1.0 / o).sum();
        let line_odds = odds.get(index).copied().unwrap_or(0.0);
        if line_odds > 0.0 && sum_inverse > 0.0 {
            self.total_stake = round2(stake * line_odds * sum_inverse);
            self.total_stake_input = display_number(self.total_stake);
        }
    }

    pub fn set_total_stake_input(&mut self, raw: &str) {
        if !self.total_stake_editable() {
            return;
        }
        let formatted = format_input(raw, false);
        self.total_stake = formatted.value;
        self.total_stake_input = formatted.text;
        self.editing = None;
        self.recompute();
    }

    pub fn set_increase_input(&mut self, index: usize, raw: &str) {
        if let Lines::Aumentada(l) = &mut self.lines {
            if let Some(line) = l.get_mut(index) {
                line.increase = format_input(raw, false).value;
                self.recompute();
            }
        }
    }

    pub fn set_lay_odd_input(&mut self, index: usize, raw: &str) {
        if let Lines::Limitation(l) = &mut self.lines {
            if let Some(line) = l.get_mut(index) {
                line.lay_odd = format_input(raw, line.line.auto_punctuate).value;
                self.recompute();
            }
        }
    }

    /// Field focus: in the limitation tab the focused line drives recomputation
    pub fn focus(&mut self, index: usize) {
        if let Lines::Limitation(l) = &mut self.lines {
            if index < l.len() {
                lines::set_editing(l, index);
            }
        }
    }

    /// Field blur: the text mirrors are re-derived from the numbers
    pub fn blur(&mut self, index: usize) {
        if let Some(line) = self.lines.base_mut(index) {
            line.sync_inputs();
        }
        if self.editing == Some(index) {
            self.editing = None;
        }
        self.total_stake_input = display_number(self.total_stake);
    }

    /// Pin boost line `index` as the fixed stake
    pub fn set_fixed(&mut self, index: usize) {
        if let Lines::Aumentada(l) = &mut self.lines {
            lines::set_fixed(l, index);
            self.editing = None;
            self.recompute();
        }
    }

    pub fn clear_fixed(&mut self) {
        if let Lines::Aumentada(l) = &mut self.lines {
            lines::clear_fixed(l);
            self.recompute();
        }
    }

    pub fn set_bet_mode(&mut self, index: usize, mode: BetMode) {
        if let Lines::Limitation(l) = &mut self.lines {
            lines::set_bet_mode(l, index, mode);
            self.recompute();
        }
    }

    pub fn set_freebet(&mut self, index: usize, is_freebet: bool) {
        if let Lines::Limitation(l) = &mut self.lines {
            if let Some(line) = l.get_mut(index) {
                line.is_freebet = is_freebet;
                self.recompute();
            }
        }
    }

    pub fn set_recompute_mode(&mut self, mode: RecomputeMode) {
        self.recompute_mode = mode;
        self.recompute();
    }

    pub fn set_extraction(&mut self, input: ExtractionInput) {
        if let Lines::Extraction(current) = &mut self.lines {
            *current = input.sanitized();
            self.recompute();
        }
    }

    /// Run the active strategy and write the solved stakes back
    pub fn recompute(&mut self) {
        let result = match &self.lines {
            Lines::Dutching(l) => dutching::calculate(l, self.total_stake),
            Lines::Aumentada(l) => aumentada::calculate(l, self.total_stake),
            Lines::Limitation(l) => limitation::calculate(l, self.recompute_mode),
            Lines::Extraction(input) => extraction::calculate(input).to_calculation(input),
        };

        let driver = match &self.lines {
            Lines::Limitation(l) => l.iter().position(|l| l.is_editing),
            Lines::Aumentada(l) => aumentada::fixed_index(l).or(self.editing),
            _ => self.editing,
        };
        let writes_back = !matches!(
            (&self.lines, self.recompute_mode),
            (Lines::Limitation(_), RecomputeMode::Manual) | (Lines::Extraction(_), _)
        );

        if writes_back {
            let stakes = &result.stakes;
            self.lines.for_each_base(|i, line| {
                let Some(&stake) = stakes.get(i) else {
                    return;
                };
                if Some(i) == driver {
                    line.stake = stake;
                } else if line.stake != stake || line.stake_input.is_empty() != (stake == 0.0) {
                    line.set_stake(stake);
                }
            });
        }

        if let Lines::Aumentada(l) = &self.lines {
            if aumentada::fixed_index(l).is_some() {
                self.total_stake = result.total_investment;
                self.total_stake_input = display_number(self.total_stake);
            }
        }

        debug!(
            mode = %self.mode(),
            profit = result.profit,
            investment = result.total_investment,
            "recomputed"
        );
        self.result = result;
    }
}
