//! Bet line data model
//!
//! A calculator holds between [`MIN_LINES`] and [`MAX_LINES`] lines, one per
//! mutually exclusive outcome. Mode-specific lines embed the shared
//! [`BetLine`] and add their own flags. Flags that may be set on only one
//! line at a time are changed through the setters at the bottom of this
//! module, never by assigning the field directly.

use serde::{Deserialize, Serialize};

use super::input::{display_number, format_input};

pub const MIN_LINES: usize = 2;
pub const MAX_LINES: usize = 5;

/// Odds/stake pair with its text mirrors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BetLine {
    #[serde(default)]
    pub odds: f64,
    #[serde(default)]
    pub stake: f64,
    #[serde(default, alias = "oddsInput", skip_serializing_if = "String::is_empty")]
    pub odds_input: String,
    #[serde(default, alias = "stakeInput", skip_serializing_if = "String::is_empty")]
    pub stake_input: String,
    #[serde(default, alias = "autoPunctuate")]
    pub auto_punctuate: bool,
}

impl BetLine {
    pub fn new(odds: f64, stake: f64) -> Self {
        Self {
            odds,
            stake,
            odds_input: display_number(odds),
            stake_input: display_number(stake),
            auto_punctuate: false,
        }
    }

    /// Apply a keystroke to the odds field
    pub fn set_odds_input(&mut self, raw: &str) {
        let formatted = format_input(raw, self.auto_punctuate);
        self.odds = formatted.value;
        self.odds_input = formatted.text;
    }

    /// Apply a keystroke to the stake field
    pub fn set_stake_input(&mut self, raw: &str) {
        // Stakes are money amounts; auto punctuation only applies to odds
        let formatted = format_input(raw, false);
        self.stake = formatted.value;
        self.stake_input = formatted.text;
    }

    /// Set the stake from a computation and refresh its mirror
    pub fn set_stake(&mut self, stake: f64) {
        self.stake = stake;
        self.stake_input = display_number(stake);
    }

    /// Re-derive both text mirrors from the numeric values
    pub fn sync_inputs(&mut self) {
        self.odds_input = display_number(self.odds);
        self.stake_input = display_number(self.stake);
    }

    pub fn has_valid_odds(&self) -> bool {
        self.odds > 0.0 && self.odds.is_finite()
    }
}

/// Back (bet for the outcome) or lay (bet against it on an exchange)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetMode {
    #[default]
    Back,
    Lay,
}

impl BetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetMode::Back => "back",
            BetMode::Lay => "lay",
        }
    }
}

/// Line of the limitation (back/lay) calculator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitationLine {
    #[serde(flatten)]
    pub line: BetLine,
    #[serde(default, alias = "isEditing")]
    pub is_editing: bool,
    #[serde(default, alias = "isFreebet")]
    pub is_freebet: bool,
    #[serde(default, alias = "betMode")]
    pub bet_mode: BetMode,
    /// Exchange odds, only meaningful in lay mode
    #[serde(default, alias = "layOdd")]
    pub lay_odd: f64,
}

impl LimitationLine {
    pub fn back(odds: f64, stake: f64) -> Self {
        Self {
            line: BetLine::new(odds, stake),
            ..Default::default()
        }
    }

    pub fn freebet(odds: f64, stake: f64) -> Self {
        Self {
            is_freebet: true,
            ..Self::back(odds, stake)
        }
    }

    pub fn lay(lay_odd: f64, stake: f64) -> Self {
        Self {
            line: BetLine::new(0.0, stake),
            bet_mode: BetMode::Lay,
            lay_odd,
            ..Default::default()
        }
    }

    pub fn stake(&self) -> f64 {
        self.line.stake
    }

    pub fn is_lay(&self) -> bool {
        self.bet_mode == BetMode::Lay
    }

    /// Odds that price this line: the lay odds in lay mode, else the back odds
    pub fn effective_odds(&self) -> f64 {
        match self.bet_mode {
            BetMode::Back => self.line.odds,
            BetMode::Lay => self.lay_odd,
        }
    }

    pub fn has_valid_odds(&self) -> bool {
        let odds = self.effective_odds();
        odds > 0.0 && odds.is_finite()
    }

    /// Money put at risk by this line: the stake for a back bet, nothing for a
    /// freebet, the liability for a lay bet
    pub fn investment(&self) -> f64 {
        match self.bet_mode {
            BetMode::Lay => self.liability(),
            BetMode::Back if self.is_freebet => 0.0,
            BetMode::Back => self.line.stake,
        }
    }

    /// Liability of a lay bet (0 for back bets)
    pub fn liability(&self) -> f64 {
        match self.bet_mode {
            BetMode::Lay if self.lay_odd > 1.0 => self.line.stake * (self.lay_odd - 1.0),
            _ => 0.0,
        }
    }

    /// Amount received if this line's outcome happens
    pub fn return_if_win(&self) -> f64 {
        self.line.stake * self.return_factor()
    }

    /// Return produced per unit of stake
    ///
    /// A lay line returns its own stake, a freebet returns only the winnings,
    /// a plain back bet returns stake times odds.
    pub fn return_factor(&self) -> f64 {
        match self.bet_mode {
            BetMode::Lay => 1.0,
            BetMode::Back if self.is_freebet => (self.line.odds - 1.0).max(0.0),
            BetMode::Back => self.line.odds.max(0.0),
        }
    }
}

/// Line of the odds-boost ("aumentada") calculator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AumentadaLine {
    #[serde(flatten)]
    pub line: BetLine,
    /// Boost applied to the winnings part of the odds, in percent
    #[serde(default)]
    pub increase: f64,
    #[serde(default, alias = "isFixed")]
    pub is_fixed: bool,
}

impl AumentadaLine {
    pub fn new(odds: f64, increase: f64) -> Self {
        Self {
            line: BetLine::new(odds, 0.0),
            increase,
            is_fixed: false,
        }
    }

    pub fn with_stake(mut self, stake: f64) -> Self {
        self.line.set_stake(stake);
        self
    }

    /// Boosted odds: only the winnings portion `odds - 1` is increased
    ///
    /// # Examples
    /// ```
    /// use surebet::core::AumentadaLine;
    /// let line = AumentadaLine::new(2.0, 10.0);
    /// assert!((line.final_odds() - 2.10).abs() < 1e-12);
    /// ```
    pub fn final_odds(&self) -> f64 {
        boosted_odds(self.line.odds, self.increase)
    }
}

/// `odds + (odds - 1) * increase / 100`
pub fn boosted_odds(odds: f64, increase: f64) -> f64 {
    odds + (odds - 1.0) * (increase / 100.0)
}

/// Make line `index` the only driver of automatic recomputation
pub fn set_editing(lines: &mut [LimitationLine], index: usize) {
    for (i, line) in lines.iter_mut().enumerate() {
        line.is_editing = i == index;
    }
}

pub fn clear_editing(lines: &mut [LimitationLine]) {
    for line in lines.iter_mut() {
        line.is_editing = false;
    }
}

/// Change the bet mode of line `index`; choosing lay turns every other line
/// back to back mode
pub fn set_bet_mode(lines: &mut [LimitationLine], index: usize, mode: BetMode) {
    if index >= lines.len() {
        return;
    }
    if mode == BetMode::Lay {
        for line in lines.iter_mut() {
            line.bet_mode = BetMode::Back;
        }
    }
    lines[index].bet_mode = mode;
}

/// Pin line `index` as the fixed-stake pivot, unpinning every other line
pub fn set_fixed(lines: &mut [AumentadaLine], index: usize) {
    if index >= lines.len() {
        return;
    }
    for (i, line) in lines.iter_mut().enumerate() {
        line.is_fixed = i == index;
    }
}

pub fn clear_fixed(lines: &mut [AumentadaLine]) {
    for line in lines.iter_mut() {
        line.is_fixed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bet_line_inputs_stay_in_sync() {
        let mut line = BetLine::default();
        line.set_odds_input("2,5");
        assert!((line.odds - 2.5).abs() < 1e-12);
        assert_eq!(line.odds_input, "2.5");

        line.set_stake_input("100");
        assert!((line.stake - 100.0).abs() < 1e-12);

        line.sync_inputs();
        assert_eq!(line.odds_input, "2.50");
        assert_eq!(line.stake_input, "100.00");
    }

    #[test]
    fn test_auto_punctuate_only_odds() {
        let mut line = BetLine {
            auto_punctuate: true,
            ..Default::default()
        };
        line.set_odds_input("185");
        line.set_stake_input("185");
        assert!((line.odds - 1.85).abs() < 1e-12);
        assert!((line.stake - 185.0).abs() < 1e-12);
    }

    #[test]
    fn test_limitation_line_economics() {
        let back = LimitationLine::back(2.0, 100.0);
        assert!((back.investment() - 100.0).abs() < 1e-12);
        assert!((back.return_if_win() - 200.0).abs() < 1e-12);

        let free = LimitationLine::freebet(3.0, 100.0);
        assert_eq!(free.investment(), 0.0);
        assert!((free.return_if_win() - 200.0).abs() < 1e-12);

        let lay = LimitationLine::lay(2.05, 97.56);
        assert!((lay.investment() - 102.438).abs() < 1e-9);
        assert!((lay.return_if_win() - 97.56).abs() < 1e-12);
        assert!((lay.effective_odds() - 2.05).abs() < 1e-12);
    }

    #[test]
    fn test_final_odds_boost() {
        let line = AumentadaLine::new(2.0, 10.0);
        assert!((line.final_odds() - 2.10).abs() < 1e-12);

        let line = AumentadaLine::new(3.5, 0.0);
        assert!((line.final_odds() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_set_bet_mode_single_lay() {
        let mut lines = vec![
            LimitationLine::lay(2.0, 10.0),
            LimitationLine::back(2.0, 10.0),
            LimitationLine::lay(3.0, 10.0),
        ];

        for k in 0..lines.len() {
            set_bet_mode(&mut lines, k, BetMode::Lay);
            let lays: Vec<usize> = lines
                .iter()
                .enumerate()
                .filter(|(_, l)| l.is_lay())
                .map(|(i, _)| i)
                .collect();
            assert_eq!(lays, vec![k]);
        }

        set_bet_mode(&mut lines, 2, BetMode::Back);
        assert!(lines.iter().all(|l| !l.is_lay()));
    }

    #[test]
    fn test_set_fixed_single_pivot() {
        let mut lines = vec![
            AumentadaLine::new(2.0, 0.0),
            AumentadaLine::new(2.0, 0.0),
            AumentadaLine::new(2.0, 0.0),
        ];
        lines[0].is_fixed = true;
        lines[2].is_fixed = true;

        set_fixed(&mut lines, 1);
        let fixed: Vec<bool> = lines.iter().map(|l| l.is_fixed).collect();
        assert_eq!(fixed, vec![false, true, false]);

        clear_fixed(&mut lines);
        assert!(lines.iter().all(|l| !l.is_fixed));
    }

    #[test]
    fn test_set_editing_single_driver() {
        let mut lines = vec![LimitationLine::default(); 4];
        set_editing(&mut lines, 3);
        set_editing(&mut lines, 1);
        assert_eq!(lines.iter().filter(|l| l.is_editing).count(), 1);
        assert!(lines[1].is_editing);

        clear_editing(&mut lines);
        assert!(lines.iter().all(|l| !l.is_editing));
    }

    #[test]
    fn test_out_of_range_setters_are_noops() {
        let mut lines = vec![LimitationLine::lay(2.0, 1.0), LimitationLine::default()];
        set_bet_mode(&mut lines, 5, BetMode::Lay);
        assert!(lines[0].is_lay());

        let mut boosted = vec![AumentadaLine::new(2.0, 0.0)];
        boosted[0].is_fixed = true;
        set_fixed(&mut boosted, 3);
        assert!(boosted[0].is_fixed);
    }

    #[test]
    fn test_limitation_line_serde_flattened() {
        let line = LimitationLine::lay(2.05, 50.0);
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["bet_mode"], "lay");
        assert_eq!(json["stake"], 50.0);
        assert_eq!(json["lay_odd"], 2.05);

        let back: LimitationLine = serde_json::from_value(json).unwrap();
        assert_eq!(back, line);
    }
}
