//! Surebet CLI - Command-line interface for the betting calculators

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::path::{Path, PathBuf};

use surebet::core::extraction;
use surebet::ledger::build_ledger_url;
use surebet::share::{JsonDirShareStore, ShareCodec};
use surebet::{
    BetMode, BonusType, Calculator, CalculatorMode, ExtractionInput, Lines, RecomputeMode,
};

/// Default share directory (relative to the working directory)
const DEFAULT_SHARE_DIR: &str = ".surebet/shares";
const DEFAULT_LEDGER_URL: &str = "/bets/new";

#[derive(Parser)]
#[command(name = "surebet")]
#[command(author, version, about = "Sure-bet calculator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Directory where share links are stored
    #[arg(long, default_value = DEFAULT_SHARE_DIR)]
    share_dir: PathBuf,

    /// Bet-entry form URL used for the ledger link
    #[arg(long, default_value = DEFAULT_LEDGER_URL)]
    ledger_url: String,

    /// Print the ledger link after each calculation
    #[arg(long)]
    ledger: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a total over several outcomes for an equal return
    Dutching {
        /// Odds of each outcome (comma separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        odds: Vec<String>,

        /// Total investment
        #[arg(short, long)]
        total: String,
    },

    /// Dutching over boosted odds
    Aumentada {
        /// Odds of each outcome (comma separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        odds: Vec<String>,

        /// Boost per line in percent (comma separated, missing = 0)
        #[arg(long, value_delimiter = ',')]
        increase: Vec<String>,

        /// Total investment (ignored with --fixed)
        #[arg(short, long, default_value = "0")]
        total: String,

        /// Line (1-based) whose stake is fixed
        #[arg(long, requires = "stake")]
        fixed: Option<usize>,

        /// Stake of the fixed line
        #[arg(long)]
        stake: Option<String>,
    },

    /// Back/lay hedging with optional freebets
    Limitation {
        /// Back odds of each line (comma separated, 0 for the lay line)
        #[arg(short, long, value_delimiter = ',', required = true)]
        odds: Vec<String>,

        /// Stake of each line (comma separated, missing = 0)
        #[arg(short, long, value_delimiter = ',')]
        stakes: Vec<String>,

        /// Line (1-based) placed as a lay bet
        #[arg(long, requires = "lay_odd")]
        lay: Option<usize>,

        /// Exchange odds of the lay line
        #[arg(long)]
        lay_odd: Option<String>,

        /// Lines (1-based) that are freebets
        #[arg(long, value_delimiter = ',')]
        freebet: Vec<usize>,

        /// Line (1-based) whose stake drives the others
        #[arg(long, default_value = "1")]
        driver: usize,

        /// Keep every stake as typed
        #[arg(long)]
        manual: bool,
    },

    /// Convert a freebet or deposit bonus into cash
    Extraction {
        /// Bonus type
        #[arg(long = "type", value_enum, default_value = "freebet")]
        bet_type: BonusArg,

        /// Bonus stake
        #[arg(short, long)]
        stake: String,

        /// Bookmaker (back) odds
        #[arg(short, long)]
        back: String,

        /// Exchange (lay) odds
        #[arg(short, long)]
        lay: String,

        /// Exchange commission in percent
        #[arg(short, long, default_value = "0")]
        commission: String,
    },

    /// Create a share link from a JSON file of lines
    Share {
        /// File with `{"mode": ..., "lines": ...}`
        file: PathBuf,

        /// Total investment stored with the share
        #[arg(short, long)]
        total: Option<f64>,
    },

    /// Restore a shared calculation and recompute it
    Restore {
        /// Share code
        code: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BonusArg {
    Freebet,
    Normal,
}

impl From<BonusArg> for BonusType {
    fn from(arg: BonusArg) -> Self {
        match arg {
            BonusArg::Freebet => BonusType::Freebet,
            BonusArg::Normal => BonusType::Normal,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    println!(
        "{}",
        format!("Surebet CLI v{}", env!("CARGO_PKG_VERSION")).cyan().bold()
    );
    println!();

    let ledger = cli.ledger.then_some(cli.ledger_url.as_str());

    if cli.interactive {
        run_interactive(&cli.share_dir, &cli.ledger_url)?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Dutching { odds, total } => {
                let calc = dutching(&odds, &total)?;
                print_calculation(&calc, ledger);
            }
            Commands::Aumentada {
                odds,
                increase,
                total,
                fixed,
                stake,
            } => {
                let calc = aumentada(&odds, &increase, &total, fixed, stake.as_deref())?;
                print_calculation(&calc, ledger);
            }
            Commands::Limitation {
                odds,
                stakes,
                lay,
                lay_odd,
                freebet,
                driver,
                manual,
            } => {
                let calc = limitation(
                    &odds,
                    &stakes,
                    lay,
                    lay_odd.as_deref(),
                    &freebet,
                    driver,
                    manual,
                )?;
                print_calculation(&calc, ledger);
            }
            Commands::Extraction {
                bet_type,
                stake,
                back,
                lay,
                commission,
            } => {
                let input =
                    ExtractionInput::from_raw(bet_type.into(), &stake, &back, &lay, &commission);
                let calc = Calculator::from_lines(Lines::Extraction(input), 0.0);
                print_calculation(&calc, ledger);
            }
            Commands::Share { file, total } => {
                let content = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {:?}", file))?;
                let lines: Lines = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse lines from {:?}", file))?;
                run_share(&cli.share_dir, &lines, total)?;
            }
            Commands::Restore { code } => {
                run_restore(&cli.share_dir, &code, ledger)?;
            }
        }
    } else {
        println!("Use --help for usage information or --interactive for interactive mode.");
    }

    Ok(())
}

fn check_line_count(n: usize) -> Result<()> {
    if !(surebet::core::MIN_LINES..=surebet::core::MAX_LINES).contains(&n) {
        bail!(
            "Between {} and {} lines required, got {}",
            surebet::core::MIN_LINES,
            surebet::core::MAX_LINES,
            n
        );
    }
    Ok(())
}

/// 1-based line argument to an index
fn line_index(line: usize, n: usize, what: &str) -> Result<usize> {
    if line == 0 || line > n {
        bail!("{} must be a line between 1 and {}, got {}", what, n, line);
    }
    Ok(line - 1)
}

fn dutching(odds: &[String], total: &str) -> Result<Calculator> {
    check_line_count(odds.len())?;
    let mut calc = Calculator::new(CalculatorMode::Dutching);
    ensure_lines(&mut calc, odds.len());
    for (i, raw) in odds.iter().enumerate() {
        calc.set_odds_input(i, raw);
        calc.blur(i);
    }
    calc.set_total_stake_input(total);
    Ok(calc)
}

fn aumentada(
    odds: &[String],
    increase: &[String],
    total: &str,
    fixed: Option<usize>,
    stake: Option<&str>,
) -> Result<Calculator> {
    check_line_count(odds.len())?;
    let mut calc = Calculator::new(CalculatorMode::Aumentada);
    ensure_lines(&mut calc, odds.len());
    for (i, raw) in odds.iter().enumerate() {
        calc.set_odds_input(i, raw);
        if let Some(inc) = increase.get(i) {
            calc.set_increase_input(i, inc);
        }
        calc.blur(i);
    }

    match (fixed, stake) {
        (Some(line), Some(stake)) => {
            let index = line_index(line, odds.len(), "--fixed")?;
            calc.set_fixed(index);
            calc.set_stake_input(index, stake);
            calc.blur(index);
        }
        _ => calc.set_total_stake_input(total),
    }
    Ok(calc)
}

fn limitation(
    odds: &[String],
    stakes: &[String],
    lay: Option<usize>,
    lay_odd: Option<&str>,
    freebet: &[usize],
    driver: usize,
    manual: bool,
) -> Result<Calculator> {
    let n = odds.len();
    check_line_count(n)?;
    let driver = line_index(driver, n, "--driver")?;

    let mut calc = Calculator::new(CalculatorMode::Limitation);
    if manual {
        calc.set_recompute_mode(RecomputeMode::Manual);
    }
    ensure_lines(&mut calc, n);

    for (i, raw) in odds.iter().enumerate() {
        calc.set_odds_input(i, raw);
    }
    for line in freebet {
        calc.set_freebet(line_index(*line, n, "--freebet")?, true);
    }
    if let (Some(line), Some(lay_odd)) = (lay, lay_odd) {
        let index = line_index(line, n, "--lay")?;
        calc.set_bet_mode(index, BetMode::Lay);
        calc.set_lay_odd_input(index, lay_odd);
    }

    // The driver is typed last so its stake is the one the others follow
    for (i, raw) in stakes.iter().enumerate().filter(|(i, _)| *i != driver) {
        calc.set_stake_input(i, raw);
    }
    if let Some(raw) = stakes.get(driver) {
        calc.set_stake_input(driver, raw);
    }
    for i in 0..n {
        calc.blur(i);
    }
    Ok(calc)
}

fn ensure_lines(calc: &mut Calculator, n: usize) {
    while calc.lines().len() < n && calc.add_line() {}
}

fn run_share(share_dir: &Path, lines: &Lines, total: Option<f64>) -> Result<()> {
    let codec = ShareCodec::new(JsonDirShareStore::new(share_dir));
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let code = runtime
        .block_on(codec.create_share(lines, total))
        .context("Failed to create share")?;

    println!("{}: {}", "Share code".green(), code.bold());
    println!(
        "{}",
        format!("Valid for {} days", codec.config().ttl_days).dimmed()
    );
    Ok(())
}

fn run_restore(share_dir: &Path, code: &str, ledger: Option<&str>) -> Result<()> {
    let codec = ShareCodec::new(JsonDirShareStore::new(share_dir));
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let shared = runtime
        .block_on(codec.get_share(code))
        .with_context(|| format!("Failed to restore share {}", code))?;

    println!(
        "{}: {} ({}, expires {})",
        "Restored".green(),
        shared.code,
        shared.lines.mode(),
        shared.expires_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!();

    let calc = Calculator::from_lines(shared.lines, shared.total_stake);
    print_calculation(&calc, ledger);
    Ok(())
}

fn print_calculation(calc: &Calculator, ledger: Option<&str>) {
    let result = calc.result();

    println!(
        "{}",
        format!("{} ({})", "Calculation".yellow().bold(), calc.mode())
    );

    match calc.lines() {
        Lines::Extraction(input) => {
            let figures = extraction::calculate(input);
            println!("{:>16} {:>10.2}", "Lay stake", figures.lay_stake);
            println!("{:>16} {:>10.2}", "Liability", figures.liability);
            println!("{:>16} {:>10.2}", "If back wins", figures.profit_if_back_wins);
            println!("{:>16} {:>10.2}", "If lay wins", figures.profit_if_lay_wins);
            println!("{:>16} {:>9.2}%", "Retention", figures.retention);
        }
        lines => {
            println!(
                "{:>4} {:>6} {:>10} {:>10} {:>10} {:>10}",
                "#", "Type", "Odds", "Stake", "Return", "Profit"
            );
            println!("{}", "-".repeat(56));
            for (i, (kind, odds)) in line_labels(lines).into_iter().enumerate() {
                let stake = result.stakes.get(i).copied().unwrap_or(0.0);
                let ret = result.returns.get(i).copied().unwrap_or(0.0);
                let profit = result.profits.get(i).copied().unwrap_or(0.0);
                println!(
                    "{:>4} {:>6} {:>10.2} {:>10.2} {:>10.2} {}",
                    i + 1,
                    kind,
                    odds,
                    stake,
                    ret,
                    colored_amount(profit, 10)
                );
            }
        }
    }

    println!("{}", "-".repeat(56));
    println!("{:>16} {:>10.2}", "Investment", result.total_investment);
    if result.liability > 0.0 {
        println!("{:>16} {:>10.2}", "Liability", result.liability);
    }
    println!("{:>16} {:>10.2}", "Return", result.total_return);
    println!("{:>16} {}", "Profit", colored_amount(result.profit, 10));
    println!("{:>16} {:>10}", "ROI", result.roi.to_string());

    if let Some(base) = ledger {
        println!();
        println!("{}: {}", "Ledger".cyan(), build_ledger_url(base, calc.lines()));
    }
}

/// Type label and pricing odds for each line
fn line_labels(lines: &Lines) -> Vec<(&'static str, f64)> {
    match lines {
        Lines::Dutching(l) => l.iter().map(|l| ("back", l.odds)).collect(),
        Lines::Aumentada(l) => l
            .iter()
            .map(|l| (if l.is_fixed { "fixed" } else { "boost" }, l.final_odds()))
            .collect(),
        Lines::Limitation(l) => l
            .iter()
            .map(|l| {
                let kind = match (l.bet_mode, l.is_freebet) {
                    (BetMode::Lay, _) => "lay",
                    (BetMode::Back, true) => "free",
                    (BetMode::Back, false) => "back",
                };
                (kind, l.effective_odds())
            })
            .collect(),
        Lines::Extraction(_) => Vec::new(),
    }
}

fn colored_amount(value: f64, width: usize) -> String {
    let text = format!("{:>width$.2}", value, width = width);
    if value > 0.0 {
        text.green().to_string()
    } else if value < 0.0 {
        text.red().to_string()
    } else {
        text
    }
}

fn run_interactive(share_dir: &Path, ledger_url: &str) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!("Decimal commas are accepted.\n");

    let theme = ColorfulTheme::default();

    loop {
        let options = vec![
            "Dutching",
            "Aumentada (odds boost)",
            "Limitation (back/lay)",
            "Extraction (freebet/bonus)",
            "Restore a share",
            "Quit",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to calculate?")
            .items(&options)
            .default(0)
            .interact()?;

        let calc = match selection {
            0 => {
                let odds = prompt_odds(&theme)?;
                let total: String = Input::with_theme(&theme)
                    .with_prompt("Total investment")
                    .interact_text()?;
                dutching(&odds, &total)?
            }
            1 => {
                let odds = prompt_odds(&theme)?;
                let mut increase = Vec::with_capacity(odds.len());
                for i in 0..odds.len() {
                    let inc: String = Input::with_theme(&theme)
                        .with_prompt(format!("Boost % for line {}", i + 1))
                        .default("0".to_string())
                        .interact_text()?;
                    increase.push(inc);
                }

                let mut fixed_options = vec!["None".to_string()];
                fixed_options.extend((1..=odds.len()).map(|i| format!("Line {}", i)));
                let fixed = Select::with_theme(&theme)
                    .with_prompt("Fixed stake line")
                    .items(&fixed_options)
                    .default(0)
                    .interact()?;

                if fixed == 0 {
                    let total: String = Input::with_theme(&theme)
                        .with_prompt("Total investment")
                        .interact_text()?;
                    aumentada(&odds, &increase, &total, None, None)?
                } else {
                    let stake: String = Input::with_theme(&theme)
                        .with_prompt(format!("Stake on line {}", fixed))
                        .interact_text()?;
                    aumentada(&odds, &increase, "0", Some(fixed), Some(stake.as_str()))?
                }
            }
            2 => interactive_limitation(&theme)?,
            3 => {
                let bet_type = Select::with_theme(&theme)
                    .with_prompt("Bonus type")
                    .items(&["Freebet", "Normal"])
                    .default(0)
                    .interact()?;
                let bet_type = if bet_type == 0 {
                    BonusType::Freebet
                } else {
                    BonusType::Normal
                };
                let stake: String = Input::with_theme(&theme)
                    .with_prompt("Stake")
                    .interact_text()?;
                let back: String = Input::with_theme(&theme)
                    .with_prompt("Back odds")
                    .interact_text()?;
                let lay: String = Input::with_theme(&theme)
                    .with_prompt("Lay odds")
                    .interact_text()?;
                let commission: String = Input::with_theme(&theme)
                    .with_prompt("Commission %")
                    .default("0".to_string())
                    .interact_text()?;
                let input = ExtractionInput::from_raw(bet_type, &stake, &back, &lay, &commission);
                Calculator::from_lines(Lines::Extraction(input), 0.0)
            }
            4 => {
                let code: String = Input::with_theme(&theme)
                    .with_prompt("Share code")
                    .interact_text()?;
                println!();
                if let Err(e) = run_restore(share_dir, code.trim(), Some(ledger_url)) {
                    println!("{} {:#}", "Error:".red(), e);
                }
                println!();
                continue;
            }
            5 => {
                println!("Goodbye!");
                break;
            }
            _ => continue,
        };

        println!();
        print_calculation(&calc, Some(ledger_url));
        println!();

        let share = Confirm::with_theme(&theme)
            .with_prompt("Create a share link?")
            .default(false)
            .interact()?;
        if share {
            let total = Some(calc.total_stake()).filter(|t| *t > 0.0);
            if let Err(e) = run_share(share_dir, calc.lines(), total) {
                println!("{} {:#}", "Error:".red(), e);
            }
            println!();
        }
    }

    Ok(())
}

fn prompt_odds(theme: &ColorfulTheme) -> Result<Vec<String>> {
    let count: usize = Input::with_theme(theme)
        .with_prompt("Number of lines (2-5)")
        .default(2)
        .interact_text()?;
    check_line_count(count)?;

    let mut odds = Vec::with_capacity(count);
    for i in 0..count {
        let raw: String = Input::with_theme(theme)
            .with_prompt(format!("Odds for line {}", i + 1))
            .interact_text()?;
        odds.push(raw);
    }
    Ok(odds)
}

fn interactive_limitation(theme: &ColorfulTheme) -> Result<Calculator> {
    let odds = prompt_odds(theme)?;
    let n = odds.len();

    let mut lay_options = vec!["None".to_string()];
    lay_options.extend((1..=n).map(|i| format!("Line {}", i)));
    let lay = Select::with_theme(theme)
        .with_prompt("Lay line")
        .items(&lay_options)
        .default(0)
        .interact()?;
    let lay_odd = if lay > 0 {
        let raw: String = Input::with_theme(theme)
            .with_prompt(format!("Lay odds for line {}", lay))
            .interact_text()?;
        Some(raw)
    } else {
        None
    };

    let mut freebet = Vec::new();
    for i in 1..=n {
        if i == lay {
            continue;
        }
        let is_freebet = Confirm::with_theme(theme)
            .with_prompt(format!("Is line {} a freebet?", i))
            .default(false)
            .interact()?;
        if is_freebet {
            freebet.push(i);
        }
    }

    let driver: usize = Input::with_theme(theme)
        .with_prompt("Line whose stake you know")
        .default(1)
        .interact_text()?;
    let stake: String = Input::with_theme(theme)
        .with_prompt(format!("Stake on line {}", driver))
        .interact_text()?;

    let mut stakes = vec![String::new(); n];
    if let Some(slot) = stakes.get_mut(driver.saturating_sub(1)) {
        *slot = stake;
    }

    limitation(
        &odds,
        &stakes,
        (lay > 0).then_some(lay),
        lay_odd.as_deref(),
        &freebet,
        driver,
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use surebet::{AumentadaLine, BetLine, LimitationLine};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn stakes(calc: &Calculator) -> Vec<f64> {
        calc.result().stakes.clone()
    }

    #[test]
    fn test_dutching_command() {
        let calc = dutching(&strings(&["2.0", "2,0", "4"]), "100").unwrap();
        assert_eq!(calc.lines().len(), 3);
        assert_eq!(stakes(&calc), vec![40.0, 40.0, 20.0]);
    }

    #[test]
    fn test_aumentada_fixed_command() {
        let calc = aumentada(
            &strings(&["2.0", "2.1"]),
            &strings(&["0"]),
            "0",
            Some(1),
            Some("100"),
        )
        .unwrap();
        let s = stakes(&calc);
        assert!((s[0] - 100.0).abs() < 1e-9);
        assert!((s[1] * 2.1 - 200.0).abs() <= 0.02);
    }

    #[test]
    fn test_limitation_lay_command() {
        let calc = limitation(
            &strings(&["2.0", "0"]),
            &strings(&["100"]),
            Some(2),
            Some("2.05"),
            &[],
            1,
            false,
        )
        .unwrap();
        assert_eq!(stakes(&calc), vec![100.0, 97.56]);
        assert_eq!(calc.result().liability, 102.44);
    }

    #[test]
    fn test_limitation_rejects_bad_line_numbers() {
        let odds = strings(&["2.0", "2.0"]);
        assert!(limitation(&odds, &[], None, None, &[], 3, false).is_err());
        assert!(limitation(&odds, &[], None, None, &[0], 1, false).is_err());
        assert!(limitation(&strings(&["2.0"]), &[], None, None, &[], 1, false).is_err());
    }

    #[test]
    fn test_line_labels() {
        let lines = Lines::Limitation(vec![
            LimitationLine::freebet(3.0, 100.0),
            LimitationLine::lay(2.95, 0.0),
        ]);
        let labels = line_labels(&lines);
        assert_eq!(labels[0].0, "free");
        assert_eq!(labels[1], ("lay", 2.95));

        let boosted = Lines::Aumentada(vec![AumentadaLine::new(2.0, 10.0)]);
        assert!((line_labels(&boosted)[0].1 - 2.1).abs() < 1e-12);

        let plain = Lines::Dutching(vec![BetLine::new(1.5, 0.0)]);
        assert_eq!(line_labels(&plain), vec![("back", 1.5)]);
    }
}
