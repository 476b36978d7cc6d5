//! CLI definition and dispatch.

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::adapters::csv_feed_adapter::CsvFeedAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::alert::AlertFilter;
use crate::domain::config::EngineConfig;
use crate::domain::config_validation::validate_engine_config;
use crate::domain::engine::TradingEngine;
use crate::domain::error::ConfluenceError;
use crate::domain::observation::PriceObservation;
use crate::domain::portfolio::PortfolioSummary;
use crate::domain::risk::Decision;
use crate::domain::signal::CompositeSignal;
use crate::ports::feed_port::FeedPort;

#[derive(Parser, Debug)]
#[command(name = "confluence", about = "Multi-strategy signal fusion and risk-managed trading")]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay recorded CSV feeds through the engine
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory holding one <SYMBOL>.csv per symbol
        #[arg(short, long)]
        feed: PathBuf,
        /// Comma-separated symbols; defaults to every CSV in the feed directory
        #[arg(short, long, value_delimiter = ',')]
        symbols: Vec<String>,
    },
    /// Load and validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

impl Cli {
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();

        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("warning: logging already initialised: {e}");
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    cli.init_logging();
    match cli.command {
        Command::Run {
            config,
            feed,
            symbols,
        } => run_replay(&config, &feed, &symbols),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &ConfluenceError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

/// Load, parse and validate an INI configuration.
pub fn load_engine_config(path: &Path) -> Result<EngineConfig, ConfluenceError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    let config = EngineConfig::from_port(&adapter)?;
    validate_engine_config(&config)?;
    Ok(config)
}

fn run_validate(config_path: &Path) -> ExitCode {
    match load_engine_config(config_path) {
        Ok(config) => {
            println!("{} is valid", config_path.display());
            println!(
                "  strategies: MA {}/{}, RSI {}, MACD {}/{}/{}, Bollinger {}",
                config.strategies.ma_short_window,
                config.strategies.ma_long_window,
                config.strategies.rsi_period,
                config.strategies.macd_fast,
                config.strategies.macd_slow,
                config.strategies.macd_signal,
                config.strategies.bollinger_period
            );
            println!(
                "  confidence threshold {:.1}, initial capital {:.2}, shorting {}",
                config.fusion.confidence_threshold,
                config.initial_capital,
                if config.risk.allow_shorting { "on" } else { "off" }
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_replay(config_path: &Path, feed_dir: &Path, symbols: &[String]) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_engine_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let feed = CsvFeedAdapter::new(feed_dir.to_path_buf());
    let symbols = if symbols.is_empty() {
        match feed.list_symbols() {
            Ok(s) => s,
            Err(e) => return fail(&e),
        }
    } else {
        symbols.to_vec()
    };
    if symbols.is_empty() {
        eprintln!("error: no symbols to replay in {}", feed_dir.display());
        return ExitCode::from(3);
    }

    let feeds = match load_feeds(&feed, &symbols) {
        Ok(f) => f,
        Err(e) => return fail(&e),
    };

    let engine = TradingEngine::new(config);
    let mut alerts = AlertFilter::new();
    let stats = match replay(&engine, &feeds, &mut alerts) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    match engine.portfolio_summary() {
        Ok(summary) => {
            print_summary(&summary);
            println!(
                "Ticks: {}  Rejected: {}  Entries: {}  Exits: {}",
                stats.ticks, stats.rejected, stats.entries, stats.exits
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

pub fn load_feeds(
    feed: &dyn FeedPort,
    symbols: &[String],
) -> Result<Vec<(String, Vec<PriceObservation>)>, ConfluenceError> {
    symbols
        .iter()
        .map(|symbol| {
            let observations = feed.fetch(symbol)?;
            eprintln!("  {}: {} observations", symbol, observations.len());
            Ok((symbol.clone(), observations))
        })
        .collect()
}

/// One observation for one symbol on the merged timeline.
#[derive(Debug, Clone, Copy)]
pub struct Tick<'a> {
    pub symbol: &'a str,
    pub observation: &'a PriceObservation,
}

/// Merge per-symbol feeds into one time-ordered sequence. Observations
/// sharing a timestamp keep the order of `feeds`.
pub fn build_unified_timeline(feeds: &[(String, Vec<PriceObservation>)]) -> Vec<Tick<'_>> {
    let mut ticks: Vec<Tick<'_>> = feeds
        .iter()
        .flat_map(|(symbol, observations)| {
            observations.iter().map(move |observation| Tick {
                symbol: symbol.as_str(),
                observation,
            })
        })
        .collect();
    ticks.sort_by_key(|tick| tick.observation.timestamp);
    ticks
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayStats {
    pub ticks: usize,
    pub rejected: usize,
    pub entries: usize,
    pub exits: usize,
    pub alerts: usize,
}

/// Feed every tick through the engine, printing decisions and alert-worthy
/// signals. Bad observations are skipped; state violations abort.
pub fn replay(
    engine: &TradingEngine,
    feeds: &[(String, Vec<PriceObservation>)],
    alerts: &mut AlertFilter,
) -> Result<ReplayStats, ConfluenceError> {
    let mut stats = ReplayStats::default();

    for tick in build_unified_timeline(feeds) {
        stats.ticks += 1;
        if let Err(e) = engine.ingest(tick.symbol, tick.observation.clone()) {
            if e.is_state_violation() {
                return Err(e);
            }
            eprintln!("warning: skipping {} tick: {}", tick.symbol, e);
            stats.rejected += 1;
            continue;
        }

        let report = engine.run_cycle_report(tick.symbol)?;
        if let Some(composite) = &report.composite {
            if alerts.should_alert(composite) {
                stats.alerts += 1;
                println!("{}", describe_signal(composite));
            }
        }

        match &report.decision {
            Decision::Enter(_) => stats.entries += 1,
            Decision::Exit { .. } => stats.exits += 1,
            Decision::Hold => {}
        }
        if let Some(line) = describe_decision(&report.decision, tick.observation.timestamp) {
            println!("{line}");
        }
    }

    Ok(stats)
}

pub fn describe_signal(composite: &CompositeSignal) -> String {
    let votes = composite.votes();
    format!(
        "{} SIGNAL {} {} confidence={:.1} (buy {} / sell {} / hold {})",
        composite.timestamp(),
        composite.symbol(),
        composite.direction(),
        composite.confidence(),
        votes.buy,
        votes.sell,
        votes.hold
    )
}

pub fn describe_decision(decision: &Decision, at: NaiveDateTime) -> Option<String> {
    match decision {
        Decision::Enter(order) => Some(format!(
            "{} ENTER {} {} qty={} @ {:.2} stop={:.2} target={:.2}",
            at,
            order.side,
            order.symbol,
            order.quantity,
            order.entry_price,
            order.stop_loss,
            order.take_profit
        )),
        Decision::Exit {
            symbol,
            reason,
            exit_price,
        } => Some(format!("{} EXIT {} ({}) @ {:.2}", at, symbol, reason, exit_price)),
        Decision::Hold => None,
    }
}

fn print_summary(summary: &PortfolioSummary) {
    println!("\n=== Portfolio ===");
    println!("Cash:             {:.2}", summary.cash);
    println!("Invested:         {:.2}", summary.invested);
    println!("Market Value:     {:.2}", summary.market_value);
    println!("Unrealized P&L:   {:.2}", summary.unrealized_pnl);
    println!("Total Value:      {:.2}", summary.total_value);
    println!("Open Positions:   {}", summary.open_positions);
    println!("Daily Loss:       {:.2}", summary.daily_realized_loss);
}
