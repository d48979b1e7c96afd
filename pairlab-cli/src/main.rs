//! PairLab CLI: run, init-config and inspect commands.
//!
//! Commands:
//! - `run`: execute a pairs backtest from a TOML config and/or flags
//! - `init-config`: write the default config file
//! - `inspect`: load one price file and report what was parsed

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pairlab_core::{load_price_series, InputOrder};
use pairlab_runner::{run_and_save, run_from_config, BacktestConfig, BacktestResult};

/// Environment variable holding the log filter (e.g. `debug`, `pairlab_core=debug`).
const LOG_ENV: &str = "PAIRLAB_LOG";

#[derive(Parser)]
#[command(
    name = "pairlab",
    version,
    about = "PairLab CLI: pairs-trading backtest engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pairs backtest. Flags override values from --config.
    Run(RunArgs),
    /// Write the default config file.
    InitConfig {
        /// Where to write it.
        #[arg(long, default_value = "pairlab.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Load one price file and print row count, missing prices and date range.
    Inspect {
        file: PathBuf,

        /// Row order of the file: newest_first, oldest_first or auto.
        #[arg(long, default_value = "newest_first")]
        order: String,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// First instrument's price file.
    #[arg(long)]
    left: Option<PathBuf>,

    /// Second instrument's price file.
    #[arg(long)]
    right: Option<PathBuf>,

    #[arg(long)]
    left_symbol: Option<String>,

    #[arg(long)]
    right_symbol: Option<String>,

    /// Threshold width in standard deviations.
    #[arg(long)]
    num_stdevs: Option<f64>,

    /// Starting capital.
    #[arg(long)]
    capital: Option<f64>,

    /// Units per leg.
    #[arg(long)]
    order_size: Option<u32>,

    #[arg(long, default_value_t = false)]
    show_thresholds: bool,

    #[arg(long, default_value_t = false)]
    show_means: bool,

    #[arg(long, default_value_t = false)]
    show_signals: bool,

    /// Output directory for artifacts.
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,

    /// Print the summary only.
    #[arg(long, default_value_t = false)]
    no_artifacts: bool,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_cmd(args),
        Commands::InitConfig { path, force } => init_config(&path, force),
        Commands::Inspect { file, order } => inspect(&file, &order),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_cmd(args: RunArgs) -> Result<()> {
    let config = build_config(&args)?;

    if args.no_artifacts {
        let result = run_from_config(&config)?;
        print_summary(&result);
    } else {
        let (result, run_dir) = run_and_save(&config, &args.output_dir)?;
        print_summary(&result);
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

/// Merge the optional config file with command-line overrides.
fn build_config(args: &RunArgs) -> Result<BacktestConfig> {
    let mut config = match &args.config {
        Some(path) => BacktestConfig::from_file(path)?,
        None => BacktestConfig::default(),
    };

    if let Some(left) = &args.left {
        config.pair.left_file = Some(left.clone());
    }
    if let Some(right) = &args.right {
        config.pair.right_file = Some(right.clone());
    }
    if let Some(sym) = &args.left_symbol {
        config.pair.left_symbol = sym.clone();
    }
    if let Some(sym) = &args.right_symbol {
        config.pair.right_symbol = sym.clone();
    }
    if let Some(k) = args.num_stdevs {
        config.strategy.num_stdevs = k;
    }
    if let Some(capital) = args.capital {
        config.strategy.starting_capital = capital;
    }
    if let Some(size) = args.order_size {
        config.strategy.order_size = size;
    }
    config.display.show_thresholds |= args.show_thresholds;
    config.display.show_means |= args.show_means;
    config.display.show_signals |= args.show_signals;

    if config.pair.left_file.is_none() || config.pair.right_file.is_none() {
        bail!("both price files are required: pass --left/--right or set them in --config");
    }
    tracing::info!(
        left = %config.pair.left_symbol,
        right = %config.pair.right_symbol,
        num_stdevs = config.strategy.num_stdevs,
        capital = config.strategy.starting_capital,
        order_size = config.strategy.order_size,
        "resolved run config"
    );
    Ok(config)
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    let toml = BacktestConfig::default().to_toml()?;
    std::fs::write(path, toml).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn inspect(file: &Path, order: &str) -> Result<()> {
    let order = parse_order(order)?;
    let symbol = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    let series = load_price_series(file, &symbol, order)?;
    tracing::debug!(file = %file.display(), ?order, "inspected price file");

    println!();
    println!("=== {} ===", file.display());
    println!("Rows:           {}", series.len());
    println!("Missing prices: {}", series.missing_count());
    println!("First date:     {}", series.first_date().unwrap_or("-"));
    println!("Last date:      {}", series.last_date().unwrap_or("-"));
    println!();
    Ok(())
}

fn parse_order(raw: &str) -> Result<InputOrder> {
    match raw {
        "newest_first" => Ok(InputOrder::NewestFirst),
        "oldest_first" => Ok(InputOrder::OldestFirst),
        "auto" => Ok(InputOrder::Auto),
        _ => bail!("unknown order '{raw}'. Valid: newest_first, oldest_first, auto"),
    }
}

fn print_summary(result: &BacktestResult) {
    let s = result.summary();
    println!();
    println!("=== Pairs Backtest Result ===");
    println!("Pair:           {}", s.pair);
    println!("Period:         {} to {}", s.start_date, s.end_date);
    println!("Bars:           {} ({} dates dropped)", s.bars, s.dropped_dates);
    println!("Correlation:    {:.4}", s.correlation);
    println!();
    println!("--- Spread ---");
    println!("Mean:           {:.4}", s.mean_spread);
    println!("Std Dev:        {:.4}", s.spread_stdev);
    println!("Upper:          {:.4}", s.upper_threshold);
    println!("Lower:          {:.4}", s.lower_threshold);
    println!();
    println!("--- Performance ---");
    println!("Trades:         {} ({} winners)", s.num_trades, s.winning_trades);
    println!("Final Value:    ${:.2}", s.final_portfolio_value);
    println!("Total Return:   {:.2}%", s.total_return_pct);
    println!("Return on Cap:  {:.2}%", s.capital_return_pct);
    println!("Sharpe:         {:.4}", s.sharpe_ratio);
    println!("Max Drawdown:   {:.2}%", s.max_drawdown_pct);
    if result.report.ended_with_open_position {
        println!("Open At End:    {}", s.open_position);
    }
    for warn in s.warnings.iter().chain(&result.notes) {
        println!("WARNING: {warn}");
    }
    println!("Run Id:         {}", result.run_id);
    println!();
}
