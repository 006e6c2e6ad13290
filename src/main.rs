use analytics::{check_period, AnalyticsEngine, AnalyticsParams, InMemoryProvider};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use core_types::DateRange;
use database::DbRepository;
use serde_json::json;

mod render;

/// The main entry point for the equity analytics application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = configuration::load_config_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;
    let _log_guard = configuration::init_logging(&config.logging)?;

    let params = AnalyticsParams::from(&config.analytics);
    let args = cli.command.args();
    let range = DateRange::new(args.from, args.to)?;
    let symbols = resolve_symbols(&args.symbols, &config.portfolio.symbols);
    if symbols.is_empty() {
        bail!("No symbols given: pass --symbols or set [portfolio] symbols in the config file");
    }

    // Reject short volatility requests before touching the database.
    if let Commands::Volatility(_) = cli.command {
        check_period(range, &params)?;
    }

    tracing::info!(command = cli.command.name(), ?symbols, %range, "Starting analysis.");

    let pool = database::connect()
        .await
        .context("Failed to connect to the database")?;
    let rows = DbRepository::new(pool)
        .get_price_series_many(&symbols, range)
        .await
        .context("Failed to fetch prices")?;
    let provider = InMemoryProvider::from_points(rows)?;
    let engine = AnalyticsEngine::with_params(provider, params);

    let output = run(&cli.command, &engine, &symbols, range, args.json)?;
    println!("{output}");

    tracing::info!(command = cli.command.name(), "Analysis complete.");
    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Return, drawdown, volatility and correlation analytics over daily equity prices.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily log returns, drawdown trace and Sharpe ratio per symbol.
    Returns(RequestArgs),
    /// Worst drawdown episode and its duration per symbol.
    Mdd(RequestArgs),
    /// Rolling volatility at 20/40/60/80/100-day horizons per symbol.
    Volatility(RequestArgs),
    /// Correlation matrix of daily returns.
    Correlation(RequestArgs),
    /// Mean, standard deviation, min and max of daily returns per symbol.
    Stats(RequestArgs),
    /// Tail quantiles of daily returns per symbol.
    Quantiles(RequestArgs),
}

impl Commands {
    fn args(&self) -> &RequestArgs {
        match self {
            Commands::Returns(a)
            | Commands::Mdd(a)
            | Commands::Volatility(a)
            | Commands::Correlation(a)
            | Commands::Stats(a)
            | Commands::Quantiles(a) => a,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Commands::Returns(_) => "returns",
            Commands::Mdd(_) => "mdd",
            Commands::Volatility(_) => "volatility",
            Commands::Correlation(_) => "correlation",
            Commands::Stats(_) => "stats",
            Commands::Quantiles(_) => "quantiles",
        }
    }
}

#[derive(Args)]
struct RequestArgs {
    /// Comma-separated symbols (e.g., "AAPL,MSFT"). Falls back to the configured portfolio.
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,

    /// The start date, inclusive (format: YYYY-MM-DD).
    #[arg(long)]
    from: NaiveDate,

    /// The end date, inclusive (format: YYYY-MM-DD).
    #[arg(long)]
    to: NaiveDate,

    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Runs one command against the loaded prices and renders its result.
/// Command-line symbols win over the configured portfolio. Either way the list
/// is trimmed, upper-cased and deduplicated so every command sees each symbol once.
fn resolve_symbols(requested: &[String], configured: &[String]) -> Vec<String> {
    if requested.is_empty() {
        analytics::normalize_symbols(configured)
    } else {
        analytics::normalize_symbols(requested)
    }
}

fn run(
    command: &Commands,
    engine: &AnalyticsEngine<InMemoryProvider>,
    symbols: &[String],
    range: DateRange,
    as_json: bool,
) -> anyhow::Result<String> {
    let output = match command {
        Commands::Returns(_) => {
            let results = engine.adjusted_returns_for(symbols, range);
            if as_json {
                serde_json::to_string_pretty(&results)?
            } else {
                render::adjusted_returns(&results)
            }
        }
        Commands::Mdd(_) => {
            let outcomes: Vec<_> = symbols
                .iter()
                .map(|s| (s.clone(), engine.mdd_duration(s, range)))
                .collect();
            if as_json {
                let items: Vec<_> = outcomes
                    .iter()
                    .map(|(symbol, outcome)| match outcome {
                        Ok(episode) => json!({ "symbol": symbol, "episode": episode }),
                        Err(e) => json!({ "symbol": symbol, "error": e.to_string(), "recoverable": e.is_recoverable() }),
                    })
                    .collect();
                serde_json::to_string_pretty(&items)?
            } else {
                render::mdd(&outcomes)
            }
        }
        Commands::Volatility(_) => {
            let outcomes: Vec<_> = symbols
                .iter()
                .map(|s| (s.clone(), engine.volatility_profile(s, range)))
                .collect();
            if as_json {
                let items: Vec<_> = outcomes
                    .iter()
                    .map(|(symbol, outcome)| match outcome {
                        Ok(profile) => json!({ "symbol": symbol, "profile": profile }),
                        Err(e) => json!({ "symbol": symbol, "error": e.to_string() }),
                    })
                    .collect();
                serde_json::to_string_pretty(&items)?
            } else {
                render::volatility(&outcomes)
            }
        }
        Commands::Correlation(_) => {
            let matrix = engine.correlation(symbols, range);
            if as_json {
                serde_json::to_string_pretty(&matrix)?
            } else {
                render::correlation(&matrix)
            }
        }
        Commands::Stats(_) => {
            let results = engine.descriptive_stats(symbols, range);
            if as_json {
                serde_json::to_string_pretty(&results)?
            } else {
                render::stats(&results)
            }
        }
        Commands::Quantiles(_) => {
            let results = engine.quantiles(symbols, range);
            if as_json {
                serde_json::to_string_pretty(&results)?
            } else {
                render::quantiles(&results)
            }
        }
    };
    Ok(output)
}
