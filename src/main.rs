use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tradecycle::cli::commands::{Cli, Commands};
use tradecycle::cli::render::{cycle_summary, halt_panel};
use tradecycle::config::AppConfig;
use tradecycle::domain::entities::reflection::ReflectionLevel;
use tradecycle::domain::ports::trade_repository::TradeFilter;
use tradecycle::domain::values::portfolio::PortfolioSnapshot;
use tradecycle::infrastructure::feeds::JsonFileFeed;
use tradecycle::{default_collaborators, TradeCycle};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }

    let feed_path = match &cli.command {
        Commands::Run { feed, .. } => feed.clone(),
        _ => None,
    };
    let app = match feed_path {
        Some(path) => {
            let (collaborators, summarizer) = default_collaborators(&config, Arc::new(JsonFileFeed::new(path)));
            TradeCycle::with_providers(&config, collaborators, summarizer)
        }
        None => TradeCycle::new(&config),
    };
    let app = match app {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error initializing tradecycle: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(app, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(app: TradeCycle, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Run {
            instrument,
            cycles,
            portfolio_in,
            portfolio_out,
            json,
            ..
        } => {
            let instrument = instrument.unwrap_or_else(|| app.config().instrument.clone());
            let portfolio = match &portfolio_in {
                Some(path) => PortfolioSnapshot::load(path)?,
                None => app.initial_portfolio(),
            };

            let result = app.run_cycles(&instrument, portfolio, cycles.max(1)).await;
            let outcomes = match result {
                Ok(outcomes) => outcomes,
                Err(e) => {
                    if let Some(path) = &portfolio_out {
                        e.portfolio.save(path)?;
                    }
                    return Err(e.into());
                }
            };

            for outcome in &outcomes {
                if json {
                    println!("{}", serde_json::to_string_pretty(outcome)?);
                } else if outcome.is_halted() {
                    println!("{}", halt_panel(outcome));
                } else {
                    println!("{}", cycle_summary(outcome));
                }
            }
            if let (Some(path), Some(last)) = (&portfolio_out, outcomes.last()) {
                last.portfolio.save(path)?;
                eprintln!("Portfolio written to {}", path.display());
            }
        }
        Commands::Evaluate { instrument, price } => {
            let report = app.evaluate_pending(&instrument, price)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Report { instrument } => match app.accuracy_report(&instrument)? {
            Some(report) => println!("{report}"),
            None => println!(
                "Not enough evaluated signals for {} yet.",
                instrument.to_uppercase()
            ),
        },
        Commands::Trades { limit, since } => {
            let trades = app.list_trades(&TradeFilter {
                limit: Some(limit),
                since: parse_date(&since)?,
                ..TradeFilter::default()
            })?;
            println!("{}", serde_json::to_string_pretty(&trades)?);
        }
        Commands::Reflections { level, limit } => {
            let level = ReflectionLevel::try_from(level)?;
            let entries = app.recent_reflections(level, limit)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Commands::Stats => {
            let stats = app.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}

fn parse_date(s: &Option<String>) -> Result<Option<chrono::DateTime<chrono::Utc>>, String> {
    match s {
        None => Ok(None),
        Some(s) => {
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
                return Ok(Some(dt.with_timezone(&chrono::Utc)));
            }
            if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                    return Ok(Some(dt.and_utc()));
                }
            }
            Err(format!("Invalid date format: {s}. Use YYYY-MM-DD or RFC3339"))
        }
    }
}
