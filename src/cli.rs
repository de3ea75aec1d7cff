//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::technical_indicators::TechnicalIndicators;
use crate::domain::config::{SimulationConfig, SIMULATION};
use crate::domain::config_validation::validate_simulation_config;
use crate::domain::dataset::Dataset;
use crate::domain::engine::Trader;
use crate::domain::error::ScoretraderError;
use crate::domain::indicator::IndicatorKind;
use crate::domain::report::SimulationReport;
use crate::domain::strategy::build_strategy;
use crate::domain::window::reconcile;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "scoretrader", about = "Score-driven multi-ticker trading simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory of <TICKER>.csv files, overrides [simulation] data_dir
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show dataset coverage and the resolved simulation window
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the default level.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scoretrader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run { config, data_dir } => run_simulation(&config, data_dir.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, data_dir } => run_info(&config, data_dir.as_deref()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load, validate and type the configuration at `path`.
pub fn load_config(path: &Path) -> Result<SimulationConfig, ScoretraderError> {
    tracing::info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_simulation_config(&adapter)?;
    SimulationConfig::from_port(&adapter)
}

fn resolve_data_dir(
    override_dir: Option<&Path>,
    config: &SimulationConfig,
) -> Result<PathBuf, ScoretraderError> {
    override_dir
        .map(Path::to_path_buf)
        .or_else(|| config.data_dir.clone())
        .ok_or_else(|| ScoretraderError::ConfigMissing {
            section: SIMULATION.to_string(),
            key: "data_dir".to_string(),
        })
}

fn load_dataset(
    override_dir: Option<&Path>,
    config: &SimulationConfig,
) -> Result<Dataset, ScoretraderError> {
    let data_dir = resolve_data_dir(override_dir, config)?;
    tracing::info!(dir = %data_dir.display(), tickers = config.tickers.len(), "loading data");
    CsvAdapter::new(data_dir).load_dataset(&config.tickers)
}

/// Run the configured simulation end to end.
pub fn simulate(
    config_path: &Path,
    data_dir: Option<&Path>,
) -> Result<SimulationReport, ScoretraderError> {
    let config = load_config(config_path)?;
    let dataset = load_dataset(data_dir, &config)?;
    let mut trader = Trader::new(&dataset, config, &TechnicalIndicators::new())?;
    println!("{trader}");
    trader.run_simulation()
}

fn run_simulation(config_path: &Path, data_dir: Option<&Path>) -> Result<(), ScoretraderError> {
    let report = simulate(config_path, data_dir)?;
    println!("{report}");
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), ScoretraderError> {
    let config = load_config(config_path)?;
    let strategy = build_strategy(&config.strategy, &config.strategy_params)?;

    for ind in &config.exit_indicators {
        let kind = IndicatorKind::from_id(&ind.spec.id)
            .ok_or_else(|| ScoretraderError::UnknownIndicator(ind.spec.id.clone()))?;
        if kind.arity() != ind.spec.params.len() {
            return Err(ScoretraderError::ConfigInvalid {
                section: "strategy_params".to_string(),
                key: ind.spec.id.clone(),
                reason: format!(
                    "{} takes {} parameter(s), got {}",
                    ind.spec.id,
                    kind.arity(),
                    ind.spec.params.len()
                ),
            });
        }
    }

    println!("Strategy: {}", strategy.name());
    println!("Tickers:  {}", config.tickers.join(", "));
    println!("Window:   {} to {}", config.start_date, config.end_date);
    println!("\nEntry indicators:");
    for ind in &config.entry_indicators {
        println!(
            "  {} {} {} (weight {})",
            ind.column, ind.direction, ind.threshold, ind.weight
        );
    }
    println!("\nExit indicators:");
    for ind in &config.exit_indicators {
        println!(
            "  {} -> {} {} 0 (weight {})",
            ind.spec,
            ind.spec.column_name(),
            ind.direction,
            ind.weight
        );
    }
    println!("\nConfiguration is valid.");
    Ok(())
}

fn run_info(config_path: &Path, data_dir: Option<&Path>) -> Result<(), ScoretraderError> {
    let config = load_config(config_path)?;
    let dataset = load_dataset(data_dir, &config)?;

    let (Some(first), Some(last)) = (dataset.first_date(), dataset.last_date()) else {
        return Err(ScoretraderError::EmptyDataset);
    };
    println!("Dataset: {} rows, {} to {}", dataset.len(), first, last);
    for ticker in &config.tickers {
        println!("  {}: {}", ticker, dataset.fields(ticker).join(", "));
    }

    let window = reconcile(dataset.dates(), &config.start_date, &config.end_date)?;
    let rows = dataset.truncate(&window).len();
    println!(
        "Window:  {} to {} ({} trading days)",
        window.start_date, window.end_date, rows
    );
    Ok(())
}
