//! Headless Schelling runner
//!
//! Builds a grid from a TOML config, a preset, or flags, runs it, and prints
//! a summary or JSON report.

use clap::Parser;
use std::path::PathBuf;

use schelling_sim::core::config::Preset;
use schelling_sim::simulation::{ProgressLogger, SimulationOutput};
use schelling_sim::{Engine, Result, SimulationConfig};

/// Schelling segregation model - headless runner
#[derive(Parser, Debug)]
#[command(name = "schelling")]
#[command(about = "Run a Schelling segregation simulation and report the outcome")]
struct Args {
    /// TOML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start from a published parameter set (schelling1971, vinkovic-kirman2006, mesh26x32)
    #[arg(long)]
    preset: Option<String>,

    /// Grid rows
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns
    #[arg(long)]
    cols: Option<usize>,

    /// Agents per group, comma separated
    #[arg(long, value_delimiter = ',')]
    groups: Option<Vec<usize>>,

    /// Number of empty cells
    #[arg(long)]
    vacancies: Option<usize>,

    /// Maximum other/same neighbor ratio an agent accepts
    #[arg(long)]
    tolerance: Option<f64>,

    /// Step budget (runs until stable or interrupted when omitted)
    #[arg(long)]
    steps: Option<u64>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Log progress every N steps
    #[arg(long)]
    progress: Option<u64>,

    /// Stop once stable, checking every N steps
    #[arg(long)]
    check_every: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the final grid as text
    #[arg(long)]
    print_grid: bool,
}

fn build_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match (&args.config, &args.preset) {
        (Some(path), preset) => {
            if let Some(name) = preset {
                eprintln!("Warning: --preset '{}' ignored because --config was given", name);
            }
            SimulationConfig::load(path)?
        }
        (None, Some(name)) => match Preset::from_name(name) {
            Some(preset) => preset.config(),
            None => {
                eprintln!("Warning: unknown preset '{}', using defaults", name);
                SimulationConfig::default()
            }
        },
        (None, None) => SimulationConfig::default(),
    };

    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(groups) = &args.groups {
        config.groups = groups.clone();
    }
    if let Some(vacancies) = args.vacancies {
        config.vacancies = vacancies;
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    if args.steps.is_some() {
        config.max_steps = args.steps;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.progress.is_some() {
        config.progress_interval = args.progress;
    }
    if args.check_every.is_some() {
        config.stability_check_interval = args.check_every;
    }

    Ok(config)
}

fn render_report(format: &str, output: &SimulationOutput) -> Result<String> {
    Ok(match format {
        "json" => output.to_json()?,
        "text" => output.summary(),
        other => {
            eprintln!("Unknown format '{}', defaulting to text", other);
            output.summary()
        }
    })
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;
    let mut engine = Engine::initialize(&config)?;

    if let Some(interval) = config.progress_interval {
        engine.register_observer(ProgressLogger::new(interval, config.max_steps));
    }
    if config.max_steps.is_none() && config.stability_check_interval.is_none() {
        tracing::warn!("No step budget or stability check set; the run may never end");
    }

    tracing::info!(
        "Grid {}x{}, groups {:?}, {} vacancies, tolerance {}, seed {:?}",
        config.rows,
        config.cols,
        config.groups,
        config.vacancies,
        config.tolerance,
        engine.seed()
    );

    let initial = engine.metrics();
    let report = engine.run(None);
    let output = SimulationOutput::new(config, initial, &engine, &report);

    let mut text = render_report(&args.format, &output)?;
    if args.print_grid {
        text.push_str("\n\n");
        text.push_str(&engine.snapshot().to_string());
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &text)?;
            println!("Report written to {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        if e.is_configuration() {
            eprintln!("Invalid configuration: {}", e);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}
