use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use sluice_config::SluiceConfig;
use sluice_engine::Simulation;
use sluice_telemetry::{EventLogger, MetricsRecorder};

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the simulation and print the final report
    Run(RunArgs),
    /// Validate a configuration without running it
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Configuration file; defaults to config/sluice.yaml when present
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Number of manager threads
    #[arg(long)]
    pub consumers: Option<usize>,
    /// Cycles for every system
    #[arg(long)]
    pub cycles: Option<u32>,
    /// Print Prometheus metrics after the report
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// Applies command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut SluiceConfig) {
        if let Some(consumers) = self.consumers {
            config.workers.consumers = consumers;
        }
        if let Some(cycles) = self.cycles {
            for system in &mut config.systems {
                system.cycles = cycles;
            }
        }
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Check(args) => check(args),
    }
}

fn load(path: Option<&PathBuf>) -> anyhow::Result<SluiceConfig> {
    let config = match path {
        Some(path) => SluiceConfig::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SluiceConfig::load().context("loading configuration")?,
    };
    Ok(config)
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = load(args.config.as_ref())?;
    args.apply(&mut config);
    config.check().context("command-line overrides")?;

    EventLogger::init(&config.telemetry.log_level);
    let metrics = MetricsRecorder::new()?;

    let simulation = Simulation::from_config(&config, metrics)?;
    let report = simulation.run()?;

    for resource in &report.resources {
        info!(
            resource = %resource.name,
            amount = resource.amount,
            max_capacity = resource.max_capacity,
            "final amount"
        );
    }
    print!("{}", report.to_yaml()?);

    if args.metrics {
        print!("{}", simulation.metrics().gather_metrics()?);
    }
    Ok(())
}

fn check(args: CheckArgs) -> anyhow::Result<()> {
    let config = load(args.config.as_ref())?;

    println!(
        "ok: {} resources, {} systems, {} consumers",
        config.resources.len(),
        config.systems.len(),
        config.workers.consumers
    );
    for resource in &config.resources {
        println!(
            "  resource {}: {}/{}",
            resource.name, resource.amount, resource.max_capacity
        );
    }
    for system in &config.systems {
        let describe = |amount: &Option<sluice_config::AmountSpec>| match amount {
            Some(amount) => format!("{} {}", amount.amount, amount.resource),
            None => "-".to_owned(),
        };
        println!(
            "  system {}: {} -> {} x{}",
            system.name,
            describe(&system.consumes),
            describe(&system.produces),
            system.cycles
        );
    }
    Ok(())
}
