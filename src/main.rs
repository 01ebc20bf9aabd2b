//! Walk-forward ROR CLI
//!
//! Command-line interface for running rolling-return simulations, plan sweeps
//! and IRR calculations over prepared CSV inputs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkforward_ror::series::load_series;
use walkforward_ror::simulation::{
    Histogram, InvestmentPlan, ReturnMethod, ReturnObservation, ReturnSummary,
    RollingReturnSimulator, SimulationConfig, DEFAULT_CONTRIBUTION, DEFAULT_HORIZON_YEARS,
};
use walkforward_ror::sweep::{staged_grid, PlanSweep, SweepOutcome};
use walkforward_ror::valuation::{internal_rate_of_return, load_schedule, npv};

#[derive(Parser)]
#[command(version, about = "Historical rate-of-return statistics for staged investment plans")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate one plan from every eligible anchor date
    Simulate {
        /// CSV with `date,value` columns
        #[arg(long)]
        prices: PathBuf,
        /// Contribution offsets in days from the anchor
        #[arg(long, value_delimiter = ',', default_value = "0")]
        offsets: Vec<f64>,
        /// Holding horizon in years
        #[arg(long, default_value_t = DEFAULT_HORIZON_YEARS)]
        horizon: f64,
        #[arg(long, default_value_t = DEFAULT_CONTRIBUTION)]
        contribution: f64,
        /// Report IRR per anchor instead of the simple annualized return
        #[arg(long)]
        irr: bool,
        #[arg(long, default_value_t = 20)]
        buckets: usize,
        #[arg(long)]
        json: bool,
    },
    /// Compare staged plans with 1..=N contributions
    Sweep {
        #[arg(long)]
        prices: PathBuf,
        #[arg(long, default_value_t = 12)]
        max_contributions: usize,
        /// Days between contributions (default: one month)
        #[arg(long, default_value_t = 30.4375)]
        spacing: f64,
        #[arg(long, default_value_t = DEFAULT_HORIZON_YEARS)]
        horizon: f64,
        #[arg(long)]
        json: bool,
    },
    /// IRR of a `date,amount` cash-flow CSV
    Irr {
        #[arg(long)]
        flows: PathBuf,
    },
}

#[derive(Serialize)]
struct SimulateResponse {
    plan: InvestmentPlan,
    config: SimulationConfig,
    summary: Option<ReturnSummary>,
    histogram: Option<Histogram>,
    observations: Vec<ReturnObservation>,
    execution_time_ms: u64,
}

#[derive(Serialize)]
struct SweepResponse {
    config: SimulationConfig,
    outcomes: Vec<SweepOutcome>,
    execution_time_ms: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Simulate {
            prices,
            offsets,
            horizon,
            contribution,
            irr,
            buckets,
            json,
        } => {
            let config = SimulationConfig {
                horizon_years: horizon,
                contribution,
                method: if irr {
                    ReturnMethod::Irr
                } else {
                    ReturnMethod::SimpleAnnualized
                },
            };
            run_simulate(&prices, offsets, config, buckets, json)
        }
        Command::Sweep {
            prices,
            max_contributions,
            spacing,
            horizon,
            json,
        } => run_sweep(&prices, max_contributions, spacing, horizon, json),
        Command::Irr { flows } => run_irr(&flows),
    }
}

fn run_simulate(
    prices: &Path,
    offsets: Vec<f64>,
    config: SimulationConfig,
    buckets: usize,
    json: bool,
) -> Result<()> {
    let start = Instant::now();
    let series = load_series(prices)
        .with_context(|| format!("loading price series from {}", prices.display()))?;
    let plan = InvestmentPlan::new(offsets)?;

    let sample = RollingReturnSimulator::new(config).simulate(&series, &plan)?;
    // Empty samples have no statistics; reported as absent rather than failing
    let summary = sample.summary().ok();
    let histogram = sample.histogram(buckets).ok();

    if json {
        let response = SimulateResponse {
            plan,
            config,
            summary,
            histogram,
            observations: sample.observations().to_vec(),
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    println!("Walk-forward ROR");
    println!("================\n");
    println!(
        "Series: {} samples, {} to {}",
        series.len(),
        series.first().date,
        series.last().date
    );
    println!(
        "Plan:   {} ({} contributions of {:.2})",
        plan,
        plan.len(),
        config.contribution
    );
    println!("Horizon: {} years, method {:?}", config.horizon_years, config.method);
    println!();

    match summary {
        Some(s) => {
            println!("Anchors:    {}", s.count);
            println!("Mean:       {:.4}%", s.mean);
            println!("Std dev:    {:.4}%", s.std_dev);
            println!("2.5th pct:  {:.4}%", s.p2_5);
            println!("97.5th pct: {:.4}%", s.p97_5);
            println!("Range:      {:.4}% .. {:.4}%", s.min, s.max);
        }
        None => println!("No anchor has {} years of data after it", config.horizon_years),
    }

    if let Some(hist) = histogram {
        println!("\n{:>20} {:>8}", "Bucket", "Count");
        println!("{}", "-".repeat(29));
        for bucket in &hist.buckets {
            println!("{:>20} {:>8}", bucket.label, bucket.count);
        }
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}

fn run_sweep(
    prices: &Path,
    max_contributions: usize,
    spacing: f64,
    horizon: f64,
    json: bool,
) -> Result<()> {
    let start = Instant::now();
    let series = load_series(prices)
        .with_context(|| format!("loading price series from {}", prices.display()))?;
    let plans = staged_grid(max_contributions, spacing)?;

    let sweep = PlanSweep::new(SimulationConfig::with_horizon(horizon));
    let outcomes = sweep.run(&series, &plans);

    if json {
        let response = SweepResponse {
            config: *sweep.config(),
            outcomes,
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    println!(
        "{:>6} {:>10} {:>10} {:>10} {:>10} {:>9}",
        "N",
        "Mean",
        "StdDev",
        "P2.5",
        "P97.5",
        "Frontier"
    );
    println!("{}", "-".repeat(60));
    for (n, outcome) in outcomes.iter().enumerate() {
        match &outcome.result {
            Ok(p) => println!(
                "{:>6} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>9}",
                n + 1,
                p.summary.mean,
                p.summary.std_dev,
                p.summary.p2_5,
                p.summary.p97_5,
                if p.on_frontier { "*" } else { "" },
            ),
            Err(e) => println!("{:>6} failed: {}", n + 1, e),
        }
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}

fn run_irr(flows: &Path) -> Result<()> {
    let schedule = load_schedule(flows)
        .with_context(|| format!("loading cash flows from {}", flows.display()))?;

    let rate = internal_rate_of_return(&schedule)?;
    println!("IRR: {:.6}%", rate);
    println!("NPV at IRR: {:.3e}", npv(&schedule, None, rate));
    Ok(())
}
