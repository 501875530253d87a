//! `store-locator`: locates the stores of the companies given on the command
//! line and reports them, optionally with nearby weather observations.

mod cli;
mod settings;

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use locator_engine::{render_text, write_reports, FailedCompany, RunReport, StoreLocator};
use locator_logging::{locator_error, locator_info, locator_warn};
use log::LevelFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    locator_logging::initialize(cli.log, level);

    match run(cli).await {
        Ok(report) if report.companies.is_empty() && !report.failed.is_empty() => {
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            locator_error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunReport> {
    let config = settings::load_config(cli.config.as_deref(), cli.locale.as_deref())?;
    let today = chrono::Local::now().date_naive();
    let weather_range = cli.weather_range(today)?;
    let locator = StoreLocator::from_config(&config, weather_range)
        .context("failed to set up the store locator")?;

    let mut report = RunReport::default();
    for company in &cli.companies {
        match locator.locate(&company.name, &company.homepage).await {
            Ok(found) => report.companies.push(found),
            Err(err) => {
                locator_warn!("skipping {}: {err}", company.name);
                report.failed.push(FailedCompany {
                    name: company.name.clone(),
                    homepage: company.homepage.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    locator_info!(
        "located {} of {} companies",
        report.companies.len(),
        cli.companies.len()
    );

    match cli.output.as_deref() {
        Some(dir) => {
            let paths = write_reports(&report, dir)
                .with_context(|| format!("failed to write reports to {}", dir.display()))?;
            locator_info!(
                "reports written to {} and {}",
                paths.text.display(),
                paths.json.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(render_text(&report).as_bytes())
                .context("failed to write report to stdout")?;
        }
    }
    Ok(report)
}
