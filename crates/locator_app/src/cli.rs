use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::Parser;
use locator_core::{ConfigError, DateRange};
use locator_logging::LogDestination;

/// Finds the physical stores of companies from their homepages
///
/// Each company's homepage is searched for its store-locator page, postal
/// codes are read from that page and geocoded. With --weather, the nearest
/// weather station of every store and its hourly observations are added.
///
/// Examples:
///   store-locator "Acme=https://acme.pt"
///   store-locator --weather --output out/ "Acme=https://acme.pt" "Globex=https://globex.pt"
#[derive(Parser, Debug)]
#[command(name = "store-locator")]
#[command(version)]
#[command(about, long_about = None)]
pub struct Cli {
    /// Companies as NAME=HOMEPAGE
    #[arg(value_name = "COMPANY=HOMEPAGE", required = true)]
    pub companies: Vec<CompanyArg>,

    /// RON configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Locale whose keywords and postal code pattern are used, e.g. pt or en
    #[arg(long)]
    pub locale: Option<String>,

    /// Look up weather stations and hourly observations
    #[arg(long)]
    pub weather: bool,

    /// First observation day (YYYY-MM-DD), defaults to the first day of yesterday's month
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last observation day (YYYY-MM-DD), defaults to yesterday
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Directory receiving report.txt and report.json; stdout when absent
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Log destination: terminal, file or both
    #[arg(long, default_value = "terminal")]
    pub log: LogDestination,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Observation period relative to `today`, or `None` without --weather.
    pub fn weather_range(&self, today: NaiveDate) -> Result<Option<DateRange>, ConfigError> {
        if !self.weather {
            return Ok(None);
        }
        let default = DateRange::month_to_yesterday(today);
        let range = DateRange::new(
            self.start.unwrap_or(default.start()),
            self.end.unwrap_or(default.end()),
        )?;
        Ok(Some(range))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyArg {
    pub name: String,
    pub homepage: String,
}

impl FromStr for CompanyArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, homepage) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=HOMEPAGE, got '{s}'"))?;
        let name = name.trim();
        let homepage = homepage.trim();
        if name.is_empty() || homepage.is_empty() {
            return Err(format!("company name and homepage must not be empty in '{s}'"));
        }
        Ok(Self {
            name: name.to_string(),
            homepage: homepage.to_string(),
        })
    }
}
