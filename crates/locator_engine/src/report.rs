use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use locator_core::{Company, Station, Store};
use serde::Serialize;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::pipeline::CompanyReport;

pub const TEXT_REPORT: &str = "report.txt";
pub const JSON_REPORT: &str = "report.json";
const SEPARATOR: &str = "-------------------------------------";

#[derive(Debug, Clone, Serialize)]
pub struct FailedCompany {
    pub name: String,
    pub homepage: String,
    pub reason: String,
}

/// Everything one run produced, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub companies: Vec<CompanyReport>,
    pub failed: Vec<FailedCompany>,
}

impl RunReport {
    /// Stations of all companies, unique by id, in first-seen order.
    pub fn stations(&self) -> Vec<&Station> {
        let mut unique: Vec<&Station> = Vec::new();
        for station in self.companies.iter().flat_map(|c| c.stations.iter()) {
            if !unique.iter().any(|seen| seen.id == station.id) {
                unique.push(station);
            }
        }
        unique
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub text: PathBuf,
    pub json: PathBuf,
}

pub fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total number of companies: {}\n", report.companies.len());
    for entry in &report.companies {
        write_company(&mut out, &entry.company);
        let _ = writeln!(out, "{SEPARATOR}");
    }
    for failed in &report.failed {
        let _ = writeln!(out, "Failed: {} ({}): {}", failed.name, failed.homepage, failed.reason);
    }
    if !report.failed.is_empty() {
        let _ = writeln!(out, "{SEPARATOR}");
    }

    let stations = report.stations();
    let _ = writeln!(out, "\nTotal number of stations: {}\n", stations.len());
    for station in stations {
        write_station(&mut out, station);
        let _ = writeln!(out, "{SEPARATOR}");
    }
    out
}

pub fn render_json(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Writes [`TEXT_REPORT`] and [`JSON_REPORT`] into `dir`.
pub fn write_reports(report: &RunReport, dir: &Path) -> Result<ReportPaths, ReportError> {
    let json = render_json(report)?;
    let writer = AtomicFileWriter::create(dir)?;
    let text = writer.write(TEXT_REPORT, &render_text(report))?;
    let json = writer.write(JSON_REPORT, &json)?;
    Ok(ReportPaths { text, json })
}

fn write_company(out: &mut String, company: &Company) {
    let _ = writeln!(out, "Company name: {}", company.name);
    let _ = writeln!(out, "Company web link: {}", company.homepage);
    let _ = writeln!(
        out,
        "Stores information link: {}",
        company.store_page.as_deref().unwrap_or("")
    );
    let _ = writeln!(out, "Total number of stores: {}\n", company.stores.len());
    for store in &company.stores {
        write_store(out, store);
        out.push('\n');
    }
}

fn write_store(out: &mut String, store: &Store) {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    let _ = writeln!(out, "Postal Code: {}", store.postal_code);
    match store.location {
        Some(location) => {
            let _ = writeln!(out, "Latitude: {}", location.latitude);
            let _ = writeln!(out, "Longitude: {}", location.longitude);
        }
        None => {
            let _ = writeln!(out, "Latitude: \nLongitude: ");
        }
    }
    let _ = writeln!(out, "City: {}", field(&store.city));
    let _ = writeln!(out, "Country: {}", field(&store.country));
    let _ = writeln!(out, "State: {}", field(&store.state));
    let _ = writeln!(out, "Province: {}", field(&store.province));
    let _ = writeln!(out, "Meteorologic Station Id: {}", field(&store.station_id));
}

fn write_station(out: &mut String, station: &Station) {
    let _ = writeln!(out, "Station Id: {}", station.id);
    let _ = writeln!(out, "Station name: {}", station.name);
    let _ = writeln!(out, "Hourly observations: {}", station.observations.len());
    if let (Some(first), Some(last)) = (station.observations.first(), station.observations.last()) {
        let _ = writeln!(out, "Period: {} to {}", first.time, last.time);
    }
}
