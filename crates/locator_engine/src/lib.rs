//! Store locator engine: HTTP collaborators, retrying fetches, batch
//! enrichment and the company pipeline.
mod batch;
mod decode;
mod error;
mod geocode;
mod http;
mod meteostat;
mod page;
mod persist;
mod pipeline;
mod postal;
mod report;
mod retry;

pub use batch::{enrich, enrich_concurrent, BatchReport, FailurePolicy, RecordFailure};
pub use decode::decode_html;
pub use error::PipelineError;
pub use geocode::{parse_search_response, Geocoder, Place, ZipcodebaseClient};
pub use http::{FetchSettings, HttpClient, Page, PageSource};
pub use meteostat::{MeteostatClient, WeatherSource, MAX_HOURLY_DAYS};
pub use page::{snapshot_anchors, AnchorSnapshotter};
pub use persist::{AtomicFileWriter, PersistError};
pub use pipeline::{CompanyReport, LocatorSettings, RunSummary, StageCounts, StoreLocator};
pub use postal::extract_postal_codes;
pub use report::{
    render_json, render_text, write_reports, FailedCompany, ReportError, ReportPaths, RunReport,
    JSON_REPORT, TEXT_REPORT,
};
pub use retry::{fetch_with_retry, Retrier};
