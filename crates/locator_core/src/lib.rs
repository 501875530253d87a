//! Store locator core: keyword matching, link ranking, domain records and
//! configuration. No IO happens here.
mod config;
mod error;
mod lexicon;
mod model;
mod outcome;
mod rank;

pub use config::{
    DateRange, HttpConfig, LocaleProfile, LocatorConfig, METEOSTAT_KEY_VAR, ZIPCODEBASE_KEY_VAR,
};
pub use error::ConfigError;
pub use lexicon::KeywordLexicon;
pub use model::{Company, Location, Observation, Station, Store};
pub use outcome::{FailureKind, FetchError, FetchOutcome, RetryPolicy};
pub use rank::{rank_candidates, rank_links, LinkCandidate, RankedLink};
