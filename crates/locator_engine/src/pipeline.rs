use std::sync::Arc;

use locator_core::{
    rank_links, Company, DateRange, FailureKind, FetchError, FetchOutcome, LocaleProfile,
    LocatorConfig, Station, Store,
};
use locator_logging::{locator_debug, locator_info, locator_warn};
use serde::Serialize;

use crate::batch::{enrich_concurrent, BatchReport, FailurePolicy};
use crate::error::PipelineError;
use crate::geocode::{Geocoder, ZipcodebaseClient};
use crate::http::{FetchSettings, HttpClient, Page, PageSource};
use crate::meteostat::{MeteostatClient, WeatherSource, MAX_HOURLY_DAYS};
use crate::page::AnchorSnapshotter;
use crate::postal::extract_postal_codes;
use crate::retry::Retrier;

#[derive(Debug, Clone)]
pub struct LocatorSettings {
    pub profile: LocaleProfile,
    pub retrier: Retrier,
    pub concurrency: usize,
    /// Observation period; `None` skips the weather stages.
    pub weather_range: Option<DateRange>,
}

impl LocatorSettings {
    pub fn from_config(
        config: &LocatorConfig,
        weather_range: Option<DateRange>,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            profile: config.locale_profile()?,
            retrier: Retrier::new(config.retry_policy()?)?,
            concurrency: config.concurrency()?,
            weather_range,
        })
    }
}

/// Enriched / skipped counts of one batch stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StageCounts {
    pub enriched: usize,
    pub skipped: usize,
}

impl<R> From<&BatchReport<R>> for StageCounts {
    fn from(report: &BatchReport<R>) -> Self {
        Self {
            enriched: report.enriched,
            skipped: report.skipped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    pub candidate_links: usize,
    pub postal_codes: usize,
    pub geocoding: StageCounts,
    pub stations: StageCounts,
    pub observations: StageCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyReport {
    pub company: Company,
    pub stations: Vec<Station>,
    pub summary: RunSummary,
}

#[derive(Debug, Clone)]
struct StationAssignment {
    store: Store,
    station: Option<Station>,
}

/// Finds a company's stores starting from its homepage.
pub struct StoreLocator {
    pages: Arc<dyn PageSource>,
    geocoder: Arc<dyn Geocoder>,
    weather: Option<Arc<dyn WeatherSource>>,
    snapshotter: AnchorSnapshotter,
    settings: LocatorSettings,
}

impl StoreLocator {
    pub fn new(
        pages: Arc<dyn PageSource>,
        geocoder: Arc<dyn Geocoder>,
        weather: Option<Arc<dyn WeatherSource>>,
        settings: LocatorSettings,
    ) -> Self {
        Self {
            pages,
            geocoder,
            weather,
            snapshotter: AnchorSnapshotter::new(),
            settings,
        }
    }

    /// Wires the reqwest-backed clients. The Meteostat key is only required
    /// when a weather range is requested.
    pub fn from_config(
        config: &LocatorConfig,
        weather_range: Option<DateRange>,
    ) -> Result<Self, PipelineError> {
        let settings = LocatorSettings::from_config(config, weather_range)?;
        let http =
            HttpClient::new(FetchSettings::from(&config.http)).map_err(PipelineError::Client)?;
        let geocoder = ZipcodebaseClient::new(
            http.clone(),
            &config.zipcode_base_url,
            &config.zipcode_api_key,
        )?;
        let weather: Option<Arc<dyn WeatherSource>> = match weather_range {
            Some(_) => Some(Arc::new(MeteostatClient::new(
                http.clone(),
                &config.meteostat_base_url,
                &config.meteostat_api_key,
            )?)),
            None => None,
        };
        Ok(Self::new(Arc::new(http), Arc::new(geocoder), weather, settings))
    }

    pub async fn locate(
        &self,
        name: &str,
        homepage: &str,
    ) -> Result<CompanyReport, PipelineError> {
        locator_info!("locating stores of {name} from {homepage}");
        let mut company = Company::new(name, homepage);
        let mut summary = RunSummary::default();

        let home = self.load_page(homepage).await?;
        let candidates = self.snapshotter.snapshot(&home.html, Some(&home.final_url));
        let links = rank_links(&candidates, &self.settings.profile.lexicon);
        summary.candidate_links = links.len();
        let Some(store_link) = links.into_iter().next() else {
            return Err(PipelineError::NoStoreLink {
                url: home.final_url,
            });
        };
        locator_debug!(
            "{} anchors on {}, store page {}",
            candidates.len(),
            home.final_url,
            store_link
        );

        let store_page = self.load_page(&store_link).await?;
        company.store_page = Some(store_link);
        let codes = extract_postal_codes(&self.settings.profile.postal_pattern, &store_page.html);
        summary.postal_codes = codes.len();
        if codes.is_empty() {
            return Err(PipelineError::NoStores {
                url: store_page.final_url,
            });
        }

        let stores: Vec<Store> = codes.into_iter().map(Store::new).collect();
        let geocoded = self.geocode(stores).await;
        summary.geocoding = StageCounts::from(&geocoded);
        company.stores = geocoded.records;
        if company.stores.is_empty() {
            locator_warn!("{name}: none of {} postal code(s) could be geocoded", summary.postal_codes);
        }

        let mut stations = Vec::new();
        let weather = self.weather.as_deref();
        if let (Some(weather), Some(range)) = (weather, self.settings.weather_range) {
            let stores = std::mem::take(&mut company.stores);
            let (assigned, found) = self.assign_stations(weather, stores).await;
            summary.stations = StageCounts::from(&assigned);
            company.stores = assigned.records;

            let observed = self.observe(weather, found, range).await;
            summary.observations = StageCounts::from(&observed);
            stations = observed.records;
        }

        locator_info!(
            "{name}: {} store(s), {} station(s)",
            company.stores.len(),
            stations.len()
        );
        Ok(CompanyReport {
            company,
            stations,
            summary,
        })
    }

    async fn load_page(&self, url: &str) -> Result<Page, PipelineError> {
        let pages = self.pages.as_ref();
        match self.settings.retrier.run(url, || pages.fetch_page(url)).await {
            FetchOutcome::Success(page) => Ok(page),
            FetchOutcome::Failure { reason, attempts } => Err(PipelineError::PageUnavailable {
                url: url.to_string(),
                reason,
                attempts,
            }),
        }
    }

    async fn geocode(&self, stores: Vec<Store>) -> BatchReport<Store> {
        let geocoder = self.geocoder.as_ref();
        let retrier = self.settings.retrier;
        enrich_concurrent(
            "geocoding",
            stores,
            FailurePolicy::Drop,
            self.settings.concurrency,
            |store: Store| async move {
                let label = format!("geocode {}", store.postal_code);
                retrier
                    .run(&label, || geocoder.locate(&store.postal_code))
                    .await
                    .map(|place| place.apply_to(store.clone()))
            },
        )
        .await
    }

    /// Station lookup per store. Stores without a station stay in the output;
    /// the returned stations are unique by id, in first-seen order.
    async fn assign_stations(
        &self,
        weather: &dyn WeatherSource,
        stores: Vec<Store>,
    ) -> (BatchReport<Store>, Vec<Station>) {
        let retrier = self.settings.retrier;
        let pending: Vec<StationAssignment> = stores
            .into_iter()
            .map(|store| StationAssignment {
                store,
                station: None,
            })
            .collect();

        let report = enrich_concurrent(
            "station lookup",
            pending,
            FailurePolicy::Retain,
            self.settings.concurrency,
            |assignment: StationAssignment| async move {
                let Some(location) = assignment.store.location else {
                    return FetchOutcome::Failure {
                        reason: FetchError::new(
                            FailureKind::InvalidInput,
                            "store has no coordinates",
                        ),
                        attempts: 0,
                    };
                };
                let label = format!("nearby station {}", assignment.store.postal_code);
                retrier
                    .run(&label, || weather.nearby_station(location))
                    .await
                    .map(|station| {
                        let mut store = assignment.store.clone();
                        store.station_id = Some(station.id.clone());
                        StationAssignment {
                            store,
                            station: Some(station),
                        }
                    })
            },
        )
        .await;

        let mut stations: Vec<Station> = Vec::new();
        let mut stores = Vec::with_capacity(report.records.len());
        for assignment in report.records {
            if let Some(station) = assignment.station {
                if !stations.contains(&station) {
                    stations.push(station);
                }
            }
            stores.push(assignment.store);
        }
        let report = BatchReport {
            records: stores,
            enriched: report.enriched,
            skipped: report.skipped,
            failures: report.failures,
        };
        (report, stations)
    }

    /// Observations are fetched per [`MAX_HOURLY_DAYS`] window, each window
    /// with its own retry budget. No rows over the whole range is `NotFound`.
    async fn observe(
        &self,
        weather: &dyn WeatherSource,
        stations: Vec<Station>,
        range: DateRange,
    ) -> BatchReport<Station> {
        let retrier = self.settings.retrier;
        enrich_concurrent(
            "observations",
            stations,
            FailurePolicy::Retain,
            self.settings.concurrency,
            |station: Station| async move {
                let windows = range.split(MAX_HOURLY_DAYS);
                let mut observations = Vec::new();
                for window in &windows {
                    let label = format!(
                        "observations {} {}..{}",
                        station.id,
                        window.start(),
                        window.end()
                    );
                    let window = *window;
                    match retrier
                        .run(&label, || weather.hourly_observations(&station.id, window))
                        .await
                    {
                        FetchOutcome::Success(rows) => observations.extend(rows),
                        FetchOutcome::Failure { reason, attempts } => {
                            return FetchOutcome::Failure { reason, attempts };
                        }
                    }
                }
                if observations.is_empty() {
                    return FetchOutcome::Failure {
                        reason: FetchError::new(
                            FailureKind::NotFound,
                            format!("no observations for station {}", station.id),
                        ),
                        attempts: windows.len() as u32,
                    };
                }
                observations.sort_by_key(|o| o.time);
                FetchOutcome::Success(Station {
                    observations,
                    ..station
                })
            },
        )
        .await
    }
}
