use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use locator_core::{
    ConfigError, DateRange, FailureKind, FetchError, Location, Observation, Station,
};
use serde::Deserialize;
use url::Url;

use crate::http::{parse_base_url, HttpClient};

const API_KEY_HEADER: &str = "X-RapidAPI-Key";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Longest period the hourly endpoint serves per request.
pub const MAX_HOURLY_DAYS: u32 = 30;

#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    /// Closest station to `location`.
    async fn nearby_station(&self, location: Location) -> Result<Station, FetchError>;

    /// Hourly observations of `station_id` over `range`, ordered by time. An
    /// empty list means the station reported nothing in that period.
    ///
    /// One call is one retry unit; callers retrying a long period should ask
    /// for it in windows of at most [`MAX_HOURLY_DAYS`].
    async fn hourly_observations(
        &self,
        station_id: &str,
        range: DateRange,
    ) -> Result<Vec<Observation>, FetchError>;
}

/// Meteostat JSON API, as published on RapidAPI.
#[derive(Debug, Clone)]
pub struct MeteostatClient {
    http: HttpClient,
    base_url: Url,
    api_key: String,
}

impl MeteostatClient {
    pub fn new(http: HttpClient, base_url: &str, api_key: &str) -> Result<Self, ConfigError> {
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey("meteostat"));
        }
        Ok(Self {
            http,
            base_url: parse_base_url("meteostat", base_url)?,
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        self.http
            .get_json(url, &[(API_KEY_HEADER, self.api_key.as_str())])
            .await
    }
}

#[async_trait::async_trait]
impl WeatherSource for MeteostatClient {
    async fn nearby_station(&self, location: Location) -> Result<Station, FetchError> {
        if !location.latitude.is_finite() || !location.longitude.is_finite() {
            return Err(FetchError::new(FailureKind::InvalidInput, "non-finite coordinates"));
        }
        let lat = location.latitude.to_string();
        let lon = location.longitude.to_string();
        let url = self.endpoint(
            "stations/nearby",
            &[("lat", lat.as_str()), ("lon", lon.as_str())],
        )?;
        let body: NearbyResponse = self.get(url).await?;
        parse_nearby(body)
    }

    async fn hourly_observations(
        &self,
        station_id: &str,
        range: DateRange,
    ) -> Result<Vec<Observation>, FetchError> {
        if station_id.is_empty() {
            return Err(FetchError::new(FailureKind::InvalidInput, "empty station id"));
        }
        let mut observations = Vec::new();
        for window in range.split(MAX_HOURLY_DAYS) {
            let start = window.start().format(DATE_FORMAT).to_string();
            let end = window.end().format(DATE_FORMAT).to_string();
            let url = self.endpoint(
                "stations/hourly",
                &[("station", station_id), ("start", start.as_str()), ("end", end.as_str())],
            )?;
            let body: HourlyResponse = self.get(url).await?;
            observations.extend(parse_hourly(body)?);
        }
        Ok(observations)
    }
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    data: Option<Vec<NearbyEntry>>,
}

#[derive(Debug, Deserialize)]
struct NearbyEntry {
    id: Option<String>,
    name: Option<BTreeMap<String, Option<String>>>,
}

fn parse_nearby(body: NearbyResponse) -> Result<Station, FetchError> {
    let entry = body
        .data
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::new(FailureKind::NotFound, "no station nearby"))?;
    let id = entry
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FetchError::new(FailureKind::MissingField("id".into()), ""))?;
    let name = entry
        .name
        .and_then(|mut names| names.remove("en"))
        .flatten()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| FetchError::new(FailureKind::MissingField("name.en".into()), ""))?;
    Ok(Station::new(id, name))
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    data: Option<Vec<HourlyRow>>,
}

#[derive(Debug, Deserialize)]
struct HourlyRow {
    time: Option<String>,
    temp: Option<f64>,
    dwpt: Option<f64>,
    rhum: Option<f64>,
    prcp: Option<f64>,
    snow: Option<f64>,
    wdir: Option<f64>,
    wspd: Option<f64>,
    wpgt: Option<f64>,
    pres: Option<f64>,
    tsun: Option<f64>,
}

/// Rows without a timestamp are skipped; a timestamp that does not parse
/// makes the whole body malformed.
fn parse_hourly(body: HourlyResponse) -> Result<Vec<Observation>, FetchError> {
    let rows = body.data.unwrap_or_default();
    let mut observations = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(raw_time) = row.time else {
            continue;
        };
        let time = NaiveDateTime::parse_from_str(&raw_time, TIME_FORMAT).map_err(|err| {
            FetchError::new(
                FailureKind::MalformedResponse,
                format!("bad observation time '{raw_time}': {err}"),
            )
        })?;
        observations.push(Observation {
            time,
            temperature: row.temp,
            dew_point: row.dwpt,
            humidity: row.rhum,
            precipitation: row.prcp,
            snow: row.snow,
            wind_direction: row.wdir,
            wind_speed: row.wspd,
            wind_peak_gust: row.wpgt,
            pressure: row.pres,
            sunshine_minutes: row.tsun,
        });
    }
    observations.sort_by_key(|o| o.time);
    Ok(observations)
}
