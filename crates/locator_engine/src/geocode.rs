use locator_core::{ConfigError, FailureKind, FetchError, Location, Store};
use serde_json::Value;
use url::Url;

use crate::http::{parse_base_url, HttpClient};

/// Location details the geocoder knows for one postal code.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Place {
    pub location: Option<Location>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub province: Option<String>,
}

impl Place {
    pub fn apply_to(self, mut store: Store) -> Store {
        store.location = self.location;
        store.city = self.city;
        store.country = self.country;
        store.state = self.state;
        store.province = self.province;
        store
    }
}

#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn locate(&self, postal_code: &str) -> Result<Place, FetchError>;
}

/// Zipcodebase postal code search.
#[derive(Debug, Clone)]
pub struct ZipcodebaseClient {
    http: HttpClient,
    base_url: Url,
    api_key: String,
}

impl ZipcodebaseClient {
    pub fn new(http: HttpClient, base_url: &str, api_key: &str) -> Result<Self, ConfigError> {
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey("zipcodebase"));
        }
        let base_url = parse_base_url("zipcodebase", base_url)?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    fn search_url(&self, postal_code: &str) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join("api/v1/search")
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.query_pairs_mut()
            .append_pair("apikey", &self.api_key)
            .append_pair("codes", postal_code);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl Geocoder for ZipcodebaseClient {
    async fn locate(&self, postal_code: &str) -> Result<Place, FetchError> {
        if postal_code.trim().is_empty() {
            return Err(FetchError::new(FailureKind::InvalidInput, "empty postal code"));
        }
        let url = self.search_url(postal_code)?;
        let body: Value = self.http.get_json(url, &[]).await?;
        parse_search_response(postal_code, &body)
    }
}

/// Maps a Zipcodebase `search` body to a [`Place`] for `postal_code`.
///
/// With no hits the service answers `"results": []` instead of an object, so
/// the body is walked as a dynamic value.
pub fn parse_search_response(postal_code: &str, body: &Value) -> Result<Place, FetchError> {
    let query_empty = match body.get("query") {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    };
    if query_empty {
        return Err(FetchError::new(
            FailureKind::MalformedResponse,
            "response has no query section",
        ));
    }

    let hit = body
        .get("results")
        .and_then(|results| results.get(postal_code))
        .and_then(Value::as_array)
        .and_then(|hits| hits.first())
        .ok_or_else(|| FetchError::new(FailureKind::NotFound, format!("no result for {postal_code}")))?;

    let location = match (number_field(hit, "latitude"), number_field(hit, "longitude")) {
        (Some(latitude), Some(longitude)) => Some(Location::new(latitude, longitude)),
        _ => None,
    };

    Ok(Place {
        location,
        city: text_field(hit, "city"),
        country: text_field(hit, "country_code"),
        state: text_field(hit, "state"),
        province: text_field(hit, "province"),
    })
}

fn number_field(hit: &Value, name: &str) -> Option<f64> {
    match hit.get(name)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_field(hit: &Value, name: &str) -> Option<String> {
    hit.get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
