use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One physical store, identified by the postal code found on the store page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Store {
    pub postal_code: String,
    pub location: Option<Location>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub province: Option<String>,
    pub station_id: Option<String>,
}

impl Store {
    pub fn new(postal_code: impl Into<String>) -> Self {
        Self {
            postal_code: postal_code.into(),
            ..Self::default()
        }
    }
}

/// Weather station. Two stations are the same station when their ids match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub observations: Vec<Observation>,
}

impl Station {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            observations: Vec::new(),
        }
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Station {}

/// Hourly observation; absent measurements stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub time: NaiveDateTime,
    pub temperature: Option<f64>,
    pub dew_point: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub snow: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_peak_gust: Option<f64>,
    pub pressure: Option<f64>,
    pub sunshine_minutes: Option<f64>,
}

impl Observation {
    pub fn empty(time: NaiveDateTime) -> Self {
        Self {
            time,
            temperature: None,
            dew_point: None,
            humidity: None,
            precipitation: None,
            snow: None,
            wind_direction: None,
            wind_speed: None,
            wind_peak_gust: None,
            pressure: None,
            sunshine_minutes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub homepage: String,
    pub store_page: Option<String>,
    pub stores: Vec<Store>,
}

impl Company {
    pub fn new(name: impl Into<String>, homepage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            homepage: homepage.into(),
            store_page: None,
            stores: Vec::new(),
        }
    }
}
