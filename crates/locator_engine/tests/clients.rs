use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use locator_core::{ConfigError, DateRange, FailureKind, Location, RetryPolicy};
use locator_engine::{
    FetchSettings, Geocoder, HttpClient, MeteostatClient, PageSource, Retrier, WeatherSource,
    ZipcodebaseClient,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http() -> HttpClient {
    HttpClient::new(FetchSettings::default()).expect("client builds")
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn page_is_fetched_and_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><a href=\"/lojas\">Lojas</a></html>",
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;

    let url = format!("{}/", server.uri());
    let page = http().fetch_page(&url).await.expect("page loads");

    assert_eq!(page.final_url, url);
    assert!(page.html.contains("Lojas"));
}

#[tokio::test]
async fn latin1_page_is_decoded_from_header_charset() {
    let server = MockServer::start().await;
    let body: Vec<u8> = b"<p>Localiza\xe7\xe3o</p>".to_vec();
    Mock::given(method("GET"))
        .and(path("/latin"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=ISO-8859-1"))
        .mount(&server)
        .await;

    let page = http()
        .fetch_page(&format!("{}/latin", server.uri()))
        .await
        .expect("page loads");

    assert!(page.html.contains("Localização"));
}

#[tokio::test]
async fn server_errors_are_transient_status_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = http()
        .fetch_page(&format!("{}/busy", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert!(err.is_transient());
}

#[tokio::test]
async fn non_html_pages_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 16], "application/pdf"))
        .mount(&server)
        .await;

    let err = http()
        .fetch_page(&format!("{}/catalogue.pdf", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::MalformedResponse);
    assert!(!err.is_transient());
}

#[tokio::test]
async fn invalid_page_url_is_reported() {
    let err = http().fetch_page("not a url").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn non_http_links_fail_once_without_retry() {
    let client = http();
    let retrier = Retrier::new(RetryPolicy::new(3, Duration::from_millis(10)).unwrap()).unwrap();

    for link in ["mailto:contact@acme.pt", "javascript:void(0)", "tel:+351253000000"] {
        let calls = AtomicU32::new(0);
        let outcome = retrier
            .run(link, || {
                calls.fetch_add(1, Ordering::SeqCst);
                client.fetch_page(link)
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1, "{link}");
        assert_eq!(outcome.attempts(), Some(1), "{link}");
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl, "{link}");
        assert!(!err.is_transient());
    }
}

#[tokio::test]
async fn zipcodebase_search_fills_place() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .and(query_param("apikey", "zip-key"))
        .and(query_param("codes", "4700-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "codes": ["4700-123"], "country": null },
            "results": { "4700-123": [{
                "postal_code": "4700-123",
                "country_code": "PT",
                "latitude": "41.55030000",
                "longitude": "-8.42650000",
                "city": "Braga",
                "state": "Braga",
                "province": "Braga"
            }]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ZipcodebaseClient::new(http(), &server.uri(), "zip-key").unwrap();
    let place = client.locate("4700-123").await.expect("geocoded");

    assert_eq!(place.location, Some(Location::new(41.5503, -8.4265)));
    assert_eq!(place.city.as_deref(), Some("Braga"));
    assert_eq!(place.country.as_deref(), Some("PT"));
}

#[tokio::test]
async fn zipcodebase_unknown_code_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "codes": ["9999-999"] },
            "results": []
        })))
        .mount(&server)
        .await;

    let client = ZipcodebaseClient::new(http(), &server.uri(), "zip-key").unwrap();
    let err = client.locate("9999-999").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::NotFound);
}

#[test]
fn clients_require_api_keys() {
    let zip = ZipcodebaseClient::new(http(), "https://app.zipcodebase.com", "");
    let meteo = MeteostatClient::new(http(), "https://meteostat.p.rapidapi.com", "");

    assert_eq!(zip.unwrap_err(), ConfigError::MissingApiKey("zipcodebase"));
    assert_eq!(meteo.unwrap_err(), ConfigError::MissingApiKey("meteostat"));
}

#[test]
fn unparsable_base_url_is_a_config_error() {
    let err = ZipcodebaseClient::new(http(), "::nope::", "zip-key").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidBaseUrl {
            service: "zipcodebase",
            ..
        }
    ));
}

#[tokio::test]
async fn nearby_station_sends_api_key_and_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stations/nearby"))
        .and(header("X-RapidAPI-Key", "meteo-key"))
        .and(query_param("lat", "41.5503"))
        .and(query_param("lon", "-8.4265"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "generated": "2024-02-01 10:00:00" },
            "data": [
                { "id": "08546", "name": { "en": "Braga / Merelim" }, "distance": 4200.5 },
                { "id": "08545", "name": { "en": "Porto" }, "distance": 41000.0 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MeteostatClient::new(http(), &server.uri(), "meteo-key").unwrap();
    let station = client
        .nearby_station(Location::new(41.5503, -8.4265))
        .await
        .expect("station found");

    assert_eq!(station.id, "08546");
    assert_eq!(station.name, "Braga / Merelim");
    assert!(station.observations.is_empty());
}

#[tokio::test]
async fn hourly_observations_are_requested_in_windows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stations/hourly"))
        .and(query_param("station", "08546"))
        .and(query_param("start", "2024-01-31"))
        .and(query_param("end", "2024-02-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "time": "2024-02-15 23:00:00", "temp": 9.1, "rhum": 88.0, "tsun": null }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stations/hourly"))
        .and(query_param("station", "08546"))
        .and(query_param("start", "2024-01-01"))
        .and(query_param("end", "2024-01-30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "time": "2024-01-01 01:00:00", "temp": 11.5, "prcp": 0.2 },
                { "time": null, "temp": 0.0 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MeteostatClient::new(http(), &server.uri(), "meteo-key").unwrap();
    let range = DateRange::new(day(2024, 1, 1), day(2024, 2, 15)).unwrap();
    let observations = client
        .hourly_observations("08546", range)
        .await
        .expect("observations");

    assert_eq!(observations.len(), 2);
    assert_eq!(observations[0].temperature, Some(11.5));
    assert_eq!(observations[0].precipitation, Some(0.2));
    assert_eq!(observations[1].humidity, Some(88.0));
    assert_eq!(observations[1].sunshine_minutes, None);
    assert!(observations[0].time < observations[1].time);
}

#[tokio::test]
async fn station_without_observations_yields_no_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stations/hourly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let client = MeteostatClient::new(http(), &server.uri(), "meteo-key").unwrap();
    let range = DateRange::new(day(2024, 3, 1), day(2024, 3, 2)).unwrap();
    let observations = client.hourly_observations("08546", range).await.unwrap();

    assert!(observations.is_empty());
}
