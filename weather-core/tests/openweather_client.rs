//! Integration tests for OpenWeatherClient using wiremock.

use serde_json::json;
use weather_core::provider::{GeoPoint, ProviderClient, ProviderError};
use weather_core::{OpenWeatherClient, ProviderConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server_uri: &str) -> OpenWeatherClient {
    OpenWeatherClient::new(ProviderConfig {
        api_key: "TEST_KEY".into(),
        geocoding_url: format!("{server_uri}/geo/1.0/zip?zip={{postal_code}},IN&appid={{api_key}}"),
        weather_url: format!("{server_uri}/data/2.5/weather"),
    })
}

#[tokio::test]
async fn test_geocode_single_object_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .and(query_param("zip", "110001,IN"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zip": "110001",
            "name": "New Delhi",
            "lat": 28.6139,
            "lon": 77.209,
            "country": "IN"
        })))
        .mount(&mock_server)
        .await;

    let points = client_for(&mock_server.uri()).geocode("110001").await.unwrap();

    assert_eq!(points, vec![GeoPoint { latitude: 28.6139, longitude: 77.209 }]);
}

#[tokio::test]
async fn test_geocode_array_response_keeps_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "lat": 1.0, "lon": 2.0 },
            { "lat": 3.0, "lon": 4.0 }
        ])))
        .mount(&mock_server)
        .await;

    let points = client_for(&mock_server.uri()).geocode("560001").await.unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[0], GeoPoint { latitude: 1.0, longitude: 2.0 });
}

#[tokio::test]
async fn test_geocode_empty_array() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let points = client_for(&mock_server.uri()).geocode("000000").await.unwrap();

    assert!(points.is_empty());
}

#[tokio::test]
async fn test_geocode_client_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "cod": "404", "message": "not found" })),
        )
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server.uri()).geocode("999999").await.unwrap_err();

    match err {
        ProviderError::Status { status, ref body } => {
            assert_eq!(status, 404);
            assert!(body.contains("not found"));
        }
        ref other => panic!("expected status error, got {other:?}"),
    }
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_geocode_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server.uri()).geocode("110001").await.unwrap_err();

    assert!(matches!(err, ProviderError::Decode(_)));
}

#[tokio::test]
async fn test_lookup_weather_passes_coordinates_and_units() {
    let mock_server = MockServer::start().await;
    let payload = json!({
        "cod": 200,
        "main": { "temp": 31.2, "humidity": 48 },
        "weather": [{ "description": "haze" }]
    });

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "28.5"))
        .and(query_param("lon", "77.25"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let raw = client_for(&mock_server.uri()).lookup_weather(28.5, 77.25).await.unwrap();

    assert_eq!(raw, payload);
}

#[tokio::test]
async fn test_lookup_weather_returns_reported_errors_untouched() {
    let mock_server = MockServer::start().await;
    let payload = json!({ "cod": "404", "message": "city not found" });

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .mount(&mock_server)
        .await;

    let raw = client_for(&mock_server.uri()).lookup_weather(0.0, 0.0).await.unwrap();

    assert_eq!(raw, payload);
}

#[tokio::test]
async fn test_lookup_weather_server_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server.uri()).lookup_weather(1.0, 2.0).await.unwrap_err();

    assert!(matches!(err, ProviderError::Status { status: 500, .. }));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_transport_failure() {
    // Nothing listens on the discard port.
    let client = client_for("http://127.0.0.1:9");

    let err = client.lookup_weather(1.0, 2.0).await.unwrap_err();

    assert!(matches!(err, ProviderError::Transport(_)));
}

#[tokio::test]
async fn test_geocode_postal_code_cannot_rewrite_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .and(query_param("zip", "110001&appid=INJECTED#,IN"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "lat": 1.0, "lon": 2.0 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    client_for(&mock_server.uri())
        .geocode("110001&appid=INJECTED#")
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let appids: Vec<String> = requests[0]
        .url
        .query_pairs()
        .filter(|(name, _)| name == "appid")
        .map(|(_, value)| value.into_owned())
        .collect();
    assert_eq!(appids, vec!["TEST_KEY".to_string()]);
}
