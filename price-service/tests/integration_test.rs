use chrono::{DateTime, Duration, TimeZone, Utc};
use common::http_client::{DEFAULT_ACCEPT_LANGUAGE, DEFAULT_USER_AGENT, HttpClient};
use price_service::cache::MemoryPriceCache;
use price_service::clock::Clock;
use price_service::handlers::AppState;
use price_service::listing::ListingDirectory;
use price_service::service::PriceService;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const TWELVE_HOURS: u64 = 12 * 60 * 60;

struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    fn starting_at(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

struct TestApp {
    address: String,
    clock: Arc<ManualClock>,
    client: reqwest::Client,
}

impl TestApp {
    async fn get_price(&self, listing: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/api/airbnb-price?listing={}", self.address, listing))
            .send()
            .await
            .expect("Failed to send request")
    }
}

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()
}

async fn spawn_app(listing_base_url: &str) -> TestApp {
    let clock = Arc::new(ManualClock::starting_at(start_time()));
    let http_client = HttpClient::new(DEFAULT_USER_AGENT, DEFAULT_ACCEPT_LANGUAGE, None, 0)
        .expect("Failed to build HTTP client");
    let service = PriceService::new(
        http_client,
        Arc::new(MemoryPriceCache::with_ttl(TWELVE_HOURS)),
        clock.clone(),
        ListingDirectory::with_base_url(listing_base_url),
        TWELVE_HOURS,
    );
    let app = price_service::router(AppState {
        service: Arc::new(service),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        clock,
        client: reqwest::Client::new(),
    }
}

fn listing_page() -> String {
    format!(
        "<html>\n<body>\n  <div class=\"price\">\n    <span>Gecelik ₺1.500</span>\n  </div>\n  <p>{}</p>\n  <div>Hafta sonu: ₺1.800</div>\n</body>\n</html>",
        "Lorem ipsum dolor sit amet ".repeat(8)
    )
}

/// Test that a fetched page is priced, served with an edge cache directive and cached
#[tokio::test]
async fn test_serves_extracted_prices_and_caches_them() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/okanhomes2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = spawn_app(&mock_server.uri()).await;

    let response = app.get_price("okanhomes2").await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["cache-control"],
        "public, max-age=0, s-maxage=43200"
    );
    let first: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        first,
        json!({
            "listing": "okanhomes2",
            "currency": "TRY",
            "basePrice": 1500.0,
            "weekendPrice": 1800.0,
            "lastUpdated": "2026-10-19T08:00:00.000Z",
            "source": "airbnb"
        })
    );

    app.clock.advance(Duration::hours(1));

    let response = app.get_price("okanhomes2").await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["cache-control"],
        "public, max-age=0, s-maxage=43200"
    );
    let second: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(first, second);
}

/// Test that unknown or missing listing ids are rejected before any fetch
#[tokio::test]
async fn test_rejects_invalid_listing_without_fetching() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = spawn_app(&mock_server.uri()).await;

    for listing in ["okanhomes9", "", "../okanhomes2"] {
        let response = app.get_price(listing).await;
        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(
            body,
            json!({ "error": "Invalid listing. Use listing=okanhomes2|okanhomes3" })
        );
    }

    let response = app
        .client
        .get(format!("{}/api/airbnb-price", app.address))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status().as_u16(), 400);
}

/// Test that a repeated listing key gets the JSON invalid-listing response
#[tokio::test]
async fn test_rejects_repeated_listing_parameter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = spawn_app(&mock_server.uri()).await;

    let response = app
        .client
        .get(format!(
            "{}/api/airbnb-price?listing=okanhomes2&listing=okanhomes3",
            app.address
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        body,
        json!({ "error": "Invalid listing. Use listing=okanhomes2|okanhomes3" })
    );
}

/// Test that a non-success upstream status surfaces as 502 and is never cached
#[tokio::test]
async fn test_upstream_failure_returns_bad_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/okanhomes3"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let app = spawn_app(&mock_server.uri()).await;

    for _ in 0..2 {
        let response = app.get_price("okanhomes3").await;
        assert_eq!(response.status().as_u16(), 502);
        assert!(response.headers().get("cache-control").is_none());
        let body: Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(
            body,
            json!({ "error": "Failed to fetch Airbnb page", "status": 503 })
        );
    }
}

/// Test that a page without prices yields the degraded response and is refetched
#[tokio::test]
async fn test_missing_price_is_degraded_and_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/okanhomes2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><h1>Cozy flat</h1><p>Book now</p></body></html>"),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let app = spawn_app(&mock_server.uri()).await;

    for _ in 0..2 {
        let response = app.get_price("okanhomes2").await;
        assert_eq!(response.status().as_u16(), 200);
        assert!(response.headers().get("cache-control").is_none());
        let body: Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(
            body,
            json!({
                "listing": "okanhomes2",
                "currency": "TRY",
                "basePrice": null,
                "weekendPrice": null,
                "note": "Price not detected. Airbnb layout may have changed."
            })
        );
    }
}

/// Test the cache TTL boundary: just inside is a hit, one millisecond past refetches
#[tokio::test]
async fn test_cache_expires_after_twelve_hours() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/okanhomes2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let app = spawn_app(&mock_server.uri()).await;

    let first: Value = app.get_price("okanhomes2").await.json().await.unwrap();

    app.clock
        .advance(Duration::hours(12) - Duration::milliseconds(1));
    let cached: Value = app.get_price("okanhomes2").await.json().await.unwrap();
    assert_eq!(cached, first);

    app.clock.advance(Duration::milliseconds(2));
    let refreshed: Value = app.get_price("okanhomes2").await.json().await.unwrap();
    assert_eq!(refreshed["basePrice"], 1500.0);
    assert_eq!(refreshed["lastUpdated"], "2026-10-19T20:00:00.001Z");
}

/// Test that transport failures become a 500 with the error detail
#[tokio::test]
async fn test_network_failure_returns_server_error() {
    let app = spawn_app("http://127.0.0.1:1").await;

    let response = app.get_price("okanhomes2").await;
    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Server error");
    assert!(
        body["detail"]
            .as_str()
            .is_some_and(|detail| detail.starts_with("Network error"))
    );
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app("http://127.0.0.1:1").await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({ "status": "ok", "service": "price-service" }));
}
