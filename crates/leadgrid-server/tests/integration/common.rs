use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use httptest::Server;

use leadgrid_core::ScraperConfig;
use leadgrid_server::routes;
use leadgrid_server::state::AppState;

pub const TEST_API_KEY: &str = "test-places-key";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

/// Build the app against a stubbed places API, with all pacing and backoff
/// delays set to zero. `overrides` replace or extend the base environment.
pub fn setup_test_app(upstream: &Server, overrides: &[(&str, &str)]) -> TestApp {
    let base_url = upstream.url_str("/");
    let mut env: HashMap<String, String> = [
        ("GOOGLE_API_KEY", TEST_API_KEY),
        ("PLACES_API_BASE_URL", base_url.as_str()),
        ("MAX_RETRIES", "2"),
        ("INITIAL_BACKOFF", "0"),
        ("MIN_DELAY", "0"),
        ("MAX_DELAY", "0"),
        ("PAGE_TOKEN_MIN_DELAY", "0"),
        ("PAGE_TOKEN_MAX_DELAY", "0"),
        ("REQUEST_TIMEOUT_SECS", "5"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        env.insert(k.to_string(), v.to_string());
    }

    let config = ScraperConfig::from_lookup(|key| env.get(key).cloned())
        .expect("Failed to build test config");
    let state = Arc::new(AppState::from_config(&config).expect("Failed to build app state"));

    TestApp {
        router: routes::router(Arc::clone(&state)),
        state,
    }
}

pub fn nearby_page(ids: &[&str]) -> serde_json::Value {
    let results: Vec<_> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "place_id": id,
                "name": format!("Clinic {id}"),
                "types": ["dentist", "health"],
                "vicinity": "New Delhi",
                "rating": 4.5,
                "user_ratings_total": 20,
                "photos": [{"photo_reference": format!("photo-{id}"), "width": 400, "height": 300}],
                "geometry": {"location": {"lat": 28.5, "lng": 77.2}}
            })
        })
        .collect();
    serde_json::json!({"status": "OK", "results": results})
}

pub fn geocode_hit(lat: f64, lng: f64) -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "results": [{"geometry": {"location": {"lat": lat, "lng": lng}}}]
    })
}
