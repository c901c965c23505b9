use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use httptest::matchers::{all_of, contains, request, url_decoded};
use httptest::responders::{json_encoded, status_code};
use httptest::{Expectation, Server};
use tower::ServiceExt;

use crate::integration::common::{TEST_API_KEY, geocode_hit, nearby_page, setup_test_app};

fn scrape_request(body: serde_json::Value) -> Request<Body> {
    Request::post("/scrape")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_session_capacity() {
    let upstream = Server::run();
    let app = setup_test_app(&upstream, &[("MAX_CONCURRENT_SESSIONS", "7")]);

    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["active_sessions"], 0);
    assert_eq!(json["max_sessions"], 7);
}

#[tokio::test]
async fn scrape_areas_end_to_end() {
    let upstream = Server::run();
    upstream.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/geocode/json"),
            request::query(url_decoded(contains(("address", "dentist Saket Delhi")))),
            request::query(url_decoded(contains(("key", TEST_API_KEY)))),
        ])
        .respond_with(json_encoded(geocode_hit(28.52, 77.21))),
    );
    upstream.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/geocode/json"),
            request::query(url_decoded(contains(("address", "dentist Rohini Delhi")))),
        ])
        .respond_with(json_encoded(geocode_hit(28.74, 77.11))),
    );
    upstream.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/place/nearbysearch/json"),
            request::query(url_decoded(contains(("location", "28.52,77.21")))),
            request::query(url_decoded(contains(("keyword", "dentist")))),
        ])
        .respond_with(json_encoded(nearby_page(&["P1", "P123"]))),
    );
    upstream.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/place/nearbysearch/json"),
            request::query(url_decoded(contains(("location", "28.74,77.11")))),
        ])
        .respond_with(json_encoded(nearby_page(&["P123", "P2"]))),
    );
    upstream.expect(
        Expectation::matching(request::method_path("GET", "/place/details/json"))
            .times(3)
            .respond_with(json_encoded(serde_json::json!({
                "status": "OK",
                "result": {
                    "formatted_address": "A-1, Saket, New Delhi 110017",
                    "international_phone_number": "+91 11 4000 0000",
                    "url": "https://maps.google.com/?cid=1"
                }
            }))),
    );
    let app = setup_test_app(&upstream, &[]);

    let response = app
        .router
        .oneshot(scrape_request(serde_json::json!({
            "city": "Delhi",
            "keyword": "dentist",
            "areas": ["Saket", "Rohini"]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["total_results"], 3);
    assert_eq!(json["retry_logs"], serde_json::json!([]));

    let results = json["results"].as_array().unwrap();
    let ids: Vec<_> = results.iter().map(|r| r["place_id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["P1", "P123", "P2"]);
    assert_eq!(results[0]["is_duplicate"], false);
    assert_eq!(results[1]["is_duplicate"], true);

    let first = &results[0];
    assert_eq!(first["business_name"], "Clinic P1");
    assert_eq!(first["category"], "dentist");
    assert_eq!(first["address"], "A-1, Saket, New Delhi 110017");
    assert_eq!(first["phone_number"], "+91 11 4000 0000");
    assert!(first["fallback_data"].is_null());
    assert_eq!(
        first["photo_urls"][0],
        format!(
            "{}place/photo?maxwidth=400&photoreference=photo-P1&key={TEST_API_KEY}",
            upstream.url_str("/")
        )
    );
}

#[tokio::test]
async fn grid_mode_sweeps_ring_around_city() {
    let upstream = Server::run();
    upstream.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/geocode/json"),
            request::query(url_decoded(contains(("address", "Delhi")))),
        ])
        .respond_with(json_encoded(geocode_hit(28.6, 77.2))),
    );
    upstream.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/place/nearbysearch/json"),
            request::query(url_decoded(contains(("radius", "2000")))),
        ])
        .times(3)
        .respond_with(json_encoded(nearby_page(&["G1"]))),
    );
    upstream.expect(
        Expectation::matching(request::method_path("GET", "/place/details/json"))
            .respond_with(json_encoded(serde_json::json!({"status": "OK", "result": {}}))),
    );
    let app = setup_test_app(
        &upstream,
        &[("GRID_SEARCH_ENABLED", "true"), ("GRID_POINTS", "3")],
    );

    let response = app
        .router
        .oneshot(scrape_request(serde_json::json!({
            "city": "Delhi",
            "keyword": "dentist",
            "radius": 2000
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["total_results"], 1);
    assert_eq!(json["results"][0]["is_duplicate"], true);
}

#[tokio::test]
async fn failed_details_land_in_retry_logs() {
    let upstream = Server::run();
    upstream.expect(
        Expectation::matching(request::method_path("GET", "/geocode/json"))
            .respond_with(json_encoded(geocode_hit(28.52, 77.21))),
    );
    upstream.expect(
        Expectation::matching(request::method_path("GET", "/place/nearbysearch/json"))
            .respond_with(json_encoded(nearby_page(&["P9"]))),
    );
    upstream.expect(
        Expectation::matching(request::method_path("GET", "/place/details/json"))
            .times(2)
            .respond_with(status_code(502)),
    );
    let app = setup_test_app(&upstream, &[]);

    let response = app
        .router
        .oneshot(scrape_request(serde_json::json!({
            "city": "Delhi",
            "keyword": "dentist"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["total_results"], 1);
    assert_eq!(json["results"][0]["address"], "New Delhi");
    assert!(json["results"][0].get("phone_number").is_none());

    let logs = json["retry_logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["place_id"], "P9");
    assert!(logs[0]["error"].as_str().unwrap().contains("HTTP 502"));
    assert!(!logs[0]["error"].as_str().unwrap().contains(TEST_API_KEY));
    assert!(logs[0]["timestamp"].is_string());
}

#[tokio::test]
async fn blank_city_is_rejected_without_upstream_calls() {
    let upstream = Server::run();
    let app = setup_test_app(&upstream, &[]);

    let response = app
        .router
        .oneshot(scrape_request(serde_json::json!({
            "city": "  ",
            "keyword": "dentist"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "Invalid query");
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let upstream = Server::run();
    let app = setup_test_app(&upstream, &[]);

    let response = app
        .router
        .oneshot(scrape_request(serde_json::json!({"keyword": "dentist"})))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn session_ceiling_returns_429() {
    let upstream = Server::run();
    let app = setup_test_app(&upstream, &[("MAX_CONCURRENT_SESSIONS", "1")]);
    let held = app.state.service.gate().try_acquire().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(scrape_request(serde_json::json!({
            "city": "Delhi",
            "keyword": "dentist"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = json_body(response).await;
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("Too many concurrent requests")
    );

    drop(held);
    assert_eq!(app.state.service.gate().active(), 0);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let upstream = Server::run();
    let app = setup_test_app(&upstream, &[]);

    let response = app
        .router
        .oneshot(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert!(json["paths"]["/scrape"]["post"].is_object());
    assert!(json["paths"]["/health"]["get"].is_object());
}
