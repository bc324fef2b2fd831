//! Integration tests for `Session` state transitions against wiremock
//! endpoints.
//!
//! Slow responses (`set_delay`) keep a request in flight long enough to
//! observe the loading snapshot and exercise the single-flight guard.

use std::time::Duration;

use dermascan_client::DermascanClient;
use dermascan_session::{
    AnalysisResult, LookupPhase, Session, NO_RESULTS_MESSAGE, PERMISSION_DENIED_MESSAGE,
};
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SLOW: Duration = Duration::from_millis(400);

fn test_session(server: &MockServer) -> Session {
    let client = DermascanClient::with_endpoints(
        &format!("{}/predict", server.uri()),
        &format!("{}/api/interpreter", server.uri()),
        5,
        "dermascan-test/0.1",
    )
    .expect("client construction should not fail");
    Session::new(client)
}

fn test_image(shade: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([shade, 120, 100])))
}

fn eczema_body() -> serde_json::Value {
    json!({
        "predictions": [
            {"class_name": "Acne", "probability": 0.82},
            {"class_name": "Eczema", "probability": 0.91}
        ]
    })
}

fn one_doctor_body() -> serde_json::Value {
    json!({
        "elements": [
            {"type": "node", "id": 7, "lat": 12.0, "lon": 77.0,
             "tags": {"name": "Dr. A", "addr:street": "MG Road", "addr:city": "Bengaluru"}},
            {"type": "node", "id": 8, "lat": 91.0, "lon": 77.0,
             "tags": {"name": "Dr. B"}}
        ]
    })
}

async fn mount_predict(server: &MockServer, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(response)
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_directory(server: &MockServer, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(response)
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Classification workflow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyze_without_image_is_noop() {
    let server = MockServer::start().await;
    mount_predict(&server, ResponseTemplate::new(200), 0).await;

    let session = test_session(&server);
    assert!(session.analyze().is_none());

    let state = session.analysis();
    assert!(!state.is_analyzing);
    assert!(state.result.is_none());
}

#[tokio::test]
async fn session_debug_shows_both_workflows() {
    let server = MockServer::start().await;
    let session = test_session(&server);
    let debug = format!("{session:?}");
    assert!(debug.starts_with("Session"), "{debug}");
    assert!(debug.contains("analysis"), "{debug}");
    assert!(debug.contains("doctors"), "{debug}");
}

#[tokio::test]
async fn analyze_transitions_through_analyzing_to_label() {
    let server = MockServer::start().await;
    mount_predict(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(eczema_body())
            .set_delay(SLOW),
        1,
    )
    .await;

    let session = test_session(&server);
    session.set_image(test_image(180));

    let handle = session.analyze().expect("analysis should start");
    let loading = session.analysis();
    assert!(loading.is_analyzing);
    assert!(loading.result.is_none());
    assert!(loading.image.is_some());

    handle.await.expect("analysis task should not panic");

    let done = session.analysis();
    assert!(!done.is_analyzing);
    assert_eq!(done.result_label(), Some("Eczema (91.00% confidence)"));
    assert!(done.image.is_some(), "image stays selected after analysis");
}

#[tokio::test]
async fn second_analyze_while_in_flight_is_ignored() {
    let server = MockServer::start().await;
    mount_predict(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(eczema_body())
            .set_delay(SLOW),
        1,
    )
    .await;

    let session = test_session(&server);
    session.set_image(test_image(180));

    let first = session.analyze().expect("first analysis should start");
    assert!(session.analyze().is_none(), "second call must be a no-op");
    assert!(session.analysis().is_analyzing);

    first.await.expect("analysis task should not panic");
    assert_eq!(
        session.analysis().result_label(),
        Some("Eczema (91.00% confidence)")
    );
}

#[tokio::test]
async fn analyze_failure_is_stored_as_display_result() {
    let server = MockServer::start().await;
    mount_predict(&server, ResponseTemplate::new(500), 1).await;

    let session = test_session(&server);
    session.set_image(test_image(180));
    session
        .analyze()
        .expect("analysis should start")
        .await
        .expect("analysis task should not panic");

    let state = session.analysis();
    assert!(!state.is_analyzing);
    assert_eq!(
        state.result,
        Some(AnalysisResult::Failed("Prediction failed (500)".to_string()))
    );
}

#[tokio::test]
async fn analyze_empty_body_reports_empty_response() {
    let server = MockServer::start().await;
    mount_predict(&server, ResponseTemplate::new(200).set_body_string(""), 1).await;

    let session = test_session(&server);
    session.set_image(test_image(180));
    session
        .analyze()
        .expect("analysis should start")
        .await
        .expect("analysis task should not panic");

    assert_eq!(
        session.analysis().result_label(),
        Some("Prediction failed (empty response)")
    );
}

#[tokio::test]
async fn new_analysis_clears_previous_result() {
    let server = MockServer::start().await;
    mount_predict(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(eczema_body())
            .set_delay(Duration::from_millis(200)),
        2,
    )
    .await;

    let session = test_session(&server);
    session.set_image(test_image(180));
    session
        .analyze()
        .expect("analysis should start")
        .await
        .expect("analysis task should not panic");
    assert!(session.analysis().result.is_some());

    let second = session.analyze().expect("second analysis should start");
    let state = session.analysis();
    assert!(state.is_analyzing);
    assert!(state.result.is_none());
    second.await.expect("analysis task should not panic");
}

#[tokio::test]
async fn set_image_clears_previous_result() {
    let server = MockServer::start().await;
    mount_predict(&server, ResponseTemplate::new(200).set_body_json(eczema_body()), 1).await;

    let session = test_session(&server);
    session.set_image(test_image(180));
    session
        .analyze()
        .expect("analysis should start")
        .await
        .expect("analysis task should not panic");
    assert!(session.analysis().result.is_some());

    session.set_image(test_image(40));
    assert!(session.analysis().result.is_none());
}

#[tokio::test]
async fn result_for_replaced_image_is_discarded() {
    let server = MockServer::start().await;
    mount_predict(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(eczema_body())
            .set_delay(SLOW),
        1,
    )
    .await;

    let session = test_session(&server);
    session.set_image(test_image(180));
    let handle = session.analyze().expect("analysis should start");

    session.set_image(test_image(40));
    assert!(session.analyze().is_none(), "still single-flight after image swap");

    handle.await.expect("analysis task should not panic");
    let state = session.analysis();
    assert!(!state.is_analyzing);
    assert!(state.result.is_none(), "stale label must not be shown");
    assert!(state.image.is_some());
}

#[tokio::test]
async fn analysis_subscribers_see_settled_state() {
    let server = MockServer::start().await;
    mount_predict(&server, ResponseTemplate::new(200).set_body_json(eczema_body()), 1).await;

    let session = test_session(&server);
    let mut rx = session.subscribe_analysis();
    session.set_image(test_image(180));
    let _handle = session.analyze().expect("analysis should start");

    let settled = tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|s| !s.is_analyzing && s.result.is_some()),
    )
    .await
    .expect("analysis should settle")
    .expect("sender alive");
    assert_eq!(settled.result_label(), Some("Eczema (91.00% confidence)"));
}

// ---------------------------------------------------------------------------
// Doctor-lookup workflow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lookup_populates_ranked_providers() {
    let server = MockServer::start().await;
    mount_directory(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(one_doctor_body())
            .set_delay(Duration::from_millis(200)),
        1,
    )
    .await;

    let session = test_session(&server);
    let handle = session
        .fetch_nearby_doctors(12.0, 77.0)
        .expect("lookup should start");

    let loading = session.doctors();
    assert!(loading.is_loading());
    assert!(loading.providers.is_empty());
    assert_eq!(loading.error_message(), None);

    handle.await.expect("lookup task should not panic");

    let done = session.doctors();
    assert_eq!(done.phase, LookupPhase::Populated);
    assert_eq!(done.error_message(), None);
    assert_eq!(done.providers.len(), 1, "out-of-range Dr. B is dropped");
    assert_eq!(done.providers[0].name, "Dr. A");
    assert_eq!(done.providers[0].distance_meters, Some(0.0));
    assert_eq!(
        done.providers[0].address.as_deref(),
        Some("MG Road, Bengaluru")
    );
}

#[tokio::test]
async fn empty_elements_is_no_results_not_error() {
    let server = MockServer::start().await;
    mount_directory(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"elements": []})),
        1,
    )
    .await;

    let session = test_session(&server);
    session
        .fetch_nearby_doctors(12.0, 77.0)
        .expect("lookup should start")
        .await
        .expect("lookup task should not panic");

    let state = session.doctors();
    assert_eq!(state.phase, LookupPhase::NoResults);
    assert!(state.providers.is_empty());
    assert_eq!(state.error_message(), Some(NO_RESULTS_MESSAGE));
}

#[tokio::test]
async fn lookup_transport_failure_is_failed_phase() {
    let server = MockServer::start().await;
    mount_directory(&server, ResponseTemplate::new(504), 1).await;

    let session = test_session(&server);
    session
        .fetch_nearby_doctors(12.0, 77.0)
        .expect("lookup should start")
        .await
        .expect("lookup task should not panic");

    let state = session.doctors();
    assert_eq!(
        state.phase,
        LookupPhase::Failed("Doctor lookup failed (504)".to_string())
    );
    assert_eq!(state.error_message(), Some("Doctor lookup failed (504)"));
}

#[tokio::test]
async fn second_lookup_while_in_flight_is_ignored() {
    let server = MockServer::start().await;
    mount_directory(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(one_doctor_body())
            .set_delay(SLOW),
        1,
    )
    .await;

    let session = test_session(&server);
    let first = session
        .fetch_nearby_doctors(12.0, 77.0)
        .expect("lookup should start");
    assert!(session.fetch_nearby_doctors(13.0, 78.0).is_none());

    first.await.expect("lookup task should not panic");
    assert_eq!(session.doctors().phase, LookupPhase::Populated);
}

#[tokio::test]
async fn new_lookup_clears_previous_outcome() {
    let server = MockServer::start().await;
    mount_directory(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(one_doctor_body())
            .set_delay(Duration::from_millis(200)),
        2,
    )
    .await;

    let session = test_session(&server);
    session
        .fetch_nearby_doctors(12.0, 77.0)
        .expect("lookup should start")
        .await
        .expect("lookup task should not panic");
    assert_eq!(session.doctors().providers.len(), 1);

    let second = session
        .fetch_nearby_doctors(12.0, 77.0)
        .expect("lookup should start");
    let state = session.doctors();
    assert!(state.is_loading());
    assert!(state.providers.is_empty());
    assert_eq!(state.error_message(), None);
    second.await.expect("lookup task should not panic");
}

#[tokio::test]
async fn permission_denied_makes_no_request() {
    let server = MockServer::start().await;
    mount_directory(&server, ResponseTemplate::new(200), 0).await;

    let session = test_session(&server);
    session.location_permission_denied();

    let state = session.doctors();
    assert_eq!(state.phase, LookupPhase::PermissionDenied);
    assert!(!state.is_loading());
    assert_eq!(state.error_message(), Some(PERMISSION_DENIED_MESSAGE));
}

#[tokio::test]
async fn permission_denied_is_ignored_while_loading() {
    let server = MockServer::start().await;
    mount_directory(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(one_doctor_body())
            .set_delay(SLOW),
        1,
    )
    .await;

    let session = test_session(&server);
    let handle = session
        .fetch_nearby_doctors(12.0, 77.0)
        .expect("lookup should start");
    session.location_permission_denied();
    assert!(session.doctors().is_loading());

    handle.await.expect("lookup task should not panic");
    assert_eq!(session.doctors().phase, LookupPhase::Populated);
}

#[tokio::test]
async fn invalid_user_location_fails_without_request() {
    let server = MockServer::start().await;
    mount_directory(&server, ResponseTemplate::new(200), 0).await;

    let session = test_session(&server);
    session
        .fetch_nearby_doctors(f64::NAN, 77.0)
        .expect("lookup should start")
        .await
        .expect("lookup task should not panic");

    let state = session.doctors();
    assert!(matches!(state.phase, LookupPhase::Failed(ref m) if m.starts_with("Invalid location")));
}

#[tokio::test]
async fn workflows_run_independently() {
    let server = MockServer::start().await;
    mount_predict(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(eczema_body())
            .set_delay(SLOW),
        1,
    )
    .await;
    mount_directory(
        &server,
        ResponseTemplate::new(200).set_body_json(one_doctor_body()),
        1,
    )
    .await;

    let session = test_session(&server);
    session.set_image(test_image(180));
    let analysis = session.analyze().expect("analysis should start");
    let lookup = session
        .fetch_nearby_doctors(12.0, 77.0)
        .expect("lookup should start while analysis is in flight");

    lookup.await.expect("lookup task should not panic");
    assert_eq!(session.doctors().phase, LookupPhase::Populated);
    assert!(session.analysis().is_analyzing, "analysis still in flight");

    analysis.await.expect("analysis task should not panic");
    assert!(!session.analysis().is_analyzing);
}
