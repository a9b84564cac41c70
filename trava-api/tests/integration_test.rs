use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use tower::util::ServiceExt;
use uuid::Uuid;

use trava_api::{app, AppState};
use trava_core::events::SearchEvent;
use trava_core::package::CommissionPolicy;
use trava_jobs::{StubFlightProvider, StubHotelProvider};
use trava_store::SearchRules;

fn test_state() -> AppState {
    let rules = SearchRules {
        commission_rate: 0.0,
        commission_policy: CommissionPolicy::Flat,
        ..SearchRules::default()
    };
    AppState::in_memory(
        rules,
        Arc::new(StubFlightProvider),
        Arc::new(StubHotelProvider::new()),
    )
}

fn search_body(origin: &str, destination: &str) -> String {
    let date = chrono::Utc::now().date_naive() + chrono::Duration::days(90);
    serde_json::json!({
        "origin_id": origin,
        "destination_id": destination,
        "departure_date": date,
        "nights": 7,
        "rooms": [{ "adults": 2, "children": 0, "infants": 0 }]
    })
    .to_string()
}

async fn post_search(state: &AppState, body: String) -> (StatusCode, serde_json::Value) {
    let response = app(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/packages/search")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn await_terminal(
    rx: &mut tokio::sync::broadcast::Receiver<SearchEvent>,
) -> SearchEvent {
    loop {
        let event = tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
            .await
            .expect("no terminal event within 2s")
            .expect("event channel closed");
        if !matches!(event, SearchEvent::FlightUpdated { .. }) {
            return event;
        }
    }
}

#[tokio::test]
async fn test_search_flow_end_to_end() {
    let state = test_state();
    let mut rx = state.sse_tx.subscribe();

    // 1 room, 2 adults, 7 nights: 2 flight checks + 1 hotel check.
    let (status, body) = post_search(&state, search_body("VIE", "HRG")).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let batch_id: Uuid = body["batch_id"].as_str().unwrap().parse().unwrap();

    match await_terminal(&mut rx).await {
        SearchEvent::SearchCompleted {
            batch_id: id,
            packages,
            min,
            max,
        } => {
            assert_eq!(id, batch_id);
            assert_eq!(packages.len(), 1);
            assert_eq!(packages[0].total_price, Decimal::new(85000, 2));
            assert_eq!(packages[0].price_minus_hotel, Decimal::new(55000, 2));
            assert_eq!(min, Decimal::new(85000, 2));
            assert_eq!(max, min);
        }
        other => panic!("unexpected event {other:?}"),
    }

    // Poll path returns the same packages with batch status.
    let response = app(state.clone())
        .oneshot(
            Request::builder()
                .uri(format!("/v1/packages/search/{batch_id}?page=1&per_page=10"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "COMPLETE");
    assert_eq!(json["total"], 1);
    assert_eq!(json["packages"][0]["total_price"], "850.00");
    assert_eq!(json["packages"][0]["price_minus_hotel"], "550.00");
    assert_eq!(json["tasks_succeeded"], 3);
}

#[tokio::test]
async fn test_failed_search_reports_failure() {
    let state = test_state();
    let mut rx = state.sse_tx.subscribe();

    let (status, body) = post_search(&state, search_body("XXX", "XXX")).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let batch_id: Uuid = body["batch_id"].as_str().unwrap().parse().unwrap();

    match await_terminal(&mut rx).await {
        SearchEvent::SearchFailed { batch_id: id, .. } => assert_eq!(id, batch_id),
        other => panic!("unexpected event {other:?}"),
    }

    // Sibling tasks may still be persisting their failure records when
    // the terminal event fires; give them a moment to finish.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // The admin retry pass finds the three failed checks and keeps them
    // while the supplier stays down.
    let response = app(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/admin/failed-checks/retry")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["recovered"], 0);
    assert_eq!(json["still_failing"], 3);
}

#[tokio::test]
async fn test_invalid_request_is_rejected() {
    let state = test_state();

    let date = chrono::Utc::now().date_naive() + chrono::Duration::days(90);
    let body = serde_json::json!({
        "origin_id": "VIE",
        "destination_id": "HRG",
        "departure_date": date,
        "nights": 0,
        "rooms": [{ "adults": 2, "children": 0, "infants": 0 }]
    })
    .to_string();

    let (status, json) = post_search(&state, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("nights"));
}

#[tokio::test]
async fn test_unknown_batch_is_not_found() {
    let state = test_state();

    let response = app(state)
        .oneshot(
            Request::builder()
                .uri(format!("/v1/packages/search/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
