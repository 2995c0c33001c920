//! End-to-end monitoring session tests over HTTP.

#![allow(clippy::panic)]

mod common;

use std::time::Duration;

use serde_json::{Value, json};

use common::{TestApp, spawn_app};

/// Polls the session until `ready` holds or two seconds pass.
async fn wait_for(app: &TestApp, session: &str, ready: impl Fn(&Value) -> bool) -> Value {
    for _ in 0..100 {
        let (status, body) = app.get(&format!("/api/sessions/{session}")).await;
        assert_eq!(status, 200);
        if ready(&body) {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("session {session} never reached the expected state");
}

fn sample_count(body: &Value) -> u64 {
    body.get("sample_count").and_then(Value::as_u64).unwrap_or(0)
}

#[tokio::test]
async fn new_session_is_idle_without_route() {
    let app = spawn_app().await;
    let session = app.open_session().await;

    let (status, body) = app.get(&format!("/api/sessions/{session}")).await;
    assert_eq!(status, 200);
    assert_eq!(body.get("state").and_then(Value::as_str), Some("idle"));
    assert_eq!(body.get("route"), Some(&Value::Null));
    assert_eq!(sample_count(&body), 0);
}

#[tokio::test]
async fn start_queries_immediately_and_stop_goes_idle() {
    let app = spawn_app().await;
    let route = app.create_route("Commute").await;
    let session = app.open_session().await;

    let (status, body) = app
        .put(&format!("/api/sessions/{session}/route"), &json!({"routeId": route}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body.pointer("/route/id").and_then(Value::as_i64), Some(route));

    let (status, body) = app
        .post(&format!("/api/sessions/{session}/start"), &json!({}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body.get("state").and_then(Value::as_str), Some("monitoring"));
    assert_eq!(body.get("period_secs").and_then(Value::as_u64), Some(300));

    let body = wait_for(&app, &session, |b| sample_count(b) >= 1).await;
    assert_eq!(body.pointer("/aggregates/average_minutes").and_then(Value::as_i64), Some(30));
    assert!(app.provider.calls() >= 1);

    let (status, body) = app
        .post(&format!("/api/sessions/{session}/stop"), &Value::Null)
        .await;
    assert_eq!(status, 200);
    assert_eq!(body.get("state").and_then(Value::as_str), Some("idle"));

    let (_, history) = app.get(&format!("/api/routes/{route}/travel-times")).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn start_with_route_id_selects_it() {
    let app = spawn_app().await;
    let route = app.create_route("Commute").await;
    let session = app.open_session().await;

    let (status, body) = app
        .post(
            &format!("/api/sessions/{session}/start"),
            &json!({"routeId": route}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body.pointer("/route/id").and_then(Value::as_i64), Some(route));
    assert_eq!(body.get("state").and_then(Value::as_str), Some("monitoring"));
}

#[tokio::test]
async fn start_without_route_is_rejected() {
    let app = spawn_app().await;
    let session = app.open_session().await;

    let (status, body) = app
        .post(&format!("/api/sessions/{session}/start"), &json!({}))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body.pointer("/error/code").and_then(Value::as_u64), Some(1001));
}

#[tokio::test]
async fn selecting_missing_route_is_not_found() {
    let app = spawn_app().await;
    let session = app.open_session().await;

    let (status, body) = app
        .put(&format!("/api/sessions/{session}/route"), &json!({"routeId": 404}))
        .await;
    assert_eq!(status, 404);
    assert_eq!(body.pointer("/error/code").and_then(Value::as_u64), Some(2001));
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = spawn_app().await;
    let missing = uuid::Uuid::new_v4();

    let (status, body) = app.get(&format!("/api/sessions/{missing}")).await;
    assert_eq!(status, 404);
    assert_eq!(body.pointer("/error/code").and_then(Value::as_u64), Some(2002));
}

#[tokio::test]
async fn refresh_picks_up_manual_samples() {
    let app = spawn_app().await;
    let route = app.create_route("Commute").await;
    let session = app.open_session().await;
    app.put(&format!("/api/sessions/{session}/route"), &json!({"routeId": route}))
        .await;

    let (status, _) = app
        .post(
            "/api/travel-times",
            &json!({"routeId": route, "durationSeconds": 900, "distanceMeters": 5000}),
        )
        .await;
    assert_eq!(status, 201);

    let (status, body) = app
        .post(&format!("/api/sessions/{session}/refresh"), &Value::Null)
        .await;
    assert_eq!(status, 200);
    assert_eq!(sample_count(&body), 1);
    assert_eq!(body.pointer("/aggregates/max_minutes").and_then(Value::as_i64), Some(15));
}

#[tokio::test]
async fn deleting_route_stops_its_sessions() {
    let app = spawn_app().await;
    let route = app.create_route("Commute").await;
    let session = app.open_session().await;
    app.post(
        &format!("/api/sessions/{session}/start"),
        &json!({"routeId": route}),
    )
    .await;

    let (status, _) = app.delete(&format!("/api/routes/{route}")).await;
    assert_eq!(status, 200);

    wait_for(&app, &session, |b| {
        b.get("state").and_then(Value::as_str) == Some("idle")
    })
    .await;
}

#[tokio::test]
async fn closed_session_is_forgotten() {
    let app = spawn_app().await;
    let session = app.open_session().await;

    let (status, _) = app.delete(&format!("/api/sessions/{session}")).await;
    assert_eq!(status, 200);

    let (status, _) = app.get(&format!("/api/sessions/{session}")).await;
    assert_eq!(status, 404);
    let (status, _) = app.delete(&format!("/api/sessions/{session}")).await;
    assert_eq!(status, 404);
}
