//! Remote client against a mock backend.
//!
//! Remote failures must never change scores or fail the user action.

use axum::{
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use mindease_core::{
    error::MindError,
    remote::{RemoteClient, RemoteDispatcher},
    session::DashboardSession,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

const ROSTER: &str = "\
employee_id,name,avg_hours,error_rate,night_shifts,login_count,task_count,patients_handled,shift
C1,Dr. Kim,12,10,5,100,150,50,Night-1
H1,Nurse Ortiz,0,0,0,0,0,0,Day-A
";

/// Serve `app` on a random local port and return its base URL.
async fn serve(app: Router) -> String {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = TcpListener::bind(addr).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{port}")
}

fn session_with_roster() -> DashboardSession {
    let mut session = DashboardSession::build_test("remote".into(), 3).unwrap();
    session.ingest_delimited(ROSTER).unwrap();
    session
}

#[tokio::test]
async fn connect_sends_bearer_token_and_ingests_rows() {
    let app = Router::new().route(
        "/staff",
        get(|headers: HeaderMap| async move {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if auth != "Bearer k-123" {
                return Err(StatusCode::UNAUTHORIZED);
            }
            Ok(Json(json!({
                "employees": [
                    { "employee_id": "R1", "name": "Remote One", "avg_hours": 12, "error_rate": 10,
                      "night_shifts": 5, "login_count": 100, "task_count": 150, "patients_handled": 50 },
                    { "employee_id": "R2", "name": "Remote Two" }
                ]
            })))
        }),
    );
    let base = serve(app).await;
    let client = RemoteClient::new(format!("{base}/api"));
    let mut session = DashboardSession::build_test("connect".into(), 1).unwrap();

    let count = session
        .ingest_remote(&client, &format!("{base}/staff"), Some("k-123"))
        .await
        .unwrap();
    assert_eq!(count, 2);
    assert_eq!(session.records()[0].employee_id, "R1");
    assert_eq!(session.records()[1].shift, "Day");
}

#[tokio::test]
async fn non_object_employees_are_ingested_with_defaults() {
    let app = Router::new().route(
        "/staff",
        get(|| async { Json(json!({ "employees": [{ "employee_id": "R1" }, 5, null] })) }),
    );
    let base = serve(app).await;
    let client = RemoteClient::new(format!("{base}/api"));
    let mut session = DashboardSession::build_test("defaults".into(), 1).unwrap();

    let count = session
        .ingest_remote(&client, &format!("{base}/staff"), None)
        .await
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(session.records()[0].employee_id, "R1");
    for record in &session.records()[1..] {
        assert_eq!(record.name, "Unknown Employee");
        assert!(record.employee_id.starts_with("EMP"));
        assert_eq!(record.shift, "Day");
    }
}

#[tokio::test]
async fn connect_with_wrong_token_fails_without_mutation() {
    let app = Router::new().route("/staff", get(|| async { StatusCode::UNAUTHORIZED }));
    let base = serve(app).await;
    let client = RemoteClient::new(format!("{base}/api"));
    let mut session = session_with_roster();
    let before = session.records().to_vec();

    let err = session
        .ingest_remote(&client, &format!("{base}/staff"), Some("bad"))
        .await
        .unwrap_err();
    assert!(matches!(err, MindError::RemoteStatus { status: 401, .. }), "got {err:?}");
    assert_eq!(session.records(), before.as_slice());
}

#[tokio::test]
async fn body_without_employees_is_invalid() {
    let app = Router::new().route("/staff", get(|| async { Json(json!({ "rows": [] })) }));
    let base = serve(app).await;
    let client = RemoteClient::new(format!("{base}/api"));

    let err = client.fetch_employees(&format!("{base}/staff"), None).await.unwrap_err();
    assert!(matches!(err, MindError::InvalidResponse { .. }));
}

#[tokio::test]
async fn predictions_overwrite_local_scores() {
    let seen = Arc::new(Mutex::new(0usize));
    let seen_in_handler = seen.clone();
    let app = Router::new().route(
        "/api/predict",
        post(move |Json(body): Json<Value>| {
            let seen = seen_in_handler.clone();
            async move {
                *seen.lock().unwrap() = body["employees"].as_array().map(Vec::len).unwrap_or(0);
                Json(json!({ "predictions": [{ "employee_id": "H1", "stress_score": 0.95 }] }))
            }
        }),
    );
    let base = serve(app).await;
    let client = RemoteClient::new(format!("{base}/api"));
    let mut session = session_with_roster();

    let matched = session.predict_with(&client).await.unwrap();
    assert_eq!(matched, 1);
    assert_eq!(*seen.lock().unwrap(), 2);
    assert_eq!(session.find("H1").unwrap().stress_score(), 0.95);
}

#[tokio::test]
async fn failing_prediction_keeps_scores() {
    let app = Router::new().route(
        "/api/predict",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base = serve(app).await;
    let client = RemoteClient::new(format!("{base}/api"));
    let mut session = session_with_roster();
    let before = session.records().to_vec();

    let matched = session.predict_with(&client).await.unwrap();
    assert_eq!(matched, 0);
    assert_eq!(session.records(), before.as_slice());
    assert_eq!(session.store.event_count("remote", "predictions_skipped").unwrap(), 1);
}

#[tokio::test]
async fn unreachable_backend_keeps_scores() {
    let client = RemoteClient::new("http://127.0.0.1:9/api");
    let mut session = session_with_roster();
    let before = session.records().to_vec();

    let matched = session.predict_with(&client).await.unwrap();
    assert_eq!(matched, 0);
    assert_eq!(session.records(), before.as_slice());
}

#[tokio::test]
async fn swap_posts_notify_and_optimize() {
    let received: Arc<Mutex<Vec<(String, Value)>>> = Arc::new(Mutex::new(Vec::new()));
    let on_notify = received.clone();
    let on_optimize = received.clone();
    let app = Router::new()
        .route(
            "/api/notify",
            post(move |Json(body): Json<Value>| {
                let received = on_notify.clone();
                async move {
                    received.lock().unwrap().push(("notify".into(), body));
                    Json(json!({ "status": "sent" }))
                }
            }),
        )
        .route(
            "/api/optimize",
            post(move |Json(body): Json<Value>| {
                let received = on_optimize.clone();
                async move {
                    received.lock().unwrap().push(("optimize".into(), body));
                    Json(json!({ "status": "ok" }))
                }
            }),
        );
    let base = serve(app).await;
    let client = RemoteClient::new(format!("{base}/api"));
    let dispatcher = RemoteDispatcher::new(client, tokio::runtime::Handle::current());
    let mut session = session_with_roster();

    session.apply_swap("C1", "H1", &dispatcher).unwrap();
    dispatcher.flush().await;

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 2);
    let notify = &received.iter().find(|(k, _)| k == "notify").unwrap().1;
    assert_eq!(notify["to"], "Nurse Ortiz");
    assert_eq!(notify["from"], "MindEase AI System");
    let optimize = &received.iter().find(|(k, _)| k == "optimize").unwrap().1;
    assert_eq!(optimize["from"], "C1");
    assert_eq!(optimize["to"], "H1");
    assert!(optimize["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn dispatch_to_dead_backend_does_not_undo_swap() {
    let client = RemoteClient::new("http://127.0.0.1:9/api");
    let dispatcher = RemoteDispatcher::new(client, tokio::runtime::Handle::current());
    let mut session = session_with_roster();

    let outcome = session.apply_swap("C1", "H1", &dispatcher).unwrap();
    dispatcher.flush().await;

    assert_eq!(session.find("C1").unwrap().shift, "Day-A");
    assert_eq!(session.find("C1").unwrap().stress_score(), outcome.staff.stress_score());
}
