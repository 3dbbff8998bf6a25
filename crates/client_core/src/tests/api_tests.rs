use super::*;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct ServerState {
    submissions: Arc<Mutex<Value>>,
    submitted: Arc<Mutex<Vec<SubmitRequest>>>,
    submit_reply: Arc<Mutex<(StatusCode, Value)>>,
    calculate_reply: Arc<Mutex<(StatusCode, Value)>>,
    reset_reply: Arc<Mutex<(StatusCode, Value)>>,
}

impl ServerState {
    fn new() -> Self {
        Self {
            submissions: Arc::new(Mutex::new(json!({ "submissions": [] }))),
            submitted: Arc::new(Mutex::new(Vec::new())),
            submit_reply: Arc::new(Mutex::new((StatusCode::OK, json!({ "success": true })))),
            calculate_reply: Arc::new(Mutex::new((
                StatusCode::BAD_REQUEST,
                json!({ "error": "Need exactly 3 submissions" }),
            ))),
            reset_reply: Arc::new(Mutex::new((
                StatusCode::OK,
                json!({ "message": "Submissions reset successfully" }),
            ))),
        }
    }
}

async fn handle_submissions(State(state): State<ServerState>) -> Json<Value> {
    Json(state.submissions.lock().await.clone())
}

async fn handle_submit(
    State(state): State<ServerState>,
    Json(payload): Json<SubmitRequest>,
) -> (StatusCode, Json<Value>) {
    state.submitted.lock().await.push(payload);
    let (status, body) = state.submit_reply.lock().await.clone();
    (status, Json(body))
}

async fn handle_calculate(State(state): State<ServerState>) -> (StatusCode, Json<Value>) {
    let (status, body) = state.calculate_reply.lock().await.clone();
    (status, Json(body))
}

async fn handle_reset(State(state): State<ServerState>) -> (StatusCode, Json<Value>) {
    let (status, body) = state.reset_reply.lock().await.clone();
    (status, Json(body))
}

async fn spawn_rent_server() -> (String, ServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState::new();
    let app = Router::new()
        .route("/api/submissions", get(handle_submissions))
        .route("/api/submit", post(handle_submit))
        .route("/api/calculate", get(handle_calculate))
        .route("/api/reset", post(handle_reset))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

fn client(server_url: &str) -> HttpRentApi {
    HttpRentApi::new(server_url, DEFAULT_REQUEST_TIMEOUT).expect("client")
}

#[tokio::test]
async fn lists_wrapped_and_bare_submissions() {
    let (server_url, state) = spawn_rent_server().await;
    let api = client(&server_url);

    *state.submissions.lock().await = json!({
        "submissions": [{ "name": "ada", "timestamp": "2024-03-01T10:00:00" }]
    });
    let wrapped = api.list_submissions().await.expect("wrapped");
    assert_eq!(wrapped.len(), 1);
    assert_eq!(wrapped[0].name, "ada");

    *state.submissions.lock().await = json!([
        { "name": "ada", "values": [1000, 690, 690], "timestamp": "2024-03-01T10:00:00" },
        { "name": "bo", "values": [800, 800, 780], "timestamp": "2024-03-01T11:00:00" }
    ]);
    let bare = api.list_submissions().await.expect("bare");
    assert_eq!(bare.len(), 2);
    assert_eq!(bare[1].values.as_deref(), Some(&[800.0, 800.0, 780.0][..]));
}

#[tokio::test]
async fn unexpected_submissions_shape_is_malformed() {
    let (server_url, state) = spawn_rent_server().await;
    *state.submissions.lock().await = json!({ "count": 2 });

    let err = client(&server_url)
        .list_submissions()
        .await
        .expect_err("must fail");
    assert!(matches!(err, ClientError::Malformed { .. }), "{err}");
}

#[tokio::test]
async fn submit_posts_positional_values() {
    let (server_url, state) = spawn_rent_server().await;
    let request = SubmitRequest {
        name: "ada".to_string(),
        values: [Some(1000.0), Some(690.0), Some(690.0)],
    };

    client(&server_url).submit(&request).await.expect("submit");

    assert_eq!(state.submitted.lock().await.clone(), vec![request]);
}

#[tokio::test]
async fn submit_accepts_message_acknowledgement() {
    let (server_url, state) = spawn_rent_server().await;
    *state.submit_reply.lock().await =
        (StatusCode::OK, json!({ "message": "Submission successful" }));

    let request = SubmitRequest {
        name: "ada".to_string(),
        values: [Some(793.33), Some(793.33), Some(793.34)],
    };
    client(&server_url).submit(&request).await.expect("submit");
}

#[tokio::test]
async fn submit_rejection_carries_server_message() {
    let (server_url, state) = spawn_rent_server().await;
    *state.submit_reply.lock().await = (
        StatusCode::BAD_REQUEST,
        json!({ "error": "Total must equal 2380" }),
    );

    let request = SubmitRequest {
        name: "ada".to_string(),
        values: [Some(1.0), Some(2.0), Some(3.0)],
    };
    let err = client(&server_url)
        .submit(&request)
        .await
        .expect_err("must fail");

    assert!(matches!(
        err,
        ClientError::Rejected {
            status: Some(400),
            ..
        }
    ));
    assert_eq!(err.server_message(), Some("Total must equal 2380"));
}

#[tokio::test]
async fn submit_with_false_flag_is_rejected_even_on_ok_status() {
    let (server_url, state) = spawn_rent_server().await;
    *state.submit_reply.lock().await = (StatusCode::OK, json!({ "success": false }));

    let request = SubmitRequest {
        name: "ada".to_string(),
        values: [None, None, None],
    };
    let err = client(&server_url)
        .submit(&request)
        .await
        .expect_err("must fail");

    assert!(matches!(err, ClientError::Rejected { status: None, .. }));
    assert_eq!(err.user_message("fallback"), "fallback");
}

#[tokio::test]
async fn calculate_passes_through_detailed_body() {
    let (server_url, state) = spawn_rent_server().await;
    *state.calculate_reply.lock().await = (
        StatusCode::OK,
        json!({
            "success": true,
            "method": "linear_programming",
            "explanation": "Envy-free rents.",
            "assignments": [
                { "person": "ada", "room": "Small Room", "valuation": 800, "rent": 780.5 }
            ]
        }),
    );

    match client(&server_url).calculate().await.expect("calculate") {
        CalculateBody::Detailed(body) => {
            assert!(body.success);
            assert_eq!(body.assignments[0].rent, 780.5);
        }
        other => panic!("unexpected body: {other:?}"),
    }
}

#[tokio::test]
async fn calculate_error_status_is_rejected() {
    let (server_url, _state) = spawn_rent_server().await;

    let err = client(&server_url)
        .calculate()
        .await
        .expect_err("must fail");
    assert_eq!(err.server_message(), Some("Need exactly 3 submissions"));
}

#[tokio::test]
async fn reset_acknowledges_and_rejects() {
    let (server_url, state) = spawn_rent_server().await;
    let api = client(&server_url);

    api.reset().await.expect("reset");

    *state.reset_reply.lock().await = (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "store unavailable" }),
    );
    let err = api.reset().await.expect_err("must fail");
    assert_eq!(err.server_message(), Some("store unavailable"));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .list_submissions()
        .await
        .expect_err("must fail");
    assert!(matches!(err, ClientError::Transport { .. }), "{err}");
    assert_eq!(err.user_message("Error submitting valuations"), "Error submitting valuations");
}

#[test]
fn keeps_path_prefix_of_server_url() {
    let api = HttpRentApi::new("http://localhost:5000/rent", DEFAULT_REQUEST_TIMEOUT)
        .expect("client");
    assert_eq!(
        api.endpoint(SUBMIT_ROUTE).expect("endpoint").as_str(),
        "http://localhost:5000/rent/api/submit"
    );
}

#[test]
fn rejects_invalid_server_url() {
    assert!(matches!(
        HttpRentApi::new("not a url", DEFAULT_REQUEST_TIMEOUT),
        Err(ClientError::InvalidUrl(_))
    ));
}
