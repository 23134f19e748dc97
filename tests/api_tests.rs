use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use tokio::sync::Mutex;

use menu_eval_api::api::{create_router, AppState, ScoringParams};
use menu_eval_api::data::{Dataset, MenuCatalog, SimilarityTable};
use menu_eval_api::models::EvaluationRecord;
use menu_eval_api::services::submission::{RecordSink, SubmissionError};

/// Sink that captures submitted records and fails configured iterations
/// with a server error.
struct StubSink {
    fail_iterations: Vec<u32>,
    submitted: Mutex<Vec<EvaluationRecord>>,
}

impl StubSink {
    fn new(fail_iterations: Vec<u32>) -> Self {
        Self {
            fail_iterations,
            submitted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl RecordSink for StubSink {
    async fn submit(&self, record: &EvaluationRecord) -> Result<(), SubmissionError> {
        if self.fail_iterations.contains(&record.iteration) {
            return Err(SubmissionError::Server(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        self.submitted.lock().await.push(record.clone());
        Ok(())
    }
}

fn test_dataset() -> Dataset {
    let catalog =
        MenuCatalog::from_reader("nama\nNasi Goreng\nMie Goreng\nEs Teh\n".as_bytes()).unwrap();
    let content = SimilarityTable::from_reader(
        "menu,NASI GORENG,MIE GORENG,ES TEH\n\
         NASI GORENG,1.0,0.8,0.2\n\
         MIE GORENG,0.8,1.0,0.5\n\
         ES TEH,0.2,0.5,1.0\n"
            .as_bytes(),
    )
    .unwrap();
    let collaborative = SimilarityTable::from_reader(
        "menu,NASI GORENG,MIE GORENG,ES TEH\n\
         NASI GORENG,1.0,0.4,0.6\n\
         MIE GORENG,0.4,1.0,0.3\n\
         ES TEH,0.6,0.3,1.0\n"
            .as_bytes(),
    )
    .unwrap();

    Dataset {
        catalog,
        content,
        collaborative,
    }
}

fn create_test_server(sink: Arc<StubSink>) -> TestServer {
    let state = AppState::new(
        Arc::new(test_dataset()),
        ScoringParams {
            alpha: 0.6,
            top_k: 10,
        },
        sink,
    );
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

async fn start_session(server: &TestServer, iterations: u32) -> String {
    let response = server
        .post("/sessions")
        .json(&json!({
            "participant": "Budi",
            "total_iterations": iterations
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let session: serde_json::Value = response.json();
    session["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(Arc::new(StubSink::new(vec![])));
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_list_menus() {
    let server = create_test_server(Arc::new(StubSink::new(vec![])));
    let response = server.get("/menus").await;
    response.assert_status_ok();
    let menus: Vec<String> = response.json();
    assert_eq!(menus, ["Nasi Goreng", "Mie Goreng", "Es Teh"]);
}

#[tokio::test]
async fn test_create_session_rejects_blank_participant() {
    let server = create_test_server(Arc::new(StubSink::new(vec![])));
    let response = server
        .post("/sessions")
        .json(&json!({
            "participant": "   ",
            "total_iterations": 3
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_full_evaluation_flow() {
    let sink = Arc::new(StubSink::new(vec![]));
    let server = create_test_server(sink.clone());
    let id = start_session(&server, 2).await;

    // Iteration 1: raw input is normalized before the table lookup.
    let response = server
        .post(&format!("/sessions/{}/recommendations", id))
        .json(&json!({ "menu": " nasi goreng " }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["iteration"], 1);
    assert_eq!(
        body["recommendations"],
        json!(["MIE GORENG", "ES TEH"])
    );

    let response = server
        .post(&format!("/sessions/{}/ratings", id))
        .json(&json!({ "ratings": [1, 0] }))
        .await;
    response.assert_status_ok();
    let session: serde_json::Value = response.json();
    assert_eq!(session["state"], "awaiting_recommendation");
    assert_eq!(session["iteration"], 2);
    assert_eq!(session["completed_records"], 1);
    assert_eq!(
        session["history"],
        json!([{ "iteration": 1, "input_menu": "nasi goreng" }])
    );

    // Iteration 2
    server
        .post(&format!("/sessions/{}/recommendations", id))
        .json(&json!({ "menu": "Es Teh" }))
        .await
        .assert_status_ok();
    let response = server
        .post(&format!("/sessions/{}/ratings", id))
        .json(&json!({ "ratings": [0, 1] }))
        .await;
    response.assert_status_ok();
    let session: serde_json::Value = response.json();
    assert_eq!(session["state"], "ready_to_submit");

    // Upload everything
    let response = server
        .post(&format!("/sessions/{}/submission", id))
        .await;
    response.assert_status_ok();
    let result: serde_json::Value = response.json();
    assert_eq!(result["delivered"], 2);
    assert_eq!(result["failed"], 0);

    let submitted = sink.submitted.lock().await;
    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted[0].participant, "Budi");
    assert_eq!(submitted[0].iteration, 1);
    assert_eq!(submitted[0].input_menu, "nasi goreng");
    assert_eq!(submitted[0].ratings, [1, 0]);
    assert_eq!(submitted[1].iteration, 2);

    let response = server.get(&format!("/sessions/{}", id)).await;
    let session: serde_json::Value = response.json();
    assert_eq!(session["state"], "done");
    assert_eq!(
        session["history"],
        json!([
            { "iteration": 1, "input_menu": "nasi goreng" },
            { "iteration": 2, "input_menu": "Es Teh" }
        ])
    );
}

#[tokio::test]
async fn test_unknown_menu_is_not_found() {
    let server = create_test_server(Arc::new(StubSink::new(vec![])));
    let id = start_session(&server, 1).await;

    let response = server
        .post(&format!("/sessions/{}/recommendations", id))
        .json(&json!({ "menu": "Pizza" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    // A miss does not consume the iteration.
    let response = server.get(&format!("/sessions/{}", id)).await;
    let session: serde_json::Value = response.json();
    assert_eq!(session["state"], "awaiting_recommendation");
    assert_eq!(session["iteration"], 1);
}

#[tokio::test]
async fn test_rating_before_recommendation_conflicts() {
    let server = create_test_server(Arc::new(StubSink::new(vec![])));
    let id = start_session(&server, 1).await;

    let response = server
        .post(&format!("/sessions/{}/ratings", id))
        .json(&json!({ "ratings": [1] }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rating_count_mismatch_is_bad_request() {
    let server = create_test_server(Arc::new(StubSink::new(vec![])));
    let id = start_session(&server, 1).await;

    server
        .post(&format!("/sessions/{}/recommendations", id))
        .json(&json!({ "menu": "Nasi Goreng" }))
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("/sessions/{}/ratings", id))
        .json(&json!({ "ratings": [1] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let server = create_test_server(Arc::new(StubSink::new(vec![])));
    let response = server
        .get("/sessions/00000000-0000-0000-0000-000000000000")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submit_before_finishing_conflicts() {
    let server = create_test_server(Arc::new(StubSink::new(vec![])));
    let id = start_session(&server, 1).await;

    let response = server
        .post(&format!("/sessions/{}/submission", id))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_failed_records_reported_not_retried() {
    let sink = Arc::new(StubSink::new(vec![1]));
    let server = create_test_server(sink.clone());
    let id = start_session(&server, 1).await;

    server
        .post(&format!("/sessions/{}/recommendations", id))
        .json(&json!({ "menu": "Mie Goreng" }))
        .await
        .assert_status_ok();
    server
        .post(&format!("/sessions/{}/ratings", id))
        .json(&json!({ "ratings": [1, 1] }))
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("/sessions/{}/submission", id))
        .await;
    response.assert_status_ok();
    let result: serde_json::Value = response.json();
    assert_eq!(result["delivered"], 0);
    assert_eq!(result["failed"], 1);
    assert_eq!(result["outcomes"][0]["status"], "server_error");
    assert_eq!(result["outcomes"][0]["code"], 500);

    // The evaluation still completes and the record is dropped.
    assert!(sink.submitted.lock().await.is_empty());
    let response = server.get(&format!("/sessions/{}", id)).await;
    let session: serde_json::Value = response.json();
    assert_eq!(session["state"], "done");

    let response = server
        .post(&format!("/sessions/{}/submission", id))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}
