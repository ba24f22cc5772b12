//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use tally_core::test_utils::{MockGeminiMode, MockGeminiServer};
use tally_core::{AIClient, InMemoryStore, MockBackend, NewExpense};
use tower::ServiceExt;

fn seeded_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    let now = Utc::now();
    let seed = [
        ("Rent", 900.0, Some("housing"), 40),
        ("Groceries", 80.0, Some("food"), 20),
        ("Dinner out", 60.0, Some("food"), 10),
        ("Bus pass", 40.0, None, 5),
    ];
    for (description, amount, category, days_ago) in seed {
        store
            .create(
                DEFAULT_OWNER,
                NewExpense {
                    description: description.to_string(),
                    amount,
                    category: category.map(String::from),
                    created_at: Some(now - Duration::days(days_ago)),
                },
            )
            .unwrap();
    }
    Arc::new(store)
}

fn setup_test_app() -> Router {
    create_router(
        seeded_store(),
        ExpenseAnalyzer::deterministic(),
        ServerConfig::default(),
    )
}

fn setup_app_with(analyzer: ExpenseAnalyzer) -> Router {
    create_router(seeded_store(), analyzer, ServerConfig::default())
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn get_as(app: Router, uri: &str, user: &str) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .header(OWNER_HEADER, user)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

// ========== Health ==========

#[tokio::test]
async fn test_health() {
    let response = get(setup_test_app(), "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["status"]["status"], "ok");
    assert_eq!(json["status"]["aiAvailable"], false);
}

#[test]
fn test_get_owner() {
    let mut headers = HeaderMap::new();
    assert_eq!(get_owner(&headers), "local-dev");
    headers.insert(OWNER_HEADER, HeaderValue::from_static("alice"));
    assert_eq!(get_owner(&headers), "alice");
    headers.insert(OWNER_HEADER, HeaderValue::from_static("  "));
    assert_eq!(get_owner(&headers), "local-dev");
}

// ========== Expense CRUD ==========

#[tokio::test]
async fn test_list_expenses() {
    let response = get(setup_test_app(), "/api/expenses").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    let expenses = json["expenses"].as_array().unwrap();
    assert_eq!(expenses.len(), 4);
    // Oldest first by default
    assert_eq!(expenses[0]["description"], "Rent");
}

#[tokio::test]
async fn test_list_expenses_desc_and_category() {
    let response = get(setup_test_app(), "/api/expenses?order=desc&category=food").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let expenses = json["expenses"].as_array().unwrap();
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0]["description"], "Dinner out");
}

#[tokio::test]
async fn test_list_expenses_invalid_params() {
    let response = get(setup_test_app(), "/api/expenses?order=sideways").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("sort order"));

    let response = get(setup_test_app(), "/api/expenses?from=last-tuesday").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(setup_test_app(), "/api/expenses?from=2024-05-02&to=2024-05-01").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_expenses_owner_isolation() {
    let response = get_as(setup_test_app(), "/api/expenses", "someone-else").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!(json["expenses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_expense() {
    let body = serde_json::json!({
        "description": "Coffee",
        "amount": 4.5,
        "category": "food"
    });
    let response = send_json(setup_test_app(), "POST", "/api/expenses", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Expense created");
    assert_eq!(json["expense"]["description"], "Coffee");
    assert_eq!(json["expense"]["owner"], "local-dev");
    assert_eq!(json["expense"]["id"], 5);
}

#[tokio::test]
async fn test_create_expense_validation() {
    let body = serde_json::json!({"description": "   ", "amount": 4.5});
    let response = send_json(setup_test_app(), "POST", "/api/expenses", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["success"], false);

    let body = serde_json::json!({"description": "No amount"});
    let response = send_json(setup_test_app(), "POST", "/api/expenses", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_expense() {
    let response = get(setup_test_app(), "/api/expenses/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["expense"]["description"], "Rent");

    let response = get(setup_test_app(), "/api/expenses/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_as(setup_test_app(), "/api/expenses/1", "mallory").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(setup_test_app(), "/api/expenses/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_expense() {
    let body = serde_json::json!({"amount": 950.0});
    let response = send_json(setup_test_app(), "PUT", "/api/expenses/1", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["expense"]["amount"], 950.0);
    assert_eq!(json["expense"]["description"], "Rent");

    let body = serde_json::json!({"amount": 1.0});
    let response = send_json(setup_test_app(), "PUT", "/api/expenses/42", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_expense() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/expenses/2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["expense"]["description"], "Groceries");

    let response = get(app, "/api/expenses/2").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Aggregates ==========

#[tokio::test]
async fn test_summary() {
    let response = get(setup_test_app(), "/api/expenses/summary").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["summary"]["totalAmount"], 1080.0);
    assert_eq!(json["summary"]["count"], 4);
    assert_eq!(json["summary"]["categories"][0]["category"], "housing");
}

#[tokio::test]
async fn test_summary_empty_is_not_found() {
    let response = get_as(setup_test_app(), "/api/expenses/summary", "newcomer").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = get_body_json(response).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_stats() {
    let response = get(setup_test_app(), "/api/expenses/stats").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let stats = &json["stats"];
    assert_eq!(stats["totalAmount"], 1080.0);
    assert_eq!(stats["averageTransaction"], 270.0);
    assert_eq!(stats["topCategory"], "housing");
    assert_eq!(stats["spendingTrend"], "decreasing");
    assert_eq!(stats["riskLevel"], "medium");
    assert_eq!(stats["categoryBreakdown"]["others"], 40.0);
}

#[tokio::test]
async fn test_stats_window() {
    let from = (Utc::now() - Duration::days(15)).format("%Y-%m-%d").to_string();
    let uri = format!("/api/expenses/stats?from={}", from);
    let response = get(setup_test_app(), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["stats"]["totalAmount"], 100.0);
}

// ========== Analysis ==========

#[tokio::test]
async fn test_analysis_fallback_without_provider() {
    let response = get(setup_test_app(), "/api/expenses/analysis").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["source"], "fallback");
    let analysis = json["analysis"].as_str().unwrap();
    assert!(analysis.contains("Total spent: $1080.00"));
    assert!(analysis.contains("Top category: housing"));
}

#[tokio::test]
async fn test_analysis_with_mock_provider() {
    let app = setup_app_with(ExpenseAnalyzer::new(AIClient::mock()));
    let response = get(app, "/api/expenses/analysis").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["source"], "ai");
    assert!(json["analysis"].as_str().unwrap().contains("Mock analysis"));
}

#[tokio::test]
async fn test_analysis_provider_failure_still_succeeds() {
    let app = setup_app_with(ExpenseAnalyzer::new(AIClient::Mock(MockBackend::failing(
        "boom",
    ))));
    let response = get(app, "/api/expenses/analysis").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["source"], "fallback");
    assert!(json["analysis"]
        .as_str()
        .unwrap()
        .starts_with("AI analysis unavailable."));
}

#[tokio::test]
async fn test_analysis_empty_is_not_found() {
    let response = get_as(setup_test_app(), "/api/expenses/analysis", "newcomer").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_insights_fallback_without_provider() {
    let response = get(setup_test_app(), "/api/expenses/insights").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["source"], "fallback");
    let insights = &json["insights"];
    assert_eq!(insights["topCategory"], "housing");
    assert_eq!(insights["totalSpent"], 1080.0);
    assert_eq!(insights["averageTransaction"], 270.0);
    assert_eq!(insights["riskLevel"], "medium");
    assert!(insights["quickTip"].as_str().unwrap().contains("housing"));
}

#[tokio::test]
async fn test_insights_from_gemini() {
    let server = MockGeminiServer::start().await;
    let app = setup_app_with(ExpenseAnalyzer::new(AIClient::Gemini(server.backend())));

    let response = get(app, "/api/expenses/insights").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["source"], "ai");
    assert_eq!(
        json["insights"]["quickTip"],
        "Rent dominates; compare utility plans to free up cash."
    );
}

#[tokio::test]
async fn test_insights_unparseable_gemini_output() {
    let server = MockGeminiServer::start_with(MockGeminiMode::Text("no json here".into())).await;
    let app = setup_app_with(ExpenseAnalyzer::new(AIClient::Gemini(server.backend())));

    let response = get(app, "/api/expenses/insights").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["source"], "fallback");
    assert_eq!(json["insights"]["totalSpent"], 1080.0);
}

// ========== Budget ==========

#[tokio::test]
async fn test_budget_recommendations() {
    let response = get(setup_test_app(), "/api/budget/recommendations").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let rec = &json["recommendations"];
    assert_eq!(rec["periodMonths"], 3);
    assert_eq!(rec["totalSpent"], 1080.0);
    assert_eq!(rec["categories"][0]["category"], "housing");
    assert_eq!(rec["categories"][0]["monthlyAverage"], 300.0);
    assert_eq!(rec["categories"][0]["suggestedLimit"], 270.0);
}

#[tokio::test]
async fn test_budget_recommendations_empty() {
    let response = get_as(setup_test_app(), "/api/budget/recommendations", "newcomer").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Errors ==========

#[tokio::test]
async fn test_internal_error_is_generic() {
    let err: AppError = anyhow::anyhow!("disk on fire").into();
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "An internal error occurred");
}
