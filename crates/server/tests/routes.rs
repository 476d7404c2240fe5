use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use ledger::Ledger;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use serde_json::{Value, json};
use server::{ServerState, router};
use tower::ServiceExt;

async fn app() -> Router {
    let database = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    Migrator::up(&database, None).await.expect("migrations");
    let ledger = Ledger::builder().database(database).build();
    router(ServerState {
        ledger: Arc::new(ledger),
    })
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", "tester")
        .header(header::CONTENT_TYPE, "application/json");
    match body {
        Some(value) => builder.body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

async fn create_workspace(app: &Router) -> Value {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/workspaces",
            Some(json!({"name": "Home", "base_currency": "EUR"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

#[tokio::test]
async fn missing_identity_header_is_unauthorized() {
    let app = app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/workspaces")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn workspace_roundtrip() {
    let app = app().await;

    let workspace = create_workspace(&app).await;
    assert_eq!(workspace["name"], "Home");
    assert_eq!(workspace["base_currency"], "EUR");

    let response = app
        .clone()
        .oneshot(request("GET", "/workspaces", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["id"], workspace["id"]);
}

#[tokio::test]
async fn record_then_read_balances_and_summary() {
    let app = app().await;
    let workspace = create_workspace(&app).await;
    let workspace_id = workspace["id"].as_str().expect("workspace id").to_string();

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/workspaces/{workspace_id}/accounts"),
            None,
        ))
        .await
        .expect("response");
    let accounts = json_body(response).await;
    let cash_id = accounts[0]["id"].clone();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/workspaces/{workspace_id}/operations"),
            Some(json!({
                "kind": "income",
                "amount_minor": 12_000,
                "account_id": cash_id,
                "occurred_on": "2025-03-10",
                "tags": ["Salary advance"]
            })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let operation = json_body(response).await;
    assert_eq!(operation["kind"], "income");
    assert_eq!(operation["amount_minor"], 12_000);
    assert_eq!(operation["currency"], "EUR");
    assert_eq!(operation["tag_ids"].as_array().map(Vec::len), Some(1));

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/workspaces/{workspace_id}/balances"),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let balances = json_body(response).await;
    let entries = balances["balances"].as_array().expect("balances array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["balance_minor"], 12_000);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/workspaces/{workspace_id}/summary?from=2025-03-01&to=2025-03-31"),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let summary = json_body(response).await;
    assert_eq!(summary["income_minor"], 12_000);
    assert_eq!(summary["total_minor"], 12_000);
}

#[tokio::test]
async fn transfer_roundtrip_over_http() {
    let app = app().await;
    let workspace = create_workspace(&app).await;
    let workspace_id = workspace["id"].as_str().expect("workspace id").to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/workspaces/{workspace_id}/accounts"),
            Some(json!({"name": "Bank"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bank = json_body(response).await;

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/workspaces/{workspace_id}/accounts"),
            None,
        ))
        .await
        .expect("response");
    let accounts = json_body(response).await;
    let cash = accounts
        .as_array()
        .and_then(|list| list.iter().find(|a| a["name"] == "Cash"))
        .expect("seeded cash account")
        .clone();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/workspaces/{workspace_id}/operations"),
            Some(json!({
                "kind": "income",
                "amount_minor": 10_000,
                "account_id": cash["id"],
                "occurred_on": "2025-03-01"
            })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/workspaces/{workspace_id}/transfers"),
            Some(json!({
                "from_account_id": cash["id"],
                "to_account_id": bank["id"],
                "amount_minor": 4_000,
                "occurred_on": "2025-03-02"
            })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let transfer = json_body(response).await;
    assert_eq!(transfer["outgoing"]["transfer_direction"], "out");
    assert_eq!(transfer["incoming"]["transfer_direction"], "in");
    assert_eq!(transfer["outgoing"]["transfer_group_id"], transfer["group_id"]);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/workspaces/{workspace_id}/balances"),
            None,
        ))
        .await
        .expect("response");
    let balances = json_body(response).await;
    let minor_for = |id: &Value| {
        balances["balances"]
            .as_array()
            .and_then(|list| list.iter().find(|b| &b["account_id"] == id))
            .map(|b| b["balance_minor"].clone())
    };
    assert_eq!(minor_for(&cash["id"]), Some(json!(6_000)));
    assert_eq!(minor_for(&bank["id"]), Some(json!(4_000)));
}

#[tokio::test]
async fn unknown_workspace_is_not_found() {
    let app = app().await;

    let response = app
        .oneshot(request(
            "GET",
            "/workspaces/00000000-0000-0000-0000-000000000000",
            None,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn zero_amount_is_unprocessable() {
    let app = app().await;
    let workspace = create_workspace(&app).await;
    let workspace_id = workspace["id"].as_str().expect("workspace id").to_string();

    let response = app
        .oneshot(request(
            "POST",
            &format!("/workspaces/{workspace_id}/operations"),
            Some(json!({
                "kind": "expense",
                "amount_minor": 0,
                "occurred_on": "2025-03-10"
            })),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn bad_summary_query_is_a_bad_request() {
    let app = app().await;
    let workspace = create_workspace(&app).await;
    let workspace_id = workspace["id"].as_str().expect("workspace id").to_string();

    let response = app
        .oneshot(request(
            "GET",
            &format!("/workspaces/{workspace_id}/summary?period=year"),
            None,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
