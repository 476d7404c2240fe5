use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
};
use ledger::Ledger;

use crate::{accounts, categories, debts, operations, rates, summary, workspaces};

/// Identity is supplied by a trusted upstream (reverse proxy or auth
/// gateway); the server itself performs no authentication.
static USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
}

/// The caller's external user id, extracted from the `x-user-id` header.
#[derive(Clone, Debug)]
pub struct Identity(pub String);

async fn identity(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let user_id = request
        .headers()
        .get(&USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    request.extensions_mut().insert(Identity(user_id));
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/workspaces",
            post(workspaces::create).get(workspaces::list),
        )
        .route("/workspaces/{workspace_id}", get(workspaces::detail))
        .route(
            "/workspaces/{workspace_id}/operations",
            post(operations::record).get(operations::list),
        )
        .route(
            "/workspaces/{workspace_id}/operations/{operation_id}",
            get(operations::detail)
                .patch(operations::update)
                .delete(operations::remove),
        )
        .route(
            "/workspaces/{workspace_id}/transfers",
            post(operations::record_transfer),
        )
        .route(
            "/workspaces/{workspace_id}/transfers/{group_id}",
            get(operations::transfer_detail).patch(operations::update_transfer),
        )
        .route(
            "/workspaces/{workspace_id}/balances",
            get(accounts::balances),
        )
        .route("/workspaces/{workspace_id}/summary", get(summary::get))
        .route(
            "/workspaces/{workspace_id}/accounts",
            post(accounts::create).get(accounts::list),
        )
        .route(
            "/workspaces/{workspace_id}/accounts/{account_id}",
            patch(accounts::rename).delete(accounts::remove),
        )
        .route(
            "/workspaces/{workspace_id}/accounts/{account_id}/default",
            post(accounts::set_default),
        )
        .route(
            "/workspaces/{workspace_id}/accounts/{account_id}/archive",
            post(accounts::archive),
        )
        .route(
            "/workspaces/{workspace_id}/categories",
            post(categories::create).get(categories::list),
        )
        .route(
            "/workspaces/{workspace_id}/categories/{category_id}",
            delete(categories::remove),
        )
        .route(
            "/workspaces/{workspace_id}/categories/{category_id}/archive",
            post(categories::archive),
        )
        .route("/workspaces/{workspace_id}/tags", get(categories::list_tags))
        .route(
            "/workspaces/{workspace_id}/tags/{tag_id}",
            delete(categories::remove_tag),
        )
        .route(
            "/workspaces/{workspace_id}/rates",
            post(rates::put).get(rates::list),
        )
        .route(
            "/workspaces/{workspace_id}/rates/bulk",
            post(rates::bulk_upsert),
        )
        .route(
            "/workspaces/{workspace_id}/debts",
            post(debts::create).get(debts::list),
        )
        .route(
            "/workspaces/{workspace_id}/debts/{debt_id}",
            get(debts::detail).delete(debts::remove),
        )
        .route(
            "/workspaces/{workspace_id}/debts/{debt_id}/archive",
            post(debts::archive),
        )
        .route_layer(middleware::from_fn(identity))
        .with_state(state)
}

pub async fn run(ledger: Ledger) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(ledger, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    ledger: Ledger,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        ledger: Arc::new(ledger),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
