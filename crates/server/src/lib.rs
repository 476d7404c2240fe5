use axum::{Json, http::StatusCode, response::IntoResponse};
use ledger::LedgerError;
use serde::Serialize;

pub use server::{Identity, ServerState, router, run, run_with_listener, spawn_with_listener};

mod accounts;
mod categories;
mod debts;
mod operations;
mod rates;
mod server;
mod summary;
mod workspaces;

pub enum ServerError {
    Ledger(LedgerError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_ledger_error(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::ExistingKey(_) | LedgerError::ReferentialIntegrity { .. } => {
            StatusCode::CONFLICT
        }
        LedgerError::Validation(_)
        | LedgerError::RateUnresolved { .. }
        | LedgerError::DebtOverapplication { .. }
        | LedgerError::CurrencyMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::PartialWrite(_) | LedgerError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_ledger_error(err: LedgerError) -> String {
    match err {
        LedgerError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        LedgerError::PartialWrite(detail) => {
            tracing::error!("partial write detected: {detail}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Ledger(err) => (status_for_ledger_error(&err), message_for_ledger_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<LedgerError> for ServerError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let res = ServerError::from(LedgerError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn existing_key_maps_to_409() {
        let res = ServerError::from(LedgerError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn referential_integrity_maps_to_409() {
        let res = ServerError::from(LedgerError::ReferentialIntegrity {
            entity: "account".to_string(),
            references: 3,
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_maps_to_422() {
        let res = ServerError::from(LedgerError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn rate_unresolved_maps_to_422() {
        let res = ServerError::from(LedgerError::RateUnresolved {
            from: "USD".to_string(),
            to: "EUR".to_string(),
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn partial_write_is_an_opaque_500() {
        let res = ServerError::from(LedgerError::PartialWrite("torn".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
