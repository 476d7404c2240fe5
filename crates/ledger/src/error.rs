//! Errors surfaced by the ledger core.
//!
//! Every error here is caller-visible: the ledger never swallows a failure
//! and never retries on its own. Messages name the offending field or limit
//! so callers can render a useful message.

use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Bad input shape or range (amount, dates, required links).
    #[error("Invalid input: {0}")]
    Validation(String),
    /// No conversion path to the workspace base currency and no explicit rate.
    #[error("No exchange rate available for {from} -> {to}")]
    RateUnresolved { from: String, to: String },
    /// An applied amount would drive a debt's remaining balance below zero.
    #[error("Debt over-application: requested {requested_minor} but only {remaining_minor} remaining")]
    DebtOverapplication {
        requested_minor: i64,
        remaining_minor: i64,
    },
    /// Delete blocked because other rows still reference the entity.
    #[error("Cannot delete {entity}: {references} operation(s) reference it")]
    ReferentialIntegrity { entity: String, references: u64 },
    /// A multi-row write (transfer pair, tag links) was found torn.
    #[error("Partial write: {0}")]
    PartialWrite(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (
                Self::RateUnresolved { from: af, to: at },
                Self::RateUnresolved { from: bf, to: bt },
            ) => af == bf && at == bt,
            (
                Self::DebtOverapplication {
                    requested_minor: ar,
                    remaining_minor: am,
                },
                Self::DebtOverapplication {
                    requested_minor: br,
                    remaining_minor: bm,
                },
            ) => ar == br && am == bm,
            (
                Self::ReferentialIntegrity {
                    entity: ae,
                    references: ar,
                },
                Self::ReferentialIntegrity {
                    entity: be,
                    references: br,
                },
            ) => ae == be && ar == br,
            (Self::PartialWrite(a), Self::PartialWrite(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
