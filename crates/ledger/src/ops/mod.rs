use sea_orm::DatabaseConnection;
use unicode_normalization::UnicodeNormalization;

use crate::{LedgerError, ResultLedger};

pub(crate) mod accounts;
pub(crate) mod balances;
pub(crate) mod categories;
pub(crate) mod debts;
pub(crate) mod operations;
pub(crate) mod rates;
pub(crate) mod summary;
pub(crate) mod workspaces;

/// Run a block inside a DB transaction, committing on success and rolling
/// back on error (the uncommitted transaction is dropped).
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Stateless handle over the ledger database.
///
/// All derived values (account balances, remaining debt) are recomputed from
/// persisted state on read; nothing is cached in memory, so concurrent
/// writers in the same workspace never observe stale increments.
#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    /// Return a builder for `Ledger`.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.nfc().collect())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Case- and form-insensitive key for name uniqueness (tags, categories).
pub(crate) fn normalize_name_key(value: &str) -> String {
    value.trim().nfc().collect::<String>().to_lowercase()
}

/// The builder for `Ledger`.
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
}

impl LedgerBuilder {
    /// Pass the required database.
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Construct `Ledger`.
    pub fn build(self) -> Ledger {
        Ledger {
            database: self.database,
        }
    }
}
