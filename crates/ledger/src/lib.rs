//! Tally ledger core.
//!
//! Multi-workspace finance ledger: operations (income/expense/salary and
//! transfer pairs) recorded against accounts, normalized to a workspace base
//! currency, with derived account balances, debt amortization tracking and
//! period summaries.
//!
//! The entry point is [`Ledger`], a stateless handle over a database
//! connection; every mutation runs in a single database transaction and
//! every derived value (balances, remaining debt) is recomputed from current
//! ledger state at read time.

pub use accounts::Account;
pub use categories::CategoryKind;
pub use commands::{
    OperationListFilter, RecordOperationCmd, RecordTransferCmd, UpdateOperationCmd,
    UpdateTransferCmd,
};
pub use currency::Currency;
pub use debts::{Debt, DebtDirection, DebtOverview};
pub use error::LedgerError;
pub use exchange_rates::{ExchangeRate, RateSource};
pub use money::Money;
pub use operations::{Operation, OperationKind, TransferDirection};
pub use ops::operations::TransferPair;
pub use ops::rates::ResolvedRate;
pub use ops::summary::{Period, Summary, summarize};
pub use ops::{Ledger, LedgerBuilder};
pub use workspaces::Workspace;

pub mod accounts;
pub mod categories;
mod commands;
mod currency;
pub mod debts;
mod error;
pub mod exchange_rates;
mod money;
pub mod operation_tags;
pub mod operations;
mod ops;
pub mod tags;
pub mod workspaces;

type ResultLedger<T> = Result<T, LedgerError>;
