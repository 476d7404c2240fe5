//! Command structs for ledger write operations.
//!
//! These types group parameters for writes (record/transfer/update), keeping
//! call sites readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{Currency, OperationKind};

/// Record a single income/expense/salary operation.
///
/// Transfers have their own command ([`RecordTransferCmd`]) because they
/// write a row pair.
#[derive(Clone, Debug)]
pub struct RecordOperationCmd {
    pub workspace_id: Uuid,
    pub user_id: String,
    pub kind: OperationKind,
    pub amount_minor: i64,
    /// Operation currency; `None` means the workspace base currency.
    pub currency: Option<Currency>,
    /// Explicit `currency -> base` rate. Overrides resolver lookup.
    pub exchange_rate: Option<f64>,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// Tag names; unknown ones are created in the workspace tag set.
    pub tags: Vec<String>,
    pub debt_id: Option<Uuid>,
    pub debt_applied_minor: Option<i64>,
    pub note: Option<String>,
    pub occurred_on: NaiveDate,
}

impl RecordOperationCmd {
    #[must_use]
    pub fn new(
        workspace_id: Uuid,
        user_id: impl Into<String>,
        kind: OperationKind,
        amount_minor: i64,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            workspace_id,
            user_id: user_id.into(),
            kind,
            amount_minor,
            currency: None,
            exchange_rate: None,
            account_id: None,
            category_id: None,
            tags: Vec::new(),
            debt_id: None,
            debt_applied_minor: None,
            note: None,
            occurred_on,
        }
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn exchange_rate(mut self, rate: f64) -> Self {
        self.exchange_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn debt(mut self, debt_id: Uuid, applied_minor: i64) -> Self {
        self.debt_id = Some(debt_id);
        self.debt_applied_minor = Some(applied_minor);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Record a transfer pair: one `out` row against the source account, one
/// `in` row against the destination.
#[derive(Clone, Debug)]
pub struct RecordTransferCmd {
    pub workspace_id: Uuid,
    pub user_id: String,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    /// Amount leaving the source account, in `currency` minor units.
    pub amount_minor: i64,
    /// Source-leg currency; `None` means the workspace base currency.
    pub currency: Option<Currency>,
    /// Destination-leg currency; `None` means same as the source leg.
    pub to_currency: Option<Currency>,
    /// Explicit `currency -> to_currency` rate for cross-currency transfers.
    pub cross_rate: Option<f64>,
    pub note: Option<String>,
    pub occurred_on: NaiveDate,
}

impl RecordTransferCmd {
    #[must_use]
    pub fn new(
        workspace_id: Uuid,
        user_id: impl Into<String>,
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount_minor: i64,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            workspace_id,
            user_id: user_id.into(),
            from_account_id,
            to_account_id,
            amount_minor,
            currency: None,
            to_currency: None,
            cross_rate: None,
            note: None,
            occurred_on,
        }
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn to_currency(mut self, currency: Currency) -> Self {
        self.to_currency = Some(currency);
        self
    }

    #[must_use]
    pub fn cross_rate(mut self, rate: f64) -> Self {
        self.cross_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Patch an existing income/expense/salary operation.
///
/// `None` fields are left unchanged. Changing amount or currency re-resolves
/// the conversion rate; changing the applied debt amount re-runs the
/// over-application guard against the debt's current remaining balance.
#[derive(Clone, Debug, Default)]
pub struct UpdateOperationCmd {
    pub amount_minor: Option<i64>,
    pub currency: Option<Currency>,
    pub exchange_rate: Option<f64>,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// Replaces the whole tag set when present.
    pub tags: Option<Vec<String>>,
    pub debt_applied_minor: Option<i64>,
    pub note: Option<String>,
    pub occurred_on: Option<NaiveDate>,
}

/// Patch a transfer pair; both legs are always updated together. Changing
/// amount or either leg currency re-resolves both legs' rates.
#[derive(Clone, Debug, Default)]
pub struct UpdateTransferCmd {
    pub amount_minor: Option<i64>,
    pub from_account_id: Option<Uuid>,
    pub to_account_id: Option<Uuid>,
    /// Source-leg currency.
    pub currency: Option<Currency>,
    /// Destination-leg currency.
    pub to_currency: Option<Currency>,
    pub cross_rate: Option<f64>,
    pub note: Option<String>,
    pub occurred_on: Option<NaiveDate>,
}

/// Filter for operation list reads.
#[derive(Clone, Debug)]
pub struct OperationListFilter {
    pub account_id: Option<Uuid>,
    pub kinds: Option<Vec<OperationKind>>,
    /// Inclusive `occurred_on` range bounds.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub include_transfers: bool,
    pub limit: Option<u64>,
}

impl Default for OperationListFilter {
    fn default() -> Self {
        Self {
            account_id: None,
            kinds: None,
            from: None,
            to: None,
            include_transfers: true,
            limit: None,
        }
    }
}
