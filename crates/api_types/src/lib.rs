//! Wire types shared between the Tally server and its clients.
//!
//! These mirror the ledger's domain types but stay independent of it:
//! amounts are raw minor units, ids are `Uuid`, dates are calendar dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod workspace {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WorkspaceNew {
        pub name: String,
        /// 3-letter currency code; defaults to EUR server-side.
        pub base_currency: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WorkspaceView {
        pub id: Uuid,
        pub name: String,
        pub base_currency: String,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub color: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountRename {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub color: Option<String>,
        pub is_default: bool,
        pub archived: bool,
    }

    /// Response body for the balances read.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub balances: Vec<AccountBalance>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountBalance {
        pub account_id: Uuid,
        pub balance_minor: i64,
    }
}

pub mod operation {
    use super::*;

    /// Request body for recording an income/expense/salary operation.
    /// `kind` is one of `income`, `expense`, `salary`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct OperationNew {
        pub kind: String,
        pub amount_minor: i64,
        pub currency: Option<String>,
        pub exchange_rate: Option<f64>,
        pub account_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        #[serde(default)]
        pub tags: Vec<String>,
        pub debt_id: Option<Uuid>,
        pub debt_applied_minor: Option<i64>,
        pub note: Option<String>,
        pub occurred_on: NaiveDate,
    }

    /// Patch body; absent fields keep their current value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OperationPatch {
        pub amount_minor: Option<i64>,
        pub currency: Option<String>,
        pub exchange_rate: Option<f64>,
        pub account_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub tags: Option<Vec<String>>,
        pub debt_applied_minor: Option<i64>,
        pub note: Option<String>,
        pub occurred_on: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OperationView {
        pub id: Uuid,
        pub kind: String,
        pub amount_minor: i64,
        pub currency: String,
        pub exchange_rate: Option<f64>,
        pub base_amount_minor: Option<i64>,
        pub account_id: Option<Uuid>,
        pub transfer_direction: Option<String>,
        pub transfer_group_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub debt_id: Option<Uuid>,
        pub debt_applied_minor: Option<i64>,
        pub note: Option<String>,
        pub occurred_on: NaiveDate,
        pub created_by: String,
        #[serde(default)]
        pub tag_ids: Vec<Uuid>,
    }

    /// Query parameters for the list endpoint.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OperationListQuery {
        pub account_id: Option<Uuid>,
        /// Comma-separated kind names.
        pub kinds: Option<String>,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub include_transfers: Option<bool>,
        pub limit: Option<u64>,
    }
}

pub mod transfer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub from_account_id: Uuid,
        pub to_account_id: Uuid,
        pub amount_minor: i64,
        pub currency: Option<String>,
        pub to_currency: Option<String>,
        pub cross_rate: Option<f64>,
        pub note: Option<String>,
        pub occurred_on: NaiveDate,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransferPatch {
        pub amount_minor: Option<i64>,
        pub from_account_id: Option<Uuid>,
        pub to_account_id: Option<Uuid>,
        pub currency: Option<String>,
        pub to_currency: Option<String>,
        pub cross_rate: Option<f64>,
        pub note: Option<String>,
        pub occurred_on: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub group_id: Uuid,
        pub outgoing: super::operation::OperationView,
        pub incoming: super::operation::OperationView,
    }
}

pub mod category {
    use super::*;

    /// `kind` is `income` or `expense`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub kind: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub kind: String,
        pub archived: bool,
    }
}

pub mod tag {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagView {
        pub id: Uuid,
        pub name: String,
    }
}

pub mod rate {
    use super::*;

    /// `source` is one of `manual`, `ecb`, `openexchange`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RateUpsert {
        pub from_currency: String,
        pub to_currency: String,
        pub rate_date: NaiveDate,
        pub rate: f64,
        pub source: Option<String>,
    }

    /// Bulk body used by the feed refresh path.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RateBulkUpsert {
        pub source: String,
        pub rates: Vec<RateObservation>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RateObservation {
        pub from_currency: String,
        pub to_currency: String,
        pub rate_date: NaiveDate,
        pub rate: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RateView {
        pub from_currency: String,
        pub to_currency: String,
        pub rate_date: NaiveDate,
        pub rate: f64,
        pub source: String,
    }
}

pub mod debt {
    use super::*;

    /// `direction` is `i_owe` or `owed_to_me`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtNew {
        pub direction: String,
        pub title: String,
        pub counterparty: String,
        pub initial_minor: i64,
        pub opened_on: NaiveDate,
        pub due_on: Option<NaiveDate>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtView {
        pub id: Uuid,
        pub direction: String,
        pub title: String,
        pub counterparty: String,
        pub initial_minor: i64,
        pub remaining_minor: i64,
        pub progress_pct: u8,
        pub opened_on: NaiveDate,
        pub due_on: Option<NaiveDate>,
        pub archived: bool,
    }
}

pub mod summary {
    use super::*;

    /// Query: either `period=today|month` or an explicit `from`/`to` pair.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SummaryQuery {
        pub period: Option<String>,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        pub income_minor: i64,
        pub expense_minor: i64,
        pub salary_minor: i64,
        pub total_minor: i64,
    }
}
