use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod transfer {
    use super::*;

    /// Body of `POST /transfers`.
    ///
    /// The funder is the caller identified by the `x-user-id` header.
    /// `account_type = "Main"` asks for a smart distribution; any category
    /// name is a direct transfer into that sub-account.
    ///
    /// Exactly one of `amount_minor` (cents) and `amount` (decimal text such
    /// as `"12.50"`) must be set.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub beneficiary_id: Uuid,
        pub account_type: String,
        #[serde(default)]
        pub amount_minor: Option<i64>,
        #[serde(default)]
        pub amount: Option<String>,
        #[serde(default)]
        pub description: Option<String>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransferKind {
        Direct,
        SmartDistribution,
    }

    /// One credited account.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllocationView {
        pub account_type: String,
        pub account_id: Uuid,
        /// e.g. `"16%"`.
        pub share: String,
        pub amount_minor: i64,
        pub new_balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ForfeitView {
        pub account_type: String,
        pub amount_minor: i64,
        /// `missing_account` or `inactive_account`.
        pub reason: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferCreated {
        pub reference: String,
        pub kind: TransferKind,
        pub amount_minor: i64,
        pub funder_new_balance_minor: i64,
        /// Set for direct transfers.
        pub destination: Option<AllocationView>,
        /// Emergency share kept in the beneficiary `Main` account.
        pub emergency: Option<AllocationView>,
        #[serde(default)]
        pub categories: Vec<AllocationView>,
        #[serde(default)]
        pub forfeited: Vec<ForfeitView>,
        #[serde(default)]
        pub rounding_residual_minor: i64,
    }
}

pub mod ledger {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerEntryView {
        pub id: Uuid,
        pub account_id: Uuid,
        /// `debit` or `credit`.
        pub direction: String,
        pub amount_minor: i64,
        pub description: String,
        pub reference: String,
        pub category: String,
        pub sender_name: Option<String>,
        pub sender_account_number: Option<String>,
        pub recipient_name: Option<String>,
        pub recipient_account_number: Option<String>,
        pub merchant_name: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryList {
        pub entries: Vec<LedgerEntryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReconciliationView {
        pub account_id: Uuid,
        pub initial_balance_minor: i64,
        pub stored_balance_minor: i64,
        pub replayed_balance_minor: i64,
        pub entries: usize,
        pub consistent: bool,
    }
}
