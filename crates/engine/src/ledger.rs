//! Ledger entries.
//!
//! A [`LedgerEntry`] is an immutable record of a single balance change on one
//! account. Entries are the only source of truth for balance history: an
//! account's balance always equals its opening balance plus the signed sum of
//! its entries.
//!
//! Amounts are stored as positive integer **minor units**; the sign comes from
//! the [`Direction`].

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    /// Signed balance change for `amount_minor` in this direction.
    pub fn signed(self, amount_minor: i64) -> i64 {
        match self {
            Self::Credit => amount_minor,
            Self::Debit => -amount_minor,
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(EngineError::Integrity(format!(
                "invalid ledger direction: {other}"
            ))),
        }
    }
}

/// Why an entry was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerCategory {
    FundTransfer,
    SmartDistribution,
    EmergencyFund,
    Purchase,
    /// Share debited from the funder that no beneficiary account received.
    ForfeitedShare,
}

impl LedgerCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FundTransfer => "fund_transfer",
            Self::SmartDistribution => "smart_distribution",
            Self::EmergencyFund => "emergency_fund",
            Self::Purchase => "purchase",
            Self::ForfeitedShare => "forfeited_share",
        }
    }
}

impl TryFrom<&str> for LedgerCategory {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "fund_transfer" => Ok(Self::FundTransfer),
            "smart_distribution" => Ok(Self::SmartDistribution),
            "emergency_fund" => Ok(Self::EmergencyFund),
            "purchase" => Ok(Self::Purchase),
            "forfeited_share" => Ok(Self::ForfeitedShare),
            other => Err(EngineError::Integrity(format!(
                "invalid ledger category: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub account_id: Uuid,
    pub direction: Direction,
    pub amount_minor: i64,
    pub description: String,
    pub reference: String,
    pub category: LedgerCategory,
    pub sender_name: Option<String>,
    pub sender_account_number: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_account_number: Option<String>,
    pub merchant_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Signed effect of this entry on its account balance.
    #[must_use]
    pub fn signed_amount_minor(&self) -> i64 {
        self.direction.signed(self.amount_minor)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
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
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            account_id: ActiveValue::Set(entry.account_id.to_string()),
            direction: ActiveValue::Set(entry.direction.as_str().to_string()),
            amount_minor: ActiveValue::Set(entry.amount_minor),
            description: ActiveValue::Set(entry.description.clone()),
            reference: ActiveValue::Set(entry.reference.clone()),
            category: ActiveValue::Set(entry.category.as_str().to_string()),
            sender_name: ActiveValue::Set(entry.sender_name.clone()),
            sender_account_number: ActiveValue::Set(entry.sender_account_number.clone()),
            recipient_name: ActiveValue::Set(entry.recipient_name.clone()),
            recipient_account_number: ActiveValue::Set(entry.recipient_account_number.clone()),
            merchant_name: ActiveValue::Set(entry.merchant_name.clone()),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "ledger entry")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            direction: Direction::try_from(model.direction.as_str())?,
            amount_minor: model.amount_minor,
            description: model.description,
            reference: model.reference,
            category: LedgerCategory::try_from(model.category.as_str())?,
            sender_name: model.sender_name,
            sender_account_number: model.sender_account_number,
            recipient_name: model.recipient_name,
            recipient_account_number: model.recipient_account_number,
            merchant_name: model.merchant_name,
            created_at: model.created_at,
        })
    }
}
