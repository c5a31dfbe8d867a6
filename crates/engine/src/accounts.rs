//! Accounts: a user's `Main` balance and its category sub-accounts.
//!
//! Accounts form a strict two-level tree: a `Main` account has no parent and
//! every category account points at the `Main` account of the same owner.
//! Accounts are provisioned outside the engine; the engine only reads them and
//! mutates balances through the ledger.

use core::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine, util::parse_uuid};

/// The kind of an account.
///
/// `Main` holds unrestricted funds, every other variant is a spending
/// category that can only be funded from a `Main` transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountType {
    Main,
    Healthcare,
    Groceries,
    Education,
    Transport,
    Pregnancy,
    Entertainment,
    Clothing,
    BabyCare,
}

impl AccountType {
    /// Every category sub-account type, in distribution order.
    pub const CATEGORIES: [AccountType; 8] = [
        AccountType::Healthcare,
        AccountType::Groceries,
        AccountType::Education,
        AccountType::Transport,
        AccountType::Pregnancy,
        AccountType::Entertainment,
        AccountType::Clothing,
        AccountType::BabyCare,
    ];

    /// Canonical name stored in the database and shown to users.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "Main",
            Self::Healthcare => "Healthcare",
            Self::Groceries => "Groceries",
            Self::Education => "Education",
            Self::Transport => "Transport",
            Self::Pregnancy => "Pregnancy",
            Self::Entertainment => "Entertainment",
            Self::Clothing => "Clothing",
            Self::BabyCare => "Baby Care",
        }
    }

    /// Upper-case tag used to suffix transfer references (`BASE-BABY_CARE`).
    pub fn reference_tag(self) -> &'static str {
        match self {
            Self::Main => "MAIN",
            Self::Healthcare => "HEALTHCARE",
            Self::Groceries => "GROCERIES",
            Self::Education => "EDUCATION",
            Self::Transport => "TRANSPORT",
            Self::Pregnancy => "PREGNANCY",
            Self::Entertainment => "ENTERTAINMENT",
            Self::Clothing => "CLOTHING",
            Self::BabyCare => "BABY_CARE",
        }
    }

    #[must_use]
    pub fn is_main(self) -> bool {
        self == Self::Main
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AccountType {
    type Error = EngineError;

    /// Accepts the canonical name as well as `baby_care` / `BABY CARE`
    /// spellings.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "main" => Ok(Self::Main),
            "healthcare" => Ok(Self::Healthcare),
            "groceries" => Ok(Self::Groceries),
            "education" => Ok(Self::Education),
            "transport" => Ok(Self::Transport),
            "pregnancy" => Ok(Self::Pregnancy),
            "entertainment" => Ok(Self::Entertainment),
            "clothing" => Ok(Self::Clothing),
            "babycare" => Ok(Self::BabyCare),
            _ => Err(EngineError::InvalidInput(format!(
                "invalid account type: {value}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Suspended,
    Closed,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Closed => "closed",
        }
    }
}

impl TryFrom<&str> for AccountStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "closed" => Ok(Self::Closed),
            other => Err(EngineError::Integrity(format!(
                "invalid account status: {other}"
            ))),
        }
    }
}

/// An account as seen by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub account_type: AccountType,
    /// Current balance in minor units. Never negative.
    pub balance_minor: i64,
    /// Opening balance set at provisioning time, before any ledger entry.
    pub initial_balance_minor: i64,
    pub parent_account_id: Option<Uuid>,
    pub account_number: String,
    pub status: AccountStatus,
    pub currency: Currency,
}

impl Account {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Check the two-level tree shape: `Main` has no parent, a category
    /// account has `main` as parent and the same owner.
    pub fn ensure_child_of(&self, main: &Account) -> ResultEngine<()> {
        if !main.account_type.is_main() || main.parent_account_id.is_some() {
            return Err(EngineError::KeyNotFound(format!(
                "account {} is not a main account",
                main.account_number
            )));
        }
        if self.account_type.is_main()
            || self.parent_account_id != Some(main.id)
            || self.owner_id != main.owner_id
        {
            return Err(EngineError::KeyNotFound(format!(
                "{} account {} is not a sub-account of {}",
                self.account_type, self.account_number, main.account_number
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub account_type: String,
    pub balance_minor: i64,
    pub initial_balance_minor: i64,
    pub parent_account_id: Option<String>,
    #[sea_orm(unique)]
    pub account_number: String,
    pub status: String,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger::Entity")]
    LedgerEntries,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Owner,
}

impl Related<super::ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let account_type = AccountType::try_from(model.account_type.as_str())?;
        let parent_account_id = model
            .parent_account_id
            .as_deref()
            .map(|id| parse_uuid(id, "parent account"))
            .transpose()?;
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            owner_id: parse_uuid(&model.owner_id, "owner")?,
            account_type,
            balance_minor: model.balance_minor,
            initial_balance_minor: model.initial_balance_minor,
            parent_account_id,
            account_number: model.account_number,
            status: AccountStatus::try_from(model.status.as_str())?,
            currency: Currency::try_from(model.currency.as_str())?,
        })
    }
}
