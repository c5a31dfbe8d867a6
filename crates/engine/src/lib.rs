//! Fund distribution engine.
//!
//! Moves money from a funder's `Main` account to linked dependents, either
//! straight into one category account or fanned out across an emergency
//! share and category sub-accounts. Every balance change is a ledger entry
//! and every transfer commits or rolls back as one database transaction.

pub use accounts::{Account, AccountStatus, AccountType};
pub use commands::TransferCmd;
pub use currency::Currency;
pub use error::EngineError;
pub use ledger::{Direction, LedgerCategory, LedgerEntry};
pub use money::MoneyCents;
pub use ops::{
    DistributionLine, DistributionReport, Engine, EngineBuilder, ForfeitReason, ForfeitedShare,
    Reconciliation, TransferKind, TransferResult, TransferStage,
};
pub use policy::{Allocation, CategoryRate, CategoryShare, DistributionPolicy};
pub use reference::{LegTag, TransferReference};

mod accounts;
mod commands;
mod currency;
mod error;
mod ledger;
mod links;
mod money;
mod ops;
mod policy;
mod reference;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
