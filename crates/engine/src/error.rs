//! The module contains the error the engine can throw.
//!
//! Every error is terminal for the current request: the engine never retries
//! and the surrounding database transaction is always rolled back, so the
//! caller sees the original balances untouched.
//!
//! - [`InvalidAmount`] non-positive or unparseable amount.
//! - [`InvalidInput`] other bad request shape (unknown account type, funder
//!   funding themselves, malformed distribution table).
//! - [`Unauthorized`] no link between funder and beneficiary.
//! - [`KeyNotFound`] a required account (or user) does not exist.
//! - [`InsufficientFunds`] a balance would go negative.
//! - [`ConcurrencyConflict`] the database refused a lock or serialization.
//! - [`Integrity`] stored data or an internal invariant is broken; never
//!   caused by the caller.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`ConcurrencyConflict`]: EngineError::ConcurrencyConflict
//!  [`Integrity`]: EngineError::Integrity
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Account inactive: {0}")]
    AccountInactive(String),
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),
    #[error("Integrity violation: {0}")]
    Integrity(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for EngineError {
    /// Lock timeouts, busy databases and serialization failures are surfaced
    /// as [`EngineError::ConcurrencyConflict`] so callers can decide to retry.
    fn from(err: DbErr) -> Self {
        let message = err.to_string();
        let lowered = message.to_ascii_lowercase();
        let conflict = [
            "database is locked",
            "database table is locked",
            "could not serialize access",
            "deadlock detected",
            "lock timeout",
            "could not obtain lock",
        ];
        if conflict.iter().any(|needle| lowered.contains(needle)) {
            return Self::ConcurrencyConflict(message);
        }
        Self::Database(err)
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::AccountInactive(a), Self::AccountInactive(b)) => a == b,
            (Self::InvalidReference(a), Self::InvalidReference(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::ConcurrencyConflict(a), Self::ConcurrencyConflict(b)) => a == b,
            (Self::Integrity(a), Self::Integrity(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
