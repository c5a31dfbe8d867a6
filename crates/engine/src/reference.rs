//! Transfer references.
//!
//! Every logical transfer gets one base reference; each ledger entry it writes
//! carries that base plus a deterministic suffix, so all legs of a transfer can
//! be recovered by prefix match.
//!
//! ```text
//! TRF-20261017093015123-1A2B3C4D-5E6F7A8B-9C0D1E2F-HEALTHCARE-OUT
//! └──┬────────────────────────────────────────────┘ └──┬─────────┘
//!   base: prefix, UTC millis, funder, beneficiary, nonce   leg suffix
//! ```

use core::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{AccountType, EngineError, ResultEngine};

const PREFIX: &str = "TRF";
const BASE_SEGMENTS: usize = 5;

/// Which leg of a transfer an entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegTag {
    /// Single leg of a direct transfer.
    Direct,
    /// Share retained in the beneficiary `Main` account.
    Emergency,
    /// Share routed to a category sub-account.
    Category(AccountType),
    /// Shares that no beneficiary account received.
    Forfeited,
}

impl LegTag {
    fn tag(self) -> Option<&'static str> {
        match self {
            Self::Direct => None,
            Self::Emergency => Some("EMERGENCY"),
            Self::Category(kind) => Some(kind.reference_tag()),
            Self::Forfeited => Some("FORFEITED"),
        }
    }
}

/// Base correlation id of one logical transfer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransferReference(String);

impl TransferReference {
    /// Generate a fresh reference for a transfer between two parties.
    #[must_use]
    pub fn new(funder_id: Uuid, beneficiary_id: Uuid) -> Self {
        Self::from_parts(Utc::now(), funder_id, beneficiary_id, Uuid::new_v4())
    }

    pub(crate) fn from_parts(
        at: DateTime<Utc>,
        funder_id: Uuid,
        beneficiary_id: Uuid,
        nonce: Uuid,
    ) -> Self {
        Self(format!(
            "{PREFIX}-{}-{}-{}-{}",
            at.format("%Y%m%d%H%M%S%3f"),
            short(funder_id),
            short(beneficiary_id),
            short(nonce),
        ))
    }

    /// Recover the base reference from any leg reference (or a base itself).
    pub fn parse(reference: &str) -> ResultEngine<Self> {
        let invalid = || EngineError::InvalidReference(reference.to_string());
        let segments: Vec<&str> = reference.trim().split('-').collect();
        if segments.len() < BASE_SEGMENTS || segments[0] != PREFIX {
            return Err(invalid());
        }
        let well_formed = segments[1].len() == 17
            && segments[1].chars().all(|c| c.is_ascii_digit())
            && segments[2..BASE_SEGMENTS]
                .iter()
                .all(|s| s.len() == 8 && s.chars().all(|c| c.is_ascii_hexdigit()));
        if !well_formed {
            return Err(invalid());
        }
        Ok(Self(segments[..BASE_SEGMENTS].join("-")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reference written on the entry that debits the source account.
    #[must_use]
    pub fn debit_reference(&self, leg: LegTag) -> String {
        match leg {
            LegTag::Direct => format!("{}-OUT", self.0),
            LegTag::Forfeited => self.credit_reference(leg),
            other => format!("{}-OUT", self.credit_reference(other)),
        }
    }

    /// Reference written on the entry that credits the destination account.
    #[must_use]
    pub fn credit_reference(&self, leg: LegTag) -> String {
        match leg.tag() {
            None => format!("{}-IN", self.0),
            Some(tag) => format!("{}-{tag}", self.0),
        }
    }

    /// `true` when `reference` belongs to this transfer.
    #[must_use]
    pub fn owns(&self, reference: &str) -> bool {
        Self::parse(reference).is_ok_and(|base| base == *self)
    }
}

impl fmt::Display for TransferReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn short(id: Uuid) -> String {
    id.simple().to_string()[..8].to_ascii_uppercase()
}
