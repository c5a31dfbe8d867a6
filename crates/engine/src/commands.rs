//! Command structs for engine operations.
//!
//! These types group the parameters of a transfer, keeping call sites
//! readable and avoiding long argument lists.

use uuid::Uuid;

use crate::AccountType;

/// Move money from a funder's `Main` account to a linked beneficiary.
///
/// With `account_type == Main` the amount is fanned out by the distribution
/// policy; any other account type is a direct single-leg transfer into that
/// category account.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    /// Authenticated caller, trusted as-is.
    pub funder_id: Uuid,
    pub beneficiary_id: Uuid,
    pub account_type: AccountType,
    pub amount_minor: i64,
    pub description: Option<String>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        funder_id: Uuid,
        beneficiary_id: Uuid,
        account_type: AccountType,
        amount_minor: i64,
    ) -> Self {
        Self {
            funder_id,
            beneficiary_id,
            account_type,
            amount_minor,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn is_smart_distribution(&self) -> bool {
        self.account_type.is_main()
    }
}
