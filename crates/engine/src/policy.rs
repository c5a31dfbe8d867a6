//! Distribution policy for smart transfers.
//!
//! A smart transfer keeps a fixed emergency share in the beneficiary `Main`
//! account and fans the rest out to category sub-accounts. Shares are
//! expressed in basis points (`2000` = 20%) and rounded half-up to the cent,
//! independently per bucket.
//!
//! | Bucket        | Share |
//! |---------------|------:|
//! | Emergency     |   20% |
//! | Healthcare    |   20% |
//! | Groceries     |   16% |
//! | Education     |   16% |
//! | Transport     |    8% |
//! | Pregnancy     |    8% |
//! | Entertainment |    4% |
//! | Clothing      |    4% |
//! | Baby Care     |    4% |
//!
//! Rounding error is not redistributed. The only correction applied is a
//! clamp: when per-bucket rounding would allocate more than the transferred
//! amount, the excess is taken back from the emergency share first and then
//! from the smallest categories, so an allocation never creates money.

use serde::{Deserialize, Serialize};

use crate::{AccountType, EngineError, MoneyCents, ResultEngine};

const FULL_BPS: u32 = 10_000;

/// A category and its share of every smart transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRate {
    pub account_type: AccountType,
    pub bps: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionPolicy {
    emergency_bps: u32,
    categories: Vec<CategoryRate>,
}

/// Amount assigned to one category by [`DistributionPolicy::allocate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub account_type: AccountType,
    pub bps: u32,
    pub amount_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub amount_minor: i64,
    pub emergency_bps: u32,
    pub emergency_minor: i64,
    pub categories: Vec<CategoryShare>,
}

impl Allocation {
    /// Sum of every bucket.
    #[must_use]
    pub fn allocated_minor(&self) -> i64 {
        self.emergency_minor
            + self
                .categories
                .iter()
                .map(|share| share.amount_minor)
                .sum::<i64>()
    }

    /// Part of the amount lost to rounding (never negative).
    #[must_use]
    pub fn residual_minor(&self) -> i64 {
        self.amount_minor - self.allocated_minor()
    }

    #[cfg(test)]
    pub(crate) fn share_for(&self, account_type: AccountType) -> Option<&CategoryShare> {
        self.categories
            .iter()
            .find(|share| share.account_type == account_type)
    }
}

impl Default for DistributionPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl DistributionPolicy {
    /// The production table.
    #[must_use]
    pub fn standard() -> Self {
        let rate = |account_type, bps| CategoryRate { account_type, bps };
        Self {
            emergency_bps: 2_000,
            categories: vec![
                rate(AccountType::Healthcare, 2_000),
                rate(AccountType::Groceries, 1_600),
                rate(AccountType::Education, 1_600),
                rate(AccountType::Transport, 800),
                rate(AccountType::Pregnancy, 800),
                rate(AccountType::Entertainment, 400),
                rate(AccountType::Clothing, 400),
                rate(AccountType::BabyCare, 400),
            ],
        }
    }

    /// Build a custom policy.
    ///
    /// Rejects `Main` as a category, duplicated categories and tables adding
    /// up to more than 100%.
    pub fn new(emergency_bps: u32, categories: Vec<CategoryRate>) -> ResultEngine<Self> {
        let mut total = emergency_bps;
        for (idx, rate) in categories.iter().enumerate() {
            if rate.account_type.is_main() {
                return Err(EngineError::InvalidInput(
                    "Main cannot be a distribution category".to_string(),
                ));
            }
            if categories[..idx]
                .iter()
                .any(|other| other.account_type == rate.account_type)
            {
                return Err(EngineError::InvalidInput(format!(
                    "duplicated distribution category: {}",
                    rate.account_type
                )));
            }
            total = total.saturating_add(rate.bps);
        }
        if total > FULL_BPS {
            return Err(EngineError::InvalidInput(format!(
                "distribution shares add up to {total} bps, more than {FULL_BPS}"
            )));
        }
        Ok(Self {
            emergency_bps,
            categories,
        })
    }

    #[must_use]
    pub fn emergency_bps(&self) -> u32 {
        self.emergency_bps
    }

    #[must_use]
    pub fn categories(&self) -> &[CategoryRate] {
        &self.categories
    }

    /// Split `amount_minor` across the emergency bucket and every category.
    pub fn allocate(&self, amount_minor: i64) -> ResultEngine<Allocation> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let amount = MoneyCents::new(amount_minor);
        let mut allocation = Allocation {
            amount_minor,
            emergency_bps: self.emergency_bps,
            emergency_minor: amount.share_bps(self.emergency_bps).cents(),
            categories: self
                .categories
                .iter()
                .map(|rate| CategoryShare {
                    account_type: rate.account_type,
                    bps: rate.bps,
                    amount_minor: amount.share_bps(rate.bps).cents(),
                })
                .collect(),
        };

        let mut excess = -allocation.residual_minor();
        if excess > 0 {
            let taken = excess.min(allocation.emergency_minor);
            allocation.emergency_minor -= taken;
            excess -= taken;
            for share in allocation.categories.iter_mut().rev() {
                if excess == 0 {
                    break;
                }
                let taken = excess.min(share.amount_minor);
                share.amount_minor -= taken;
                excess -= taken;
            }
        }

        Ok(allocation)
    }
}

/// Format basis points as a percentage (`2000` -> `20%`, `1250` -> `12.5%`).
#[must_use]
pub fn format_bps(bps: u32) -> String {
    let whole = bps / 100;
    let fraction = bps % 100;
    if fraction == 0 {
        format!("{whole}%")
    } else {
        let fraction = format!("{fraction:02}");
        format!("{whole}.{}%", fraction.trim_end_matches('0'))
    }
}
