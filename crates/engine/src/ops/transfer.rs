//! Transfer orchestrator.
//!
//! A transfer moves through `Validating -> Locking -> Executing -> Committing`
//! and ends either committed or rolled back. The whole operation runs inside a
//! single database transaction: rows are locked funder first, then the
//! beneficiary `Main` account, then its category accounts, and nothing is
//! visible to other readers until commit.

use core::fmt;

use sea_orm::{DatabaseTransaction, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Account, AccountType, EngineError, LedgerCategory, MoneyCents, ResultEngine, TransferCmd,
    TransferReference, links,
    policy::format_bps,
    reference::LegTag,
    util::normalize_optional_text,
};

use super::{
    Engine,
    accounts::{Lock, find_account_by_owner_and_type, list_category_accounts},
    ledger::{PairInput, record_pair, record_write_off},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferStage {
    Validating,
    Locking,
    Executing,
    Committing,
    Committed,
    RolledBack,
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validating => "validating",
            Self::Locking => "locking",
            Self::Executing => "executing",
            Self::Committing => "committing",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Direct,
    SmartDistribution,
}

/// One credited bucket of a smart distribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionLine {
    /// `Main` for the emergency share.
    pub account_type: AccountType,
    pub account_id: Uuid,
    pub share_bps: u32,
    /// Human readable share, e.g. `20%`.
    pub share: String,
    pub amount_minor: i64,
    pub new_balance_minor: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForfeitReason {
    /// The beneficiary has no sub-account for the category.
    MissingAccount,
    /// The sub-account exists but is suspended or closed.
    InactiveAccount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForfeitedShare {
    pub account_type: AccountType,
    pub amount_minor: i64,
    pub reason: ForfeitReason,
}

/// Where every cent of a smart transfer went.
///
/// `debited == credited + forfeited + rounding_residual` always holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub emergency: Option<DistributionLine>,
    pub categories: Vec<DistributionLine>,
    pub forfeited: Vec<ForfeitedShare>,
    pub rounding_residual_minor: i64,
}

impl DistributionReport {
    /// Total credited to beneficiary accounts.
    #[must_use]
    pub fn credited_minor(&self) -> i64 {
        self.emergency
            .iter()
            .chain(self.categories.iter())
            .map(|line| line.amount_minor)
            .sum()
    }

    /// Total of shares whose account was missing or inactive.
    #[must_use]
    pub fn forfeited_minor(&self) -> i64 {
        self.forfeited.iter().map(|share| share.amount_minor).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub reference: String,
    pub kind: TransferKind,
    pub amount_minor: i64,
    pub funder_account_id: Uuid,
    pub funder_new_balance_minor: i64,
    /// Destination of a direct transfer.
    pub destination: Option<DistributionLine>,
    /// Breakdown of a smart distribution.
    pub distribution: Option<DistributionReport>,
}

/// Rows held for the rest of the transfer.
struct Locked {
    funder_main: Account,
    beneficiary_main: Account,
}

impl Engine {
    /// Move `cmd.amount_minor` from the funder's `Main` account to a linked
    /// beneficiary, either directly into one category account or fanned out
    /// by the distribution policy when `cmd.account_type` is `Main`.
    ///
    /// Nothing is persisted unless every leg succeeds.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<TransferResult> {
        let smart = cmd.is_smart_distribution();
        let TransferCmd {
            funder_id,
            beneficiary_id,
            account_type,
            amount_minor,
            description,
        } = cmd;

        tracing::debug!(stage = %TransferStage::Validating, %funder_id, %beneficiary_id);
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        if funder_id == beneficiary_id {
            return Err(EngineError::InvalidInput(
                "funder and beneficiary must differ".to_string(),
            ));
        }
        let description = normalize_optional_text(description.as_deref());

        let outcome = self
            .with_tx(|engine, db_tx| {
                Box::pin(async move {
                    let locked = engine
                        .validate_and_lock(db_tx, funder_id, beneficiary_id, amount_minor)
                        .await?;
                    let reference = TransferReference::new(funder_id, beneficiary_id);

                    tracing::debug!(stage = %TransferStage::Executing, %reference);
                    let result = if smart {
                        let description = description.unwrap_or_else(|| {
                            format!("Smart distribution of {}", MoneyCents::new(amount_minor))
                        });
                        engine
                            .distribute(db_tx, &locked, amount_minor, &description, &reference)
                            .await?
                    } else {
                        let description = description.unwrap_or_else(|| {
                            format!(
                                "Transfer of {} to {account_type}",
                                MoneyCents::new(amount_minor)
                            )
                        });
                        direct(
                            db_tx,
                            &locked,
                            account_type,
                            amount_minor,
                            &description,
                            &reference,
                        )
                        .await?
                    };

                    tracing::debug!(stage = %TransferStage::Committing, %reference);
                    Ok(result)
                })
            })
            .await;

        match &outcome {
            Ok(result) => {
                tracing::info!(
                    stage = %TransferStage::Committed,
                    reference = %result.reference,
                    kind = ?result.kind,
                    amount = %MoneyCents::new(result.amount_minor),
                    "transfer committed"
                );
            }
            Err(err) => {
                tracing::info!(
                    stage = %TransferStage::RolledBack,
                    %funder_id,
                    %beneficiary_id,
                    "transfer rolled back: {err}"
                );
            }
        }
        outcome
    }

    async fn validate_and_lock(
        &self,
        db_tx: &DatabaseTransaction,
        funder_id: Uuid,
        beneficiary_id: Uuid,
        amount_minor: i64,
    ) -> ResultEngine<Locked> {
        let link = links::Entity::find_by_id((funder_id.to_string(), beneficiary_id.to_string()))
            .one(db_tx)
            .await?;
        if link.is_none() {
            return Err(EngineError::Unauthorized(format!(
                "{funder_id} is not linked to {beneficiary_id}"
            )));
        }

        tracing::debug!(stage = %TransferStage::Locking, %funder_id, %beneficiary_id);
        let funder_main =
            find_account_by_owner_and_type(db_tx, funder_id, AccountType::Main, Lock::Exclusive)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound(format!("Main account of funder {funder_id}"))
                })?;
        if funder_main.balance_minor < amount_minor {
            return Err(EngineError::InsufficientFunds(format!(
                "balance {} is lower than {}",
                MoneyCents::new(funder_main.balance_minor),
                MoneyCents::new(amount_minor)
            )));
        }

        let beneficiary_main = find_account_by_owner_and_type(
            db_tx,
            beneficiary_id,
            AccountType::Main,
            Lock::Exclusive,
        )
        .await?
        .ok_or_else(|| {
            EngineError::KeyNotFound(format!("Main account of beneficiary {beneficiary_id}"))
        })?;
        if !beneficiary_main.is_active() {
            return Err(EngineError::AccountInactive(format!(
                "Main account {} of beneficiary {beneficiary_id} is {}",
                beneficiary_main.account_number,
                beneficiary_main.status.as_str()
            )));
        }

        Ok(Locked {
            funder_main,
            beneficiary_main,
        })
    }

    async fn distribute(
        &self,
        db_tx: &DatabaseTransaction,
        locked: &Locked,
        amount_minor: i64,
        description: &str,
        reference: &TransferReference,
    ) -> ResultEngine<TransferResult> {
        let Locked {
            funder_main,
            beneficiary_main,
        } = locked;
        let allocation = self.policy.allocate(amount_minor)?;
        let children =
            list_category_accounts(db_tx, beneficiary_main, false, Lock::Exclusive).await?;

        let mut funder_balance = funder_main.balance_minor;
        let mut emergency = None;
        if allocation.emergency_minor > 0 {
            let pair = record_pair(
                db_tx,
                PairInput {
                    source: funder_main,
                    destination: beneficiary_main,
                    amount_minor: allocation.emergency_minor,
                    description,
                    reference,
                    leg: LegTag::Emergency,
                    category: LedgerCategory::EmergencyFund,
                },
            )
            .await?;
            funder_balance = pair.source_balance_minor;
            emergency = Some(DistributionLine {
                account_type: AccountType::Main,
                account_id: beneficiary_main.id,
                share_bps: allocation.emergency_bps,
                share: format_bps(allocation.emergency_bps),
                amount_minor: allocation.emergency_minor,
                new_balance_minor: pair.destination_balance_minor,
            });
        }

        let mut categories = Vec::new();
        let mut forfeited = Vec::new();
        for share in &allocation.categories {
            if share.amount_minor == 0 {
                continue;
            }
            let target = children
                .iter()
                .find(|account| account.account_type == share.account_type);
            let target = match target {
                Some(account) if account.is_active() => account,
                Some(_) | None => {
                    let reason = if target.is_some() {
                        ForfeitReason::InactiveAccount
                    } else {
                        ForfeitReason::MissingAccount
                    };
                    tracing::warn!(
                        %reference,
                        category = %share.account_type,
                        amount = %MoneyCents::new(share.amount_minor),
                        ?reason,
                        "share forfeited"
                    );
                    forfeited.push(ForfeitedShare {
                        account_type: share.account_type,
                        amount_minor: share.amount_minor,
                        reason,
                    });
                    continue;
                }
            };

            let pair = record_pair(
                db_tx,
                PairInput {
                    source: funder_main,
                    destination: target,
                    amount_minor: share.amount_minor,
                    description,
                    reference,
                    leg: LegTag::Category(share.account_type),
                    category: LedgerCategory::SmartDistribution,
                },
            )
            .await?;
            funder_balance = pair.source_balance_minor;
            categories.push(DistributionLine {
                account_type: share.account_type,
                account_id: target.id,
                share_bps: share.bps,
                share: format_bps(share.bps),
                amount_minor: share.amount_minor,
                new_balance_minor: pair.destination_balance_minor,
            });
        }

        let report = DistributionReport {
            emergency,
            categories,
            forfeited,
            rounding_residual_minor: allocation.residual_minor(),
        };
        let undelivered = report.forfeited_minor() + report.rounding_residual_minor;
        if undelivered > 0 {
            let (_, balance) = record_write_off(
                db_tx,
                funder_main.id,
                undelivered,
                &format!("{description} (undelivered shares)"),
                reference,
            )
            .await?;
            funder_balance = balance;
        }

        if report.credited_minor() + undelivered != amount_minor {
            return Err(EngineError::Integrity(format!(
                "distribution of {amount_minor} does not balance: credited {}, undelivered {undelivered}",
                report.credited_minor()
            )));
        }

        Ok(TransferResult {
            reference: reference.to_string(),
            kind: TransferKind::SmartDistribution,
            amount_minor,
            funder_account_id: funder_main.id,
            funder_new_balance_minor: funder_balance,
            destination: None,
            distribution: Some(report),
        })
    }
}

async fn direct(
    db_tx: &DatabaseTransaction,
    locked: &Locked,
    account_type: AccountType,
    amount_minor: i64,
    description: &str,
    reference: &TransferReference,
) -> ResultEngine<TransferResult> {
    let Locked {
        funder_main,
        beneficiary_main,
    } = locked;
    let target = find_account_by_owner_and_type(
        db_tx,
        beneficiary_main.owner_id,
        account_type,
        Lock::Exclusive,
    )
    .await?
    .ok_or_else(|| {
        EngineError::KeyNotFound(format!(
            "{account_type} account of beneficiary {}",
            beneficiary_main.owner_id
        ))
    })?;
    target.ensure_child_of(beneficiary_main)?;

    let pair = record_pair(
        db_tx,
        PairInput {
            source: funder_main,
            destination: &target,
            amount_minor,
            description,
            reference,
            leg: LegTag::Direct,
            category: LedgerCategory::FundTransfer,
        },
    )
    .await?;

    Ok(TransferResult {
        reference: reference.to_string(),
        kind: TransferKind::Direct,
        amount_minor,
        funder_account_id: funder_main.id,
        funder_new_balance_minor: pair.source_balance_minor,
        destination: Some(DistributionLine {
            account_type,
            account_id: target.id,
            share_bps: 10_000,
            share: format_bps(10_000),
            amount_minor,
            new_balance_minor: pair.destination_balance_minor,
        }),
        distribution: None,
    })
}
