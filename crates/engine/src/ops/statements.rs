//! Read side of the ledger: account statements, transfer lookup and balance
//! reconciliation.

use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, LedgerEntry, ResultEngine, TransferReference, ledger};

use super::{
    Engine,
    accounts::{Lock, require_account},
};

/// Stored balance compared with the balance replayed from the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub account_id: Uuid,
    pub initial_balance_minor: i64,
    pub stored_balance_minor: i64,
    pub replayed_balance_minor: i64,
    pub entries: usize,
}

impl Reconciliation {
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.stored_balance_minor == self.replayed_balance_minor
    }
}

fn to_entries(models: Vec<ledger::Model>) -> ResultEngine<Vec<LedgerEntry>> {
    models.into_iter().map(LedgerEntry::try_from).collect()
}

impl Engine {
    /// Ledger history of one account, newest first.
    pub async fn entries_for_account(&self, account_id: Uuid) -> ResultEngine<Vec<LedgerEntry>> {
        require_account(&self.database, account_id, Lock::None).await?;
        let models = ledger::Entity::find()
            .filter(ledger::Column::AccountId.eq(account_id.to_string()))
            .order_by_desc(ledger::Column::CreatedAt)
            .order_by_asc(ledger::Column::Reference)
            .all(&self.database)
            .await?;
        to_entries(models)
    }

    /// Every entry written by one transfer.
    ///
    /// `reference` may be the base reference or any leg reference.
    pub async fn entries_for_reference(&self, reference: &str) -> ResultEngine<Vec<LedgerEntry>> {
        let base = TransferReference::parse(reference)?;
        let models = ledger::Entity::find()
            .filter(ledger::Column::Reference.starts_with(base.as_str()))
            .order_by_asc(ledger::Column::Reference)
            .order_by_asc(ledger::Column::Direction)
            .all(&self.database)
            .await?;
        to_entries(models)
    }

    /// Legs of one transfer, provided the caller may read at least one of the
    /// accounts involved.
    pub async fn entries_for_reference_as(
        &self,
        caller_id: Uuid,
        reference: &str,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        let entries = self.entries_for_reference(reference).await?;
        if entries.is_empty() {
            return Err(EngineError::KeyNotFound(format!("transfer {reference}")));
        }
        let mut checked: Vec<Uuid> = Vec::new();
        for entry in &entries {
            if checked.contains(&entry.account_id) {
                continue;
            }
            checked.push(entry.account_id);
            match self.account_for_viewer(caller_id, entry.account_id).await {
                Ok(_) => return Ok(entries),
                Err(EngineError::Unauthorized(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Err(EngineError::Unauthorized(format!(
            "{caller_id} is not a party to {reference}"
        )))
    }

    /// Replay an account's ledger on top of its opening balance.
    pub async fn reconcile(&self, account_id: Uuid) -> ResultEngine<Reconciliation> {
        let account = require_account(&self.database, account_id, Lock::None).await?;
        let entries = ledger::Entity::find()
            .filter(ledger::Column::AccountId.eq(account_id.to_string()))
            .all(&self.database)
            .await?;

        let mut replayed = account.initial_balance_minor;
        for model in &entries {
            let entry = LedgerEntry::try_from(model.clone())?;
            replayed += entry.signed_amount_minor();
        }

        let report = Reconciliation {
            account_id,
            initial_balance_minor: account.initial_balance_minor,
            stored_balance_minor: account.balance_minor,
            replayed_balance_minor: replayed,
            entries: entries.len(),
        };
        if !report.is_consistent() {
            tracing::warn!(
                %account_id,
                stored = report.stored_balance_minor,
                replayed = report.replayed_balance_minor,
                "ledger does not reconcile"
            );
        }
        Ok(report)
    }
}
