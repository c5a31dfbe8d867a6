//! Ledger recorder.
//!
//! The only writer of ledger entries and the only caller of
//! [`adjust_balance`]: every balance change in the engine is a ledger pair
//! (or a write-off) recorded here, inside the caller's transaction.

use chrono::Utc;
use sea_orm::{DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{
    Account, Direction, EngineError, LedgerCategory, LedgerEntry, ResultEngine, TransferReference,
    ledger,
    reference::LegTag,
};

use super::accounts::{Lock, adjust_balance, owner_name, require_account};

/// One account-to-account leg.
pub(crate) struct PairInput<'a> {
    pub source: &'a Account,
    pub destination: &'a Account,
    pub amount_minor: i64,
    pub description: &'a str,
    pub reference: &'a TransferReference,
    pub leg: LegTag,
    pub category: LedgerCategory,
}

/// Entries written for one leg, with the balances they produced.
#[derive(Clone, Debug)]
pub(crate) struct RecordedPair {
    pub source_balance_minor: i64,
    pub destination_balance_minor: i64,
}

struct Party {
    name: Option<String>,
    account_number: String,
}

async fn party(db_tx: &DatabaseTransaction, account: &Account) -> ResultEngine<Party> {
    Ok(Party {
        name: owner_name(db_tx, account.owner_id).await?,
        account_number: account.account_number.clone(),
    })
}

async fn insert(db_tx: &DatabaseTransaction, entry: &LedgerEntry) -> ResultEngine<()> {
    ledger::ActiveModel::from(entry).insert(db_tx).await?;
    Ok(())
}

/// Move `amount_minor` from `source` to `destination` and write the debit
/// and credit entries.
///
/// Either both sides are applied or the returned error leaves the caller's
/// transaction to be rolled back.
pub(crate) async fn record_pair(
    db_tx: &DatabaseTransaction,
    input: PairInput<'_>,
) -> ResultEngine<RecordedPair> {
    let PairInput {
        source,
        destination,
        amount_minor,
        description,
        reference,
        leg,
        category,
    } = input;

    if amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(
            "ledger amount_minor must be > 0".to_string(),
        ));
    }
    if source.id == destination.id {
        return Err(EngineError::InvalidInput(
            "source and destination accounts must differ".to_string(),
        ));
    }
    source.currency.ensure_same(destination.currency)?;

    let sender = party(db_tx, source).await?;
    let recipient = party(db_tx, destination).await?;

    let source_balance_minor = adjust_balance(db_tx, source.id, -amount_minor).await?;
    let destination_balance_minor = adjust_balance(db_tx, destination.id, amount_minor).await?;

    let created_at = Utc::now();
    let entry = |account_id: Uuid, direction: Direction, leg_reference: String| LedgerEntry {
        id: Uuid::new_v4(),
        account_id,
        direction,
        amount_minor,
        description: description.to_string(),
        reference: leg_reference,
        category,
        sender_name: sender.name.clone(),
        sender_account_number: Some(sender.account_number.clone()),
        recipient_name: recipient.name.clone(),
        recipient_account_number: Some(recipient.account_number.clone()),
        merchant_name: None,
        created_at,
    };
    let debit = entry(source.id, Direction::Debit, reference.debit_reference(leg));
    let credit = entry(
        destination.id,
        Direction::Credit,
        reference.credit_reference(leg),
    );

    insert(db_tx, &debit).await?;
    insert(db_tx, &credit).await?;

    tracing::debug!(
        reference = %reference,
        amount_minor,
        from = %source.account_number,
        to = %destination.account_number,
        "ledger pair recorded"
    );

    Ok(RecordedPair {
        source_balance_minor,
        destination_balance_minor,
    })
}

/// Debit `source` for money that left it without reaching any account
/// (forfeited shares of a smart transfer). Returns the entry and the new
/// source balance.
pub(crate) async fn record_write_off(
    db_tx: &DatabaseTransaction,
    source_id: Uuid,
    amount_minor: i64,
    description: &str,
    reference: &TransferReference,
) -> ResultEngine<(LedgerEntry, i64)> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(
            "write-off amount_minor must be > 0".to_string(),
        ));
    }
    let source = require_account(db_tx, source_id, Lock::Exclusive).await?;
    let sender = party(db_tx, &source).await?;
    let new_balance = adjust_balance(db_tx, source.id, -amount_minor).await?;

    let entry = LedgerEntry {
        id: Uuid::new_v4(),
        account_id: source.id,
        direction: Direction::Debit,
        amount_minor,
        description: description.to_string(),
        reference: reference.debit_reference(LegTag::Forfeited),
        category: LedgerCategory::ForfeitedShare,
        sender_name: sender.name,
        sender_account_number: Some(sender.account_number),
        recipient_name: None,
        recipient_account_number: None,
        merchant_name: None,
        created_at: Utc::now(),
    };
    insert(db_tx, &entry).await?;
    Ok((entry, new_balance))
}
