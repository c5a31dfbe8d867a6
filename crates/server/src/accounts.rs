//! Read-only account endpoints: statement and reconciliation.

use api_types::ledger::{EntryList, LedgerEntryView, ReconciliationView};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::LedgerEntry;
use uuid::Uuid;

use crate::{ServerError, server::CallerId, server::ServerState};

pub(crate) fn entry_view(entry: LedgerEntry) -> LedgerEntryView {
    LedgerEntryView {
        id: entry.id,
        account_id: entry.account_id,
        direction: entry.direction.as_str().to_string(),
        amount_minor: entry.amount_minor,
        description: entry.description,
        reference: entry.reference,
        category: entry.category.as_str().to_string(),
        sender_name: entry.sender_name,
        sender_account_number: entry.sender_account_number,
        recipient_name: entry.recipient_name,
        recipient_account_number: entry.recipient_account_number,
        merchant_name: entry.merchant_name,
        created_at: entry.created_at,
    }
}

pub async fn entries(
    Extension(caller): Extension<CallerId>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<EntryList>, ServerError> {
    state.engine.account_for_viewer(caller.0, account_id).await?;
    let entries = state.engine.entries_for_account(account_id).await?;
    Ok(Json(EntryList {
        entries: entries.into_iter().map(entry_view).collect(),
    }))
}

pub async fn reconcile(
    Extension(caller): Extension<CallerId>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<ReconciliationView>, ServerError> {
    state.engine.account_for_viewer(caller.0, account_id).await?;
    let report = state.engine.reconcile(account_id).await?;
    Ok(Json(ReconciliationView {
        account_id: report.account_id,
        initial_balance_minor: report.initial_balance_minor,
        stored_balance_minor: report.stored_balance_minor,
        replayed_balance_minor: report.replayed_balance_minor,
        entries: report.entries,
        consistent: report.is_consistent(),
    }))
}
