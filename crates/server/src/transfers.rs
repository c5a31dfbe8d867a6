//! Transfer endpoints.

use api_types::{
    ledger::EntryList,
    transfer::{AllocationView, ForfeitView, TransferCreated, TransferKind, TransferNew},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{
    AccountType, DistributionLine, ForfeitReason, MoneyCents, TransferCmd, TransferResult,
};

use crate::{ServerError, accounts::entry_view, server::CallerId, server::ServerState};

fn allocation_view(line: DistributionLine) -> AllocationView {
    AllocationView {
        account_type: line.account_type.to_string(),
        account_id: line.account_id,
        share: line.share,
        amount_minor: line.amount_minor,
        new_balance_minor: line.new_balance_minor,
    }
}

fn created_view(result: TransferResult) -> TransferCreated {
    let kind = match result.kind {
        engine::TransferKind::Direct => TransferKind::Direct,
        engine::TransferKind::SmartDistribution => TransferKind::SmartDistribution,
    };
    let (emergency, categories, forfeited, rounding_residual_minor) = match result.distribution {
        Some(report) => (
            report.emergency.map(allocation_view),
            report.categories.into_iter().map(allocation_view).collect(),
            report
                .forfeited
                .into_iter()
                .map(|share| ForfeitView {
                    account_type: share.account_type.to_string(),
                    amount_minor: share.amount_minor,
                    reason: match share.reason {
                        ForfeitReason::MissingAccount => "missing_account",
                        ForfeitReason::InactiveAccount => "inactive_account",
                    }
                    .to_string(),
                })
                .collect(),
            report.rounding_residual_minor,
        ),
        None => (None, Vec::new(), Vec::new(), 0),
    };

    TransferCreated {
        reference: result.reference,
        kind,
        amount_minor: result.amount_minor,
        funder_new_balance_minor: result.funder_new_balance_minor,
        destination: result.destination.map(allocation_view),
        emergency,
        categories,
        forfeited,
        rounding_residual_minor,
    }
}

pub async fn transfer_new(
    Extension(caller): Extension<CallerId>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransferCreated>), ServerError> {
    let account_type = AccountType::try_from(payload.account_type.as_str())?;
    let amount_minor = match (payload.amount_minor, payload.amount.as_deref()) {
        (Some(cents), None) => cents,
        (None, Some(text)) => text.parse::<MoneyCents>()?.cents(),
        _ => {
            return Err(ServerError::Generic(
                "exactly one of amount_minor and amount is required".to_string(),
            ));
        }
    };
    let mut cmd = TransferCmd::new(caller.0, payload.beneficiary_id, account_type, amount_minor);
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let result = state.engine.transfer(cmd).await?;
    Ok((StatusCode::CREATED, Json(created_view(result))))
}

pub async fn transfer_get(
    Extension(caller): Extension<CallerId>,
    State(state): State<ServerState>,
    Path(reference): Path<String>,
) -> Result<Json<EntryList>, ServerError> {
    let entries = state
        .engine
        .entries_for_reference_as(caller.0, &reference)
        .await?;
    Ok(Json(EntryList {
        entries: entries.into_iter().map(entry_view).collect(),
    }))
}
