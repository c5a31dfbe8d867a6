use std::collections::HashMap;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AccountType, Direction, Engine, EngineError, ForfeitReason, LedgerCategory, LedgerEntry,
    TransferCmd, TransferKind, TransferReference,
};
use migration::MigratorTrait;
use uuid::Uuid;

const EUR_100: i64 = 10_000;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn exec(db: &DatabaseConnection, sql: &str, values: Vec<sea_orm::Value>) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(backend, sql, values))
        .await
        .unwrap();
}

async fn insert_user(db: &DatabaseConnection, name: &str, role: &str) -> Uuid {
    let id = Uuid::new_v4();
    exec(
        db,
        "INSERT INTO users (id, display_name, role) VALUES (?, ?, ?)",
        vec![id.to_string().into(), name.into(), role.into()],
    )
    .await;
    id
}

async fn insert_account(
    db: &DatabaseConnection,
    owner_id: Uuid,
    account_type: AccountType,
    balance_minor: i64,
    parent: Option<Uuid>,
    status: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    let number = format!("ACC-{}", &id.simple().to_string()[..12]);
    exec(
        db,
        "INSERT INTO accounts (id, owner_id, account_type, balance_minor, initial_balance_minor, \
         parent_account_id, account_number, status, currency) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'EUR')",
        vec![
            id.to_string().into(),
            owner_id.to_string().into(),
            account_type.as_str().into(),
            balance_minor.into(),
            balance_minor.into(),
            parent.map(|p| p.to_string()).into(),
            number.into(),
            status.into(),
        ],
    )
    .await;
    id
}

async fn link(db: &DatabaseConnection, funder_id: Uuid, dependent_id: Uuid) {
    exec(
        db,
        "INSERT INTO funder_dependent_links (funder_id, dependent_id, custom_name) VALUES (?, ?, ?)",
        vec![
            funder_id.to_string().into(),
            dependent_id.to_string().into(),
            "Mia".into(),
        ],
    )
    .await;
}

async fn set_status(db: &DatabaseConnection, account_id: Uuid, status: &str) {
    exec(
        db,
        "UPDATE accounts SET status = ? WHERE id = ?",
        vec![status.into(), account_id.to_string().into()],
    )
    .await;
}

struct Family {
    funder: Uuid,
    dependent: Uuid,
    funder_main: Uuid,
    dependent_main: Uuid,
}

/// Linked funder and dependent; the dependent owns the given categories.
async fn family(
    db: &DatabaseConnection,
    funder_balance_minor: i64,
    categories: &[AccountType],
) -> Family {
    let funder = insert_user(db, "Grace Funder", "funder").await;
    let dependent = insert_user(db, "Mia Dependent", "dependent").await;
    let funder_main =
        insert_account(db, funder, AccountType::Main, funder_balance_minor, None, "active").await;
    let dependent_main = insert_account(db, dependent, AccountType::Main, 0, None, "active").await;
    for category in categories {
        insert_account(db, dependent, *category, 0, Some(dependent_main), "active").await;
    }
    link(db, funder, dependent).await;
    Family {
        funder,
        dependent,
        funder_main,
        dependent_main,
    }
}

async fn balance(engine: &Engine, account_id: Uuid) -> i64 {
    engine.account(account_id).await.unwrap().balance_minor
}

async fn category_balance(engine: &Engine, owner: Uuid, account_type: AccountType) -> i64 {
    engine
        .account_by_owner_and_type(owner, account_type)
        .await
        .unwrap()
        .balance_minor
}

/// Every entry on the given accounts, each once.
async fn all_entries(engine: &Engine, accounts: &[Uuid]) -> Vec<LedgerEntry> {
    let mut by_id = HashMap::new();
    for account_id in accounts {
        for entry in engine.entries_for_account(*account_id).await.unwrap() {
            by_id.insert(entry.id, entry);
        }
    }
    by_id.into_values().collect()
}

/// Reference of the credit that pairs with a debit reference.
fn paired_credit_reference(base: &TransferReference, debit_reference: &str) -> String {
    let stem = debit_reference.strip_suffix("-OUT").unwrap();
    if stem == base.as_str() {
        format!("{stem}-IN")
    } else {
        stem.to_string()
    }
}

/// Each debit other than the write-off has exactly one credit of the same
/// amount and transfer, and no credit is left over.
fn assert_paired(entries: &[LedgerEntry]) {
    let debits: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|e| e.direction == Direction::Debit && e.category != LedgerCategory::ForfeitedShare)
        .collect();
    let credits: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|e| e.direction == Direction::Credit)
        .collect();

    for debit in &debits {
        let base = TransferReference::parse(&debit.reference).unwrap();
        let expected = paired_credit_reference(&base, &debit.reference);
        let matches = credits
            .iter()
            .filter(|c| {
                c.amount_minor == debit.amount_minor
                    && c.reference == expected
                    && TransferReference::parse(&c.reference).unwrap() == base
            })
            .count();
        assert_eq!(matches, 1, "{}", debit.reference);
    }
    assert_eq!(debits.len(), credits.len());
}

async fn family_accounts(engine: &Engine, fam: &Family) -> Vec<Uuid> {
    let mut accounts = vec![fam.funder_main, fam.dependent_main];
    accounts.extend(
        engine
            .category_accounts(fam.dependent)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id),
    );
    accounts
}

#[tokio::test]
async fn smart_distribution_splits_by_policy() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 50_000, &AccountType::CATEGORIES).await;

    let result = engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.dependent,
            AccountType::Main,
            EUR_100,
        ))
        .await
        .unwrap();

    assert_eq!(result.kind, TransferKind::SmartDistribution);
    assert_eq!(result.funder_new_balance_minor, 40_000);
    assert_eq!(balance(&engine, fam.funder_main).await, 40_000);
    assert_eq!(balance(&engine, fam.dependent_main).await, 2_000);

    let expected = [
        (AccountType::Healthcare, 2_000),
        (AccountType::Groceries, 1_600),
        (AccountType::Education, 1_600),
        (AccountType::Transport, 800),
        (AccountType::Pregnancy, 800),
        (AccountType::Entertainment, 400),
        (AccountType::Clothing, 400),
        (AccountType::BabyCare, 400),
    ];
    for (account_type, amount) in expected {
        assert_eq!(
            category_balance(&engine, fam.dependent, account_type).await,
            amount,
            "{account_type}"
        );
    }

    let report = result.distribution.unwrap();
    assert_eq!(report.emergency.as_ref().unwrap().share, "20%");
    assert_eq!(report.categories.len(), 8);
    assert!(report.forfeited.is_empty());
    assert_eq!(report.rounding_residual_minor, 0);
    assert_eq!(report.credited_minor(), EUR_100);
}

#[tokio::test]
async fn missing_categories_are_forfeited() {
    let (engine, db) = engine_with_db().await;
    let present: Vec<AccountType> = AccountType::CATEGORIES
        .into_iter()
        .filter(|t| !matches!(t, AccountType::Clothing | AccountType::BabyCare))
        .collect();
    let fam = family(&db, 50_000, &present).await;

    let result = engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.dependent,
            AccountType::Main,
            EUR_100,
        ))
        .await
        .unwrap();

    let report = result.distribution.unwrap();
    assert_eq!(report.credited_minor(), 9_200);
    assert_eq!(report.forfeited_minor(), 800);
    assert!(
        report
            .forfeited
            .iter()
            .all(|f| f.reason == ForfeitReason::MissingAccount)
    );
    // The funder is debited the full amount.
    assert_eq!(balance(&engine, fam.funder_main).await, 40_000);

    let entries = engine
        .entries_for_reference(&result.reference)
        .await
        .unwrap();
    let write_off: Vec<_> = entries
        .iter()
        .filter(|e| e.category == LedgerCategory::ForfeitedShare)
        .collect();
    assert_eq!(write_off.len(), 1);
    assert_eq!(write_off[0].amount_minor, 800);
    assert_eq!(write_off[0].account_id, fam.funder_main);
    assert!(write_off[0].reference.ends_with("-FORFEITED"));

    assert!(engine.reconcile(fam.funder_main).await.unwrap().is_consistent());
}

#[tokio::test]
async fn inactive_category_share_is_forfeited() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 50_000, &AccountType::CATEGORIES).await;
    let groceries = engine
        .account_by_owner_and_type(fam.dependent, AccountType::Groceries)
        .await
        .unwrap();
    set_status(&db, groceries.id, "suspended").await;

    let result = engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.dependent,
            AccountType::Main,
            EUR_100,
        ))
        .await
        .unwrap();

    let report = result.distribution.unwrap();
    assert_eq!(report.forfeited.len(), 1);
    assert_eq!(report.forfeited[0].account_type, AccountType::Groceries);
    assert_eq!(report.forfeited[0].reason, ForfeitReason::InactiveAccount);
    assert_eq!(balance(&engine, groceries.id).await, 0);
}

#[tokio::test]
async fn direct_transfer_credits_one_category() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 50_000, &[AccountType::Healthcare]).await;

    let result = engine
        .transfer(
            TransferCmd::new(fam.funder, fam.dependent, AccountType::Healthcare, 5_000)
                .description("Pharmacy"),
        )
        .await
        .unwrap();

    assert_eq!(result.kind, TransferKind::Direct);
    assert_eq!(balance(&engine, fam.funder_main).await, 45_000);
    assert_eq!(
        category_balance(&engine, fam.dependent, AccountType::Healthcare).await,
        5_000
    );
    assert_eq!(balance(&engine, fam.dependent_main).await, 0);

    let entries = engine
        .entries_for_reference(&result.reference)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
    let debit = entries
        .iter()
        .find(|e| e.direction == Direction::Debit)
        .unwrap();
    let credit = entries
        .iter()
        .find(|e| e.direction == Direction::Credit)
        .unwrap();
    assert_eq!(debit.reference, format!("{}-OUT", result.reference));
    assert_eq!(credit.reference, format!("{}-IN", result.reference));
    assert_eq!(debit.description, "Pharmacy");
    assert_eq!(credit.sender_name.as_deref(), Some("Grace Funder"));
    assert_eq!(credit.recipient_name.as_deref(), Some("Mia Dependent"));
    assert_eq!(credit.category, LedgerCategory::FundTransfer);
}

#[tokio::test]
async fn insufficient_funds_changes_nothing() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 3_000, &AccountType::CATEGORIES).await;

    let err = engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.dependent,
            AccountType::Main,
            5_000,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(balance(&engine, fam.funder_main).await, 3_000);
    assert!(
        engine
            .entries_for_account(fam.funder_main)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn unlinked_funder_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 50_000, &AccountType::CATEGORIES).await;
    let stranger = insert_user(&db, "Stranger", "funder").await;
    insert_account(&db, stranger, AccountType::Main, 50_000, None, "active").await;

    let err = engine
        .transfer(TransferCmd::new(
            stranger,
            fam.dependent,
            AccountType::Healthcare,
            1_000,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Unauthorized(_)));
    assert_eq!(balance(&engine, fam.dependent_main).await, 0);
}

#[tokio::test]
async fn invalid_amounts_are_rejected() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 50_000, &AccountType::CATEGORIES).await;

    for amount in [0, -500] {
        let err = engine
            .transfer(TransferCmd::new(
                fam.funder,
                fam.dependent,
                AccountType::Main,
                amount,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
    assert_eq!(balance(&engine, fam.funder_main).await, 50_000);
}

#[tokio::test]
async fn failed_leg_rolls_back_whole_transfer() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 50_000, &AccountType::CATEGORIES).await;
    set_status(&db, fam.dependent_main, "suspended").await;

    let err = engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.dependent,
            AccountType::Main,
            EUR_100,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::AccountInactive(_)));
    assert_eq!(balance(&engine, fam.funder_main).await, 50_000);
    for account in engine.category_accounts(fam.dependent).await.unwrap() {
        assert_eq!(account.balance_minor, 0);
        assert!(
            engine
                .entries_for_account(account.id)
                .await
                .unwrap()
                .is_empty()
        );
    }
    assert!(
        engine
            .entries_for_account(fam.funder_main)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn direct_transfer_to_missing_category_fails() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 50_000, &[AccountType::Healthcare]).await;

    let err = engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.dependent,
            AccountType::Education,
            1_000,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(balance(&engine, fam.funder_main).await, 50_000);
}

#[tokio::test]
async fn concurrent_transfers_never_overdraw() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, EUR_100, &AccountType::CATEGORIES).await;

    let first = engine.transfer(TransferCmd::new(
        fam.funder,
        fam.dependent,
        AccountType::Healthcare,
        6_000,
    ));
    let second = engine.transfer(TransferCmd::new(
        fam.funder,
        fam.dependent,
        AccountType::Groceries,
        6_000,
    ));
    let (first, second) = tokio::join!(first, second);

    let outcomes = [first, second];
    let committed = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 1);
    // The loser waits for the winner's lock, then sees the reduced balance.
    let rejected: Vec<_> = outcomes.into_iter().filter_map(Result::err).collect();
    assert_eq!(rejected.len(), 1);
    assert!(
        matches!(rejected[0], EngineError::InsufficientFunds(_)),
        "{:?}",
        rejected[0]
    );
    assert_eq!(balance(&engine, fam.funder_main).await, 4_000);
    assert!(engine.reconcile(fam.funder_main).await.unwrap().is_consistent());
}

#[tokio::test]
async fn every_transfer_is_paired_and_reconciles() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 50_000, &AccountType::CATEGORIES).await;

    let smart = engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.dependent,
            AccountType::Main,
            EUR_100,
        ))
        .await
        .unwrap();
    engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.dependent,
            AccountType::Transport,
            1_250,
        ))
        .await
        .unwrap();

    let entries = engine.entries_for_reference(&smart.reference).await.unwrap();
    // Emergency plus eight categories, each a debit and a credit.
    assert_eq!(entries.len(), 18);
    let debits: i64 = entries
        .iter()
        .filter(|e| e.direction == Direction::Debit)
        .map(|e| e.amount_minor)
        .sum();
    let credits: i64 = entries
        .iter()
        .filter(|e| e.direction == Direction::Credit)
        .map(|e| e.amount_minor)
        .sum();
    assert_eq!(debits, EUR_100);
    assert_eq!(credits, EUR_100);

    let base = TransferReference::parse(&smart.reference).unwrap();
    assert!(entries.iter().all(|e| base.owns(&e.reference)));
    assert!(
        entries
            .iter()
            .any(|e| e.reference == format!("{}-BABY_CARE-OUT", smart.reference))
    );

    // Any leg reference resolves the whole transfer.
    let by_leg = engine
        .entries_for_reference(&format!("{}-EMERGENCY", smart.reference))
        .await
        .unwrap();
    assert_eq!(by_leg.len(), entries.len());

    let mut owners = vec![fam.funder_main, fam.dependent_main];
    owners.extend(
        engine
            .category_accounts(fam.dependent)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id),
    );
    for account_id in owners {
        let report = engine.reconcile(account_id).await.unwrap();
        assert!(report.is_consistent(), "{account_id}: {report:?}");
    }

    let history = engine.entries_for_account(fam.funder_main).await.unwrap();
    assert_eq!(history.len(), 10);
    assert!(
        history
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at)
    );
}

#[tokio::test]
async fn odd_amounts_write_off_rounding_residual() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 50_000, &AccountType::CATEGORIES).await;

    let result = engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.dependent,
            AccountType::Main,
            7,
        ))
        .await
        .unwrap();

    let report = result.distribution.unwrap();
    assert_eq!(
        report.credited_minor() + report.forfeited_minor() + report.rounding_residual_minor,
        7
    );
    assert_eq!(balance(&engine, fam.funder_main).await, 50_000 - 7);
    assert!(engine.reconcile(fam.funder_main).await.unwrap().is_consistent());
}

#[tokio::test]
async fn unknown_reference_is_invalid() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .entries_for_reference("not-a-reference")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidReference(_)));

    let err = engine.reconcile(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn statements_are_visible_to_parties_only() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 50_000, &[AccountType::Healthcare]).await;
    let stranger = insert_user(&db, "Stranger", "caregiver").await;

    let result = engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.dependent,
            AccountType::Healthcare,
            1_000,
        ))
        .await
        .unwrap();

    // Funder reads the dependent's account through the link.
    engine
        .account_for_viewer(fam.funder, fam.dependent_main)
        .await
        .unwrap();
    engine
        .account_for_viewer(fam.dependent, fam.dependent_main)
        .await
        .unwrap();
    // The link is one-way.
    let err = engine
        .account_for_viewer(fam.dependent, fam.funder_main)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let legs = engine
        .entries_for_reference_as(fam.dependent, &result.reference)
        .await
        .unwrap();
    assert_eq!(legs.len(), 2);
    let err = engine
        .entries_for_reference_as(stranger, &result.reference)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let unknown = TransferReference::new(fam.funder, fam.dependent);
    let err = engine
        .entries_for_reference_as(fam.funder, unknown.as_str())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn funder_cannot_fund_themselves() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 50_000, &AccountType::CATEGORIES).await;

    let err = engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.funder,
            AccountType::Main,
            1_000,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidInput(_)), "{err:?}");
    assert_eq!(balance(&engine, fam.funder_main).await, 50_000);
}

#[tokio::test]
async fn suspended_beneficiary_main_rejects_tiny_transfers() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 50_000, &AccountType::CATEGORIES).await;
    set_status(&db, fam.dependent_main, "suspended").await;

    // The emergency share of one or two cents rounds to zero.
    for amount in [1, 2] {
        let err = engine
            .transfer(TransferCmd::new(
                fam.funder,
                fam.dependent,
                AccountType::Main,
                amount,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AccountInactive(_)), "{err:?}");
    }

    let err = engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.dependent,
            AccountType::Healthcare,
            500,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AccountInactive(_)), "{err:?}");

    assert_eq!(balance(&engine, fam.funder_main).await, 50_000);
    assert!(all_entries(&engine, &family_accounts(&engine, &fam).await).await.is_empty());
}

#[tokio::test]
async fn legs_stay_paired_with_forfeits_and_odd_amounts() {
    let (engine, db) = engine_with_db().await;
    let present: Vec<AccountType> = AccountType::CATEGORIES
        .into_iter()
        .filter(|t| !matches!(t, AccountType::Clothing | AccountType::BabyCare))
        .collect();
    let fam = family(&db, 50_000, &present).await;

    for amount in [EUR_100, 7, 1_333] {
        engine
            .transfer(TransferCmd::new(
                fam.funder,
                fam.dependent,
                AccountType::Main,
                amount,
            ))
            .await
            .unwrap();
    }
    engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.dependent,
            AccountType::Groceries,
            999,
        ))
        .await
        .unwrap();

    let accounts = family_accounts(&engine, &fam).await;
    let entries = all_entries(&engine, &accounts).await;
    assert_paired(&entries);

    // One write-off per smart distribution at most, all on the funder.
    let write_offs: Vec<_> = entries
        .iter()
        .filter(|e| e.category == LedgerCategory::ForfeitedShare)
        .collect();
    assert!(!write_offs.is_empty() && write_offs.len() <= 3);
    assert!(
        write_offs
            .iter()
            .all(|e| e.account_id == fam.funder_main && e.direction == Direction::Debit)
    );

    assert_eq!(
        balance(&engine, fam.funder_main).await,
        50_000 - EUR_100 - 7 - 1_333 - 999
    );
    for account_id in accounts {
        let report = engine.reconcile(account_id).await.unwrap();
        assert!(report.is_consistent(), "{account_id}: {report:?}");
    }
}

#[tokio::test]
async fn thirteen_cents_never_over_credits() {
    let (engine, db) = engine_with_db().await;
    let fam = family(&db, 50_000, &AccountType::CATEGORIES).await;

    let result = engine
        .transfer(TransferCmd::new(
            fam.funder,
            fam.dependent,
            AccountType::Main,
            13,
        ))
        .await
        .unwrap();

    let report = result.distribution.unwrap();
    assert!(report.credited_minor() <= 13, "{report:?}");
    assert!(report.rounding_residual_minor >= 0);
    assert_eq!(
        report.credited_minor() + report.forfeited_minor() + report.rounding_residual_minor,
        13
    );
    assert_eq!(balance(&engine, fam.funder_main).await, 50_000 - 13);

    let accounts = family_accounts(&engine, &fam).await;
    let credited: i64 = {
        let mut total = 0;
        for account_id in &accounts[1..] {
            total += balance(&engine, *account_id).await;
        }
        total
    };
    assert_eq!(credited, report.credited_minor());

    assert_paired(&all_entries(&engine, &accounts).await);
    for account_id in accounts {
        let report = engine.reconcile(account_id).await.unwrap();
        assert!(report.is_consistent(), "{account_id}: {report:?}");
    }
}
