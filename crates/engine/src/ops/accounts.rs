//! Account store.
//!
//! Reads go through any connection; locking reads and balance changes take
//! the open transaction explicitly so they can only happen inside a transfer.

use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Account, AccountStatus, AccountType, EngineError, ResultEngine, accounts, links, users,
};

use super::Engine;

/// Whether a read takes a row lock (`SELECT ... FOR UPDATE`).
///
/// SQLite has no row locks; there the transaction's write lock serializes
/// transfers instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Lock {
    None,
    Exclusive,
}

fn with_lock<S: QuerySelect>(query: S, lock: Lock) -> S {
    match lock {
        Lock::None => query,
        Lock::Exclusive => query.lock_exclusive(),
    }
}

pub(crate) async fn find_account<C: ConnectionTrait>(
    db: &C,
    account_id: Uuid,
    lock: Lock,
) -> ResultEngine<Option<Account>> {
    let model = with_lock(accounts::Entity::find_by_id(account_id.to_string()), lock)
        .one(db)
        .await?;
    model.map(Account::try_from).transpose()
}

pub(crate) async fn require_account<C: ConnectionTrait>(
    db: &C,
    account_id: Uuid,
    lock: Lock,
) -> ResultEngine<Account> {
    find_account(db, account_id, lock)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("account {account_id}")))
}

pub(crate) async fn find_account_by_owner_and_type<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    account_type: AccountType,
    lock: Lock,
) -> ResultEngine<Option<Account>> {
    let query = accounts::Entity::find()
        .filter(accounts::Column::OwnerId.eq(owner_id.to_string()))
        .filter(accounts::Column::AccountType.eq(account_type.as_str()));
    let model = with_lock(query, lock).one(db).await?;
    model.map(Account::try_from).transpose()
}

/// Category sub-accounts hanging off `main`, ordered by id so concurrent
/// transfers always lock them in the same order.
pub(crate) async fn list_category_accounts<C: ConnectionTrait>(
    db: &C,
    main: &Account,
    active_only: bool,
    lock: Lock,
) -> ResultEngine<Vec<Account>> {
    let mut query = accounts::Entity::find()
        .filter(accounts::Column::OwnerId.eq(main.owner_id.to_string()))
        .filter(accounts::Column::ParentAccountId.eq(main.id.to_string()))
        .filter(accounts::Column::AccountType.ne(AccountType::Main.as_str()));
    if active_only {
        query = query.filter(accounts::Column::Status.eq(AccountStatus::Active.as_str()));
    }
    let models = with_lock(query.order_by_asc(accounts::Column::Id), lock)
        .all(db)
        .await?;

    let mut children = Vec::with_capacity(models.len());
    for model in models {
        let account = Account::try_from(model)?;
        account.ensure_child_of(main)?;
        children.push(account);
    }
    Ok(children)
}

pub(crate) async fn owner_name<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
) -> ResultEngine<Option<String>> {
    Ok(users::Entity::find_by_id(owner_id.to_string())
        .one(db)
        .await?
        .map(|user| user.display_name))
}

/// Apply `delta_minor` to an account balance and return the new balance.
///
/// Fails with [`EngineError::InsufficientFunds`] instead of letting a balance
/// go negative, and with [`EngineError::AccountInactive`] for suspended or
/// closed accounts.
pub(crate) async fn adjust_balance(
    db_tx: &DatabaseTransaction,
    account_id: Uuid,
    delta_minor: i64,
) -> ResultEngine<i64> {
    let account = require_account(db_tx, account_id, Lock::Exclusive).await?;
    if !account.is_active() {
        return Err(EngineError::AccountInactive(format!(
            "{} account {} is {}",
            account.account_type,
            account.account_number,
            account.status.as_str()
        )));
    }
    let new_balance = account
        .balance_minor
        .checked_add(delta_minor)
        .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))?;
    if new_balance < 0 {
        return Err(EngineError::InsufficientFunds(format!(
            "account {} has {}, needs {}",
            account.account_number,
            account.balance_minor,
            -delta_minor
        )));
    }

    let model = accounts::ActiveModel {
        id: ActiveValue::Set(account_id.to_string()),
        balance_minor: ActiveValue::Set(new_balance),
        ..Default::default()
    };
    model.update(db_tx).await?;
    Ok(new_balance)
}

impl Engine {
    /// Fetch an account by id.
    pub async fn account(&self, account_id: Uuid) -> ResultEngine<Account> {
        require_account(&self.database, account_id, Lock::None).await
    }

    /// Fetch the account of a given type owned by `owner_id`.
    pub async fn account_by_owner_and_type(
        &self,
        owner_id: Uuid,
        account_type: AccountType,
    ) -> ResultEngine<Account> {
        find_account_by_owner_and_type(&self.database, owner_id, account_type, Lock::None)
            .await?
            .ok_or_else(|| {
                EngineError::KeyNotFound(format!("{account_type} account of {owner_id}"))
            })
    }

    /// Active category sub-accounts of `owner_id`.
    pub async fn category_accounts(&self, owner_id: Uuid) -> ResultEngine<Vec<Account>> {
        let main = self
            .account_by_owner_and_type(owner_id, AccountType::Main)
            .await?;
        list_category_accounts(&self.database, &main, true, Lock::None).await
    }

    /// Fetch an account the caller may read: their own, or one owned by a
    /// dependent they are linked to as funder.
    pub async fn account_for_viewer(
        &self,
        caller_id: Uuid,
        account_id: Uuid,
    ) -> ResultEngine<Account> {
        let account = self.account(account_id).await?;
        if account.owner_id == caller_id {
            return Ok(account);
        }
        let link =
            links::Entity::find_by_id((caller_id.to_string(), account.owner_id.to_string()))
                .one(&self.database)
                .await?;
        match link {
            Some(_) => Ok(account),
            None => Err(EngineError::Unauthorized(format!(
                "{caller_id} cannot read account {}",
                account.account_number
            ))),
        }
    }
}
