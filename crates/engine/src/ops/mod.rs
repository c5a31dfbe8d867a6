use std::{future::Future, pin::Pin};

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::{DistributionPolicy, ResultEngine};

mod accounts;
mod ledger;
mod statements;
mod transfer;

pub use statements::Reconciliation;
pub use transfer::{
    DistributionLine, DistributionReport, ForfeitReason, ForfeitedShare, TransferKind,
    TransferResult, TransferStage,
};

/// Future returned by a [`Engine::with_tx`] body.
pub(crate) type TxFuture<'c, T> = Pin<Box<dyn Future<Output = ResultEngine<T>> + Send + 'c>>;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    policy: DistributionPolicy,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Distribution table used by smart transfers.
    pub fn policy(&self) -> &DistributionPolicy {
        &self.policy
    }

    /// Run `body` inside one database transaction.
    ///
    /// The transaction commits only when `body` returns `Ok`; on error every
    /// pending write is rolled back before the error is handed to the caller.
    pub(crate) async fn with_tx<T, F>(&self, body: F) -> ResultEngine<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c Engine, &'c DatabaseTransaction) -> TxFuture<'c, T>,
    {
        let db_tx = self.database.begin().await?;
        match body(self, &db_tx).await {
            Ok(value) => {
                db_tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = db_tx.rollback().await {
                    tracing::warn!("rollback failed after {err}: {rollback_err}");
                }
                Err(err)
            }
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    policy: Option<DistributionPolicy>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the standard distribution table.
    pub fn policy(mut self, policy: DistributionPolicy) -> EngineBuilder {
        self.policy = Some(policy);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            policy: self.policy.unwrap_or_default(),
        })
    }
}
