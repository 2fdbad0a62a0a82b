//! Transaction-scoped units of work.
//!
//! [`TransactionManager::with_transaction`] begins a transaction, lends it to a
//! closure, and commits or rolls back depending on how the closure finished.
//! The closure gets `&mut Transaction`, so the handle cannot escape it or be
//! shared between concurrent tasks.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::BoxFuture;
use futures::FutureExt;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::store::Executor;

static NEXT_TX_ID: AtomicU64 = AtomicU64::new(1);

/// An in-flight transaction. Only [`TransactionManager`] creates one, and it
/// is committed or rolled back before `with_transaction` returns.
pub struct Transaction {
    id: u64,
    inner: sqlx::Transaction<'static, Sqlite>,
}

impl Transaction {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Executor that runs repository calls inside this transaction.
    pub fn executor(&mut self) -> Executor<'_> {
        Executor::Tx(self)
    }

    pub(crate) fn connection(&mut self) -> &mut SqliteConnection {
        &mut *self.inner
    }
}

#[derive(Clone)]
pub struct TransactionManager {
    pool: SqlitePool,
    metrics: Metrics,
}

impl TransactionManager {
    pub fn new(pool: SqlitePool, metrics: Metrics) -> Self {
        Self { pool, metrics }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs `unit_of_work` inside a new transaction.
    ///
    /// * `Ok` from the closure commits; a failed commit is returned as the error.
    /// * `Err` from the closure, a panic inside it, or a `ctx` that was
    ///   cancelled by the time it finished rolls back and returns
    ///   [`AppError::TransactionAborted`] wrapping the cause.
    ///
    /// Exactly one of commit or rollback is issued. If the returned future is
    /// dropped before completion, `sqlx` rolls the transaction back when the
    /// connection returns to the pool.
    pub async fn with_transaction<T, F>(&self, ctx: &RequestContext, unit_of_work: F) -> AppResult<T>
    where
        T: Send,
        F: for<'t> FnOnce(RequestContext, &'t mut Transaction) -> BoxFuture<'t, AppResult<T>> + Send,
    {
        let inner = ctx.run(self.pool.begin()).await?;
        let mut tx = Transaction { id: NEXT_TX_ID.fetch_add(1, Ordering::Relaxed), inner };
        let tx_id = tx.id;
        self.metrics.inc_transactions_started();
        tracing::debug!(tx_id, request_id = %ctx.request_id(), "transaction started");

        let outcome = AssertUnwindSafe(async { unit_of_work(ctx.clone(), &mut tx).await }).catch_unwind().await;

        let cause = match outcome {
            Ok(Ok(value)) => match ctx.check() {
                Ok(()) => return self.commit(tx).await.map(|_| value),
                Err(e) => e,
            },
            Ok(Err(e)) => e,
            Err(payload) => {
                // Fatal path: the closure panicked. Roll back, then report it
                // as an internal error instead of resuming the unwind.
                self.metrics.inc_transactions_panicked();
                let msg = panic_message(&*payload);
                tracing::error!(tx_id, "unit of work panicked: {}", msg);
                AppError::Internal(anyhow::anyhow!("unit of work panicked: {}", msg))
            }
        };

        self.rollback(tx, &cause).await;
        Err(AppError::TransactionAborted(Box::new(cause)))
    }

    /// Like [`with_transaction`](Self::with_transaction), but joins the
    /// caller's transaction when `executor` already is one.
    ///
    /// A joined unit of work neither commits nor rolls back; its result is
    /// handed back to the enclosing unit of work, which decides. `Pool`
    /// executors always start a transaction on this manager's pool.
    pub async fn with_transaction_in<T, F>(
        &self,
        ctx: &RequestContext,
        executor: Executor<'_>,
        unit_of_work: F,
    ) -> AppResult<T>
    where
        T: Send,
        F: for<'t> FnOnce(RequestContext, &'t mut Transaction) -> BoxFuture<'t, AppResult<T>> + Send,
    {
        match executor {
            Executor::Tx(tx) => {
                tracing::debug!(tx_id = tx.id(), "joining enclosing transaction");
                ctx.check()?;
                unit_of_work(ctx.clone(), tx).await
            }
            Executor::Pool(_) => self.with_transaction(ctx, unit_of_work).await,
        }
    }

    async fn commit(&self, tx: Transaction) -> AppResult<()> {
        let tx_id = tx.id;
        match tx.inner.commit().await {
            Ok(()) => {
                self.metrics.inc_transactions_committed();
                tracing::debug!(tx_id, "transaction committed");
                Ok(())
            }
            Err(e) => {
                self.metrics.inc_commit_failures();
                tracing::warn!(tx_id, "commit failed: {}", e);
                Err(AppError::from(e).context("commit failed"))
            }
        }
    }

    async fn rollback(&self, tx: Transaction, cause: &AppError) {
        let tx_id = tx.id;
        self.metrics.inc_transactions_rolled_back();
        match tx.inner.rollback().await {
            Ok(()) => tracing::warn!(tx_id, "transaction rolled back: {}", cause),
            Err(e) => tracing::error!(tx_id, "rollback failed ({}) after: {}", e, cause),
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
