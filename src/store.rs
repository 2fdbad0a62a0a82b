//! Where a repository call executes.
//!
//! Every repository operation takes an [`Executor`] argument instead of looking
//! for a transaction somewhere in the request context. `Executor::Pool` runs the
//! call on a connection checked out for that call only; `Executor::Tx` runs it
//! inside the caller's transaction.

use std::ops::{Deref, DerefMut};

use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

use crate::context::RequestContext;
use crate::error::AppResult;
use crate::transaction::Transaction;

pub enum Executor<'a> {
    Pool(&'a SqlitePool),
    Tx(&'a mut Transaction),
}

impl<'a> Executor<'a> {
    pub fn in_transaction(&self) -> bool {
        matches!(self, Executor::Tx(_))
    }

    /// Id of the transaction this executor runs in, if any.
    pub fn transaction_id(&self) -> Option<u64> {
        match self {
            Executor::Pool(_) => None,
            Executor::Tx(tx) => Some(tx.id()),
        }
    }

    /// Borrows the executor again for one more call.
    pub fn reborrow(&mut self) -> Executor<'_> {
        match self {
            Executor::Pool(pool) => Executor::Pool(*pool),
            Executor::Tx(tx) => Executor::Tx(&mut **tx),
        }
    }

    /// Resolves to a connection: a fresh pooled one, or the transaction's own.
    pub(crate) async fn acquire(self, ctx: &RequestContext) -> AppResult<Conn<'a>> {
        match self {
            Executor::Pool(pool) => Ok(Conn::Pooled(ctx.run(pool.acquire()).await?)),
            Executor::Tx(tx) => Ok(Conn::Borrowed(tx.connection())),
        }
    }
}

impl<'a> From<&'a SqlitePool> for Executor<'a> {
    fn from(pool: &'a SqlitePool) -> Self {
        Executor::Pool(pool)
    }
}

impl<'a> From<&'a mut Transaction> for Executor<'a> {
    fn from(tx: &'a mut Transaction) -> Self {
        Executor::Tx(tx)
    }
}

pub(crate) enum Conn<'a> {
    Pooled(PoolConnection<Sqlite>),
    Borrowed(&'a mut SqliteConnection),
}

impl Deref for Conn<'_> {
    type Target = SqliteConnection;

    fn deref(&self) -> &SqliteConnection {
        match self {
            Conn::Pooled(c) => &**c,
            Conn::Borrowed(c) => &**c,
        }
    }
}

impl DerefMut for Conn<'_> {
    fn deref_mut(&mut self) -> &mut SqliteConnection {
        match self {
            Conn::Pooled(c) => &mut **c,
            Conn::Borrowed(c) => &mut **c,
        }
    }
}
