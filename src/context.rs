//! Request-scoped cancellation and deadline.
//!
//! A [`RequestContext`] is created once per inbound operation and cloned into
//! everything that does I/O on its behalf. It carries no transaction; repository
//! calls receive their [`Executor`](crate::store::Executor) explicitly.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A fresh root context without a deadline.
    pub fn new() -> Self {
        Self { request_id: Uuid::new_v4(), cancel: CancellationToken::new(), deadline: None }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline_at(Instant::now() + timeout)
    }

    /// Tightens the deadline; an earlier existing deadline wins.
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Derives a context that is cancelled with this one but can also be
    /// cancelled on its own without affecting the parent.
    pub fn child(&self) -> Self {
        Self { request_id: self.request_id, cancel: self.cancel.child_token(), deadline: self.deadline }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fails fast if the context is already done.
    pub fn check(&self) -> AppResult<()> {
        if self.is_cancelled() {
            return Err(AppError::Cancelled("request cancelled".to_string()));
        }
        if self.is_expired() {
            return Err(AppError::Cancelled("deadline exceeded".to_string()));
        }
        Ok(())
    }

    /// Awaits `fut` unless the context is cancelled or its deadline passes
    /// first, in which case `fut` is dropped and `Cancelled` is returned.
    pub async fn run<F, T, E>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<AppError>,
    {
        self.check()?;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AppError::Cancelled("request cancelled".to_string())),
            _ = deadline_elapsed(self.deadline) => Err(AppError::Cancelled("deadline exceeded".to_string())),
            res = fut => res.map_err(Into::into),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending::<()>().await,
    }
}
