//! Structured concurrent lookups.
//!
//! A [`FanOut`] owns a child [`RequestContext`] and a [`JoinSet`] of branches.
//! The first branch to fail cancels the scope so its siblings stop at their
//! next store call, and [`FanOut::join`] still waits for every branch before it
//! returns. Dropping an unjoined scope aborts whatever is still running.

use std::future::Future;

use tokio::task::{JoinError, JoinSet};

use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::transaction::panic_message;

pub struct FanOut<T> {
    ctx: RequestContext,
    tasks: JoinSet<(usize, AppResult<T>)>,
    spawned: usize,
    metrics: Metrics,
}

impl<T: Send + 'static> FanOut<T> {
    /// Opens a scope under `parent`. Cancelling `parent` cancels every
    /// branch; a failing branch never cancels `parent`.
    pub fn new(parent: &RequestContext, metrics: &Metrics) -> Self {
        metrics.inc_fanouts_started();
        Self { ctx: parent.child(), tasks: JoinSet::new(), spawned: 0, metrics: metrics.clone() }
    }

    /// The scope's own context, shared by all branches.
    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    /// Starts a branch. It receives the scope context and should pass it to
    /// every store call so it observes cancellation.
    pub fn spawn<F, Fut>(&mut self, branch: F)
    where
        F: FnOnce(RequestContext) -> Fut,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        let index = self.spawned;
        self.spawned += 1;
        let fut = branch(self.ctx.clone());
        self.tasks.spawn(async move { (index, fut.await) });
    }

    /// Waits for all branches and returns their values in spawn order.
    ///
    /// The first failure the join observes is returned; failures seen after
    /// it (usually `Cancelled` from siblings) are logged and dropped.
    pub async fn join(mut self) -> AppResult<Vec<T>> {
        let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(self.spawned).collect();
        let mut first_failure: Option<AppError> = None;

        while let Some(joined) = self.tasks.join_next().await {
            let err = match joined {
                Ok((index, Ok(value))) => {
                    slots[index] = Some(value);
                    continue;
                }
                Ok((_, Err(e))) => e,
                Err(e) => branch_failure(e),
            };
            if first_failure.is_none() {
                tracing::debug!(request_id = %self.ctx.request_id(), "fan-out branch failed, cancelling siblings: {}", err);
                self.ctx.cancel();
                self.metrics.inc_fanouts_aborted();
                first_failure = Some(err);
            } else {
                tracing::debug!("discarding later fan-out failure: {}", err);
            }
        }

        if let Some(err) = first_failure {
            return Err(err);
        }
        slots
            .into_iter()
            .collect::<Option<Vec<T>>>()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("fan-out branch produced no result")))
    }
}

impl<T> Drop for FanOut<T> {
    fn drop(&mut self) {
        // JoinSet aborts its tasks on drop; cancel too so work that was handed
        // the scope context elsewhere stops as well.
        self.ctx.cancel();
    }
}

fn branch_failure(err: JoinError) -> AppError {
    if err.is_panic() {
        let msg = panic_message(&*err.into_panic());
        tracing::error!("fan-out branch panicked: {}", msg);
        AppError::Internal(anyhow::anyhow!("fan-out branch panicked: {}", msg))
    } else {
        AppError::Internal(anyhow::anyhow!("fan-out branch aborted"))
    }
}
