use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Counters for the transactional core.
#[derive(Clone)]
pub struct Metrics {
    pub transactions_started: Arc<AtomicU64>,
    pub transactions_committed: Arc<AtomicU64>,
    pub transactions_rolled_back: Arc<AtomicU64>,
    pub transactions_panicked: Arc<AtomicU64>,
    pub commit_failures: Arc<AtomicU64>,
    pub fanouts_started: Arc<AtomicU64>,
    pub fanouts_aborted: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            transactions_started: Arc::new(AtomicU64::new(0)),
            transactions_committed: Arc::new(AtomicU64::new(0)),
            transactions_rolled_back: Arc::new(AtomicU64::new(0)),
            transactions_panicked: Arc::new(AtomicU64::new(0)),
            commit_failures: Arc::new(AtomicU64::new(0)),
            fanouts_started: Arc::new(AtomicU64::new(0)),
            fanouts_aborted: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_transactions_started(&self) {
        self.transactions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_transactions_committed(&self) {
        self.transactions_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_transactions_rolled_back(&self) {
        self.transactions_rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_transactions_panicked(&self) {
        self.transactions_panicked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_commit_failures(&self) {
        self.commit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fanouts_started(&self) {
        self.fanouts_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fanouts_aborted(&self) {
        self.fanouts_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            transactions_started: self.transactions_started.load(Ordering::Relaxed),
            transactions_committed: self.transactions_committed.load(Ordering::Relaxed),
            transactions_rolled_back: self.transactions_rolled_back.load(Ordering::Relaxed),
            transactions_panicked: self.transactions_panicked.load(Ordering::Relaxed),
            commit_failures: self.commit_failures.load(Ordering::Relaxed),
            fanouts_started: self.fanouts_started.load(Ordering::Relaxed),
            fanouts_aborted: self.fanouts_aborted.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub transactions_started: u64,
    pub transactions_committed: u64,
    pub transactions_rolled_back: u64,
    pub transactions_panicked: u64,
    pub commit_failures: u64,
    pub fanouts_started: u64,
    pub fanouts_aborted: u64,
    pub uptime_seconds: u64,
}
