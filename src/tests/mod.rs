//! Integration and unit tests for inventorysvc.
//!
//! ## Test Modules
//!
//! - **transaction_tests**: commit/rollback behaviour and transaction visibility
//! - **fanout_tests**: concurrent lookups, cancellation and joining
//! - **repository_tests**: data access through pooled and transactional executors
//! - **service_tests**: use cases, including the atomic and concurrent scenarios
//! - **token_tests**: bearer token issuing and verification
//! - **api_tests**: HTTP endpoints through the full router
//! - **error_tests**: error classification and responses
//! - **config_tests**: configuration loading and validation
//! - **db_tests**: schema initialization and constraints

pub mod db_tests;
pub mod error_tests;
pub mod service_tests;
pub mod token_tests;

use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::config::{AppConfig, DatabaseConfig};

/// A migrated SQLite database in a temporary directory. The directory is
/// removed when this is dropped, so keep it alive for the whole test.
pub(crate) struct TestDb {
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub(crate) async fn test_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let cfg = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("test.db").display()),
        max_connections: 4,
    };
    let pool = crate::db::connect(&cfg).await.unwrap();
    crate::db::init_db(&pool).await.unwrap();
    TestDb { pool, _dir: dir }
}

pub(crate) fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.signature_key = "test-signature-key".to_string();
    cfg
}
