//! Use-case orchestration on top of the repositories.
//!
//! Services validate input, pick the executor for each repository call, open
//! transactions for multi-row writes, and run independent lookups through a
//! [`FanOut`] scope.

pub mod auth;
pub mod author;
pub mod book;
pub mod fanout;

pub use auth::AuthService;
pub use author::AuthorService;
pub use book::BookService;
pub use fanout::FanOut;

use crate::auth::AuthTokenService;
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::transaction::TransactionManager;
use crate::validation::Validator;

/// All use cases, wired to one pool.
#[derive(Clone)]
pub struct Services {
    pub authors: AuthorService,
    pub books: BookService,
    pub auth: AuthService,
}

impl Services {
    pub fn new(pool: sqlx::SqlitePool, config: &AppConfig, metrics: Metrics) -> Self {
        let tx = TransactionManager::new(pool.clone(), metrics.clone());
        let validator = Validator::new(config.validation.clone());
        let tokens = AuthTokenService::new(&config.auth);
        Self {
            authors: AuthorService::new(tx.clone(), validator.clone(), metrics.clone()),
            books: BookService::new(tx, validator.clone(), metrics),
            auth: AuthService::new(pool, validator, tokens),
        }
    }
}
