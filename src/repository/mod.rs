//! Data access for authors, books, and users.
//!
//! Repositories are stateless. Each operation takes the request context first
//! and an [`Executor`](crate::store::Executor) second, so the same call runs
//! either on its own pooled connection or inside a caller's transaction.
//! Absence is reported as `Ok(None)`, an empty list, or zero rows affected;
//! an `Err` always means the store itself failed.

pub mod author;
pub mod book;
pub mod user;

pub use author::AuthorRepository;
pub use book::BookRepository;
pub use user::UserRepository;
