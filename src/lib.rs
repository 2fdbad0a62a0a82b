//! # inventorysvc
//!
//! Inventory backend for authors, books and users, served over HTTP with axum
//! on top of SQLite.
//!
//! ## Core Components
//!
//! - [`context`]: request-scoped cancellation and deadlines
//! - [`store`]: the [`Executor`](store::Executor) every repository call runs on
//! - [`transaction`]: transaction-scoped units of work
//! - [`repository`]: data access for authors, books and users
//! - [`service`]: use cases, including atomic composite writes and concurrent lookups
//! - [`auth`]: bearer tokens and password hashing
//! - [`routes`] and [`middleware`]: the HTTP surface
//! - [`config`], [`db`], [`error`], [`metrics`], [`state`], [`types`], [`validation`]

pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod transaction;
pub mod types;
pub mod validation;

#[cfg(test)]
mod tests;
