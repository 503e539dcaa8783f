//! Database module for SQLite operations.
//!
//! This module provides:
//! - Database initialization and schema creation
//! - SQLite pragma configuration
//! - Repository layer and transaction-scoped sessions

pub mod migrations;
pub mod repo;
pub mod session;

pub use migrations::init_db;
pub use repo::{RepoError, Repository};
pub use session::Session;
