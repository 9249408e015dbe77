//! Persistence contracts and their SQLite implementations.
//!
//! # Invariants
//! - Repositories validate the connection schema in `try_new` and refuse
//!   unmigrated connections.

pub mod preference_repo;
