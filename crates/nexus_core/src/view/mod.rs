//! Read-only projections over [`crate::CrmStore`].
//!
//! Every function recomputes from the raw collections on each call.

pub mod dashboard;
pub mod kanban;
