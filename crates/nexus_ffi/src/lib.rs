//! Flutter bridge surface for the Nexus CRM core.

pub mod api;
