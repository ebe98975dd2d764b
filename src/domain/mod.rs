//! Domain aggregates exposed by the CRM service layer.

pub mod access;
pub mod audit_event;
pub mod auth;
pub mod customer;
pub mod deal;
pub mod lead;
pub mod organization;
pub mod role;
pub mod types;
pub mod user;
