//! Database models shared across the CRM repository.

pub mod audit_event;
pub mod config;
pub mod customer;
pub mod deal;
pub mod lead;
pub mod organization;
pub mod role;
pub mod user;
