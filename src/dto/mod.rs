//! DTO modules that bridge services with the JSON API.

pub mod access;
pub mod query;
pub mod records;
