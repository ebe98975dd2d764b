//! Business operations. Every function takes the repository as a generic
//! `R` so tests can run them against mocks.

pub mod access;
pub mod audit;
pub mod context;
pub mod customers;
pub mod deals;
pub mod employees;
pub mod errors;
pub mod leads;
pub mod organizations;
pub mod rbac;
pub mod roles;
pub mod scope;

pub use errors::{ServiceError, ServiceResult};
