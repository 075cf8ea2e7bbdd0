//! Business logic services layer

pub mod account_service;
pub mod authz;

pub use account_service::AccountService;
pub use authz::{evaluate, AccessControlService, Action, PermissionStore};
