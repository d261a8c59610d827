//! Append-only audit trail of user actions (`file_uploaded`, `folder_created`).

pub mod models;
pub mod repositories;
pub mod services;

pub use repositories::{AuditRepository, PgAuditRepository};
pub use services::AuditService;
