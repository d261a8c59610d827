//! Vault files: ingestion of uploads and owner-scoped listing and download.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{FileRepository, PgFileRepository};
pub use services::{FileService, IngestionService};
