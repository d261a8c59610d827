//! User folders: a per-user tree, listed and created through the API.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{FolderRepository, PgFolderRepository};
pub use services::FolderService;
