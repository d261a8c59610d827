//! WhatsApp bridge: webhook verification and a command-driven chat bot over
//! the user's vault.

pub mod clients;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use clients::{GraphApiClient, WhatsAppMessenger};
pub use repositories::{PgSessionRepository, SessionRepository};
pub use services::WhatsAppService;
