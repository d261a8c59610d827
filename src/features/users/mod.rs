//! Vault accounts.
//!
//! Rows are created by sign-up (keyed by the identity provider's user id) or
//! lazily by the WhatsApp bridge for unknown phone numbers.

pub mod models;
pub mod repositories;

pub use repositories::{PgUserRepository, UserRepository};
