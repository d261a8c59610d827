pub mod audit;
pub mod auth;
pub mod classification;
pub mod files;
pub mod folders;
pub mod users;
pub mod whatsapp;
