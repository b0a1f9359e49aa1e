pub mod error;
pub mod models;
pub mod notifications;
pub mod settings;
