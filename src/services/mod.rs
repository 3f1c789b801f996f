//! Typed clients for the two downstream services.

pub mod auth;
pub mod items;

pub use auth::AuthClient;
pub use items::ItemClient;
