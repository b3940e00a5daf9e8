//! Caller-owned token data model for the OAuth 1.0a consumer.

pub mod secret;
pub mod token;

pub use secret::*;
pub use token::*;
