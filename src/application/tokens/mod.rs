//! Session tokens.

mod revocation;
mod token_service;

pub use revocation::RevocationSet;
pub use token_service::{IssuedToken, TokenService};
