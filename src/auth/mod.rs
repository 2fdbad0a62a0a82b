//! Bearer-token issuing/verification and password hashing.

pub mod password;
pub mod token;

pub use token::{AuthTokenService, TokenClaims, TokenError};
