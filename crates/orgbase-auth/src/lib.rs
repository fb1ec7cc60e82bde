//! Credential verification and token issuance for the organization service

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, PasswordError};
pub use token::{OrgClaims, TokenError, TokenService};
