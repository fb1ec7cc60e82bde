//! Signed, time-bound access tokens carrying organization-scoped claims

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims embedded in an organization access token.
///
/// The token is self-contained: validity is proven solely by signature and
/// expiry, never by a directory lookup, and the token is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrgClaims {
    /// Subject (admin email)
    pub sub: String,
    /// Organization id the admin belongs to
    pub org_id: String,
    /// Organization name the token is scoped to
    pub org_name: String,
    /// Admin role (always "admin" in this design)
    pub role: String,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiration time (unix timestamp)
    pub exp: i64,
}

impl OrgClaims {
    pub fn new(
        email: String,
        org_id: String,
        org_name: String,
        role: String,
        validity: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: email,
            org_id,
            org_name,
            role,
            iat: now.timestamp(),
            exp: (now + validity).timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Token errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token encoding error: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,
}

/// Issues and validates HS256-signed access tokens with a fixed TTL.
///
/// The signing secret is process-wide and supplied at construction; there is
/// no revocation mechanism beyond natural expiry.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Signature and expiry are the only checks; there is no audience or
        // issuer in this scheme.
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Token lifetime configured for this service
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed token scoped to one admin and their organization.
    pub fn issue(
        &self,
        email: &str,
        org_id: &str,
        org_name: &str,
        role: &str,
    ) -> Result<String, TokenError> {
        let claims = OrgClaims::new(
            email.to_string(),
            org_id.to_string(),
            org_name.to_string(),
            role.to_string(),
            self.ttl,
        );

        let header = Header::new(Algorithm::HS256);
        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    /// Validate a raw token string and return its claims.
    ///
    /// Purely computational: signature check plus expiry comparison against
    /// the current time. An expired-but-well-signed token yields `Expired`;
    /// everything else that fails decoding yields `Invalid`.
    pub fn verify(&self, token: &str) -> Result<OrgClaims, TokenError> {
        let token_data =
            decode::<OrgClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?;

        // jsonwebtoken applies leeway to exp; the claim check is exact.
        if token_data.claims.is_expired() {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims)
    }
}
