//! Authorization gate for protected lifecycle operations

use std::sync::Arc;

use orgbase_auth::{OrgClaims, TokenService};
use tracing::debug;

use crate::error::ControlError;

/// Gate decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

/// Decides whether a token's holder may act on a given organization.
///
/// Expired tokens, bad signatures, and scope mismatches must all be
/// indistinguishable to the caller; only internal logging may differ.
pub struct AuthorizationGate {
    tokens: Arc<TokenService>,
}

impl AuthorizationGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Validate a raw bearer token. Purely computational; no directory
    /// lookup happens here.
    pub fn verify_token(&self, token: &str) -> Result<OrgClaims, ControlError> {
        self.tokens.verify(token).map_err(|err| {
            debug!(error = %err, "token rejected");
            ControlError::Unauthenticated
        })
    }

    /// Compare the token's organization scope against the target.
    pub fn authorize(claims: &OrgClaims, target_org_name: &str) -> Access {
        if claims.org_name == target_org_name {
            Access::Allowed
        } else {
            debug!(
                scoped_to = %claims.org_name,
                target = %target_org_name,
                "token scope mismatch"
            );
            Access::Denied
        }
    }
}
