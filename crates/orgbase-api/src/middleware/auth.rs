//! Bearer token authentication middleware
//!
//! Extracts the access token from the Authorization header, validates it
//! through the authorization gate, and makes the organization-scoped claims
//! available to handlers via Axum's Extension.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use std::sync::Arc;

use orgbase_control::AuthorizationGate;

use crate::models::ErrorResponse;

/// Validates "Authorization: Bearer <token>" and injects [`OrgClaims`] into
/// request extensions. Tokens are the only accepted credential; there is no
/// cookie fallback.
///
/// Returns 401 Unauthorized if the header is missing, not Bearer-shaped, or
/// the token fails signature or expiry validation.
///
/// [`OrgClaims`]: orgbase_auth::OrgClaims
pub async fn require_auth(
    State(gate): State<Arc<AuthorizationGate>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(
                    "Missing Authorization header",
                    "MISSING_AUTH",
                )),
            )
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "Invalid Authorization header format. Expected 'Bearer <token>'",
                "INVALID_AUTH_FORMAT",
            )),
        )
    })?;

    let claims = gate.verify_token(token).map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "Invalid or expired token",
                "INVALID_TOKEN",
            )),
        )
    })?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
