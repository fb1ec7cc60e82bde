use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::{debug, info};

use orgbase_auth::OrgClaims;
use orgbase_control::{ConflictKind, ControlError};

use crate::models::*;
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a lifecycle error onto the HTTP surface.
///
/// Uniqueness conflicts render as 400 rather than 409 so that clients get a
/// single "fix your input" status for both validation and conflicts.
fn control_error(err: ControlError) -> ApiError {
    match err {
        ControlError::Conflict(ConflictKind::NameTaken) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "Organization name already exists",
                "NAME_EXISTS",
            )),
        ),
        ControlError::Conflict(ConflictKind::EmailTaken) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "Admin email already exists",
                "EMAIL_EXISTS",
            )),
        ),
        ControlError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Organization not found", "ORG_NOT_FOUND")),
        ),
        ControlError::Forbidden => (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Invalid admin credentials", "FORBIDDEN")),
        ),
        ControlError::Unauthenticated => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "Invalid email or password",
                "INVALID_CREDENTIALS",
            )),
        ),
        ControlError::Internal(msg) => {
            tracing::error!(error = %msg, "internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            )
        }
    }
}

fn validation_error(message: &str, code: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(message, code)),
    )
}

fn validate_org_name(name: &str) -> Result<(), ApiError> {
    let len = name.chars().count();
    if !(3..=50).contains(&len) {
        return Err(validation_error(
            "Organization name must be between 3 and 50 characters",
            "INVALID_NAME",
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < 8 {
        return Err(validation_error(
            "Password must be at least 8 characters",
            "WEAK_PASSWORD",
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid {
        return Err(validation_error("Invalid email address", "INVALID_EMAIL"));
    }
    Ok(())
}

fn organization_info(org: orgbase_control::Organization) -> OrganizationInfo {
    OrganizationInfo {
        organization_id: org.id,
        organization_name: org.name,
        storage_unit_id: org.storage_unit_id,
        status: match org.status {
            orgbase_control::OrgStatus::Active => "active".to_string(),
            orgbase_control::OrgStatus::Deleted => "deleted".to_string(),
        },
        created_at: org.created_at,
        updated_at: org.updated_at,
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create an organization with its admin account and storage unit
#[utoipa::path(
    post,
    path = "/api/orgs",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = CreateOrganizationResponse),
        (status = 400, description = "Invalid input or name/email already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "organizations"
)]
pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<CreateOrganizationResponse>), ApiError> {
    validate_org_name(&req.organization_name)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    info!(organization = %req.organization_name, "creating organization");

    let org = state
        .manager
        .create(&req.organization_name, &req.email, &req.password)
        .await
        .map_err(control_error)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrganizationResponse {
            organization_id: org.id,
            organization_name: org.name,
            storage_unit_id: org.storage_unit_id,
            admin_email: req.email,
            created_at: org.created_at,
        }),
    ))
}

/// Get an organization's directory entry by name
#[utoipa::path(
    get,
    path = "/api/orgs/{name}",
    params(
        ("name" = String, Path, description = "Organization name")
    ),
    responses(
        (status = 200, description = "Organization information", body = OrganizationInfo),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "organizations"
)]
pub async fn get_organization(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<OrganizationInfo>, ApiError> {
    debug!(organization = %name, "looking up organization");

    let org = state.manager.get(&name).await.map_err(control_error)?;
    Ok(Json(organization_info(org)))
}

/// Rename an organization, migrating its documents to a new storage unit
#[utoipa::path(
    put,
    path = "/api/orgs/{name}",
    params(
        ("name" = String, Path, description = "Current organization name")
    ),
    request_body = RenameOrganizationRequest,
    responses(
        (status = 200, description = "Organization renamed", body = RenameOrganizationResponse),
        (status = 400, description = "Invalid input or new name already taken", body = ErrorResponse),
        (status = 403, description = "Credentials do not prove ownership", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "organizations"
)]
pub async fn rename_organization(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<RenameOrganizationRequest>,
) -> Result<Json<RenameOrganizationResponse>, ApiError> {
    validate_org_name(&req.new_organization_name)?;
    validate_email(&req.email)?;

    info!(
        old_name = %name,
        new_name = %req.new_organization_name,
        "renaming organization"
    );

    let org = state
        .manager
        .rename(&name, &req.new_organization_name, &req.email, &req.password)
        .await
        .map_err(control_error)?;

    Ok(Json(RenameOrganizationResponse {
        organization_id: org.id,
        organization_name: org.name,
        storage_unit_id: org.storage_unit_id,
        updated_at: org.updated_at,
    }))
}

/// Delete an organization, its admin, and its storage unit
#[utoipa::path(
    delete,
    path = "/api/orgs/{name}",
    params(
        ("name" = String, Path, description = "Organization name")
    ),
    security(
        ("bearer_token" = [])
    ),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token is scoped to a different organization", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "organizations"
)]
pub async fn delete_organization(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Extension(claims): Extension<OrgClaims>,
) -> Result<StatusCode, ApiError> {
    info!(organization = %name, admin = %claims.sub, "deleting organization");

    state
        .manager
        .delete(&name, &claims)
        .await
        .map_err(control_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Exchange admin credentials for an organization-scoped access token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    debug!(email = %req.email, "admin login attempt");

    let admin = state
        .manager
        .authenticate(&req.email, &req.password)
        .await
        .map_err(control_error)?;

    let token = state
        .tokens
        .issue(
            &admin.email,
            &admin.organization_id,
            &admin.organization_name,
            &admin.role,
        )
        .map_err(|err| {
            tracing::error!(error = %err, "token issuance failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            )
        })?;

    let expires_at = (chrono::Utc::now() + state.tokens.ttl()).timestamp();

    info!(email = %admin.email, organization = %admin.organization_name, "admin logged in");

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        expires_at,
    }))
}
