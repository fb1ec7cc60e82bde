pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use orgbase_auth::TokenService;
use orgbase_control::{AuthorizationGate, LifecycleManager};

/// Application state shared across handlers
pub struct AppState {
    pub manager: Arc<LifecycleManager>,
    pub tokens: Arc<TokenService>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Orgbase API",
        version = "0.1.0",
        description = "REST API for managing multi-tenant organizations",
        contact(
            name = "Orgbase Team",
            email = "team@orgbase.io"
        )
    ),
    paths(
        handlers::health_check,
        handlers::create_organization,
        handlers::get_organization,
        handlers::rename_organization,
        handlers::delete_organization,
        handlers::login,
    ),
    components(
        schemas(
            models::CreateOrganizationRequest,
            models::CreateOrganizationResponse,
            models::OrganizationInfo,
            models::RenameOrganizationRequest,
            models::RenameOrganizationResponse,
            models::LoginRequest,
            models::TokenResponse,
            models::HealthResponse,
            models::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "organizations", description = "Organization lifecycle endpoints"),
        (name = "auth", description = "Admin authentication endpoints"),
        (name = "system", description = "System health and info endpoints")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for development)
    pub enable_cors: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            enable_cors: true,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
    gate: Arc<AuthorizationGate>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(
        config: ApiServerConfig,
        manager: Arc<LifecycleManager>,
        tokens: Arc<TokenService>,
    ) -> Self {
        let gate = Arc::new(AuthorizationGate::new(tokens.clone()));
        let state = Arc::new(AppState { manager, tokens });

        Self {
            config,
            state,
            gate,
        }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        // PUBLIC routes (no token required; rename proves ownership with
        // credentials in the request body)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/auth/login", post(handlers::login))
            .route("/api/orgs", post(handlers::create_organization))
            .route(
                "/api/orgs/{name}",
                get(handlers::get_organization).put(handlers::rename_organization),
            )
            .with_state(self.state.clone());

        // PROTECTED routes (require a bearer token scoped to the target
        // organization)
        let protected_router = Router::new()
            .route(
                "/api/orgs/{name}",
                axum::routing::delete(handlers::delete_organization),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                self.gate.clone(),
                middleware::require_auth,
            ));

        let api_router = public_router.merge(protected_router);

        // SwaggerUi automatically creates a route for /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        // Bearer-only auth carries no cookies, so a permissive CORS policy
        // is safe here.
        let cors = self.config.enable_cors.then(|| {
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_origin(Any)
        });

        let mut router = router.layer(TraceLayer::new_for_http());

        if let Some(cors) = cors {
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let bind_addr = self.config.bind_addr;
        let router = self.build_router();

        info!("Starting API server on {}", bind_addr);
        info!("OpenAPI spec: http://{}/api/openapi.json", bind_addr);
        info!("Swagger UI: http://{}/swagger-ui", bind_addr);

        let listener = tokio::net::TcpListener::bind(bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        // Ensure OpenAPI spec can be generated without panics
        let _api_doc = ApiDoc::openapi();
    }
}
