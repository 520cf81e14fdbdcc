//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::access::Scope;
use crate::application::{CheckpointService, EntryService, SyncService, UserService};
use crate::domain::RepositoryProvider;
use crate::infrastructure::{PasswordHasher, RateLimiter, TokenService};
use crate::interfaces::http::common::{ErrorResponse, MessageResponse};
use crate::interfaces::http::middleware::{auth_middleware, require_scope, AuthState};
use crate::interfaces::http::modules::{
    auth, checkpoints, health, metrics, rate_limit, request_id, supervisor, sync, users,
};

/// Services shared by every route. Axum extracts the specific handler
/// state via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub sync: Arc<SyncService>,
    pub checkpoints: Arc<CheckpointService>,
    pub entries: Arc<EntryService>,
    pub started_at: Arc<Instant>,
}

impl AppState {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users: Arc::new(UserService::new(repos.clone(), hasher, tokens)),
            sync: Arc::new(SyncService::new(repos.clone())),
            checkpoints: Arc::new(CheckpointService::new(repos.clone())),
            entries: Arc::new(EntryService::new(repos)),
            started_at: Arc::new(Instant::now()),
        }
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        AuthState {
            users: Arc::clone(&s.users),
        }
    }
}

impl FromRef<AppState> for auth::AuthHandlerState {
    fn from_ref(s: &AppState) -> Self {
        auth::AuthHandlerState {
            users: Arc::clone(&s.users),
        }
    }
}

impl FromRef<AppState> for sync::SyncHandlerState {
    fn from_ref(s: &AppState) -> Self {
        sync::SyncHandlerState {
            sync: Arc::clone(&s.sync),
        }
    }
}

impl FromRef<AppState> for users::UserHandlerState {
    fn from_ref(s: &AppState) -> Self {
        users::UserHandlerState {
            users: Arc::clone(&s.users),
        }
    }
}

impl FromRef<AppState> for checkpoints::CheckpointHandlerState {
    fn from_ref(s: &AppState) -> Self {
        checkpoints::CheckpointHandlerState {
            checkpoints: Arc::clone(&s.checkpoints),
        }
    }
}

impl FromRef<AppState> for supervisor::SupervisorHandlerState {
    fn from_ref(s: &AppState) -> Self {
        supervisor::SupervisorHandlerState {
            entries: Arc::clone(&s.entries),
            users: Arc::clone(&s.users),
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        health::HealthState {
            started_at: Arc::clone(&s.started_at),
        }
    }
}

/// Cross-cutting router settings taken from `AppConfig`.
#[derive(Clone)]
pub struct RouterOptions {
    pub allowed_origins: Vec<String>,
    pub rate_limiter: Arc<RateLimiter>,
    /// `None` leaves `/metrics` unrouted
    pub metrics: Option<PrometheusHandle>,
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::refresh,
        sync::push,
        sync::pull,
        users::list_users,
        users::create_user,
        users::update_user,
        users::delete_user,
        checkpoints::list_checkpoints,
        checkpoints::create_checkpoint,
        checkpoints::update_checkpoint,
        supervisor::list_entries,
        supervisor::export_entries,
        supervisor::reset_password,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            health::HealthResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RefreshRequest,
            auth::RefreshResponse,
            sync::EntryInput,
            sync::EntryDto,
            sync::SyncPushRequest,
            sync::SyncPushResponse,
            sync::EntryListResponse,
            users::UserDto,
            users::CreateUserRequest,
            users::UpdateUserRequest,
            users::UserListResponse,
            checkpoints::CheckpointDto,
            checkpoints::CreateCheckpointRequest,
            checkpoints::UpdateCheckpointRequest,
            checkpoints::CheckpointListResponse,
            supervisor::ResetPasswordRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness check"),
        (name = "Authentication", description = "Login and access token refresh"),
        (name = "Sync", description = "Offline client push and delta pull"),
        (name = "Users", description = "Admin user management"),
        (name = "Checkpoints", description = "Admin checkpoint management"),
        (name = "Supervisor", description = "Entry review, CSV export and operator password reset"),
    ),
    info(
        title = "GateKeeper API",
        version = "1.0.0",
        description = "Role-based access control and offline sync for checkpoint logging",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(request_id::REQUEST_ID_HEADER),
        ]);

    if allowed_origins.iter().any(|o| o.trim() == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

/// Create the API router with all routes
pub fn create_api_router(state: AppState, options: RouterOptions) -> Router {
    let auth_state = AuthState::from_ref(&state);

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .with_state(state.clone());

    // Sync routes (any authenticated role)
    let sync_routes = Router::new()
        .route("/push", post(sync::push))
        .route("/pull", get(sync::pull))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // Admin routes; the scope check runs after authentication
    let admin_routes = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{user_id}",
            put(users::update_user).delete(users::delete_user),
        )
        .route(
            "/checkpoints",
            get(checkpoints::list_checkpoints).post(checkpoints::create_checkpoint),
        )
        .route(
            "/checkpoints/{checkpoint_id}",
            put(checkpoints::update_checkpoint),
        )
        .route_layer(middleware::from_fn_with_state(
            Scope::Administration,
            require_scope,
        ))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // Supervisor routes
    let supervisor_routes = Router::new()
        .route("/entries", get(supervisor::list_entries))
        .route("/export", get(supervisor::export_entries))
        .route("/reset-password", post(supervisor::reset_password))
        .route_layer(middleware::from_fn_with_state(Scope::Review, require_scope))
        .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(state.clone());

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check).with_state(state))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/sync", sync_routes)
        .nest("/api/v1/admin", admin_routes)
        .nest("/api/v1/supervisor", supervisor_routes);

    if let Some(handle) = options.metrics {
        router = router.route(
            "/metrics",
            get(metrics::prometheus_metrics).with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn_with_state(
            options.rate_limiter,
            rate_limit::rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors_layer(&options.allowed_origins))
}
