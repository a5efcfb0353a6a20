/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasktrack_api::{app::{build_router, AppState}, config::Config};
/// use tasktrack_shared::{db::pool::create_pool, store::PgStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.database_config()).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config)?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use std::{path::Path, sync::Arc};

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, get_service, post, put},
    Router,
};
use tasktrack_shared::{
    auth::{jwt::TokenIssuer, middleware::require_bearer, password::CredentialHasher},
    services::{TaskService, UserDirectory},
    store::Store,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config::Config, middleware::security::SecurityHeadersLayer, routes};

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is an `Arc` or wraps one, so clones are cheap.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub store: Arc<dyn Store>,

    /// Registration and login
    pub users: UserDirectory,

    /// Task operations
    pub tasks: TaskService,

    /// Token issuer shared with the auth gate
    pub tokens: Arc<TokenIssuer>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state over any store backend
    ///
    /// # Errors
    ///
    /// Fails if the signing secret is empty or argon2 rejects the
    /// configured work factor.
    pub fn new<S>(store: Arc<S>, config: Config) -> anyhow::Result<Self>
    where
        S: Store + 'static,
    {
        let tokens = Arc::new(TokenIssuer::new(&config.jwt.secret)?.with_ttl(config.token_ttl()));
        let hasher = Arc::new(CredentialHasher::new(config.password)?);

        let users = UserDirectory::new(store.clone(), hasher, tokens.clone());
        let tasks = TaskService::new(store.clone());

        Ok(Self {
            store,
            users,
            tasks,
            tokens,
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health               # Health check (public)
/// ├── POST /users/register       # public
/// ├── POST /users/login          # public
/// ├── POST /users/logout         # bearer
/// ├── GET  /users/me             # bearer
/// ├── POST /tasks                # bearer
/// ├── GET  /tasks/:id            # bearer, :id is the owner's user ID
/// ├── PUT  /tasks/:id/status     # bearer, :id is the task ID
/// └── GET  *                     # static client shell, index.html fallback
/// ```
///
/// A GET on a path that only has a POST or PUT handler also gets the client
/// shell, never a 405 or a 401.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Bearer authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    let auth = from_fn_with_state(state.tokens.clone(), require_bearer);

    // Health check and account creation (public, no auth)
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/users/register", post(routes::users::register))
        .route("/users/login", post(routes::users::login));

    let protected_routes = Router::new()
        .route("/users/logout", post(routes::users::logout))
        .route("/users/me", get(routes::users::me))
        .route("/tasks", post(routes::tasks::create_task))
        .route("/tasks/:id", get(routes::tasks::list_tasks))
        .route("/tasks/:id/status", put(routes::tasks::advance_status))
        .route_layer(auth);

    let static_dir = Path::new(&state.config.api.static_dir);
    let index = static_dir.join("index.html");
    let client_shell = ServeDir::new(static_dir).fallback(ServeFile::new(&index));

    // Merged by path with the handlers above, outside the auth layer
    let shell = get_service(ServeFile::new(&index));
    let shell_routes = Router::new()
        .route("/users/register", shell.clone())
        .route("/users/login", shell.clone())
        .route("/users/logout", shell.clone())
        .route("/tasks", shell.clone())
        .route("/tasks/:id/status", shell);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(shell_routes)
        .fallback_service(client_shell)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Permissive when no origins are configured, otherwise only the listed ones
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
