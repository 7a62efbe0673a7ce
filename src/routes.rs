use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::database::Store;
use crate::handlers;
use crate::middleware::auth_context_middleware;
use crate::state::AppState;

/// Build the full router around an already wired [`AppState`]
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .merge(auth_routes())
        .merge(post_routes())
        // Global middleware
        .layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth_context_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if state.config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
}

fn auth_routes() -> Router<AppState> {
    use handlers::protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami_get))
        .route("/api/auth/status", get(auth::status_get).put(auth::status_put))
}

fn post_routes() -> Router<AppState> {
    use handlers::protected::posts;

    Router::new()
        .route("/api/posts", get(posts::posts_get).post(posts::posts_post))
        .route(
            "/api/posts/:id",
            get(posts::post_get).put(posts::post_put).delete(posts::post_delete),
        )
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Postboard API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/register, /auth/login (public - token acquisition)",
                "auth": "/api/auth/whoami, /api/auth/status (protected)",
                "posts": "/api/posts[/:id] (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "message": "Database temporarily unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    },
                    "status": 503
                })),
            )
        }
    }
}
