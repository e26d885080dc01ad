//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness
//! GET  /health/ready            - Readiness (database)
//!
//! # Public content
//! GET  /api/courses
//! GET  /api/faculty
//! GET  /api/notices?type=news|notice
//! GET  /api/founder
//!
//! # Notice popup (per visitor session)
//! GET  /api/popup
//! POST /api/popup/next
//! POST /api/popup/dismiss-all
//!
//! # Contact form (rate limited)
//! POST /api/inquiries
//!
//! # Staff auth (login rate limited)
//! POST /api/auth/login
//! POST /api/auth/logout
//! GET  /api/auth/me
//!
//! # Admin
//! /api/admin/...               - see `admin`
//! ```

pub mod admin;
pub mod auth;
pub mod inquiries;
pub mod popup;
pub mod public;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode, header},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{
    auth_rate_limiter, contact_rate_limiter, create_session_layer, request_id_middleware,
};
use crate::state::AppState;

/// Create the public content routes router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(public::courses))
        .route("/faculty", get(public::faculty))
        .route("/notices", get(public::notices))
        .route("/founder", get(public::founder))
        .route("/popup", get(popup::open))
        .route("/popup/next", post(popup::next))
        .route("/popup/dismiss-all", post(popup::dismiss_all))
        .route(
            "/inquiries",
            post(inquiries::submit).layer(contact_rate_limiter()),
        )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login).layer(auth_rate_limiter()))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api", public_routes())
        .nest("/api/auth", auth_routes())
        .nest("/api/admin", admin::routes())
}

/// CORS for a separately hosted frontend. Cookies are allowed, so the
/// origin must be explicit.
fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let origin = match HeaderValue::from_str(origin) {
        Ok(origin) => origin,
        Err(e) => {
            tracing::warn!(origin, error = %e, "Ignoring invalid SITE_CORS_ORIGIN");
            return None;
        }
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

/// Build the full application: routes, health checks and the middleware
/// stack. Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());
    let cors = state.config().cors_origin.as_deref().and_then(cors_layer);

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(session_layer);

    if let Some(cors) = cors {
        router = router.layer(cors);
    }

    router
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
