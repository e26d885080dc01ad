//! HTTP middleware stack for the site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors, added in `main`)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (only when `SITE_CORS_ORIGIN` is set)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting on login and the contact form (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{RequireStaff, RequireSuperAdmin, StaffContext, clear_current_user, set_current_user};
pub use rate_limit::{auth_rate_limiter, contact_rate_limiter};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
