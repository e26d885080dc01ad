//! Admin JSON API, mounted under `/api/admin`.
//!
//! ```text
//! GET    /dashboard                  counts per table + unread inquiries
//! GET    /courses                    POST /courses
//! PUT    /courses/{id}               DELETE /courses/{id}
//! GET    /faculty                    POST /faculty
//! PUT    /faculty/{id}               DELETE /faculty/{id}
//! GET    /notices                    POST /notices
//! PUT    /notices/{id}               DELETE /notices/{id}
//! GET    /founders                   POST /founders
//! PUT    /founders/{id}              DELETE /founders/{id}
//! GET    /inquiries                  POST /inquiries/{id}/read
//! DELETE /inquiries/{id}
//! GET    /users                      POST /users
//! PUT    /users/{id}/profile         PUT /users/{id}/credentials
//! PUT    /users/{id}/role            DELETE /users/{id}/role
//! PUT    /users/{id}/status          DELETE /users/{id}
//! GET    /activity
//! ```

pub mod activity;
pub mod content;
pub mod dashboard;
pub mod inquiries;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;
use content::{courses, faculty, founders, notices};

/// Create the admin API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::stats))
        .route("/courses", get(courses::list).post(courses::create))
        .route("/courses/{id}", put(courses::update).delete(courses::delete))
        .route("/faculty", get(faculty::list).post(faculty::create))
        .route("/faculty/{id}", put(faculty::update).delete(faculty::delete))
        .route("/notices", get(notices::list).post(notices::create))
        .route("/notices/{id}", put(notices::update).delete(notices::delete))
        .route("/founders", get(founders::list).post(founders::create))
        .route("/founders/{id}", put(founders::update).delete(founders::delete))
        .route("/inquiries", get(inquiries::list))
        .route("/inquiries/{id}", axum::routing::delete(inquiries::delete))
        .route("/inquiries/{id}/read", post(inquiries::mark_read))
        .route("/users", get(users::list).post(users::create))
        .route("/users/{id}", axum::routing::delete(users::delete))
        .route("/users/{id}/profile", put(users::update_profile))
        .route("/users/{id}/credentials", put(users::update_credentials))
        .route("/users/{id}/role", put(users::set_role).delete(users::remove_role))
        .route("/users/{id}/status", put(users::set_status))
        .route("/activity", get(activity::list))
}
