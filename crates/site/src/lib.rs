//! Hans Institute site backend.
//!
//! Public content API, notice popup, contact form intake and the staff
//! admin API, served by axum over `PostgreSQL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::SiteConfig;
pub use error::AppError;
pub use state::AppState;
