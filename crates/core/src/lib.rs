//! Hans Institute Core - Shared types and logic.
//!
//! Used by every component of the institute site:
//! - `site` - Public API and admin panel backend
//! - `cli` - Migrations and staff account management
//!
//! # Architecture
//!
//! The core crate has no network or database I/O. Persistence needed by the
//! popup engine is injected through [`popup::KeyValueStore`]; the optional
//! `postgres` feature only adds `sqlx` encodings for the types.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, roles and capabilities, content enums
//! - [`inquiry`] - Contact form validation
//! - [`popup`] - Notice popup state machine and day-scoped dismissals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod inquiry;
pub mod popup;
pub mod types;

pub use types::*;
