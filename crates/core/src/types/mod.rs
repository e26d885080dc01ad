//! Core types for the institute site.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod content;
pub mod email;
pub mod id;
pub mod role;

pub use content::{NoticeKind, Priority, presentation_order};
pub use email::{Email, EmailError};
pub use id::*;
pub use role::{Capabilities, Capability, InvalidRole, Role};
