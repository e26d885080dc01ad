//! Session-related types.
//!
//! Types stored in the session for authentication and popup state.

use serde::{Deserialize, Serialize};

use hans_institute_core::{Email, UserId};

/// Session-stored user identity.
///
/// Only identifies the user. Role and active status are re-read from the
/// database on every staff request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address at login.
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the visitor's popup queue between requests.
    pub const POPUP: &str = "popup";
}
