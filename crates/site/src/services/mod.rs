//! Business logic services for the site.
//!
//! # Services
//!
//! - `activity` - Best-effort admin activity log
//! - `auth` - Email + password staff login
//! - `email` - Inquiry alert delivery via SMTP
//! - `intake` - Contact form validation, storage and alert fan-out
//! - `popup` - Notice popup driven through the visitor session
//! - `users` - Staff account lifecycle

pub mod activity;
pub mod auth;
pub mod email;
pub mod intake;
pub mod popup;
pub mod users;

pub use activity::record_activity;
pub use auth::{AuthError, AuthService};
pub use email::{EmailError, EmailService};
pub use intake::{
    AdminDirectory, InquiryError, InquiryNotifier, InquirySink, IntakeReceipt, IntakeService,
    SmtpNotifier,
};
pub use popup::{PopupError, PopupView, SessionStore};
pub use users::{CreateUserRequest, UpdateCredentialsRequest, UserService};
