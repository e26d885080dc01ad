//! Domain models for the site.
//!
//! Repository methods return these; handlers serialize them as JSON.

pub mod content;
pub mod session;
pub mod user;

pub use content::{
    Course, CourseInput, FacultyInput, FacultyMember, FounderMessage, FounderMessageInput,
    Inquiry, Notice, NoticeInput,
};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{ActivityEntry, StaffAccess, StaffUser};
