//! Admin dashboard counts.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::db::{
    CourseRepository, FacultyRepository, FounderMessageRepository, InquiryRepository,
    NoticeRepository, UserRepository,
};
use crate::error::Result;
use crate::middleware::RequireStaff;
use crate::state::AppState;

/// Row counts shown on the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub courses: i64,
    pub faculty: i64,
    pub notices: i64,
    pub founder_messages: i64,
    pub inquiries: i64,
    pub unread_inquiries: i64,
    pub users: i64,
}

#[tracing::instrument(skip_all)]
pub async fn stats(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    let pool = state.pool();
    let course_repo = CourseRepository::new(pool);
    let faculty_repo = FacultyRepository::new(pool);
    let notice_repo = NoticeRepository::new(pool);
    let founder_repo = FounderMessageRepository::new(pool);
    let inquiry_repo = InquiryRepository::new(pool);
    let user_repo = UserRepository::new(pool);

    let (courses, faculty, notices, founder_messages, total, unread, users) = tokio::try_join!(
        course_repo.count(),
        faculty_repo.count(),
        notice_repo.count(),
        founder_repo.count(),
        inquiry_repo.count(),
        inquiry_repo.unread_count(),
        user_repo.count(),
    )?;

    Ok(Json(DashboardStats {
        courses,
        faculty,
        notices,
        founder_messages,
        inquiries: total,
        unread_inquiries: unread,
        users,
    }))
}
