//! Seed an empty database with demo content.
//!
//! ```bash
//! hans-cli seed
//! ```
//!
//! Skips seeding if any course already exists, so it is safe to re-run.

use thiserror::Error;

use hans_institute_core::{NoticeKind, Priority};
use hans_institute_site::db::{
    CourseRepository, FacultyRepository, FounderMessageRepository, NoticeRepository,
    RepositoryError,
};
use hans_institute_site::models::{CourseInput, FacultyInput, FounderMessageInput, NoticeInput};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: SITE_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn courses() -> Vec<CourseInput> {
    [
        ("IELTS Preparation", "Band-focused coaching for all four modules.", "8 weeks", "Intermediate"),
        ("PTE Academic", "Computer-based test practice with mock exams.", "6 weeks", "Intermediate"),
        ("Japanese Language N5", "Foundation Japanese for study and work abroad.", "3 months", "Beginner"),
    ]
    .into_iter()
    .zip(1..)
    .map(|((title, description, duration, level), display_order)| CourseInput {
        title: title.to_owned(),
        description: description.to_owned(),
        duration: duration.to_owned(),
        level: level.to_owned(),
        image: None,
        price: None,
        display_order,
        is_active: true,
    })
    .collect()
}

fn faculty() -> Vec<FacultyInput> {
    [
        ("Anita Karki", "Senior Instructor", "MA English", "IELTS Writing"),
        ("Bikash Thapa", "Instructor", "BA English", "PTE Speaking"),
    ]
    .into_iter()
    .zip(1..)
    .map(|((name, designation, qualification, specialization), display_order)| FacultyInput {
        name: name.to_owned(),
        designation: designation.to_owned(),
        qualification: qualification.to_owned(),
        specialization: specialization.to_owned(),
        image: None,
        display_order,
        is_active: true,
    })
    .collect()
}

fn notices() -> Vec<NoticeInput> {
    vec![
        NoticeInput {
            title: "New IELTS batch starts Sunday".to_owned(),
            content: "Morning and evening slots are open. Seats are limited.".to_owned(),
            kind: NoticeKind::Notice,
            priority: Priority::Urgent,
            show_as_popup: true,
            is_active: true,
        },
        NoticeInput {
            title: "Office closed for Dashain".to_owned(),
            content: "The office reopens after the festival holidays.".to_owned(),
            kind: NoticeKind::Notice,
            priority: Priority::Important,
            show_as_popup: true,
            is_active: true,
        },
        NoticeInput {
            title: "Students score 8+ bands".to_owned(),
            content: "Congratulations to this month's high achievers.".to_owned(),
            kind: NoticeKind::News,
            priority: Priority::Regular,
            show_as_popup: false,
            is_active: true,
        },
    ]
}

/// Insert demo courses, faculty, notices and a founder message.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), SeedError> {
    let pool = super::connect()
        .await?
        .ok_or(SeedError::MissingDatabaseUrl)?;

    let course_repo = CourseRepository::new(&pool);
    if course_repo.count().await? > 0 {
        tracing::warn!("Content already present, skipping seed");
        return Ok(());
    }

    for course in courses() {
        course_repo.create(&course).await?;
    }

    let faculty_repo = FacultyRepository::new(&pool);
    for member in faculty() {
        faculty_repo.create(&member).await?;
    }

    let notice_repo = NoticeRepository::new(&pool);
    for notice in notices() {
        notice_repo.create(&notice).await?;
    }

    FounderMessageRepository::new(&pool)
        .create(&FounderMessageInput {
            name: "Hans Raj Sharma".to_owned(),
            designation: "Founder".to_owned(),
            message: "Welcome to Hans Institute. We prepare every student for the world.".to_owned(),
            image: None,
            display_order: 0,
            is_active: true,
        })
        .await?;

    tracing::info!("Demo content seeded");
    Ok(())
}
