//! Public content: courses, faculty, notices, founder messages, inquiries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hans_institute_core::popup::PopupNotice;
use hans_institute_core::{
    CourseId, Email, FacultyId, FounderMessageId, InquiryId, NoticeId, NoticeKind, Priority,
};

/// A course offered by the institute.
#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub level: String,
    pub image: Option<String>,
    pub price: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a course.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseInput {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub level: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

/// A faculty member.
#[derive(Debug, Clone, Serialize)]
pub struct FacultyMember {
    pub id: FacultyId,
    pub name: String,
    pub designation: String,
    pub qualification: String,
    pub specialization: String,
    pub image: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a faculty member.
#[derive(Debug, Clone, Deserialize)]
pub struct FacultyInput {
    pub name: String,
    pub designation: String,
    pub qualification: String,
    pub specialization: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

/// A news item or notice.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub id: NoticeId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: NoticeKind,
    pub priority: Priority,
    pub show_as_popup: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Notice> for PopupNotice {
    fn from(notice: Notice) -> Self {
        Self {
            id: notice.id,
            title: notice.title,
            content: notice.content,
            priority: notice.priority,
            created_at: notice.created_at,
        }
    }
}

/// Editable fields of a notice.
#[derive(Debug, Clone, Deserialize)]
pub struct NoticeInput {
    pub title: String,
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: NoticeKind,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub show_as_popup: bool,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

/// A message from the institute's founder.
#[derive(Debug, Clone, Serialize)]
pub struct FounderMessage {
    pub id: FounderMessageId,
    pub name: String,
    pub designation: String,
    pub message: String,
    pub image: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a founder message.
#[derive(Debug, Clone, Deserialize)]
pub struct FounderMessageInput {
    pub name: String,
    pub designation: String,
    pub message: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

/// A stored contact-form inquiry.
#[derive(Debug, Clone, Serialize)]
pub struct Inquiry {
    pub id: InquiryId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

const fn active_by_default() -> bool {
    true
}

/// Fail with the name of the first blank required field.
fn require(fields: &[(&str, &str)]) -> Result<(), String> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(format!("{name} is required")),
        None => Ok(()),
    }
}

/// Blank optional text is stored as NULL.
fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl CourseInput {
    /// Trim text fields and check required ones.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first missing field.
    pub fn normalized(self) -> Result<Self, String> {
        require(&[
            ("title", &self.title),
            ("description", &self.description),
            ("duration", &self.duration),
            ("level", &self.level),
        ])?;
        Ok(Self {
            title: self.title.trim().to_owned(),
            description: self.description.trim().to_owned(),
            duration: self.duration.trim().to_owned(),
            level: self.level.trim().to_owned(),
            image: blank_to_none(self.image),
            price: blank_to_none(self.price),
            ..self
        })
    }
}

impl FacultyInput {
    /// Trim text fields and check required ones.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first missing field.
    pub fn normalized(self) -> Result<Self, String> {
        require(&[
            ("name", &self.name),
            ("designation", &self.designation),
            ("qualification", &self.qualification),
            ("specialization", &self.specialization),
        ])?;
        Ok(Self {
            name: self.name.trim().to_owned(),
            designation: self.designation.trim().to_owned(),
            qualification: self.qualification.trim().to_owned(),
            specialization: self.specialization.trim().to_owned(),
            image: blank_to_none(self.image),
            ..self
        })
    }
}

impl NoticeInput {
    /// Trim text fields and check required ones.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first missing field.
    pub fn normalized(self) -> Result<Self, String> {
        require(&[("title", &self.title), ("content", &self.content)])?;
        Ok(Self {
            title: self.title.trim().to_owned(),
            content: self.content.trim().to_owned(),
            ..self
        })
    }
}

impl FounderMessageInput {
    /// Trim text fields and check required ones.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first missing field.
    pub fn normalized(self) -> Result<Self, String> {
        require(&[
            ("name", &self.name),
            ("designation", &self.designation),
            ("message", &self.message),
        ])?;
        Ok(Self {
            name: self.name.trim().to_owned(),
            designation: self.designation.trim().to_owned(),
            message: self.message.trim().to_owned(),
            image: blank_to_none(self.image),
            ..self
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_input_defaults() {
        let input: NoticeInput =
            serde_json::from_str(r#"{"title":"Exam","content":"Starts Monday"}"#).unwrap();
        assert_eq!(input.kind, NoticeKind::Notice);
        assert_eq!(input.priority, Priority::Regular);
        assert!(!input.show_as_popup);
        assert!(input.is_active);
    }

    #[test]
    fn test_notice_input_reads_type_field() {
        let input: NoticeInput = serde_json::from_str(
            r#"{"title":"Result","content":"Out now","type":"news","priority":"urgent"}"#,
        )
        .unwrap();
        assert_eq!(input.kind, NoticeKind::News);
        assert_eq!(input.priority, Priority::Urgent);
    }

    #[test]
    fn test_course_input_requires_fields() {
        let input: CourseInput = serde_json::from_str(
            r#"{"title":"  ","description":"d","duration":"3 months","level":"Beginner"}"#,
        )
        .unwrap();
        assert_eq!(input.normalized().unwrap_err(), "title is required");
    }

    #[test]
    fn test_course_input_trims_and_clears_blank_optionals() {
        let input: CourseInput = serde_json::from_str(
            r#"{"title":" Korean ","description":"d","duration":"3 months","level":"Beginner","image":"  ","price":" Rs. 15000 "}"#,
        )
        .unwrap();
        let input = input.normalized().unwrap();
        assert_eq!(input.title, "Korean");
        assert_eq!(input.image, None);
        assert_eq!(input.price.as_deref(), Some("Rs. 15000"));
    }

    #[test]
    fn test_notice_serializes_kind_as_type() {
        let notice = Notice {
            id: NoticeId::generate(),
            title: "t".to_owned(),
            content: "c".to_owned(),
            kind: NoticeKind::News,
            priority: Priority::Important,
            show_as_popup: true,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["type"], "news");
        assert_eq!(json["priority"], "important");
    }
}
