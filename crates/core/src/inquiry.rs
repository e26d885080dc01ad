//! Contact form validation.
//!
//! The public contact form is untrusted input. [`ContactSubmission::validate`]
//! either produces an [`InquiryDraft`] that is safe to persist or a
//! [`FieldErrors`] map keyed by form field, which the site returns inline
//! next to each input.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{Email, EmailError};

/// Name length bounds (characters, after trimming).
pub const NAME_LENGTH: (usize, usize) = (2, 100);
/// Phone length bounds when a phone number is given.
pub const PHONE_LENGTH: (usize, usize) = (10, 20);
/// Message length bounds.
pub const MESSAGE_LENGTH: (usize, usize) = (10, 1000);
/// Maximum subject length.
pub const SUBJECT_MAX_LENGTH: usize = 200;
/// Subject stored when the visitor leaves it blank.
pub const DEFAULT_SUBJECT: &str = "Website Inquiry";

/// Raw contact form payload as posted by a visitor.
///
/// Missing or wrongly typed fields deserialize as empty so they are
/// reported per field instead of failing the whole request body. Numbers
/// are kept as their decimal text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub subject: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub message: String,
}

fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Ok(None),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_optional_text(deserializer).map(Option::unwrap_or_default)
}

/// A validated inquiry ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InquiryDraft {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

/// Contact form fields that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Subject,
    Message,
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<ContactField, String>);

impl FieldErrors {
    fn add(&mut self, field: ContactField, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message for one field, if it failed validation.
    #[must_use]
    pub fn get(&self, field: ContactField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether `field` failed validation.
    #[must_use]
    pub fn contains(&self, field: ContactField) -> bool {
        self.0.contains_key(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (ContactField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field:?}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn within(s: &str, (min, max): (usize, usize)) -> bool {
    (min..=max).contains(&char_len(s))
}

impl ContactSubmission {
    /// Validate and normalize the submission.
    ///
    /// Text fields are trimmed before their lengths are checked. A blank
    /// phone counts as absent and a blank subject becomes
    /// [`DEFAULT_SUBJECT`].
    ///
    /// # Errors
    ///
    /// Returns every failing field at once so the form can mark them all.
    pub fn validate(&self) -> Result<InquiryDraft, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if !within(name, NAME_LENGTH) {
            errors.add(
                ContactField::Name,
                format!(
                    "Name must be between {} and {} characters",
                    NAME_LENGTH.0, NAME_LENGTH.1
                ),
            );
        }

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(EmailError::TooLong { max }) => {
                errors.add(
                    ContactField::Email,
                    format!("Email must be at most {max} characters"),
                );
                None
            }
            Err(_) => {
                errors.add(ContactField::Email, "Please enter a valid email address");
                None
            }
        };

        let phone = self
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());
        if let Some(phone) = phone
            && !within(phone, PHONE_LENGTH)
        {
            errors.add(
                ContactField::Phone,
                format!(
                    "Phone must be between {} and {} characters",
                    PHONE_LENGTH.0, PHONE_LENGTH.1
                ),
            );
        }

        let subject = self
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SUBJECT);
        if char_len(subject) > SUBJECT_MAX_LENGTH {
            errors.add(
                ContactField::Subject,
                format!("Subject must be at most {SUBJECT_MAX_LENGTH} characters"),
            );
        }

        let message = self.message.trim();
        if !within(message, MESSAGE_LENGTH) {
            errors.add(
                ContactField::Message,
                format!(
                    "Message must be between {} and {} characters",
                    MESSAGE_LENGTH.0, MESSAGE_LENGTH.1
                ),
            );
        }

        match email {
            Some(email) if errors.is_empty() => Ok(InquiryDraft {
                name: name.to_owned(),
                email,
                phone: phone.map(str::to_owned),
                subject: subject.to_owned(),
                message: message.to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid() -> ContactSubmission {
        ContactSubmission {
            name: "Sita Sharma".to_owned(),
            email: "sita@example.com".to_owned(),
            phone: Some("9800000000".to_owned()),
            subject: None,
            message: "I would like to know about the diploma course.".to_owned(),
        }
    }

    #[test]
    fn test_valid_submission_is_normalized() {
        let mut form = valid();
        form.name = "  Sita Sharma  ".to_owned();
        form.email = "Sita@Example.com".to_owned();

        let draft = form.validate().unwrap();
        assert_eq!(draft.name, "Sita Sharma");
        assert_eq!(draft.email.as_str(), "sita@example.com");
        assert_eq!(draft.subject, DEFAULT_SUBJECT);
        assert_eq!(draft.phone.as_deref(), Some("9800000000"));
    }

    #[test]
    fn test_one_character_name_is_rejected() {
        let mut form = valid();
        form.name = "A".to_owned();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(ContactField::Name));
    }

    #[test]
    fn test_name_is_measured_after_trimming() {
        let mut form = valid();
        form.name = "   A   ".to_owned();
        assert!(form.validate().unwrap_err().contains(ContactField::Name));

        form.name = "x".repeat(100);
        assert!(form.validate().is_ok());

        form.name = "x".repeat(101);
        assert!(form.validate().unwrap_err().contains(ContactField::Name));
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let mut form = valid();
        // Two Devanagari characters, six bytes
        form.name = "सि".to_owned();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_blank_phone_is_absent() {
        let mut form = valid();
        form.phone = Some("   ".to_owned());
        assert_eq!(form.validate().unwrap().phone, None);
    }

    #[test]
    fn test_phone_bounds() {
        let mut form = valid();
        form.phone = Some("123456789".to_owned());
        assert!(form.validate().unwrap_err().contains(ContactField::Phone));

        form.phone = Some("+977 1 4000 0000 0000".to_owned());
        assert!(form.validate().unwrap_err().contains(ContactField::Phone));

        form.phone = Some("+977-1-4000000".to_owned());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_message_bounds() {
        let mut form = valid();
        form.message = "too short".to_owned();
        assert!(form.validate().unwrap_err().contains(ContactField::Message));

        form.message = "m".repeat(1000);
        assert!(form.validate().is_ok());

        form.message = "m".repeat(1001);
        assert!(form.validate().unwrap_err().contains(ContactField::Message));
    }

    #[test]
    fn test_email_errors() {
        let mut form = valid();
        form.email = "not-an-email".to_owned();
        assert_eq!(
            form.validate().unwrap_err().get(ContactField::Email),
            Some("Please enter a valid email address")
        );

        form.email = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            form.validate().unwrap_err().get(ContactField::Email),
            Some("Email must be at most 255 characters")
        );
    }

    #[test]
    fn test_custom_subject_is_kept() {
        let mut form = valid();
        form.subject = Some("  Admission  ".to_owned());
        assert_eq!(form.validate().unwrap().subject, "Admission");

        form.subject = Some("s".repeat(201));
        assert!(form.validate().unwrap_err().contains(ContactField::Subject));
    }

    #[test]
    fn test_all_failures_reported_together() {
        let errors = ContactSubmission::default().validate().unwrap_err();
        assert!(errors.contains(ContactField::Name));
        assert!(errors.contains(ContactField::Email));
        assert!(errors.contains(ContactField::Message));
        assert!(!errors.contains(ContactField::Phone));
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let mut form = valid();
        form.name = "A".to_owned();
        let json = serde_json::to_value(form.validate().unwrap_err()).unwrap();
        assert_eq!(json["name"], "Name must be between 2 and 100 characters");
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let form: ContactSubmission = serde_json::from_str(r#"{"name":"Ram"}"#).unwrap();
        assert!(form.email.is_empty());
        assert!(form.phone.is_none());
    }

    #[test]
    fn test_wrongly_typed_fields_are_reported_per_field() {
        let form: ContactSubmission = serde_json::from_str(
            r#"{"name":5,"email":["a@b.com"],"phone":9800000000,"subject":null,"message":true}"#,
        )
        .unwrap();
        assert_eq!(form.name, "5");
        assert!(form.email.is_empty());
        assert_eq!(form.phone.as_deref(), Some("9800000000"));
        assert!(form.subject.is_none());

        let errors = form.validate().unwrap_err();
        assert!(errors.contains(ContactField::Name));
        assert!(errors.contains(ContactField::Email));
        assert!(errors.contains(ContactField::Message));
        assert!(!errors.contains(ContactField::Phone));
    }
}
