//! Inquiry intake.
//!
//! Validates a public contact submission, stores it, then alerts every
//! active admin by email. Storage and recipient lookup go through the
//! [`InquirySink`] and [`AdminDirectory`] seams; delivery goes through
//! [`InquiryNotifier`]. The server wires them to the sqlx repositories and
//! the SMTP service.

use std::future::Future;

use thiserror::Error;
use tracing::instrument;

use hans_institute_core::inquiry::{ContactSubmission, FieldErrors, InquiryDraft};
use hans_institute_core::{Email, InquiryId};

use crate::db::{InquiryRepository, RepositoryError, UserRepository};
use crate::services::email::{EmailError, EmailService};

/// Errors from submitting an inquiry.
#[derive(Debug, Error)]
pub enum InquiryError {
    /// The submission failed validation. Nothing was stored.
    #[error("invalid submission: {0}")]
    Invalid(FieldErrors),

    /// The inquiry could not be stored.
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Persists validated inquiries.
pub trait InquirySink: Send + Sync {
    fn store(
        &self,
        draft: &InquiryDraft,
    ) -> impl Future<Output = Result<InquiryId, RepositoryError>> + Send;
}

/// Looks up who should be alerted about new inquiries.
pub trait AdminDirectory: Send + Sync {
    fn alert_recipients(&self) -> impl Future<Output = Result<Vec<Email>, RepositoryError>> + Send;
}

/// Delivers one inquiry alert.
pub trait InquiryNotifier: Send + Sync {
    /// Whether delivery is configured at all.
    fn enabled(&self) -> bool {
        true
    }

    fn notify(
        &self,
        to: &Email,
        draft: &InquiryDraft,
    ) -> impl Future<Output = Result<(), EmailError>> + Send;
}

impl<T: InquirySink> InquirySink for &T {
    fn store(
        &self,
        draft: &InquiryDraft,
    ) -> impl Future<Output = Result<InquiryId, RepositoryError>> + Send {
        (**self).store(draft)
    }
}

impl<T: AdminDirectory> AdminDirectory for &T {
    fn alert_recipients(&self) -> impl Future<Output = Result<Vec<Email>, RepositoryError>> + Send {
        (**self).alert_recipients()
    }
}

impl<T: InquiryNotifier> InquiryNotifier for &T {
    fn enabled(&self) -> bool {
        (**self).enabled()
    }

    fn notify(
        &self,
        to: &Email,
        draft: &InquiryDraft,
    ) -> impl Future<Output = Result<(), EmailError>> + Send {
        (**self).notify(to, draft)
    }
}

impl InquirySink for InquiryRepository<'_> {
    async fn store(&self, draft: &InquiryDraft) -> Result<InquiryId, RepositoryError> {
        self.create(draft).await.map(|inquiry| inquiry.id)
    }
}

impl AdminDirectory for UserRepository<'_> {
    async fn alert_recipients(&self) -> Result<Vec<Email>, RepositoryError> {
        self.active_staff_emails().await
    }
}

/// SMTP-backed notifier. Without an email service, alerts are skipped.
#[derive(Clone, Copy)]
pub struct SmtpNotifier<'a>(pub Option<&'a EmailService>);

impl InquiryNotifier for SmtpNotifier<'_> {
    fn enabled(&self) -> bool {
        self.0.is_some()
    }

    async fn notify(&self, to: &Email, draft: &InquiryDraft) -> Result<(), EmailError> {
        match self.0 {
            Some(service) => service.send_inquiry_alert(to, draft).await,
            None => Ok(()),
        }
    }
}

/// Outcome of a stored inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeReceipt {
    /// Id of the stored inquiry.
    pub id: InquiryId,
    /// Recipients that were alerted successfully.
    pub notified: usize,
    /// Recipients whose alert failed.
    pub failed: usize,
}

/// Contact form intake.
pub struct IntakeService<S, D, N> {
    sink: S,
    directory: D,
    notifier: N,
}

impl<S: InquirySink, D: AdminDirectory, N: InquiryNotifier> IntakeService<S, D, N> {
    pub const fn new(sink: S, directory: D, notifier: N) -> Self {
        Self {
            sink,
            directory,
            notifier,
        }
    }

    /// Validate, store, and fan out alerts.
    ///
    /// Alert failures are logged and counted; they never undo the stored
    /// inquiry.
    ///
    /// # Errors
    ///
    /// Returns `InquiryError::Invalid` with per-field messages if validation
    /// fails, or `InquiryError::Storage` if the inquiry cannot be stored.
    #[instrument(skip_all)]
    pub async fn submit(&self, submission: &ContactSubmission) -> Result<IntakeReceipt, InquiryError> {
        let draft = submission.validate().map_err(InquiryError::Invalid)?;

        let id = self.sink.store(&draft).await?;
        tracing::info!(inquiry_id = %id, "Inquiry stored");

        let mut receipt = IntakeReceipt {
            id,
            notified: 0,
            failed: 0,
        };

        if !self.notifier.enabled() {
            tracing::info!(inquiry_id = %id, "Email not configured, skipping inquiry alerts");
            return Ok(receipt);
        }

        let recipients = match self.directory.alert_recipients().await {
            Ok(recipients) => recipients,
            Err(e) => {
                tracing::warn!(inquiry_id = %id, error = %e, "Could not load inquiry alert recipients");
                return Ok(receipt);
            }
        };

        for to in &recipients {
            match self.notifier.notify(to, &draft).await {
                Ok(()) => receipt.notified += 1,
                Err(e) => {
                    receipt.failed += 1;
                    tracing::warn!(inquiry_id = %id, to = %to, error = %e, "Inquiry alert failed");
                }
            }
        }

        tracing::info!(
            inquiry_id = %id,
            notified = receipt.notified,
            failed = receipt.failed,
            "Inquiry alerts dispatched"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use hans_institute_core::inquiry::ContactField;

    use super::*;

    #[derive(Default)]
    struct FakeSink {
        stored: Mutex<Vec<InquiryDraft>>,
    }

    impl InquirySink for FakeSink {
        async fn store(&self, draft: &InquiryDraft) -> Result<InquiryId, RepositoryError> {
            self.stored.lock().unwrap().push(draft.clone());
            Ok(InquiryId::generate())
        }
    }

    struct BrokenSink;

    impl InquirySink for BrokenSink {
        async fn store(&self, _draft: &InquiryDraft) -> Result<InquiryId, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    struct FakeDirectory(Vec<&'static str>);

    impl AdminDirectory for FakeDirectory {
        async fn alert_recipients(&self) -> Result<Vec<Email>, RepositoryError> {
            Ok(self.0.iter().map(|e| Email::parse(e).unwrap()).collect())
        }
    }

    /// Records every alert; fails for addresses listed in `reject`.
    #[derive(Default)]
    struct FakeNotifier {
        sent: Mutex<Vec<String>>,
        reject: Vec<&'static str>,
        disabled: bool,
    }

    impl InquiryNotifier for FakeNotifier {
        fn enabled(&self) -> bool {
            !self.disabled
        }

        async fn notify(&self, to: &Email, _draft: &InquiryDraft) -> Result<(), EmailError> {
            self.sent.lock().unwrap().push(to.to_string());
            if self.reject.contains(&to.as_str()) {
                return Err(EmailError::InvalidAddress(to.to_string()));
            }
            Ok(())
        }
    }

    fn valid() -> ContactSubmission {
        ContactSubmission {
            name: "Sita Sharma".to_owned(),
            email: "sita@example.com".to_owned(),
            phone: Some("9800000000".to_owned()),
            subject: None,
            message: "I would like to know about IELTS classes.".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_valid_submission_is_stored_once_and_fans_out() {
        let sink = FakeSink::default();
        let directory = FakeDirectory(vec!["owner@hans.edu.np", "admin@hans.edu.np"]);
        let notifier = FakeNotifier::default();
        let service = IntakeService::new(&sink, &directory, &notifier);

        let receipt = service.submit(&valid()).await.unwrap();

        assert_eq!(sink.stored.lock().unwrap().len(), 1);
        assert_eq!(receipt.notified, 2);
        assert_eq!(receipt.failed, 0);
        assert_eq!(
            *notifier.sent.lock().unwrap(),
            vec!["owner@hans.edu.np", "admin@hans.edu.np"]
        );
    }

    #[tokio::test]
    async fn test_short_name_is_rejected_without_storing() {
        let sink = FakeSink::default();
        let notifier = FakeNotifier::default();
        let service = IntakeService::new(&sink, FakeDirectory(vec!["a@b.co"]), &notifier);

        let submission = ContactSubmission {
            name: "S".to_owned(),
            ..valid()
        };
        let err = service.submit(&submission).await.unwrap_err();

        let InquiryError::Invalid(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains(ContactField::Name));
        assert!(sink.stored.lock().unwrap().is_empty());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_alert_does_not_stop_the_rest() {
        let sink = FakeSink::default();
        let notifier = FakeNotifier {
            reject: vec!["first@hans.edu.np"],
            ..FakeNotifier::default()
        };
        let service = IntakeService::new(
            &sink,
            FakeDirectory(vec!["first@hans.edu.np", "second@hans.edu.np"]),
            &notifier,
        );

        let receipt = service.submit(&valid()).await.unwrap();

        assert_eq!(receipt.notified, 1);
        assert_eq!(receipt.failed, 1);
        assert_eq!(notifier.sent.lock().unwrap().len(), 2);
        assert_eq!(sink.stored.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_notifier_skips_alerts() {
        let sink = FakeSink::default();
        let notifier = FakeNotifier {
            disabled: true,
            ..FakeNotifier::default()
        };
        let service = IntakeService::new(&sink, FakeDirectory(vec!["a@hans.edu.np"]), &notifier);

        let receipt = service.submit(&valid()).await.unwrap();

        assert_eq!(receipt.notified, 0);
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert_eq!(sink.stored.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let notifier = FakeNotifier::default();
        let service = IntakeService::new(BrokenSink, FakeDirectory(vec!["a@hans.edu.np"]), &notifier);

        assert!(matches!(
            service.submit(&valid()).await,
            Err(InquiryError::Storage(_))
        ));
        assert!(notifier.sent.lock().unwrap().is_empty());
    }
}
