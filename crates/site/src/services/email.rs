//! Email service for inquiry alerts.
//!
//! Uses SMTP via lettre (STARTTLS relay). Each alert is a multipart message
//! with a plain-text and an HTML body.

use std::fmt::Write as _;

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use hans_institute_core::Email;
use hans_institute_core::inquiry::InquiryDraft;

use crate::config::EmailConfig;

/// Shown in alerts when the visitor left the phone blank.
const PHONE_NOT_PROVIDED: &str = "Not provided";

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for transactional email.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a new-inquiry alert to one staff member.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or sent.
    pub async fn send_inquiry_alert(&self, to: &Email, inquiry: &InquiryDraft) -> Result<(), EmailError> {
        let subject = inquiry_alert_subject(inquiry);
        let text = render_inquiry_alert_text(inquiry);
        let html = render_inquiry_alert_html(inquiry);

        self.send_multipart_email(to.as_str(), &subject, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Subject line of an inquiry alert.
#[must_use]
pub fn inquiry_alert_subject(inquiry: &InquiryDraft) -> String {
    format!("New Inquiry from {}", inquiry.name)
}

/// Plain-text body of an inquiry alert.
#[must_use]
pub fn render_inquiry_alert_text(inquiry: &InquiryDraft) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "A new inquiry was submitted on the website.");
    let _ = writeln!(body);
    let _ = writeln!(body, "Name:    {}", inquiry.name);
    let _ = writeln!(body, "Email:   {}", inquiry.email);
    let _ = writeln!(
        body,
        "Phone:   {}",
        inquiry.phone.as_deref().unwrap_or(PHONE_NOT_PROVIDED)
    );
    let _ = writeln!(body, "Subject: {}", inquiry.subject);
    let _ = writeln!(body);
    let _ = writeln!(body, "{}", inquiry.message);
    body
}

/// HTML body of an inquiry alert. Every visitor-supplied value is escaped.
#[must_use]
pub fn render_inquiry_alert_html(inquiry: &InquiryDraft) -> String {
    let row = |label: &str, value: &str| {
        format!(
            "<tr><td style=\"padding:4px 12px 4px 0;font-weight:bold\">{label}</td>\
             <td style=\"padding:4px 0\">{}</td></tr>",
            escape_html(value)
        )
    };

    let message = escape_html(&inquiry.message).replace('\n', "<br>");

    format!(
        "<!DOCTYPE html><html><body style=\"font-family:sans-serif;color:#222\">\
         <h2>New Website Inquiry</h2>\
         <table>{}{}{}{}</table>\
         <h3>Message</h3><p>{message}</p>\
         </body></html>",
        row("Name", &inquiry.name),
        row("Email", inquiry.email.as_str()),
        row(
            "Phone",
            inquiry.phone.as_deref().unwrap_or(PHONE_NOT_PROVIDED)
        ),
        row("Subject", &inquiry.subject),
    )
}

/// Escape text for inclusion in HTML element content or attributes.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft(phone: Option<&str>) -> InquiryDraft {
        InquiryDraft {
            name: "Hari <b>Bahadur</b>".to_owned(),
            email: Email::parse("hari@example.com").unwrap(),
            phone: phone.map(str::to_owned),
            subject: "Website Inquiry".to_owned(),
            message: "Line one\nLine two & <script>alert(1)</script>".to_owned(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_subject_names_the_sender() {
        assert_eq!(
            inquiry_alert_subject(&draft(None)),
            "New Inquiry from Hari <b>Bahadur</b>"
        );
    }

    #[test]
    fn test_html_body_is_escaped() {
        let html = render_inquiry_alert_html(&draft(None));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Hari &lt;b&gt;Bahadur&lt;/b&gt;"));
        assert!(html.contains("Line one<br>Line two"));
    }

    #[test]
    fn test_missing_phone_reads_not_provided() {
        assert!(render_inquiry_alert_text(&draft(None)).contains("Phone:   Not provided"));
        assert!(render_inquiry_alert_html(&draft(None)).contains("Not provided"));

        let text = render_inquiry_alert_text(&draft(Some("9800000000")));
        assert!(text.contains("Phone:   9800000000"));
    }
}
