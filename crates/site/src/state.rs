//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use hans_institute_core::popup::OffsetClock;

use crate::config::SiteConfig;
use crate::services::EmailService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    email: Option<EmailService>,
    clock: OffsetClock,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Email alerts are enabled only when SMTP is configured. An SMTP relay
    /// that cannot be set up is logged and leaves email disabled.
    #[must_use]
    pub fn new(config: SiteConfig, pool: PgPool) -> Self {
        let email = config
            .email
            .as_ref()
            .and_then(|email_config| match EmailService::new(email_config) {
                Ok(service) => Some(service),
                Err(e) => {
                    tracing::warn!(error = %e, "SMTP relay could not be configured, inquiry alerts disabled");
                    None
                }
            });
        let clock = OffsetClock::new(config.utc_offset);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                clock,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The email service, if SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// Clock for the site's local "today".
    #[must_use]
    pub fn clock(&self) -> &OffsetClock {
        &self.inner.clock
    }
}
