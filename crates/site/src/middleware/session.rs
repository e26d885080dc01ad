//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The same
//! cookie carries a signed-in staff identity and an anonymous visitor's
//! popup state. The cookie is signed with the key derived from
//! `SITE_SESSION_SECRET`, so a tampered cookie starts a fresh session.

use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::SiteConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "hans_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// The store uses the default `tower_sessions.session` table created by
/// the site migrations.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &SiteConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    session_layer(
        PostgresStore::new(pool.clone()),
        config.session_key.clone(),
        config.is_secure(),
    )
}

fn session_layer<S: SessionStore>(
    store: S,
    key: Key,
    secure: bool,
) -> SessionManagerLayer<S, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::{Router, routing::get};
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session};

    use super::*;

    async fn remember(session: Session) -> StatusCode {
        session.insert("visitor", "returning").await.unwrap();
        StatusCode::OK
    }

    async fn recall(session: Session) -> String {
        session
            .get::<String>("visitor")
            .await
            .unwrap()
            .unwrap_or_default()
    }

    fn app() -> Router {
        Router::new()
            .route("/remember", get(remember))
            .route("/recall", get(recall))
            .layer(session_layer(
                MemoryStore::default(),
                Key::from(&[42_u8; 64]),
                false,
            ))
    }

    async fn recall_with(app: Router, cookie: &str) -> String {
        let response = app
            .oneshot(
                Request::get("/recall")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// `name=value` from the response's `Set-Cookie` header.
    async fn issued_cookie(app: Router) -> String {
        let response = app
            .oneshot(Request::get("/remember").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_signed_cookie_round_trips() {
        let app = app();
        let cookie = issued_cookie(app.clone()).await;
        assert!(cookie.starts_with("hans_session="));

        assert_eq!(recall_with(app, &cookie).await, "returning");
    }

    #[tokio::test]
    async fn test_tampered_cookie_starts_fresh_session() {
        let app = app();
        let cookie = issued_cookie(app.clone()).await;

        let (name, value) = cookie.split_once('=').unwrap();
        let flipped = if value.starts_with('A') { 'B' } else { 'A' };
        let rest: String = value.chars().skip(1).collect();
        let tampered = format!("{name}={flipped}{rest}");

        assert_eq!(recall_with(app, &tampered).await, "");
    }
}
