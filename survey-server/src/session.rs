//! Admin sessions
//!
//! Sessions live in memory, keyed by a random token carried in the
//! `survey-session` cookie. Restarting the server logs everybody out, and a
//! session lapses once it is older than the store's TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use survey_common::config::DEFAULT_SESSION_TTL_SECS;
use survey_common::model::{Admin, AdminId};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

pub const SESSION_COOKIE: &str = "survey-session";

#[derive(Debug, Clone)]
struct Session {
    admin: Admin,
    issued_at: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Start a session and return its token
    ///
    /// Lapsed sessions are swept out at the same time.
    pub async fn create(&self, admin: Admin) -> String {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| session.issued_at.elapsed() < self.ttl);
        sessions.insert(
            token.clone(),
            Session {
                admin,
                issued_at: Instant::now(),
            },
        );
        token
    }

    pub async fn get(&self, token: &str) -> Option<Admin> {
        let session = self.sessions.read().await.get(token).cloned()?;
        if session.issued_at.elapsed() < self.ttl {
            return Some(session.admin);
        }

        self.sessions.write().await.remove(token);
        None
    }

    pub async fn remove(&self, token: &str) -> Option<Admin> {
        self.sessions.write().await.remove(token).map(|session| session.admin)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Session token from the request cookies
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Cookie that installs a session token
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie that clears the session cookie in the browser
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = session_cookie(String::new());
    cookie.make_removal();
    cookie
}

/// The logged-in administrator
///
/// Handlers that require a login take `Principal`; handlers where a login
/// only changes the response take `Option<Principal>`.
#[derive(Debug, Clone)]
pub struct Principal(pub Admin);

impl Principal {
    pub fn id(&self) -> AdminId {
        self.0.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar).ok_or(ApiError::Unauthenticated)?;
        state
            .sessions
            .get(&token)
            .await
            .map(Principal)
            .ok_or(ApiError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    fn admin() -> Admin {
        Admin {
            id: 1,
            username: "alice".to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_lifecycle() {
        let store = SessionStore::new();
        let token = store.create(admin()).await;

        assert_eq!(store.get(&token).await, Some(admin()));
        assert_eq!(store.remove(&token).await, Some(admin()));
        assert_eq!(store.get(&token).await, None);
    }

    #[tokio::test]
    async fn test_lapsed_session_is_dropped() {
        let store = SessionStore::with_ttl(Duration::from_millis(100));
        let token = store.create(admin()).await;
        assert_eq!(store.get(&token).await, Some(admin()));

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(store.get(&token).await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_sweeps_lapsed_sessions() {
        let store = SessionStore::with_ttl(Duration::from_millis(100));
        store.create(admin()).await;
        store.create(admin()).await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        let fresh = store.create(admin()).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(&fresh).await, Some(admin()));
    }

    #[test]
    fn test_session_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; survey-session=abc-123; lang=en"),
        );
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(session_token(&jar).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_session_token_missing_or_empty() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&CookieJar::from_headers(&headers)), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("survey-session="));
        assert_eq!(session_token(&CookieJar::from_headers(&headers)), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("t".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "t");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));

        let expired = expired_session_cookie();
        assert_eq!(expired.value(), "");
        assert!(expired.to_string().contains("Max-Age=0"));
    }
}
