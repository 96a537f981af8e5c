//! Request-scoped context.
//!
//! Every handler receives a [`RequestContext`] built from the shared
//! [`AppState`]: the caller's identity (if a live session was presented) plus
//! a handle to the store. Nothing is looked up from globals.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::models::AuthUser;
use crate::store::TicketingStore;
use crate::utils::AppError;

pub const SESSION_COOKIE: &str = "session";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TicketingStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn TicketingStore>) -> Self {
        Self { store }
    }
}

pub struct RequestContext {
    user: Option<AuthUser>,
    store: Arc<dyn TicketingStore>,
}

impl RequestContext {
    pub fn new(user: Option<AuthUser>, store: Arc<dyn TicketingStore>) -> Self {
        Self { user, store }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    /// The authenticated caller, or `401` when no live session was presented.
    pub fn require_user(&self) -> Result<&AuthUser, AppError> {
        self.user.as_ref().ok_or(AppError::Unauthorized)
    }

    pub fn store(&self) -> &dyn TicketingStore {
        self.store.as_ref()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = match session_token(&parts.headers) {
            Some(token) => state.store.find_session_user(token).await?,
            None => None,
        };

        Ok(Self::new(user, Arc::clone(&state.store)))
    }
}

/// `Authorization: Bearer <token>` takes precedence over the session cookie.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(session_token(&headers), Some("abc123"));
    }

    #[test]
    fn test_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session=tok-1; lang=en"));
        assert_eq!(session_token(&headers), Some("tok-1"));
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("session=from-cookie"));
        assert_eq!(session_token(&headers), Some("from-header"));
    }

    #[test]
    fn test_no_credentials() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        headers.insert(COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_token(&headers), None);
    }
}
