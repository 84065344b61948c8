//! # Authentication Extractors
//!
//! Bearer-token extractors for route handlers. Login and session
//! management are external collaborators; this layer only resolves an
//! already-issued token to a username.

use crate::handlers::ErrorResponse;
use crate::state::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// The authenticated requester
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub username: String,
}

/// Immutable token -> username registry, built from seed data at boot
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: Arc<HashMap<String, String>>,
}

impl TokenRegistry {
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            tokens: Arc::new(pairs.into_iter().collect()),
        }
    }

    /// Resolve a bearer token to its username
    pub fn resolve(&self, token: &str) -> Option<String> {
        self.tokens.get(token).cloned()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection for requests without a valid bearer token
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("authentication required", 401)),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_user(parts, state).map(Self).ok_or(AuthRejection)
    }
}

/// Extractor that optionally resolves the current user without
/// rejecting unauthenticated requests.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer_user(parts, state)))
    }
}

fn bearer_user(parts: &Parts, state: &AppState) -> Option<CurrentUser> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    state
        .tokens
        .resolve(token)
        .map(|username| CurrentUser { username })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_registry_resolution() {
        let registry = TokenRegistry::new([
            ("tok_ada".to_string(), "ada".to_string()),
            ("tok_grace".to_string(), "grace".to_string()),
        ]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("tok_ada").as_deref(), Some("ada"));
        assert!(registry.resolve("tok_unknown").is_none());
    }
}
