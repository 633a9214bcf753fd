use super::client::{OAuthClient, OAuthError};
use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Query, Request, State},
    http::{HeaderMap, Uri, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

/// Authenticated caller, inserted into request extensions by [`oauth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    /// User the token was issued to
    pub caller_id: i64,
    /// Client application the token was issued for
    pub client_id: i64,
}

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

/// Token from `?access_token=` first, then `Authorization: Bearer <token>`.
fn extract_token(uri: &Uri, headers: &HeaderMap) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(uri)
        .map(|Query(query)| query)
        .unwrap_or_default()
        .access_token
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|auth| auth.strip_prefix("Bearer "))
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
        })
}

/// Resolve the caller from the access token, if one was sent.
///
/// - no token: the request continues anonymously
/// - token accepted: [`CallerIdentity`] is inserted into request extensions
/// - token rejected: `401`
/// - provider failure: `503`
pub async fn oauth_middleware(
    State(oauth): State<OAuthClient>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.uri(), request.headers()) else {
        tracing::debug!("No access token on request, continuing anonymously");
        return next.run(request).await;
    };

    match oauth.lookup(&token).await {
        Ok(access_token) => {
            request.extensions_mut().insert(CallerIdentity {
                caller_id: access_token.user_id,
                client_id: access_token.client_id,
            });
            next.run(request).await
        }
        Err(OAuthError::Rejected) => {
            AppError::Unauthorized("invalid access token".to_string()).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Access token lookup failed");
            AppError::ServiceUnavailable("authentication service unavailable".to_string())
                .into_response()
        }
    }
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
