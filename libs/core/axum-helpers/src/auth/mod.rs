//! Caller identity resolved from an external OAuth provider.
//!
//! An access token (query parameter `access_token` or `Authorization: Bearer`)
//! is exchanged with the provider for the caller's user and client ids.
//! Requests without a token continue anonymously; handlers that need a
//! caller take the [`CallerIdentity`] extractor, which rejects anonymous
//! requests with 401.
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{OAuthClient, OAuthConfig, oauth_middleware};
//! use core_config::FromEnv;
//!
//! let oauth = OAuthClient::new(&OAuthConfig::from_env()?)?;
//!
//! let routes = Router::new()
//!     .route("/items", post(create_item))
//!     .layer(axum::middleware::from_fn_with_state(oauth, oauth_middleware));
//! ```

pub mod client;
pub mod config;
pub mod middleware;

pub use client::{AccessToken, OAuthClient, OAuthError};
pub use config::OAuthConfig;
pub use middleware::{CallerIdentity, oauth_middleware};
