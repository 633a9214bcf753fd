//! Per-request deadline carried down to the document store.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;
use std::time::Duration;
use tokio::time::Instant;

/// Header a caller can set to bound the whole request, in milliseconds.
pub const REQUEST_TIMEOUT_HEADER: &str = "x-request-timeout-ms";

/// Caller-supplied deadline for one unit of work.
///
/// Each document store call runs under `min(call-class timeout, time left)`.
/// Cancellation is future drop: dropping the request future drops the
/// in-flight store call with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// No caller deadline; only per-call timeouts apply.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; zero once it has passed, `None` without one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    /// Budget for a single call whose own class allows `class_timeout`.
    pub fn bounded(&self, class_timeout: Duration) -> Duration {
        match self.remaining() {
            Some(left) => left.min(class_timeout),
            None => class_timeout,
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let timeout_ms = parts
            .headers
            .get(REQUEST_TIMEOUT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0);

        Ok(match timeout_ms {
            Some(ms) => Self::with_timeout(Duration::from_millis(ms)),
            None => Self::background(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_background_uses_class_timeout() {
        let ctx = RequestContext::background();
        assert_eq!(ctx.remaining(), None);
        assert!(!ctx.is_expired());
        assert_eq!(ctx.bounded(Duration::from_secs(2)), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_caps_class_timeout() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(500));
        assert_eq!(ctx.bounded(Duration::from_secs(2)), Duration::from_millis(500));
        assert_eq!(ctx.bounded(Duration::from_millis(100)), Duration::from_millis(100));

        tokio::time::advance(Duration::from_millis(600)).await;
        assert!(ctx.is_expired());
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
        assert_eq!(ctx.bounded(Duration::from_secs(2)), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_extracted_from_header() {
        let (mut parts, _) = Request::get("/")
            .header(REQUEST_TIMEOUT_HEADER, "250")
            .body(())
            .unwrap()
            .into_parts();
        let ctx = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(ctx.deadline().is_some());
        assert!(ctx.bounded(Duration::from_secs(5)) <= Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_unparsable_header_means_background() {
        for value in ["soon", "0", "-5"] {
            let (mut parts, _) = Request::get("/")
                .header(REQUEST_TIMEOUT_HEADER, value)
                .body(())
                .unwrap()
                .into_parts();
            let ctx = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();
            assert_eq!(ctx, RequestContext::background());
        }
    }
}
