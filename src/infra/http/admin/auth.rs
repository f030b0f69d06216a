use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::infra::http::error::ApiError;

/// Bearer-token guard for the admin listener. Without a configured token every
/// request is let through.
#[derive(Clone, Default)]
pub struct AdminAuth {
    token_digest: Option<Vec<u8>>,
}

impl AdminAuth {
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token_digest: token.map(digest),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token_digest.is_some()
    }

    pub fn authorize(&self, header: Option<&HeaderValue>) -> bool {
        let Some(expected) = self.token_digest.as_ref() else {
            return true;
        };
        match extract_bearer(header) {
            Some(presented) => expected.ct_eq(&digest(presented)).unwrap_u8() == 1,
            None => false,
        }
    }
}

fn digest(secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}

fn extract_bearer(header: Option<&HeaderValue>) -> Option<&str> {
    let raw = header?.to_str().ok()?;
    raw.strip_prefix("Bearer ").map(str::trim)
}

pub async fn require_admin(
    State(auth): State<AdminAuth>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !auth.authorize(request.headers().get(AUTHORIZATION)) {
        return ApiError::unauthorized()
            .with_source("infra::http::admin::require_admin")
            .into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_when_no_token_configured() {
        let auth = AdminAuth::new(None);
        assert!(!auth.is_enabled());
        assert!(auth.authorize(None));
    }

    #[test]
    fn accepts_matching_bearer_token_only() {
        let auth = AdminAuth::new(Some("s3cret"));
        let good = HeaderValue::from_static("Bearer s3cret");
        let wrong = HeaderValue::from_static("Bearer nope");
        let basic = HeaderValue::from_static("Basic s3cret");

        assert!(auth.authorize(Some(&good)));
        assert!(!auth.authorize(Some(&wrong)));
        assert!(!auth.authorize(Some(&basic)));
        assert!(!auth.authorize(None));
    }
}
