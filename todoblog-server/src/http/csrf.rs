//! Double-submit-cookie CSRF protection
//!
//! Form pages set the token both as an HttpOnly cookie and as a hidden
//! `_csrf` field. A POST is accepted only when the two match.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use cookie::{Cookie, SameSite};
use rand::distributions::Alphanumeric;
use rand::Rng;
use subtle::ConstantTimeEq;

use super::error::ApiError;

pub const CSRF_COOKIE: &str = "todoblog_csrf";
pub const CSRF_FIELD: &str = "_csrf";

/// 43 alphanumeric chars is just over 256 bits
const TOKEN_LEN: usize = 43;

/// Anti-forgery token for one browser session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn generate() -> Self {
        let token = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// Reuse the token already held by the browser, or mint a new one.
    ///
    /// Reuse keeps forms open in several tabs valid.
    pub fn from_headers_or_generate(headers: &HeaderMap) -> Self {
        cookie_token(headers)
            .filter(|t| t.len() == TOKEN_LEN && t.bytes().all(|b| b.is_ascii_alphanumeric()))
            .map(Self)
            .unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Set-Cookie` value carrying this token
    pub fn set_cookie(&self, secure: bool) -> String {
        Cookie::build((CSRF_COOKIE, self.0.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(secure)
            .build()
            .to_string()
    }
}

/// Token from the request's `Cookie` header(s)
pub fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == CSRF_COOKIE)
        .map(|c| c.value().to_owned())
}

/// Constant-time comparison of cookie and submitted tokens.
pub fn verify(cookie: Option<&str>, submitted: Option<&str>) -> Result<(), ApiError> {
    match (cookie, submitted) {
        (Some(expected), Some(given))
            if !expected.is_empty() && bool::from(expected.as_bytes().ct_eq(given.as_bytes())) =>
        {
            Ok(())
        }
        _ => Err(ApiError::CsrfRejected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn generated_tokens_are_unique() {
        let a = CsrfToken::generate();
        let b = CsrfToken::generate();
        assert_eq!(a.as_str().len(), TOKEN_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn cookie_attributes() {
        let token = CsrfToken::generate();
        let header = token.set_cookie(true);
        assert!(header.starts_with(&format!("{}={}", CSRF_COOKIE, token.as_str())));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Strict"));
        assert!(header.contains("Secure"));
        assert!(!token.set_cookie(false).contains("Secure"));
    }

    #[test]
    fn reads_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; todoblog_csrf=abc123; lang=en"),
        );
        assert_eq!(cookie_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn existing_well_formed_token_is_reused() {
        let token = CsrfToken::generate();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("todoblog_csrf={}", token.as_str())).unwrap(),
        );
        assert_eq!(CsrfToken::from_headers_or_generate(&headers), token);

        headers.insert(COOKIE, HeaderValue::from_static("todoblog_csrf=short"));
        assert_ne!(CsrfToken::from_headers_or_generate(&headers).as_str(), "short");
    }

    #[test]
    fn verify_requires_both_and_equal() {
        assert!(verify(Some("tok"), Some("tok")).is_ok());
        assert!(verify(Some("tok"), Some("other")).is_err());
        assert!(verify(Some("tok"), None).is_err());
        assert!(verify(None, Some("tok")).is_err());
        assert!(verify(Some(""), Some("")).is_err());
    }
}
