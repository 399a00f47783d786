//! Custom Axum extractors

use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::csrf::{self, CsrfToken};
use super::error::ApiError;

/// Numeric row id from the `{id}` path segment.
///
/// Anything that is not an integer cannot name a row, so it is a 404.
pub struct RowId(pub i64);

impl<S> FromRequestParts<S> for RowId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest {
                reason: e.body_text(),
            })?;

        raw.parse().map(Self).map_err(|_| ApiError::NotFound {
            resource: "item",
            id: raw,
        })
    }
}

/// Token to embed in a rendered form
impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CsrfToken::from_headers_or_generate(&parts.headers))
    }
}

#[derive(Deserialize)]
struct SubmittedToken {
    #[serde(rename = "_csrf")]
    token: Option<String>,
}

/// URL-encoded form whose CSRF token has been checked.
///
/// The token is compared before the body is deserialized into `T`, so a
/// forged request is rejected with 403 regardless of its other fields.
pub struct VerifiedForm<T>(pub T);

impl<S, T> FromRequest<S> for VerifiedForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let cookie = csrf::cookie_token(req.headers());
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest {
                reason: e.body_text(),
            })?;

        let submitted = serde_urlencoded::from_bytes::<SubmittedToken>(&body)
            .ok()
            .and_then(|s| s.token);
        csrf::verify(cookie.as_deref(), submitted.as_deref())?;

        if !is_form {
            return Err(ApiError::BadRequest {
                reason: "expected an application/x-www-form-urlencoded body".to_owned(),
            });
        }

        serde_urlencoded::from_bytes(&body)
            .map(Self)
            .map_err(|e| ApiError::BadRequest {
                reason: format!("invalid form body: {}", e),
            })
    }
}
