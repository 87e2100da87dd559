//! Request body extractor accepting JSON or form-encoded payloads.
//!
//! HTML forms post `application/x-www-form-urlencoded`; API clients post
//! JSON. An empty body decodes as `{}`, so payload types must tolerate every
//! field missing.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Body extractor that picks its decoder from the `Content-Type` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_form_content_type);

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Body {
                status: rejection.status(),
                message: rejection.body_text(),
            })?;

        decode(&body, is_form).map(Payload)
    }
}

/// Media types are case-insensitive and may carry parameters such as
/// `; charset=utf-8`.
fn is_form_content_type(value: &str) -> bool {
    value
        .split(';')
        .next()
        .is_some_and(|essence| {
            essence
                .trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

fn decode<T: DeserializeOwned>(body: &[u8], is_form: bool) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_str("{}").map_err(|e| AppError::Validation(e.to_string()));
    }
    if is_form {
        serde_urlencoded::from_bytes(body).map_err(|e| AppError::Validation(e.to_string()))
    } else {
        serde_json::from_slice(body).map_err(|e| AppError::Validation(e.to_string()))
    }
}
