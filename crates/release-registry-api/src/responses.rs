//! Response types that are not plain JSON bodies

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use release_registry_core::AppEntry;
use release_registry_service::DownloadTarget;

use crate::error::ApiError;

/// `Digest` response header
pub const DIGEST_HEADER: HeaderName = HeaderName::from_static("digest");

/// `302 Found` pointing at a download, with an optional `Digest` header
#[derive(Debug, Clone)]
pub struct DownloadRedirect(pub DownloadTarget);

impl IntoResponse for DownloadRedirect {
    fn into_response(self) -> Response {
        let DownloadTarget { url, digest } = self.0;

        let location = match HeaderValue::from_str(&url) {
            Ok(value) => value,
            Err(_) => {
                return ApiError::internal_server_error(format!(
                    "Download URL is not a valid header value: {}",
                    url
                ))
                .into_response()
            }
        };

        let mut response = (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
        if let Some(digest) = digest {
            match HeaderValue::from_str(&digest) {
                Ok(value) => {
                    response.headers_mut().insert(DIGEST_HEADER, value);
                }
                Err(_) => {
                    return ApiError::internal_server_error("Digest is not a valid header value")
                        .into_response()
                }
            }
        }
        response
    }
}

/// Either an app record or a redirect to one of its files
#[derive(Debug)]
pub enum AppVersionResponse {
    Entry(AppEntry),
    Download(DownloadRedirect),
}

impl IntoResponse for AppVersionResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Entry(entry) => Json(entry).into_response(),
            Self::Download(redirect) => redirect.into_response(),
        }
    }
}

/// Plain-text liveness body
pub fn health_ok() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "ok\n",
    )
        .into_response()
}
