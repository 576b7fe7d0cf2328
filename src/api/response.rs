//! API response helpers

use axum::Json;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::lifecycle;

/// Hold data for a successful API interaction
pub struct Success<V>
where
    V: Serialize,
{
    status_code: StatusCode,
    data: V,
    no_cache: bool,
}

impl<V> Success<V>
where
    V: Serialize,
{
    pub fn ok(data: V) -> Self {
        Self {
            status_code: StatusCode::OK,
            data,
            no_cache: false,
        }
    }

    pub fn created(data: V) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            data,
            no_cache: false,
        }
    }

    /// Tell clients and proxies not to reuse the response without asking
    pub fn no_cache(self) -> Self {
        Self {
            no_cache: true,
            ..self
        }
    }
}

#[derive(Serialize)]
struct DataWrapper<D>
where
    D: Serialize,
{
    data: D,
}

impl<V> IntoResponse for Success<V>
where
    V: Serialize,
{
    fn into_response(self) -> Response {
        let mut response = (self.status_code, Json(DataWrapper { data: self.data })).into_response();

        if self.no_cache {
            response
                .headers_mut()
                .insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        }

        response
    }
}

/// Hold data for a failed API interaction
#[derive(Debug)]
pub struct Error {
    status_code: StatusCode,
    message: String,
    description: Option<String>,
}

impl Error {
    pub fn bad_request<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn payload_too_large<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn internal_server_error<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_description<M>(self, description: M) -> Self
    where
        M: ToString,
    {
        Self {
            description: Some(description.to_string()),
            ..self
        }
    }

    fn new<M>(status_code: StatusCode, message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code,
            message: message.to_string(),
            description: None,
        }
    }
}

impl From<lifecycle::Error> for Error {
    fn from(err: lifecycle::Error) -> Self {
        match err {
            lifecycle::Error::Validation(err) => Error::bad_request(err),
            lifecycle::Error::NotFound => Error::not_found("Note not found"),
            lifecycle::Error::Corrupt(err) => {
                Error::internal_server_error("Note corrupt").with_description(err)
            }
            lifecycle::Error::AllocationExhausted(_) => {
                // already logged by the lifecycle
                Error::internal_server_error("An internal error occurred")
            }
            lifecycle::Error::Encode(err) => {
                tracing::error!("Could not encode note: {err}");

                Error::internal_server_error("An internal error occurred")
            }
            lifecycle::Error::Store(err) => {
                tracing::error!("Store error: {err}");

                Error::internal_server_error("An internal error occurred")
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorWrapper<D>
where
    D: Serialize,
{
    error: D,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<D>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.status_code,
            Json(ErrorWrapper {
                error: self.message,
                description: self.description,
            }),
        )
            .into_response()
    }
}
