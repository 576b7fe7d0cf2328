use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::body::Bytes;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use chrono::DateTime;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Map;
use serde_json::Value;
use tower::Service;

use crate::config::Config;
use crate::setup_app;
use crate::store::Config as StoreConfig;
use crate::store::Memory;
use crate::store::SharedStore;

/// Ceiling used by the test app
pub const MAX_NOTE_SIZE: usize = 64;

const BOUNDARY: &str = "scr-test-boundary";

/// Test helper version of the note response
#[derive(Debug, PartialEq, Eq)]
pub struct Note {
    pub contents: Option<String>,
    pub expires_at: String,
    pub destroy_after_read: bool,
    pub version: u64,
    pub file_name: Option<String>,
    pub file_contents: Option<String>,
}

/// Error response
#[derive(Debug, PartialEq, Eq)]
pub struct Error {
    pub error: String,
    pub description: Option<String>,
}

/// Response of a read
#[derive(Debug)]
pub struct Read {
    pub status_code: StatusCode,
    pub note: Option<Note>,
    pub error: Option<String>,
    pub cache_control: Option<String>,
}

/// Setup the app with an in-memory store
pub async fn setup_test_app() -> Router {
    setup_test_app_with_store(Arc::new(Memory::new())).await
}

/// Setup the app on top of the given store
pub async fn setup_test_app_with_store(store: SharedStore) -> Router {
    let config = Config {
        max_note_size: MAX_NOTE_SIZE,
        store_timeout: Duration::from_secs(5),
    };

    setup_app(StoreConfig::Existing(store), &config)
        .await
        .unwrap()
}

pub async fn maybe_create_note(
    app: &mut Router,
    contents: &str,
    expires_at: DateTime<Utc>,
    destroy_after_read: bool,
) -> (StatusCode, Option<String>, Option<String>) {
    let mut payload = Map::new();
    payload.insert("contents".to_string(), Value::String(contents.to_string()));
    payload.insert(
        "expiresAt".to_string(),
        Value::String(expires_at.to_rfc3339()),
    );
    payload.insert(
        "destroyAfterRead".to_string(),
        Value::Bool(destroy_after_read),
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/notes")
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    send_create(app, request).await
}

/// Create a note with a `multipart/form-data` body
///
/// `file` is the file name and contents of the `file_contents` part
pub async fn maybe_create_note_multipart(
    app: &mut Router,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> (StatusCode, Option<String>, Option<String>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((file_name, contents)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file_contents\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/notes")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    send_create(app, request).await
}

pub async fn maybe_create_note_with_raw_body(
    app: &mut Router,
    body: &str,
    include_content_type: bool,
) -> (StatusCode, Option<String>, Option<Error>) {
    let mut builder = Request::builder().method(Method::POST).uri("/api/notes");

    if include_content_type {
        builder = builder.header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
    }

    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::CREATED {
            Some(get_id(&body))
        } else {
            None
        },
        if status_code.is_client_error() {
            Some(get_error(&body))
        } else {
            None
        },
    )
}

pub async fn read_note(app: &mut Router, id: &str, peek: bool) -> Read {
    let uri = if peek {
        format!("/api/notes/{id}?peek")
    } else {
        format!("/api/notes/{id}")
    };

    get(app, &uri).await
}

pub async fn get(app: &mut Router, uri: &str) -> Read {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let cache_control = response
        .headers()
        .get(CACHE_CONTROL)
        .map(|header| header.to_str().unwrap().to_string());

    let body = response.into_body().collect().await.unwrap().to_bytes();

    Read {
        status_code,
        note: if status_code == StatusCode::OK {
            Some(get_note(&body))
        } else {
            None
        },
        error: if status_code == StatusCode::OK {
            None
        } else {
            Some(get_error_message(&body))
        },
        cache_control,
    }
}

async fn send_create(
    app: &mut Router,
    request: Request<Body>,
) -> (StatusCode, Option<String>, Option<String>) {
    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::CREATED {
            Some(get_id(&body))
        } else {
            None
        },
        if status_code == StatusCode::CREATED {
            None
        } else {
            Some(get_error_message(&body))
        },
    )
}

fn get_data(body: &Bytes) -> Map<String, Value> {
    let body: Value = serde_json::from_slice(body).unwrap();

    body.as_object()
        .unwrap()
        .get("data")
        .unwrap()
        .as_object()
        .unwrap()
        .clone()
}

fn get_id(body: &Bytes) -> String {
    get_data(body)
        .get("id")
        .unwrap()
        .as_str()
        .unwrap()
        .to_string()
}

fn get_optional_string(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key).map(|value| value.as_str().unwrap().to_string())
}

fn get_note(body: &Bytes) -> Note {
    let data = get_data(body);

    Note {
        contents: get_optional_string(&data, "contents"),
        expires_at: data.get("expiresAt").unwrap().as_str().unwrap().to_string(),
        destroy_after_read: data.get("destroyAfterRead").unwrap().as_bool().unwrap(),
        version: data.get("version").unwrap().as_u64().unwrap(),
        file_name: get_optional_string(&data, "fileName"),
        file_contents: get_optional_string(&data, "fileContents"),
    }
}

fn get_error(body: &Bytes) -> Error {
    let body: Value = serde_json::from_slice(body).unwrap();
    let body = body.as_object().unwrap();

    Error {
        error: body.get("error").unwrap().as_str().unwrap().to_string(),
        description: get_optional_string(body, "description"),
    }
}

fn get_error_message(body: &Bytes) -> String {
    get_error(body).error
}
