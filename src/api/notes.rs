//! Notes API endpoints
//!
//! Creating and reading notes, no authentication: whoever has the identifier can read the note

use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::lifecycle::NoteLifecycle;
use crate::notes::NoteView;

use super::Error;
use super::NoteForm;
use super::NoteIdentifier;
use super::QueryParameters;
use super::Success;

/// Response for a freshly created note
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedNoteResponse {
    /// Identifier to read the note with
    pub id: String,
}

/// Note response going to the reader
///
/// Contents are left out for a peek at a destroy-after-read note
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    /// Text of the note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,

    /// The note is gone from this moment on
    pub expires_at: DateTime<Utc>,

    /// The note is removed once it has been read
    pub destroy_after_read: bool,

    /// Schema version the note was written with
    pub version: u32,

    /// Name of the attached file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// Base64 encoded contents of the attached file
    #[serde(skip_serializing_if = "Option::is_none", with = "crate::base64_bytes")]
    pub file_contents: Option<Vec<u8>>,
}

impl NoteResponse {
    /// Create a response from a [`NoteView`](NoteView)
    fn from_view(view: NoteView) -> Self {
        Self {
            contents: view.contents,
            expires_at: view.expires_at,
            destroy_after_read: view.destroy_after_read,
            version: view.version,
            file_name: view.file_name,
            file_contents: view.file_contents,
        }
    }
}

/// Create a note
///
/// Request:
/// ```sh
/// curl -v \
///     -F 'contents=Meet me at the usual place' \
///     -F 'expires_at=2026-10-19T12:00:00Z' \
///     -F 'destroy_after_read=true' \
///     -F 'file_contents=@map.png' \
///     http://localhost:3000/api/notes
/// ```
///
/// Or with JSON, file contents base64 encoded:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "contents": "Meet me", "expiresAt": "2026-10-19T12:00:00Z" }' \
///     http://localhost:3000/api/notes
/// ```
///
/// Response:
/// ```json
/// { "data": { "id": "k3x9" } }
/// ```
pub async fn create(
    Extension(notes): Extension<NoteLifecycle>,
    NoteForm(new_note): NoteForm,
) -> Result<Success<CreatedNoteResponse>, Error> {
    let id = notes.create(new_note).await?;

    Ok(Success::created(CreatedNoteResponse { id }))
}

/// Query parameters for reading a note
#[derive(Debug, Deserialize)]
pub struct ReadQuery {
    /// Only look at the metadata, any value counts
    peek: Option<String>,
}

/// Read a note
///
/// Reading a destroy-after-read note removes it, add `?peek` to only see its metadata
///
/// Request:
/// ```sh
/// curl -v http://localhost:3000/api/notes/k3x9?peek
/// ```
///
/// Response:
/// ```json
/// { "data": { "expiresAt": "2026-10-19T12:00:00Z", "destroyAfterRead": true ... } }
/// ```
pub async fn single(
    Extension(notes): Extension<NoteLifecycle>,
    NoteIdentifier(note_id): NoteIdentifier,
    QueryParameters(query): QueryParameters<ReadQuery>,
) -> Result<Success<NoteResponse>, Error> {
    let view = notes.read(&note_id, query.peek.is_some()).await?;

    Ok(Success::ok(NoteResponse::from_view(view)).no_cache())
}
