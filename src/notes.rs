//! Notes
//!
//! The stored shape of a note and the rules a new note has to follow

use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Version written into every new note
pub const SCHEMA_VERSION: u32 = 1;

/// Default ceiling for the contents and file of a note combined, in bytes
pub const DEFAULT_MAX_NOTE_SIZE: usize = 100 << 20;

/// How many days a note may live at most
const MAX_LIFETIME_DAYS: i64 = 30;

/// A note as it is persisted in the blob store
///
/// Fields missing from older notes fall back to their defaults, unknown fields are ignored
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Note {
    /// Text of the note
    #[serde(default)]
    pub contents: String,

    /// The note is gone from this moment on
    pub expires_at: DateTime<Utc>,

    /// Remove the note once it has been read
    #[serde(default)]
    pub destroy_after_read: bool,

    /// Schema version the note was written with, `0` for notes from before versioning
    #[serde(default)]
    pub version: u32,

    /// Name of the attached file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// Contents of the attached file
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::base64_bytes"
    )]
    pub file_contents: Option<Vec<u8>>,
}

impl Note {
    /// Decode a note from its stored bytes
    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Encode a note into its stored bytes
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Is the note expired at `now`?
    ///
    /// The expiry moment itself counts as expired
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Attached file of a new note
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// Name of the file, as the client sent it
    pub name: String,

    /// Raw contents of the file
    pub contents: Vec<u8>,
}

/// A note that still has to be created
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewNote {
    /// Text of the note
    pub contents: String,

    /// The note is gone from this moment on
    pub expires_at: DateTime<Utc>,

    /// Remove the note once it has been read
    pub destroy_after_read: bool,

    /// Optional attached file
    pub file: Option<Attachment>,
}

/// Reasons a new note is refused
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Contents and file together are larger than allowed
    #[error("Contents and file exceed max note size of {max_note_size} bytes")]
    TooLarge {
        /// The ceiling that was exceeded
        max_note_size: usize,
    },

    /// The expiry is too far ahead
    #[error("Note expires too far into the future")]
    ExpiresTooLate,
}

impl NewNote {
    /// Size of the contents and the file combined
    pub fn size(&self) -> usize {
        self.contents.len() + self.file.as_ref().map_or(0, |file| file.contents.len())
    }

    /// Check the constraints the store can not enforce
    ///
    /// # Errors
    ///
    /// Will return `Err` when the note is too large or expires more than 30 days after `now`
    pub fn validate(&self, now: DateTime<Utc>, max_note_size: usize) -> Result<(), ValidationError> {
        if self.size() > max_note_size {
            return Err(ValidationError::TooLarge { max_note_size });
        }

        if self.expires_at > now + TimeDelta::days(MAX_LIFETIME_DAYS) {
            return Err(ValidationError::ExpiresTooLate);
        }

        Ok(())
    }

    /// Turn into the note that will be stored
    pub fn into_note(self) -> Note {
        let (file_name, file_contents) = match self.file {
            Some(file) => (Some(file.name), Some(file.contents)),
            None => (None, None),
        };

        Note {
            contents: self.contents,
            expires_at: self.expires_at,
            destroy_after_read: self.destroy_after_read,
            version: SCHEMA_VERSION,
            file_name,
            file_contents,
        }
    }
}

/// What a reader gets to see of a note
///
/// `contents` and `file_contents` are `None` when only the metadata is shown
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteView {
    pub contents: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub destroy_after_read: bool,
    pub version: u32,
    pub file_name: Option<String>,
    pub file_contents: Option<Vec<u8>>,
}

impl NoteView {
    /// Everything but the contents
    pub fn metadata(note: Note) -> Self {
        Self {
            contents: None,
            file_contents: None,
            ..Self::from(note)
        }
    }
}

impl From<Note> for NoteView {
    fn from(note: Note) -> Self {
        Self {
            contents: Some(note.contents),
            expires_at: note.expires_at,
            destroy_after_read: note.destroy_after_read,
            version: note.version,
            file_name: note.file_name,
            file_contents: note.file_contents,
        }
    }
}
