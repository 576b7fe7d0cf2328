//! Note lifecycle
//!
//! Creating a note, reading it, and making it disappear again once it expired or was read. The
//! store has no expiry and no read-then-delete of its own, so both are decided here.

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use thiserror::Error;

use crate::identifier;
use crate::identifier::IdentifierAllocator;
use crate::identifier::RandomSource;
use crate::notes::NewNote;
use crate::notes::Note;
use crate::notes::NoteView;
use crate::notes::ValidationError;
use crate::store;
use crate::store::SharedStore;

/// How often a create may lose the race for an identifier
pub const MAX_CREATE_ATTEMPTS: usize = 10;

/// Source of the current time
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum Error {
    /// The new note breaks a rule
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Every attempt lost the race for its identifier
    #[error("Could not allocate a note identifier in {0} attempts")]
    AllocationExhausted(usize),

    /// Absent, expired or destroyed, the caller is not told which
    #[error("Note not found")]
    NotFound,

    /// Something is stored, but it is not a note
    #[error("Note corrupt: {0}")]
    Corrupt(serde_json::Error),

    /// The note could not be encoded for storage
    #[error("Could not encode note: {0}")]
    Encode(serde_json::Error),

    /// The store failed
    #[error(transparent)]
    Store(#[from] store::Error),
}

/// Result type for all lifecycle operations
pub type Result<T> = core::result::Result<T, Error>;

/// Owns the create and read transitions of notes
#[derive(Clone)]
pub struct NoteLifecycle {
    /// Where the notes live
    store: SharedStore,

    /// Hands out candidate identifiers
    allocator: IdentifierAllocator,

    /// Decides what "now" is for validation and expiry
    clock: Arc<dyn Clock>,

    /// Ceiling for contents and file combined, in bytes
    max_note_size: usize,
}

impl NoteLifecycle {
    pub fn new(
        store: SharedStore,
        random: Arc<dyn RandomSource>,
        clock: Arc<dyn Clock>,
        max_note_size: usize,
    ) -> Self {
        Self {
            allocator: IdentifierAllocator::new(store.clone(), random),
            store,
            clock,
            max_note_size,
        }
    }

    /// Ceiling for contents and file combined, in bytes
    pub fn max_note_size(&self) -> usize {
        self.max_note_size
    }

    /// Create a note, returning its identifier
    ///
    /// Nothing is written when the note is invalid. An identifier that is taken between the
    /// allocation and the write is dropped and a new one is tried, at most
    /// [`MAX_CREATE_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// Will return `Err` when the note is invalid, when no identifier could be claimed or when
    /// the store fails
    pub async fn create(&self, new_note: NewNote) -> Result<String> {
        new_note.validate(self.clock.now(), self.max_note_size)?;

        let note = new_note.into_note();
        let bytes = note.to_bytes().map_err(Error::Encode)?;

        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            let identifier = self.allocator.allocate().await?;

            match self.store.put_if_absent(&identifier, bytes.clone()).await {
                Ok(()) => {
                    tracing::info!(
                        id = %identifier,
                        size = note.contents.len(),
                        file_name = note.file_name.as_deref(),
                        file_size = note.file_contents.as_ref().map(Vec::len),
                        "Created note"
                    );

                    return Ok(identifier);
                }
                Err(store::Error::Conflict) => {
                    tracing::debug!("Lost identifier {identifier} to another writer, attempt {attempt}");
                }
                Err(err) => return Err(err.into()),
            }
        }

        tracing::error!("Could not allocate note identifier in {MAX_CREATE_ATTEMPTS} attempts");

        Err(Error::AllocationExhausted(MAX_CREATE_ATTEMPTS))
    }

    /// Read a note
    ///
    /// A peek at a destroy-after-read note only shows its metadata and leaves it in place. Any
    /// other read of a destroy-after-read or expired note deletes it from the store, an expired
    /// note is never shown.
    ///
    /// # Errors
    ///
    /// Will return `Err` when the note is not there (anymore), can not be decoded or when the
    /// store fails
    pub async fn read(&self, identifier: &str, peek: bool) -> Result<NoteView> {
        if !identifier::is_valid(identifier) {
            return Err(Error::NotFound);
        }

        let bytes = match self.store.get(identifier).await {
            Ok(bytes) => bytes,
            Err(store::Error::NotFound) => return Err(Error::NotFound),
            Err(err) => return Err(err.into()),
        };

        let note = Note::from_bytes(&bytes).map_err(|err| {
            tracing::warn!("Note {identifier} is corrupt: {err}");

            Error::Corrupt(err)
        })?;

        let is_expired = note.is_expired(self.clock.now());

        if peek && note.destroy_after_read {
            // no side effects for a peek, but expired metadata stays hidden as well
            if is_expired {
                return Err(Error::NotFound);
            }

            return Ok(NoteView::metadata(note));
        }

        if note.destroy_after_read || is_expired {
            match self.store.delete(identifier).await {
                Ok(()) => tracing::debug!("Destroyed note {identifier}"),
                Err(store::Error::NotFound) => {
                    tracing::debug!("Note {identifier} was already destroyed");

                    return Err(Error::NotFound);
                }
                Err(err) => tracing::error!("Could not destroy note {identifier}: {err}"),
            }
        }

        if is_expired {
            return Err(Error::NotFound);
        }

        Ok(NoteView::from(note))
    }
}
