//! Short identifiers for notes
//!
//! An identifier starts at [`MIN_LENGTH`] random characters and grows by one random character
//! for every taken candidate. The existence check only makes collisions rare, the conditional
//! create in the store decides who owns an identifier.

use std::sync::Arc;

use rand::Rng;

use crate::store;
use crate::store::SharedStore;

/// Characters an identifier is made of
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Shortest identifier handed out
pub const MIN_LENGTH: usize = 4;

/// Source of uniformly random indices
pub trait RandomSource: Send + Sync + 'static {
    /// Random index in `0..bound`
    fn index(&self, bound: usize) -> usize;
}

/// Random source backed by the thread-local generator of `rand`
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, bound: usize) -> usize {
        rand::rng().random_range(0..bound)
    }
}

/// Is `identifier` something the allocator could have handed out?
pub fn is_valid(identifier: &str) -> bool {
    identifier.len() >= MIN_LENGTH && identifier.bytes().all(|byte| ALPHABET.contains(&byte))
}

/// Hands out identifiers that are unused at the moment of the check
#[derive(Clone)]
pub struct IdentifierAllocator {
    /// Store to check for existing identifiers
    store: SharedStore,

    /// Where the random characters come from
    random: Arc<dyn RandomSource>,
}

impl IdentifierAllocator {
    pub fn new(store: SharedStore, random: Arc<dyn RandomSource>) -> Self {
        Self { store, random }
    }

    /// Find an identifier nothing is stored at
    ///
    /// # Errors
    ///
    /// Will return `Err` when the existence check fails, it is not retried
    pub async fn allocate(&self) -> store::Result<String> {
        let mut identifier = String::with_capacity(MIN_LENGTH + 2);

        loop {
            identifier.push(self.random_char());

            if identifier.len() < MIN_LENGTH {
                continue;
            }

            if !self.store.exists(&identifier).await? {
                return Ok(identifier);
            }

            tracing::debug!("Identifier {identifier} is taken, growing it");
        }
    }

    fn random_char(&self) -> char {
        char::from(ALPHABET[self.random.index(ALPHABET.len())])
    }
}
