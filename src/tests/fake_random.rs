//! Deterministic random source for tests

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::identifier::RandomSource;

/// Repeats the given indices, in order, forever
pub struct Sequence {
    indices: Vec<usize>,
    position: AtomicUsize,
}

impl Sequence {
    pub fn new(indices: &[usize]) -> Self {
        assert!(!indices.is_empty(), "Sequence needs at least one index");

        Self {
            indices: indices.to_vec(),
            position: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for Sequence {
    fn index(&self, bound: usize) -> usize {
        let position = self.position.fetch_add(1, Ordering::SeqCst);

        self.indices[position % self.indices.len()] % bound
    }
}
