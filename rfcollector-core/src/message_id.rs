//! Client message id allocation
//!
//! Every request sent during the lifetime of a client carries a distinct id.
//! Ids start at 1 and only grow; when the space is used up allocation fails
//! instead of wrapping, so a late response can never be matched to a newer
//! request.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Shared message id generator
///
/// Cloning is cheap and clones draw from the same sequence.
#[derive(Debug, Clone)]
pub struct MessageIds {
    next: Arc<AtomicU32>,
}

impl MessageIds {
    /// First id handed out
    pub const FIRST: u32 = 1;

    pub fn new() -> Self {
        Self::starting_at(Self::FIRST)
    }

    /// Generator whose first id is `first`
    pub fn starting_at(first: u32) -> Self {
        Self {
            next: Arc::new(AtomicU32::new(first)),
        }
    }

    /// Take the next id
    pub fn next_id(&self) -> Result<u32> {
        // `next` holds the id to hand out; u32::MAX marks the space as spent
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |id| {
                (id != u32::MAX).then(|| id + 1)
            })
            .map_err(|_| Error::MessageIdExhausted)
    }

    /// Id the next call would return, without taking it
    pub fn peek(&self) -> u32 {
        self.next.load(Ordering::Acquire)
    }
}

impl Default for MessageIds {
    fn default() -> Self {
        Self::new()
    }
}
