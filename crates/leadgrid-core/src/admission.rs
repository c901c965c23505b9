use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::AppError;

/// Fail-fast bound on concurrently running scrapes.
///
/// Requests beyond the ceiling are rejected, never queued. Admission hands
/// out a [`SessionPermit`]; the slot is released when the permit drops, on
/// every exit path including panics.
#[derive(Debug, Clone)]
pub struct SessionGate {
    active: Arc<AtomicUsize>,
    ceiling: usize,
}

impl SessionGate {
    pub fn new(ceiling: usize) -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            ceiling,
        }
    }

    /// Claim a slot, or fail with [`AppError::TooManySessions`].
    pub fn try_acquire(&self) -> Result<SessionPermit, AppError> {
        self.active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.ceiling).then_some(n + 1)
            })
            .map(|_| SessionPermit {
                active: Arc::clone(&self.active),
            })
            .map_err(|_| AppError::TooManySessions {
                limit: self.ceiling,
            })
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }
}

/// An admitted session. Dropping it frees the slot.
#[derive(Debug)]
pub struct SessionPermit {
    active: Arc<AtomicUsize>,
}

impl Drop for SessionPermit {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}
