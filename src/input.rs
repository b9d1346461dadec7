use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::snake::Direction;

/// Single-slot mailbox between the input path (writer) and the tick path
/// (reader). Only the newest direction survives; nothing is queued.
#[derive(Debug, Default)]
pub struct InputBridge {
    latest: Mutex<Option<Direction>>,
}

impl InputBridge {
    pub fn new() -> Self {
        InputBridge::default()
    }

    pub fn publish(&self, direction: Direction) {
        *self.slot() = Some(direction);
    }

    /// Takes the most recent direction, leaving the slot empty.
    pub fn consume_latest(&self) -> Option<Direction> {
        self.slot().take()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Direction>> {
        // The slot only ever holds a whole `Option<Direction>`, so a panic on
        // the other side cannot leave it half written.
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
