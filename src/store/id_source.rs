use std::collections::VecDeque;

use rand::RngCore;
use rand::rngs::OsRng;

use crate::clock;
use crate::protocol::ClientId;

/// Supplies identifier candidates; uniqueness is checked by the store.
pub trait IdSource: Send {
    fn next_id(&mut self) -> ClientId;
}

/// Time-ordered identifiers: unix millis plus 80 bits from the OS RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeOrderedIdSource;

impl IdSource for TimeOrderedIdSource {
    fn next_id(&mut self) -> ClientId {
        let mut random = [0u8; 10];
        OsRng.fill_bytes(&mut random);
        let millis = u64::try_from(clock::now_millis()).unwrap_or(u64::MAX);
        ClientId::time_ordered(millis, &random)
    }
}

/// Hands out a fixed sequence first, then falls back to time-ordered ids.
/// Used to force collisions in tests and for reproducible dev runs.
#[derive(Debug, Default)]
pub struct ScriptedIdSource {
    queue: VecDeque<ClientId>,
    fallback: TimeOrderedIdSource,
}

impl ScriptedIdSource {
    pub fn new(ids: impl IntoIterator<Item = ClientId>) -> Self {
        Self {
            queue: ids.into_iter().collect(),
            fallback: TimeOrderedIdSource,
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl IdSource for ScriptedIdSource {
    fn next_id(&mut self) -> ClientId {
        self.queue
            .pop_front()
            .unwrap_or_else(|| self.fallback.next_id())
    }
}
