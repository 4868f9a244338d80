//! Crossings from the control clock domain into the core clock domain.

use crate::error::ShaderError;

/// Two-stage synchronizer for a single control bit.
///
/// The raw level enters stage 1 on one tick and stage 2 on the next; logic
/// in the core domain only reads stage 2, so a change becomes visible at
/// most two ticks after it is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Synchronizer {
    stages: [bool; 2],
}

impl Synchronizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The synchronized level.
    #[must_use]
    pub fn output(&self) -> bool {
        self.stages[1]
    }

    /// Sample `input` on a core tick.
    pub fn clock(&mut self, input: bool) {
        self.stages[1] = self.stages[0];
        self.stages[0] = input;
    }
}

/// Depth-1 mailbox carrying control words into the core domain.
///
/// The control side offers a word; the core consumes it on its next tick.
/// A second word offered before the first is consumed is refused.
#[derive(Debug, Clone, Default)]
pub struct Handoff {
    slot: Option<u8>,
    delivered: u64,
}

impl Handoff {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offer(&mut self, word: u8) -> Result<(), ShaderError> {
        if let Some(pending) = self.slot {
            return Err(ShaderError::HandoffOccupied(pending));
        }
        self.slot = Some(word);
        Ok(())
    }

    /// Core side: take the pending word, if any.
    pub fn take(&mut self) -> Option<u8> {
        let word = self.slot.take();
        if word.is_some() {
            self.delivered += 1;
        }
        word
    }

    #[must_use]
    pub fn pending(&self) -> Option<u8> {
        self.slot
    }

    /// Words handed to the core so far.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}
