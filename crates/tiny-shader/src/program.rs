//! Circular instruction store.
//!
//! An ordered buffer of instruction words. Slot 0 is the word executed this
//! tick. A rotation shifts every slot down by one and refills the tail,
//! either with the word just consumed (so the program circulates) or with an
//! incoming word from the control channel.
//!
//! A double-buffered store holds two programs back to back. Joined, the two
//! halves form one ring of `2N` words. Split, each half is its own ring of
//! `N` words and a load is steered to one of them, so one half can be
//! rewritten while the other keeps circulating untouched.

use shader_core::{Observable, Value};

use crate::error::ShaderError;
use crate::instruction::DEFAULT_PROGRAM;

/// How a double-buffered store rotates and where loads land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// One ring over the whole store; loads enter at the last slot.
    #[default]
    Joined,
    /// Halves rotate independently; loads enter the first half at slot `N-1`.
    First,
    /// Halves rotate independently; loads enter the second half at slot `2N-1`.
    Second,
}

/// Circular instruction store.
pub struct ProgramStore {
    slots: Box<[u8]>,
    program_len: usize,
    double_buffered: bool,
}

impl ProgramStore {
    /// Build a store from an image of exactly `capacity` words.
    pub fn new(program_len: usize, double_buffered: bool, image: &[u8]) -> Result<Self, ShaderError> {
        let expected = if double_buffered { 2 * program_len } else { program_len };
        if image.len() != expected || program_len == 0 {
            return Err(ShaderError::ProgramLength {
                expected,
                actual: image.len(),
            });
        }
        Ok(Self {
            slots: image.into(),
            program_len,
            double_buffered,
        })
    }

    /// Build a store holding the built-in program (in both halves when
    /// double-buffered). Only a 16-word program length has a default.
    pub fn with_default(program_len: usize, double_buffered: bool) -> Result<Self, ShaderError> {
        if program_len != DEFAULT_PROGRAM.len() {
            return Err(ShaderError::ProgramLength {
                expected: program_len,
                actual: DEFAULT_PROGRAM.len(),
            });
        }
        let copies = if double_buffered { 2 } else { 1 };
        Self::new(program_len, double_buffered, &DEFAULT_PROGRAM.repeat(copies))
    }

    /// The word executed this tick.
    #[must_use]
    pub fn head(&self) -> u8 {
        self.slots[0]
    }

    #[must_use]
    pub fn slots(&self) -> &[u8] {
        &self.slots
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Words per program (`N`).
    #[must_use]
    pub fn program_len(&self) -> usize {
        self.program_len
    }

    #[must_use]
    pub fn is_double_buffered(&self) -> bool {
        self.double_buffered
    }

    /// The two halves of a double-buffered store.
    #[must_use]
    pub fn halves(&self) -> (&[u8], &[u8]) {
        self.slots.split_at(self.program_len.min(self.slots.len()))
    }

    /// Rotate by one slot. The tail is refilled with `load` if present,
    /// otherwise with the word that was at the head.
    pub fn rotate(&mut self, load: Option<u8>, split: SplitMode) {
        match self.effective(split) {
            SplitMode::Joined => {
                let refill = load.unwrap_or(self.slots[0]);
                shift_ring(&mut self.slots, refill);
            }
            SplitMode::First => {
                let (first, second) = self.slots.split_at_mut(self.program_len);
                let refill_first = load.unwrap_or(first[0]);
                let refill_second = second[0];
                shift_ring(first, refill_first);
                shift_ring(second, refill_second);
            }
            SplitMode::Second => {
                let (first, second) = self.slots.split_at_mut(self.program_len);
                let refill_first = first[0];
                let refill_second = load.unwrap_or(second[0]);
                shift_ring(first, refill_first);
                shift_ring(second, refill_second);
            }
        }
    }

    /// Replace the tail slot in place, without rotating.
    pub fn overwrite_tail(&mut self, word: u8, split: SplitMode) {
        let idx = self.tail_index(split);
        self.slots[idx] = word;
    }

    /// Slot a load lands in under `split`.
    #[must_use]
    pub fn tail_index(&self, split: SplitMode) -> usize {
        match self.effective(split) {
            SplitMode::First => self.program_len - 1,
            SplitMode::Joined | SplitMode::Second => self.slots.len() - 1,
        }
    }

    /// Split modes only apply to a double-buffered store.
    fn effective(&self, split: SplitMode) -> SplitMode {
        if self.double_buffered { split } else { SplitMode::Joined }
    }
}

fn shift_ring(ring: &mut [u8], refill: u8) {
    ring.copy_within(1.., 0);
    if let Some(tail) = ring.last_mut() {
        *tail = refill;
    }
}

impl Observable for ProgramStore {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "head" => Some(self.head().into()),
            "slots" => Some(self.slots().into()),
            "capacity" => Some(Value::U64(self.capacity() as u64)),
            "double_buffered" => Some(self.double_buffered.into()),
            _ => {
                let idx: usize = path.strip_prefix("slot.")?.parse().ok()?;
                self.slots.get(idx).map(|&w| w.into())
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["head", "slots", "capacity", "double_buffered"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::NOP;
    use proptest::prelude::*;

    fn counting(len: usize) -> Vec<u8> {
        (0..len).map(|i| i as u8).collect()
    }

    fn single(len: usize) -> ProgramStore {
        ProgramStore::new(len, false, &counting(len)).expect("valid image")
    }

    fn double(n: usize) -> ProgramStore {
        ProgramStore::new(n, true, &counting(2 * n)).expect("valid image")
    }

    #[test]
    fn default_program_installed_bit_for_bit() {
        let store = ProgramStore::with_default(16, false).expect("default");
        assert_eq!(store.slots(), &DEFAULT_PROGRAM);
        assert_eq!(store.head(), DEFAULT_PROGRAM[0]);
    }

    #[test]
    fn default_fills_both_halves() {
        let store = ProgramStore::with_default(16, true).expect("default");
        let (a, b) = store.halves();
        assert_eq!(a, &DEFAULT_PROGRAM);
        assert_eq!(b, &DEFAULT_PROGRAM);
    }

    #[test]
    fn no_default_for_short_programs() {
        assert!(ProgramStore::with_default(8, false).is_err());
    }

    #[test]
    fn rejects_wrong_image_length() {
        assert_eq!(
            ProgramStore::new(16, false, &[NOP; 15]).err(),
            Some(ShaderError::ProgramLength {
                expected: 16,
                actual: 15
            })
        );
        assert_eq!(
            ProgramStore::new(16, true, &[NOP; 16]).err(),
            Some(ShaderError::ProgramLength {
                expected: 32,
                actual: 16
            })
        );
    }

    #[test]
    fn rotate_moves_head_to_tail() {
        let mut store = single(4);
        store.rotate(None, SplitMode::Joined);
        assert_eq!(store.slots(), &[1, 2, 3, 0]);
        assert_eq!(store.head(), 1);
    }

    #[test]
    fn rotate_with_load_replaces_consumed_word() {
        let mut store = single(4);
        store.rotate(Some(0xAA), SplitMode::Joined);
        assert_eq!(store.slots(), &[1, 2, 3, 0xAA]);
    }

    #[test]
    fn overwrite_tail_does_not_rotate() {
        let mut store = single(4);
        store.overwrite_tail(NOP, SplitMode::Joined);
        assert_eq!(store.slots(), &[0, 1, 2, NOP]);
    }

    #[test]
    fn sixteen_loads_install_a_program_in_order() {
        let mut store = ProgramStore::with_default(16, false).expect("default");
        let program: Vec<u8> = (0x80..0x90).collect();
        for &word in &program {
            store.rotate(Some(word), SplitMode::Joined);
        }
        assert_eq!(store.slots(), &program[..]);
    }

    #[test]
    fn joined_double_buffer_is_one_ring() {
        let mut store = double(4);
        store.rotate(None, SplitMode::Joined);
        // Midpoint slot N-1 takes slot N.
        assert_eq!(store.slots(), &[1, 2, 3, 4, 5, 6, 7, 0]);
    }

    #[test]
    fn split_first_loads_first_half_only() {
        let mut store = double(4);
        store.rotate(Some(0xAA), SplitMode::First);
        assert_eq!(store.slots(), &[1, 2, 3, 0xAA, 5, 6, 7, 4]);
    }

    #[test]
    fn split_second_loads_second_half_only() {
        let mut store = double(4);
        store.rotate(Some(0xBB), SplitMode::Second);
        assert_eq!(store.slots(), &[1, 2, 3, 0, 5, 6, 7, 0xBB]);
    }

    #[test]
    fn split_tail_indices() {
        let store = double(4);
        assert_eq!(store.tail_index(SplitMode::Joined), 7);
        assert_eq!(store.tail_index(SplitMode::First), 3);
        assert_eq!(store.tail_index(SplitMode::Second), 7);
        // A single store ignores the split selection.
        assert_eq!(single(4).tail_index(SplitMode::First), 3);
        let mut s = single(4);
        s.rotate(Some(9), SplitMode::Second);
        assert_eq!(s.slots(), &[1, 2, 3, 9]);
    }

    #[test]
    fn joined_rotation_by_n_swaps_the_halves() {
        let mut store = double(4);
        for _ in 0..4 {
            store.rotate(None, SplitMode::Joined);
        }
        assert_eq!(store.slots(), &[4, 5, 6, 7, 0, 1, 2, 3]);
    }

    #[test]
    fn observable_slots() {
        let store = single(4);
        assert_eq!(store.query("head"), Some(Value::U8(0)));
        assert_eq!(store.query("slot.3"), Some(Value::U8(3)));
        assert_eq!(store.query("slot.4"), None);
        assert_eq!(store.query("capacity"), Some(Value::U64(4)));
    }

    fn split_mode() -> impl Strategy<Value = SplitMode> {
        prop_oneof![
            Just(SplitMode::Joined),
            Just(SplitMode::First),
            Just(SplitMode::Second),
        ]
    }

    proptest! {
        #[test]
        fn full_rotation_is_identity(
            image in prop::collection::vec(any::<u8>(), 32),
            double_buffered in any::<bool>(),
        ) {
            let len = if double_buffered { 16 } else { 32 };
            let mut store = ProgramStore::new(len, double_buffered, &image).expect("valid image");
            for _ in 0..store.capacity() {
                store.rotate(None, SplitMode::Joined);
            }
            prop_assert_eq!(store.slots(), &image[..]);
        }

        #[test]
        fn rotation_period_follows_the_split(
            image in prop::collection::vec(any::<u8>(), 32),
            split in split_mode(),
        ) {
            // Split halves are separate rings of N; joined is one ring of 2N.
            let period = if split == SplitMode::Joined { 32 } else { 16 };
            let mut store = ProgramStore::new(16, true, &image).expect("valid image");
            for _ in 0..period {
                store.rotate(None, split);
            }
            prop_assert_eq!(store.slots(), &image[..]);
        }

        #[test]
        fn load_differs_from_plain_rotation_only_at_tail(
            image in prop::collection::vec(any::<u8>(), 32),
            word in any::<u8>(),
            split in split_mode(),
        ) {
            let mut plain = ProgramStore::new(16, true, &image).expect("valid image");
            let mut loaded = ProgramStore::new(16, true, &image).expect("valid image");
            plain.rotate(None, split);
            loaded.rotate(Some(word), split);
            let tail = loaded.tail_index(split);
            for (i, (a, b)) in plain.slots().iter().zip(loaded.slots()).enumerate() {
                if i == tail {
                    prop_assert_eq!(*b, word);
                } else {
                    prop_assert_eq!(a, b);
                }
            }
        }

        #[test]
        fn split_loads_never_touch_the_other_half(
            image in prop::collection::vec(any::<u8>(), 32),
            words in prop::collection::vec(any::<u8>(), 1..64),
            target_first in any::<bool>(),
        ) {
            let split = if target_first { SplitMode::First } else { SplitMode::Second };
            let mut store = ProgramStore::new(16, true, &image).expect("valid image");
            let (first, second) = image.split_at(16);
            let untouched = if target_first { second } else { first };
            let mut expect: Vec<u8> = untouched.to_vec();
            for &word in &words {
                store.rotate(Some(word), split);
                expect.rotate_left(1);
                let (a, b) = store.halves();
                let other = if target_first { b } else { a };
                prop_assert_eq!(other, &expect[..]);
            }
        }

        #[test]
        fn rotation_preserves_the_word_multiset(
            image in prop::collection::vec(any::<u8>(), 16),
            steps in 0usize..40,
        ) {
            let mut store = ProgramStore::new(16, false, &image).expect("valid image");
            for _ in 0..steps {
                store.rotate(None, SplitMode::Joined);
            }
            let mut before = image.clone();
            let mut after = store.slots().to_vec();
            before.sort_unstable();
            after.sort_unstable();
            prop_assert_eq!(before, after);
        }
    }
}
