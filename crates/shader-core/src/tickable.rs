//! Trait for components advanced by the core clock.

use crate::Ticks;

/// A component advanced one core-clock tick at a time.
///
/// Implementations read only the state committed by the previous tick and
/// commit all of their new state before returning.
pub trait Tickable {
    /// Advance by one core-clock tick.
    fn tick(&mut self);

    /// Advance by `count` ticks.
    ///
    /// Overrides must be observably identical to calling `tick()` in a loop.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
