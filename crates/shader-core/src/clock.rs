//! Core clock and dot clock relationship.

/// The core clock and the raster dot clock derived from it.
///
/// The shader executes one instruction per core tick, while the raster
/// advances one dot every `ticks_per_dot` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelClock {
    /// Core clock frequency in Hz (`50_000_000` for the reference board).
    pub core_hz: u64,
    /// Core ticks per raster dot.
    pub ticks_per_dot: u16,
}

impl PixelClock {
    #[must_use]
    pub const fn new(core_hz: u64, ticks_per_dot: u16) -> Self {
        Self {
            core_hz,
            ticks_per_dot,
        }
    }

    /// Dot clock frequency in Hz (integer division).
    #[must_use]
    pub const fn dot_hz(&self) -> u64 {
        self.core_hz / self.ticks_per_dot as u64
    }
}

impl Default for PixelClock {
    fn default() -> Self {
        Self::new(50_000_000, 2)
    }
}
