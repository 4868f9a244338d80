//! Frame-rate triangle wave fed to the per-pixel program.

use shader_core::{Observable, Value};

/// Highest value of the 9-bit time register.
pub const TIME_MAX: u16 = 0x1FF;

/// Triangle-wave time accumulator.
///
/// Counts up to [`TIME_MAX`], then down to 1, then up again. It advances
/// once per frame and is only reset with the rest of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeAccumulator {
    value: u16,
    /// Direction bit: set while counting down.
    falling: bool,
}

impl TimeAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one frame.
    pub fn advance(&mut self) {
        if self.falling {
            self.value -= 1;
            if self.value == 1 {
                self.falling = false;
            }
        } else {
            self.value += 1;
            if self.value == TIME_MAX {
                self.falling = true;
            }
        }
    }

    #[must_use]
    pub fn value(&self) -> u16 {
        self.value
    }

    #[must_use]
    pub fn is_falling(&self) -> bool {
        self.falling
    }

    /// Bits 8..3, the slowly changing part.
    #[must_use]
    pub fn high_bits(&self) -> u8 {
        (self.value >> 3) as u8 & 0x3F
    }

    /// Bits 2..0.
    #[must_use]
    pub fn low_bits(&self) -> u8 {
        (self.value & 0x07) as u8
    }
}

impl Observable for TimeAccumulator {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "value" => Some(self.value.into()),
            "falling" => Some(self.falling.into()),
            "high" => Some(self.high_bits().into()),
            "low" => Some(self.low_bits().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["value", "falling", "high", "low"]
    }
}
