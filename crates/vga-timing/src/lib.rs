//! VGA raster timing generator.
//!
//! Two chained modulo counters: the horizontal counter advances once per
//! dot and wraps into the vertical counter. Counter value 0 is the first
//! visible dot (or line); the porches and the sync pulse follow the visible
//! region, in that order:
//!
//! ```text
//! | visible | front porch | sync | back porch |
//! 0         640           656    752          800   (horizontal, 640x480)
//! 0         480           490    492          525   (vertical)
//! ```
//!
//! # Dot prescaler
//!
//! The generator is ticked at the core clock. With `ticks_per_dot = 2` a
//! 50 MHz core drives the 25 MHz VGA dot clock; `phase` counts the core
//! ticks within the current dot.
//!
//! # Standalone IC
//!
//! This crate has no required dependencies. The optional `serde` feature
//! derives `Deserialize`/`Serialize` for the mode description so it can be
//! carried in settings files.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timing of one axis, in dots (horizontal) or lines (vertical).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisTiming {
    pub visible: u16,
    pub front_porch: u16,
    pub sync_pulse: u16,
    pub back_porch: u16,
}

impl AxisTiming {
    #[must_use]
    pub const fn new(visible: u16, front_porch: u16, sync_pulse: u16, back_porch: u16) -> Self {
        Self {
            visible,
            front_porch,
            sync_pulse,
            back_porch,
        }
    }

    /// Counter modulus.
    ///
    /// Assumes the axis fits a 16-bit counter; see [`checked_total`](Self::checked_total).
    #[must_use]
    pub const fn total(&self) -> u16 {
        self.visible + self.front_porch + self.sync_pulse + self.back_porch
    }

    /// Counter modulus, or `None` if it does not fit in 16 bits.
    #[must_use]
    pub const fn checked_total(&self) -> Option<u16> {
        let Some(a) = self.visible.checked_add(self.front_porch) else {
            return None;
        };
        let Some(b) = a.checked_add(self.sync_pulse) else {
            return None;
        };
        b.checked_add(self.back_porch)
    }

    /// Length of the blanking interval (everything but the visible region).
    #[must_use]
    pub const fn blank_len(&self) -> u16 {
        self.front_porch + self.sync_pulse + self.back_porch
    }

    #[must_use]
    pub const fn is_blank(&self, pos: u16) -> bool {
        pos >= self.visible
    }

    #[must_use]
    pub const fn is_sync(&self, pos: u16) -> bool {
        let start = self.visible + self.front_porch;
        pos >= start && pos < start + self.sync_pulse
    }
}

/// Electrical level of the sync pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SyncPolarity {
    /// Line is low during the pulse (640x480 standard).
    #[default]
    ActiveLow,
    /// Line is high during the pulse.
    ActiveHigh,
}

impl SyncPolarity {
    /// Pin level for a logical "in sync pulse" flag.
    #[must_use]
    pub const fn level(self, in_pulse: bool) -> bool {
        match self {
            SyncPolarity::ActiveLow => !in_pulse,
            SyncPolarity::ActiveHigh => in_pulse,
        }
    }

    /// Logical "in sync pulse" flag for a pin level.
    #[must_use]
    pub const fn is_active(self, level: bool) -> bool {
        self.level(level)
    }
}

/// A complete video mode. Fields missing from a settings file fall back to
/// [`VGA_640X480`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VgaMode {
    pub horizontal: AxisTiming,
    pub vertical: AxisTiming,
    pub polarity: SyncPolarity,
}

/// 640x480 at 60 Hz, 25 MHz dot clock.
pub const VGA_640X480: VgaMode = VgaMode {
    horizontal: AxisTiming::new(640, 16, 96, 48),
    vertical: AxisTiming::new(480, 10, 2, 33),
    polarity: SyncPolarity::ActiveLow,
};

impl Default for VgaMode {
    fn default() -> Self {
        VGA_640X480
    }
}

/// Raster outputs for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RasterSignals {
    /// Horizontal counter (dots).
    pub h: u16,
    /// Vertical counter (lines).
    pub v: u16,
    /// Core tick within the current dot (0..ticks_per_dot).
    pub phase: u16,
    pub blank_h: bool,
    pub blank_v: bool,
    /// In the horizontal sync pulse (logical, polarity not applied).
    pub sync_h: bool,
    /// In the vertical sync pulse (logical, polarity not applied).
    pub sync_v: bool,
    /// Last tick of the line.
    pub next_line: bool,
    /// Last tick of the frame.
    pub next_frame: bool,
}

impl RasterSignals {
    /// Either axis is blanking.
    #[must_use]
    pub const fn blank(&self) -> bool {
        self.blank_h || self.blank_v
    }
}

/// Raster timing generator.
pub struct VgaTiming {
    mode: VgaMode,
    ticks_per_dot: u16,
    h: u16,
    v: u16,
    phase: u16,
}

impl VgaTiming {
    /// Create a generator positioned at the first visible dot.
    ///
    /// `ticks_per_dot` of zero is treated as one.
    #[must_use]
    pub fn new(mode: VgaMode, ticks_per_dot: u16) -> Self {
        Self {
            mode,
            ticks_per_dot: ticks_per_dot.max(1),
            h: 0,
            v: 0,
            phase: 0,
        }
    }

    /// Outputs for the current position.
    #[must_use]
    pub fn signals(&self) -> RasterSignals {
        let hor = &self.mode.horizontal;
        let ver = &self.mode.vertical;
        let next_line = self.h == hor.total() - 1 && self.phase == self.ticks_per_dot - 1;
        RasterSignals {
            h: self.h,
            v: self.v,
            phase: self.phase,
            blank_h: hor.is_blank(self.h),
            blank_v: ver.is_blank(self.v),
            sync_h: hor.is_sync(self.h),
            sync_v: ver.is_sync(self.v),
            next_line,
            next_frame: next_line && self.v == ver.total() - 1,
        }
    }

    /// Advance by one core tick.
    pub fn tick(&mut self) {
        self.phase += 1;
        if self.phase < self.ticks_per_dot {
            return;
        }
        self.phase = 0;
        self.h += 1;
        if self.h >= self.mode.horizontal.total() {
            self.h = 0;
            self.v += 1;
            if self.v >= self.mode.vertical.total() {
                self.v = 0;
            }
        }
    }

    /// Jump to a position. Out-of-range values wrap.
    pub fn set_position(&mut self, h: u16, v: u16) {
        self.h = h % self.mode.horizontal.total();
        self.v = v % self.mode.vertical.total();
        self.phase = 0;
    }

    #[must_use]
    pub fn mode(&self) -> &VgaMode {
        &self.mode
    }

    #[must_use]
    pub fn ticks_per_dot(&self) -> u16 {
        self.ticks_per_dot
    }

    /// Core ticks per line.
    #[must_use]
    pub fn ticks_per_line(&self) -> u32 {
        u32::from(self.mode.horizontal.total()) * u32::from(self.ticks_per_dot)
    }

    /// Core ticks per frame.
    #[must_use]
    pub fn ticks_per_frame(&self) -> u64 {
        u64::from(self.ticks_per_line()) * u64::from(self.mode.vertical.total())
    }

    /// Position within the line in core ticks.
    #[must_use]
    pub fn line_tick(&self) -> u32 {
        u32::from(self.h) * u32::from(self.ticks_per_dot) + u32::from(self.phase)
    }
}
