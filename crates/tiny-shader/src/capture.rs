//! Capture pipeline and output stage.
//!
//! The color register is written in exactly two ways: a capture latches the
//! arithmetic unit's result, and blanking forces zero. Blanking wins when
//! both happen on the same tick. The raster signals are registered alongside
//! the color, so both leave the core one tick after the raster produced them
//! and stay aligned.

use shader_core::{Observable, Value};
use vga_timing::{RasterSignals, SyncPolarity};

/// Mask for the 6-bit `RRGGBB` color.
pub const COLOR_MASK: u8 = 0x3F;

/// Output pins, valid after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pins {
    /// `RRGGBB` color sample.
    pub color: u8,
    /// Horizontal sync line level (polarity applied).
    pub hsync: bool,
    /// Vertical sync line level (polarity applied).
    pub vsync: bool,
    /// In the horizontal sync pulse.
    pub sync_h: bool,
    /// In the vertical sync pulse.
    pub sync_v: bool,
    pub next_line: bool,
    pub next_frame: bool,
    /// Either axis blanking.
    pub blank: bool,
}

impl Pins {
    /// Expand the 2-bit channels to 8 bits each.
    #[must_use]
    pub fn rgb888(&self) -> [u8; 3] {
        rgb888(self.color)
    }
}

/// Expand a `RRGGBB` color to 8 bits per channel.
///
/// Each 2-bit channel becomes its top two bits, with the low six bits filled
/// from the channel's high bit: 0, 0x40, 0xBF, 0xFF.
#[must_use]
pub fn rgb888(color: u8) -> [u8; 3] {
    let expand = |c: u8| {
        let c = c & 0x3;
        let hi = c << 6;
        if c & 0x2 != 0 { hi | 0x3F } else { hi }
    };
    [expand(color >> 4), expand(color >> 2), expand(color)]
}

pub struct CapturePipeline {
    color: u8,
    delayed: RasterSignals,
    polarity: SyncPolarity,
    captures: u64,
}

impl CapturePipeline {
    #[must_use]
    pub fn new(polarity: SyncPolarity) -> Self {
        Self {
            color: 0,
            delayed: RasterSignals {
                blank_h: true,
                blank_v: true,
                ..RasterSignals::default()
            },
            polarity,
            captures: 0,
        }
    }

    /// Register this tick's raster signals and, unless blanking, the
    /// captured sample.
    pub fn clock(&mut self, signals: &RasterSignals, sample: Option<u8>) {
        if signals.blank() {
            self.color = 0;
        } else if let Some(color) = sample {
            self.color = color & COLOR_MASK;
            self.captures += 1;
        }
        self.delayed = *signals;
    }

    #[must_use]
    pub fn color(&self) -> u8 {
        self.color
    }

    /// Samples latched so far (blanked samples are not counted).
    #[must_use]
    pub fn captures(&self) -> u64 {
        self.captures
    }

    #[must_use]
    pub fn pins(&self) -> Pins {
        let s = &self.delayed;
        Pins {
            color: self.color,
            hsync: self.polarity.level(s.sync_h),
            vsync: self.polarity.level(s.sync_v),
            sync_h: s.sync_h,
            sync_v: s.sync_v,
            next_line: s.next_line,
            next_frame: s.next_frame,
            blank: s.blank(),
        }
    }
}

impl Observable for CapturePipeline {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "color" => Some(self.color.into()),
            "captures" => Some(self.captures.into()),
            "hsync" => Some(self.pins().hsync.into()),
            "vsync" => Some(self.pins().vsync.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["color", "captures", "hsync", "vsync"]
    }
}
