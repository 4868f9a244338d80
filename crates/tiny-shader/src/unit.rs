//! Pixel arithmetic unit interface.
//!
//! The arithmetic unit is external to the core: it owns the register file
//! and the opcode decoder. The core presents one instruction per tick along
//! with the cell coordinates and the time fields, and reads back a
//! registered 6-bit color. After the `N` instructions of a program have been
//! presented, `color()` must hold that program's result.

/// Everything the core presents to the unit on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitInputs {
    /// Slot 0 of the program store.
    pub instruction: u8,
    /// A program is executing this tick.
    pub execute: bool,
    /// Cell column being computed (0 outside the window).
    pub x_pos: u16,
    /// Cell row being computed (0 outside the window).
    pub y_pos: u16,
    /// Time bits 8..3.
    pub time_high: u8,
    /// Time bits 2..0.
    pub time_low: u8,
}

/// A pixel arithmetic unit.
pub trait PixelUnit {
    /// Consume one tick's inputs.
    fn tick(&mut self, inputs: &UnitInputs);

    /// Registered color output (low six bits are used).
    fn color(&self) -> u8;
}

impl<U: PixelUnit + ?Sized> PixelUnit for Box<U> {
    fn tick(&mut self, inputs: &UnitInputs) {
        (**self).tick(inputs);
    }

    fn color(&self) -> u8 {
        (**self).color()
    }
}

/// A unit that always outputs black.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankUnit;

impl PixelUnit for BlankUnit {
    fn tick(&mut self, _inputs: &UnitInputs) {}

    fn color(&self) -> u8 {
        0
    }
}

/// Alignment test pattern.
///
/// Ignores the instruction stream and outputs `((x ^ y) + time_high) & 0x3F`
/// for the cell it was last given. Each cell gets a distinct-enough color
/// that a shifted or torn image is obvious.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternUnit {
    out: u8,
}

impl PatternUnit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Color the pattern assigns to a cell.
    #[must_use]
    pub fn pattern(x: u16, y: u16, time_high: u8) -> u8 {
        (((x ^ y) as u8).wrapping_add(time_high)) & 0x3F
    }
}

impl PixelUnit for PatternUnit {
    fn tick(&mut self, inputs: &UnitInputs) {
        if inputs.execute {
            self.out = Self::pattern(inputs.x_pos, inputs.y_pos, inputs.time_high);
        }
    }

    fn color(&self) -> u8 {
        self.out
    }
}
