//! Tiny shader core.
//!
//! For every cell of a VGA raster the core runs a short micro-program
//! (at most 16 instruction words) through an external pixel arithmetic unit
//! and latches the 6-bit `RRGGBB` result in step with the beam.
//!
//! # Pipeline
//!
//! - [`ProgramStore`]: circular instruction memory, rotated one slot per
//!   execution tick; slot 0 feeds the arithmetic unit.
//! - [`Scheduler`]: looks one cell ahead of the beam, asserts `execute` and
//!   counts execution ticks modulo the program length.
//! - [`CapturePipeline`]: latches the unit's output one tick after the
//!   counter wraps, forces black during blanking and delays the raster
//!   signals by one tick to match.
//! - [`TimeAccumulator`]: triangle wave advanced once per frame.
//!
//! [`TinyShader`] wires these together with a [`vga_timing::VgaTiming`]
//! raster generator, a pause [`Synchronizer`], and the control channel
//! (SPI receiver feeding a depth-1 [`Handoff`]).
//!
//! # Timing (defaults)
//!
//! - Core clock 50 MHz, 2 ticks per 25 MHz dot.
//! - 16 instructions per cell: a cell is 8 dots wide and 8 lines tall,
//!   giving 80x60 cells on a 640x480 raster.

mod capture;
mod config;
mod error;
pub mod instruction;
mod monitor;
mod program;
mod scheduler;
mod shader;
mod sync;
mod time;
pub mod unit;

pub use capture::{COLOR_MASK, CapturePipeline, Pins, rgb888};
pub use config::{MAX_PROGRAM_LEN, ShaderConfig};
pub use error::{ConfigError, ShaderError};
pub use monitor::VgaMonitor;
pub use program::{ProgramStore, SplitMode};
pub use scheduler::{Cell, Phase, Scheduler};
pub use shader::{Reprogram, TinyShader};
pub use sync::{Handoff, Synchronizer};
pub use time::{TIME_MAX, TimeAccumulator};
pub use unit::{BlankUnit, PatternUnit, PixelUnit, UnitInputs};
