//! Shader core configuration.

use serde::{Deserialize, Serialize};
use vga_timing::VgaMode;

use crate::error::ConfigError;

/// Longest per-pixel program the core runs.
pub const MAX_PROGRAM_LEN: u16 = 16;

/// Configuration for a shader core.
///
/// The program length doubles as the execution window width: each cell is
/// `program_len` core ticks wide, so the two can never disagree. What can go
/// wrong is the raster not dividing into whole cells, which
/// [`validate`](Self::validate) rejects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShaderConfig {
    /// Instructions per pixel program (`N`).
    pub program_len: u16,
    /// Store `2N` words with a split point between the halves.
    pub double_buffered: bool,
    /// Core ticks per raster dot.
    pub ticks_per_dot: u16,
    /// Raster timing.
    pub mode: VgaMode,
    /// Reset-time program image. `None` installs the built-in default.
    pub program: Option<Vec<u8>>,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            program_len: MAX_PROGRAM_LEN,
            double_buffered: false,
            ticks_per_dot: 2,
            mode: VgaMode::default(),
            program: None,
        }
    }
}

impl ShaderConfig {
    /// Check that both raster axes fit their counters, that the raster
    /// divides into whole cells and that the scheduler's look-ahead fits
    /// inside horizontal blanking.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program_len == 0 || self.program_len > MAX_PROGRAM_LEN {
            return Err(ConfigError::ProgramLen(self.program_len));
        }
        if self.ticks_per_dot == 0 {
            return Err(ConfigError::ZeroTicksPerDot);
        }
        if !self.program_len.is_multiple_of(self.ticks_per_dot) {
            return Err(ConfigError::PartialDot {
                program_len: self.program_len,
                ticks_per_dot: self.ticks_per_dot,
            });
        }

        let hor = &self.mode.horizontal;
        let ver = &self.mode.vertical;
        for (axis, timing) in [("horizontal", hor), ("vertical", ver)] {
            match timing.checked_total() {
                None => return Err(ConfigError::AxisTooLong { axis }),
                Some(0) => return Err(ConfigError::EmptyAxis { axis }),
                Some(_) => {}
            }
        }

        let cell = self.cell_dots();
        if !hor.visible.is_multiple_of(cell) {
            return Err(ConfigError::PartialCell {
                axis: "width",
                visible: hor.visible,
                cell,
            });
        }
        if !ver.visible.is_multiple_of(cell) {
            return Err(ConfigError::PartialCell {
                axis: "height",
                visible: ver.visible,
                cell,
            });
        }

        let lookahead = u32::from(self.program_len);
        let blank = u32::from(hor.blank_len()) * u32::from(self.ticks_per_dot);
        if lookahead > blank {
            return Err(ConfigError::LookaheadTooLong { lookahead, blank });
        }
        Ok(())
    }

    /// Width and height of one cell in dots (and lines).
    #[must_use]
    pub fn cell_dots(&self) -> u16 {
        self.program_len / self.ticks_per_dot.max(1)
    }

    /// Words held by the program store.
    #[must_use]
    pub fn capacity(&self) -> usize {
        let n = usize::from(self.program_len);
        if self.double_buffered { 2 * n } else { n }
    }

    /// Visible cells per line and per frame.
    #[must_use]
    pub fn cells(&self) -> (u16, u16) {
        let cell = self.cell_dots().max(1);
        (
            self.mode.horizontal.visible / cell,
            self.mode.vertical.visible / cell,
        )
    }
}
