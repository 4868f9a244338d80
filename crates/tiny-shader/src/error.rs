//! Build-time configuration errors and control-path errors.

use crate::config::MAX_PROGRAM_LEN;

/// Timing constants that cannot produce an aligned image.
///
/// These are rejected when a machine is built; the tick path itself never
/// fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{axis} timing has no lines or dots")]
    EmptyAxis { axis: &'static str },
    #[error("{axis} timing does not fit a 16-bit counter")]
    AxisTooLong { axis: &'static str },
    #[error("program length {0} outside 1..={MAX_PROGRAM_LEN}")]
    ProgramLen(u16),
    #[error("ticks per dot must be at least 1")]
    ZeroTicksPerDot,
    #[error("program length {program_len} is not a whole number of dots at {ticks_per_dot} ticks per dot")]
    PartialDot { program_len: u16, ticks_per_dot: u16 },
    #[error("visible {axis} of {visible} is not a whole number of {cell}-dot cells")]
    PartialCell {
        axis: &'static str,
        visible: u16,
        cell: u16,
    },
    #[error("look-ahead of {lookahead} ticks does not fit the {blank}-tick horizontal blank")]
    LookaheadTooLong { lookahead: u32, blank: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShaderError {
    #[error("invalid timing configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("program image has {actual} words, the store holds {expected}")]
    ProgramLength { expected: usize, actual: usize },
    #[error("control handoff still holds word {0:#04X}")]
    HandoffOccupied(u8),
}
