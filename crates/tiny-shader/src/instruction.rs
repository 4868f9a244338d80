//! Instruction words.
//!
//! The core never decodes instructions: it stores, rotates and replaces
//! opaque 8-bit words, and the external arithmetic unit interprets them.
//! The mnemonics below document the built-in program only.

/// No operation.
pub const NOP: u8 = 0x40;

/// Built-in program installed at reset when no image is supplied.
///
/// Computes `(x XOR y) + time` and writes it to the color output:
///
/// | Slot | Word   | Mnemonic      |
/// |------|--------|---------------|
/// | 0    | `0x44` | `GETX R0`     |
/// | 1    | `0x49` | `GETY R1`     |
/// | 2    | `0xC4` | `XOR R0 R1`   |
/// | 3    | `0x4D` | `GETTIME R1`  |
/// | 4    | `0xE4` | `ADD R0 R1`   |
/// | 5    | `0x10` | `SETRGB R0`   |
/// | 6-15 | `0x40` | `NOP`         |
pub const DEFAULT_PROGRAM: [u8; 16] = [
    0x44, 0x49, 0xC4, 0x4D, 0xE4, 0x10, NOP, NOP, NOP, NOP, NOP, NOP, NOP, NOP, NOP, NOP,
];

/// Mnemonic listing of [`DEFAULT_PROGRAM`], slot by slot.
pub const DEFAULT_LISTING: [&str; 16] = [
    "GETX R0",
    "GETY R1",
    "XOR R0 R1",
    "GETTIME R1",
    "ADD R0 R1",
    "SETRGB R0",
    "NOP",
    "NOP",
    "NOP",
    "NOP",
    "NOP",
    "NOP",
    "NOP",
    "NOP",
    "NOP",
    "NOP",
];
