//! SPI receiver for the shader control channel.
//!
//! Mode 1 (CPOL=0, CPHA=1): the clock idles low, the master changes MOSI on
//! the rising edge and the receiver samples on the falling edge. Words are
//! 8 bits, MSB first. Chip select is active low; raising it discards any
//! partial word. A burst keeps chip select low across several words.
//!
//! The receiver runs in the control clock domain. It only sees pin levels
//! and knows nothing about the core clock; handing completed words to the
//! pixel domain is the caller's job.

/// Pin levels on the control connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiPins {
    pub sclk: bool,
    pub mosi: bool,
    /// Chip select, active low.
    pub cs_n: bool,
}

impl SpiPins {
    /// Bus idle: clock low, chip select released.
    pub const IDLE: Self = Self {
        sclk: false,
        mosi: false,
        cs_n: true,
    };
}

/// Mode 1 SPI receiver.
pub struct SpiReceiver {
    shift: u8,
    bits: u8,
    prev_sclk: bool,
    words: u64,
}

impl SpiReceiver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shift: 0,
            bits: 0,
            prev_sclk: false,
            words: 0,
        }
    }

    /// Present new pin levels. Returns a word when its eighth bit is sampled.
    pub fn clock(&mut self, pins: SpiPins) -> Option<u8> {
        let falling = self.prev_sclk && !pins.sclk;
        self.prev_sclk = pins.sclk;

        if pins.cs_n {
            if self.bits != 0 {
                log::debug!("spi: chip select released after {} bits, word dropped", self.bits);
            }
            self.shift = 0;
            self.bits = 0;
            return None;
        }

        if !falling {
            return None;
        }

        self.shift = (self.shift << 1) | u8::from(pins.mosi);
        self.bits += 1;
        if self.bits < 8 {
            return None;
        }

        let word = self.shift;
        self.shift = 0;
        self.bits = 0;
        self.words += 1;
        log::trace!("spi: word {word:#04X}");
        Some(word)
    }

    /// Bits of the current partial word.
    #[must_use]
    pub fn pending_bits(&self) -> u8 {
        self.bits
    }

    /// Words received since construction.
    #[must_use]
    pub fn words_received(&self) -> u64 {
        self.words
    }
}

impl Default for SpiReceiver {
    fn default() -> Self {
        Self::new()
    }
}

/// Pin sequence a mode 1 master produces for a burst of words.
///
/// Chip select drops, each bit is driven on a rising edge and sampled on the
/// following falling edge, then chip select is released.
#[must_use]
pub fn burst(words: &[u8]) -> Vec<SpiPins> {
    let mut seq = Vec::with_capacity(words.len() * 16 + 2);
    seq.push(SpiPins {
        sclk: false,
        mosi: false,
        cs_n: false,
    });
    for &word in words {
        for bit in (0..8).rev() {
            let mosi = word & (1 << bit) != 0;
            seq.push(SpiPins {
                sclk: true,
                mosi,
                cs_n: false,
            });
            seq.push(SpiPins {
                sclk: false,
                mosi,
                cs_n: false,
            });
        }
    }
    seq.push(SpiPins::IDLE);
    seq
}
