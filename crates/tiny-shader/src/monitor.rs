//! A display that rebuilds the picture from the output pins.
//!
//! The monitor knows nothing about the core's internals. Like a real screen
//! it locks onto the sync pulses: the end of an hsync pulse starts the back
//! porch of a new line, the end of a vsync pulse starts the back porch of a
//! new frame. One sample is taken per dot.

use vga_timing::{SyncPolarity, VgaMode};

use crate::capture::Pins;

pub struct VgaMonitor {
    width: usize,
    height: usize,
    h_back_ticks: i64,
    v_back: i64,
    ticks_per_dot: i64,
    polarity: SyncPolarity,
    /// Core ticks since the first visible dot of the current line.
    x_tick: i64,
    /// Current line, once vsync has been seen.
    y: Option<i64>,
    prev_hsync: bool,
    prev_vsync: bool,
    frame: Vec<u8>,
    frames: u64,
}

impl VgaMonitor {
    #[must_use]
    pub fn new(mode: &VgaMode, ticks_per_dot: u16) -> Self {
        let width = usize::from(mode.horizontal.visible);
        let height = usize::from(mode.vertical.visible);
        let tpd = i64::from(ticks_per_dot.max(1));
        Self {
            width,
            height,
            h_back_ticks: i64::from(mode.horizontal.back_porch) * tpd,
            v_back: i64::from(mode.vertical.back_porch),
            ticks_per_dot: tpd,
            polarity: mode.polarity,
            x_tick: i64::MIN / 2,
            y: None,
            prev_hsync: false,
            prev_vsync: false,
            frame: vec![0; width * height],
            frames: 0,
        }
    }

    /// Consume one tick of output. Returns `true` when a frame completes.
    pub fn sample(&mut self, pins: &Pins) -> bool {
        let hsync = self.polarity.is_active(pins.hsync);
        let vsync = self.polarity.is_active(pins.vsync);
        let mut completed = false;

        if self.prev_vsync && !vsync {
            self.y = Some(-self.v_back);
            self.frames += 1;
            completed = true;
        }
        if self.prev_hsync && !hsync {
            self.x_tick = -self.h_back_ticks;
            if let Some(y) = self.y.as_mut() {
                *y += 1;
            }
        } else {
            self.x_tick += 1;
        }
        self.prev_hsync = hsync;
        self.prev_vsync = vsync;

        if let Some(y) = self.y
            && self.x_tick >= 0
            && self.x_tick % self.ticks_per_dot == 0
        {
            let x = self.x_tick / self.ticks_per_dot;
            if (0..self.width as i64).contains(&x) && (0..self.height as i64).contains(&y) {
                self.frame[y as usize * self.width + x as usize] = pins.color;
            }
        }
        completed
    }

    /// The most recent picture, row-major `RRGGBB` samples.
    #[must_use]
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.frame[y * self.width + x]
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Vertical sync pulses seen. The picture is complete from the second.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frame as packed RGB888, three bytes per dot.
    #[must_use]
    pub fn to_rgb888(&self) -> Vec<u8> {
        self.frame
            .iter()
            .flat_map(|&c| crate::capture::rgb888(c))
            .collect()
    }
}
