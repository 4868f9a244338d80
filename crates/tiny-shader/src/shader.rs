//! Top-level shader core.
//!
//! Owns the raster generator, program store, scheduler, capture pipeline,
//! time accumulator and the control path, and steps them together one core
//! tick at a time. Every component evaluates against the state left by the
//! previous tick before anything is committed, so the order of the commits
//! below never leaks into the outputs.

use shader_core::{Observable, Tickable, Value};
use spi_receiver::{SpiPins, SpiReceiver};
use vga_timing::{RasterSignals, VgaTiming};

use crate::capture::{CapturePipeline, Pins};
use crate::config::ShaderConfig;
use crate::error::ShaderError;
use crate::program::{ProgramStore, SplitMode};
use crate::scheduler::Scheduler;
use crate::sync::{Handoff, Synchronizer};
use crate::time::TimeAccumulator;
use crate::unit::{PixelUnit, UnitInputs};

/// A reprogramming request for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reprogram {
    /// Incoming instruction word.
    pub word: u8,
    /// Write `word` into the tail slot.
    pub load: bool,
    /// Rotate even if no program is executing.
    pub rotate: bool,
}

impl Reprogram {
    /// Overwrite the tail slot; rotates only if a program is executing.
    #[must_use]
    pub const fn load(word: u8) -> Self {
        Self {
            word,
            load: true,
            rotate: false,
        }
    }

    /// Shift `word` into the store: load plus rotate.
    #[must_use]
    pub const fn push(word: u8) -> Self {
        Self {
            word,
            load: true,
            rotate: true,
        }
    }

    /// Rotate without loading.
    pub const ROTATE: Self = Self {
        word: 0,
        load: false,
        rotate: true,
    };
}

/// The shader core with its pixel arithmetic unit attached.
pub struct TinyShader<U: PixelUnit> {
    config: ShaderConfig,
    raster: VgaTiming,
    store: ProgramStore,
    scheduler: Scheduler,
    capture: CapturePipeline,
    time: TimeAccumulator,
    pause_raw: bool,
    pause_sync: Synchronizer,
    handoff: Handoff,
    spi: SpiReceiver,
    request: Option<Reprogram>,
    split: SplitMode,
    unit: U,
    last_inputs: UnitInputs,
    tick_count: u64,
    frame_count: u64,
    overruns: u64,
}

impl<U: PixelUnit> TinyShader<U> {
    /// Build a core from a configuration. The program store is loaded with
    /// `config.program`, or the built-in default if none is given.
    pub fn new(config: ShaderConfig, unit: U) -> Result<Self, ShaderError> {
        config.validate()?;
        let n = usize::from(config.program_len);
        let store = match &config.program {
            Some(image) => ProgramStore::new(n, config.double_buffered, image)?,
            None => ProgramStore::with_default(n, config.double_buffered)?,
        };
        let (cols, rows) = config.cells();
        log::info!(
            "tiny shader: {n}-word programs{}, {cols}x{rows} cells, {} ticks/dot, {} program",
            if config.double_buffered { " (double-buffered)" } else { "" },
            config.ticks_per_dot,
            if config.program.is_some() { "custom" } else { "default" },
        );

        Ok(Self {
            raster: VgaTiming::new(config.mode, config.ticks_per_dot),
            scheduler: Scheduler::new(&config),
            capture: CapturePipeline::new(config.mode.polarity),
            store,
            time: TimeAccumulator::new(),
            pause_raw: false,
            pause_sync: Synchronizer::new(),
            handoff: Handoff::new(),
            spi: SpiReceiver::new(),
            request: None,
            split: SplitMode::Joined,
            unit,
            last_inputs: UnitInputs::default(),
            tick_count: 0,
            frame_count: 0,
            overruns: 0,
            config,
        })
    }

    /// Drive the raw pause input. It reaches the scheduler through the
    /// two-stage synchronizer.
    pub fn set_pause(&mut self, pause: bool) {
        self.pause_raw = pause;
    }

    /// Select how a double-buffered store rotates and where loads land.
    pub fn set_split_mode(&mut self, split: SplitMode) {
        self.split = split;
    }

    /// Present a reprogram request on the next tick. A later request before
    /// that tick replaces it.
    pub fn request(&mut self, request: Reprogram) {
        self.request = Some(request);
    }

    /// Offer a control word through the handoff. It is shifted in (load and
    /// rotate) on the next tick that has no direct request.
    pub fn offer_word(&mut self, word: u8) -> Result<(), ShaderError> {
        self.handoff.offer(word)
    }

    /// Present SPI pin levels to the control receiver. A completed word goes
    /// to the handoff; if the handoff is still full the word is dropped.
    pub fn spi_clock(&mut self, pins: SpiPins) {
        let Some(word) = self.spi.clock(pins) else {
            return;
        };
        if let Err(err) = self.handoff.offer(word) {
            self.overruns += 1;
            log::warn!("spi word {word:#04X} dropped: {err}");
        }
    }

    /// Send `words` as one SPI burst, holding each pin state for
    /// `ticks_per_edge` core ticks. Returns the core ticks spent.
    pub fn upload(&mut self, words: &[u8], ticks_per_edge: u64) -> u64 {
        self.upload_with(words, ticks_per_edge, |_| {})
    }

    /// [`upload`](Self::upload), handing the output pins to `observe` after
    /// every tick.
    pub fn upload_with(
        &mut self,
        words: &[u8],
        ticks_per_edge: u64,
        mut observe: impl FnMut(&Pins),
    ) -> u64 {
        let start = self.tick_count;
        for pins in spi_receiver::burst(words) {
            self.spi_clock(pins);
            for _ in 0..ticks_per_edge.max(1) {
                self.tick();
                observe(&self.capture.pins());
            }
        }
        // Let the last word leave the handoff.
        if self.handoff.pending().is_some() {
            self.tick();
            observe(&self.capture.pins());
        }
        log::debug!("uploaded {} words over spi", words.len());
        self.tick_count - start
    }

    /// Run one raster frame's worth of ticks. Returns the tick count.
    pub fn run_frame(&mut self) -> u64 {
        self.run_frame_with(|_| {})
    }

    /// Run one raster frame, handing the output pins to `observe` after
    /// every tick.
    pub fn run_frame_with(&mut self, mut observe: impl FnMut(&Pins)) -> u64 {
        let ticks = self.raster.ticks_per_frame();
        for _ in 0..ticks {
            self.tick();
            observe(&self.capture.pins());
        }
        ticks
    }

    /// Output pins: color and the one-tick-delayed raster signals.
    #[must_use]
    pub fn pins(&self) -> Pins {
        self.capture.pins()
    }

    /// The word the arithmetic unit receives on the next tick.
    #[must_use]
    pub fn current_instruction(&self) -> u8 {
        self.store.head()
    }

    /// Inputs the arithmetic unit received on the last tick.
    #[must_use]
    pub fn last_inputs(&self) -> UnitInputs {
        self.last_inputs
    }

    /// Raster signals for the next tick.
    #[must_use]
    pub fn raster_signals(&self) -> RasterSignals {
        self.raster.signals()
    }

    #[must_use]
    pub fn config(&self) -> &ShaderConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &ProgramStore {
        &self.store
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn capture(&self) -> &CapturePipeline {
        &self.capture
    }

    #[must_use]
    pub fn time(&self) -> &TimeAccumulator {
        &self.time
    }

    #[must_use]
    pub fn unit(&self) -> &U {
        &self.unit
    }

    pub fn unit_mut(&mut self) -> &mut U {
        &mut self.unit
    }

    #[must_use]
    pub fn split_mode(&self) -> SplitMode {
        self.split
    }

    /// Synchronized pause level as seen by the scheduler.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.pause_sync.output()
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Frames completed (raster `next_frame` pulses).
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// SPI words dropped because the handoff was full.
    #[must_use]
    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}

impl<U: PixelUnit> Tickable for TinyShader<U> {
    fn tick(&mut self) {
        // Evaluate from the previous tick's state.
        let signals = self.raster.signals();
        let window = if self.pause_sync.output() {
            None
        } else {
            self.scheduler.window(&signals)
        };
        let execute = window.is_some();
        let cell = window.unwrap_or_default();
        let sample = self.scheduler.capture_due().then(|| self.unit.color());

        let inputs = UnitInputs {
            instruction: self.store.head(),
            execute,
            x_pos: cell.x,
            y_pos: cell.y,
            time_high: self.time.high_bits(),
            time_low: self.time.low_bits(),
        };

        let request = self
            .request
            .take()
            .or_else(|| self.handoff.take().map(Reprogram::push));
        let load = request.filter(|r| r.load).map(|r| r.word);
        let shift = execute || request.is_some_and(|r| r.rotate);

        // Commit.
        self.unit.tick(&inputs);
        self.last_inputs = inputs;
        if shift {
            self.store.rotate(load, self.split);
        } else if let Some(word) = load {
            self.store.overwrite_tail(word, self.split);
        }
        self.scheduler.advance(execute);
        self.capture.clock(&signals, sample);
        if signals.next_frame {
            self.time.advance();
            self.frame_count += 1;
            log::debug!(
                "frame {} complete, time {}",
                self.frame_count,
                self.time.value()
            );
        }
        self.pause_sync.clock(self.pause_raw);
        self.raster.tick();
        self.tick_count += 1;
    }
}

impl<U: PixelUnit> Observable for TinyShader<U> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("store.") {
            self.store.query(rest)
        } else if let Some(rest) = path.strip_prefix("scheduler.") {
            self.scheduler.query(rest)
        } else if let Some(rest) = path.strip_prefix("time.") {
            self.time.query(rest)
        } else if let Some(rest) = path.strip_prefix("capture.") {
            self.capture.query(rest)
        } else if let Some(rest) = path.strip_prefix("raster.") {
            let s = self.raster.signals();
            match rest {
                "h" => Some(s.h.into()),
                "v" => Some(s.v.into()),
                "phase" => Some(s.phase.into()),
                "blank" => Some(s.blank().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("unit.") {
            let i = &self.last_inputs;
            match rest {
                "instruction" => Some(i.instruction.into()),
                "execute" => Some(i.execute.into()),
                "x" => Some(i.x_pos.into()),
                "y" => Some(i.y_pos.into()),
                "color" => Some(self.unit.color().into()),
                _ => None,
            }
        } else {
            match path {
                "tick_count" => Some(self.tick_count.into()),
                "frame_count" => Some(self.frame_count.into()),
                "pause" => Some(self.pause_raw.into()),
                "paused" => Some(self.pause_sync.output().into()),
                "split" => Some(Value::U8(match self.split {
                    SplitMode::Joined => 0,
                    SplitMode::First => 1,
                    SplitMode::Second => 2,
                })),
                "handoff.pending" => Some(self.handoff.pending().is_some().into()),
                "handoff.delivered" => Some(self.handoff.delivered().into()),
                "spi.words" => Some(self.spi.words_received().into()),
                "overruns" => Some(self.overruns.into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "tick_count",
            "frame_count",
            "raster.h",
            "raster.v",
            "raster.phase",
            "raster.blank",
            "store.head",
            "store.slots",
            "store.capacity",
            "store.double_buffered",
            "scheduler.counter",
            "scheduler.executing",
            "scheduler.capture_due",
            "capture.color",
            "capture.captures",
            "capture.hsync",
            "capture.vsync",
            "time.value",
            "time.falling",
            "time.high",
            "time.low",
            "unit.instruction",
            "unit.execute",
            "unit.x",
            "unit.y",
            "unit.color",
            "pause",
            "paused",
            "split",
            "handoff.pending",
            "handoff.delivered",
            "spi.words",
            "overruns",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::instruction::{DEFAULT_PROGRAM, NOP};
    use crate::unit::{BlankUnit, PatternUnit};

    fn shader() -> TinyShader<PatternUnit> {
        TinyShader::new(ShaderConfig::default(), PatternUnit::new()).expect("valid config")
    }

    #[test]
    fn reset_state() {
        let s = shader();
        assert_eq!(s.store().slots(), &DEFAULT_PROGRAM);
        assert_eq!(s.current_instruction(), DEFAULT_PROGRAM[0]);
        assert_eq!(s.pins().color, 0);
        assert_eq!(s.time().value(), 0);
        assert!(!s.is_paused());
    }

    #[test]
    fn rejects_bad_image_length() {
        let config = ShaderConfig {
            program: Some(vec![NOP; 15]),
            ..ShaderConfig::default()
        };
        assert!(matches!(
            TinyShader::new(config, BlankUnit),
            Err(ShaderError::ProgramLength {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn rejects_invalid_timing() {
        let config = ShaderConfig {
            program_len: 12,
            ..ShaderConfig::default()
        };
        assert!(matches!(
            TinyShader::new(config, BlankUnit),
            Err(ShaderError::Config(_))
        ));
    }

    #[test]
    fn execution_starts_on_first_tick_at_line_start() {
        let mut s = shader();
        s.tick();
        let inputs = s.last_inputs();
        assert!(inputs.execute);
        assert_eq!((inputs.x_pos, inputs.y_pos), (1, 0));
        assert_eq!(inputs.instruction, DEFAULT_PROGRAM[0]);
        assert_eq!(s.current_instruction(), DEFAULT_PROGRAM[1]);
    }

    #[test]
    fn direct_request_beats_handoff() {
        let mut s = shader();
        s.set_pause(true);
        s.tick_n(shader_core::Ticks::new(2));
        let before = s.store().slots().to_vec();
        s.offer_word(0x11).expect("handoff empty");
        s.request(Reprogram::push(0x22));
        s.tick();
        // The direct request is applied, the handoff word still waits.
        assert_eq!(s.store().slots()[15], 0x22);
        assert_eq!(&s.store().slots()[..15], &before[1..]);
        assert_eq!(s.query("handoff.pending"), Some(Value::Bool(true)));
        s.tick();
        assert_eq!(s.store().slots()[15], 0x11);
        assert_eq!(s.query("handoff.pending"), Some(Value::Bool(false)));
    }

    #[test]
    fn rotate_pulse_without_load_circulates() {
        let mut s = shader();
        s.set_pause(true);
        s.tick_n(shader_core::Ticks::new(2));
        let before = s.store().slots().to_vec();
        s.request(Reprogram::ROTATE);
        s.tick();
        let mut expect = before.clone();
        expect.rotate_left(1);
        assert_eq!(s.store().slots(), &expect[..]);
    }

    #[test]
    fn upload_hands_every_tick_to_the_observer() {
        let mut s = shader();
        s.set_pause(true);
        s.tick_n(shader_core::Ticks::new(2));
        let mut seen = 0u64;
        let mut last = None;
        let ticks = s.upload_with(&[NOP; 16], 3, |pins| {
            seen += 1;
            last = Some(*pins);
        });
        assert!(ticks > 0);
        assert_eq!(seen, ticks);
        assert_eq!(last, Some(s.pins()));
        assert_eq!(s.store().slots(), &[NOP; 16]);
    }

    #[test]
    fn rejects_empty_raster_axis() {
        let mut config = ShaderConfig::default();
        config.mode.vertical = vga_timing::AxisTiming::new(0, 0, 0, 0);
        assert!(matches!(
            TinyShader::new(config, BlankUnit),
            Err(ShaderError::Config(ConfigError::EmptyAxis { axis: "vertical" }))
        ));
    }

    #[test]
    fn frame_advances_time() {
        let mut s = shader();
        let ticks = s.run_frame();
        assert_eq!(ticks, 800 * 525 * 2);
        assert_eq!(s.frame_count(), 1);
        assert_eq!(s.time().value(), 1);
        assert_eq!(s.raster_signals().h, 0);
        assert_eq!(s.raster_signals().v, 0);
    }

    #[test]
    fn observable_paths_resolve() {
        let s = shader();
        for &path in s.query_paths() {
            assert!(s.query(path).is_some(), "{path}");
        }
        assert_eq!(s.query("store.slot.0"), Some(Value::U8(DEFAULT_PROGRAM[0])));
        assert_eq!(s.query("bogus"), None);
    }
}
