//! Execution scheduler.
//!
//! The scheduler decides on every tick whether a program is executing. It
//! looks `N` ticks (one cell) ahead of the beam: the program for a cell runs
//! during the `N` ticks before the cell is drawn, so its result is ready on
//! the cell's first tick. For the first cell of a line that look-ahead
//! reaches back into the previous line's horizontal blank.
//!
//! The cycle counter only detects completion. When it wraps to 0 with
//! execution active on the previous tick, a full program has passed through
//! the arithmetic unit and the capture pipeline latches the result.

use shader_core::{Observable, Value};
use vga_timing::RasterSignals;

use crate::config::ShaderConfig;

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Outside the window or paused; the store is frozen.
    Idle,
    /// Executing one instruction per tick.
    Running,
}

/// Cell coordinates of the program currently being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub x: u16,
    pub y: u16,
}

pub struct Scheduler {
    program_len: u16,
    cell_lines: u16,
    ticks_per_dot: u32,
    line_ticks: u32,
    visible_ticks: u32,
    total_lines: u16,
    visible_lines: u16,
    counter: u16,
    /// `execute` as asserted on the previous tick.
    executing: bool,
}

impl Scheduler {
    /// Build from a validated configuration.
    #[must_use]
    pub fn new(config: &ShaderConfig) -> Self {
        let tpd = u32::from(config.ticks_per_dot.max(1));
        let hor = &config.mode.horizontal;
        let ver = &config.mode.vertical;
        Self {
            program_len: config.program_len.max(1),
            cell_lines: config.cell_dots().max(1),
            ticks_per_dot: tpd,
            line_ticks: u32::from(hor.total()) * tpd,
            visible_ticks: u32::from(hor.visible) * tpd,
            total_lines: ver.total(),
            visible_lines: ver.visible,
            counter: 0,
            executing: false,
        }
    }

    /// The cell whose program should be executing at this raster position,
    /// or `None` outside the execution window.
    #[must_use]
    pub fn window(&self, signals: &RasterSignals) -> Option<Cell> {
        let line_tick =
            u32::from(signals.h) * self.ticks_per_dot + u32::from(signals.phase);
        let mut ahead = line_tick + u32::from(self.program_len);
        let mut line = signals.v;
        if ahead >= self.line_ticks {
            ahead -= self.line_ticks;
            line = (line + 1) % self.total_lines;
        }
        if ahead >= self.visible_ticks || line >= self.visible_lines {
            return None;
        }
        Some(Cell {
            x: (ahead / u32::from(self.program_len)) as u16,
            y: line / self.cell_lines,
        })
    }

    /// The counter wrapped to 0 while executing on the previous tick: a full
    /// program has completed and the result is due for capture.
    #[must_use]
    pub fn capture_due(&self) -> bool {
        self.executing && self.counter == 0
    }

    /// Commit this tick's `execute` decision.
    pub fn advance(&mut self, execute: bool) {
        self.counter = if execute {
            (self.counter + 1) % self.program_len
        } else {
            0
        };
        self.executing = execute;
    }

    #[must_use]
    pub fn counter(&self) -> u16 {
        self.counter
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.executing {
            Phase::Running
        } else {
            Phase::Idle
        }
    }

    #[must_use]
    pub fn program_len(&self) -> u16 {
        self.program_len
    }
}

impl Observable for Scheduler {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "counter" => Some(self.counter.into()),
            "executing" => Some(self.executing.into()),
            "capture_due" => Some(self.capture_due().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["counter", "executing", "capture_due"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vga_timing::{VGA_640X480, VgaTiming};

    fn signals_at(h: u16, v: u16, phase: u16) -> RasterSignals {
        let mut timing = VgaTiming::new(VGA_640X480, 2);
        timing.set_position(h, v);
        for _ in 0..phase {
            timing.tick();
        }
        timing.signals()
    }

    fn scheduler() -> Scheduler {
        Scheduler::new(&ShaderConfig::default())
    }

    #[test]
    fn window_runs_one_cell_ahead() {
        let s = scheduler();
        // Dot 0 of line 10 computes cell 1 (dots 8..16).
        assert_eq!(s.window(&signals_at(0, 10, 0)), Some(Cell { x: 1, y: 1 }));
        // Dot 7, phase 1 is the last tick of cell 1's run.
        assert_eq!(s.window(&signals_at(7, 10, 1)), Some(Cell { x: 1, y: 1 }));
        assert_eq!(s.window(&signals_at(8, 10, 0)), Some(Cell { x: 2, y: 1 }));
    }

    #[test]
    fn first_cell_runs_in_previous_blank() {
        let s = scheduler();
        assert_eq!(s.window(&signals_at(791, 7, 1)), None);
        assert_eq!(s.window(&signals_at(792, 7, 0)), Some(Cell { x: 0, y: 1 }));
        // Last line of the frame prepares line 0.
        assert_eq!(s.window(&signals_at(792, 524, 0)), Some(Cell { x: 0, y: 0 }));
    }

    #[test]
    fn window_closes_one_cell_before_active_end() {
        let s = scheduler();
        assert_eq!(s.window(&signals_at(631, 0, 1)), Some(Cell { x: 79, y: 0 }));
        assert_eq!(s.window(&signals_at(632, 0, 0)), None);
    }

    #[test]
    fn no_execution_for_lines_past_the_bottom() {
        let s = scheduler();
        assert_eq!(s.window(&signals_at(792, 479, 0)), None);
        assert_eq!(s.window(&signals_at(100, 480, 0)), None);
    }

    #[test]
    fn window_is_exactly_program_length_per_cell() {
        let s = scheduler();
        let mut timing = VgaTiming::new(VGA_640X480, 2);
        timing.set_position(0, 20);
        let mut per_cell = [0u32; 80];
        for _ in 0..timing.ticks_per_line() {
            if let Some(cell) = s.window(&timing.signals()) {
                per_cell[usize::from(cell.x)] += 1;
            }
            timing.tick();
        }
        assert!(per_cell.iter().all(|&n| n == 16));
    }

    #[test]
    fn counter_wraps_and_flags_capture() {
        let mut s = scheduler();
        assert!(!s.capture_due());
        for i in 0..16 {
            assert!(!s.capture_due(), "tick {i}");
            s.advance(true);
        }
        assert_eq!(s.counter(), 0);
        assert!(s.capture_due());
        s.advance(true);
        assert!(!s.capture_due());
    }

    #[test]
    fn deassert_resets_counter_without_capture() {
        let mut s = scheduler();
        for _ in 0..5 {
            s.advance(true);
        }
        s.advance(false);
        assert_eq!(s.counter(), 0);
        assert_eq!(s.phase(), Phase::Idle);
        assert!(!s.capture_due());
    }
}
