//! Whole-frame behaviour seen from the output pins, and the SPI control path.

use shader_core::{Observable, Tickable, Ticks, Value};
use spi_receiver::burst;
use tiny_shader::{PatternUnit, ShaderConfig, TinyShader, VgaMonitor};

/// Run two frames into a monitor and check every visible dot against the
/// pattern for its cell.
fn check_alignment(config: ShaderConfig) {
    let cell = usize::from(config.cell_dots());
    let mut monitor = VgaMonitor::new(&config.mode, config.ticks_per_dot);
    let mut s = TinyShader::new(config, PatternUnit::new()).expect("valid config");
    for _ in 0..2 {
        s.run_frame_with(|pins| {
            monitor.sample(pins);
        });
    }
    assert_eq!(monitor.frames(), 2);
    // Time stays below 8 for the first frames, so time_high is 0.
    assert_eq!(s.time().high_bits(), 0);

    for y in 0..monitor.height() {
        for x in 0..monitor.width() {
            let expect = PatternUnit::pattern((x / cell) as u16, (y / cell) as u16, 0);
            assert_eq!(monitor.pixel(x, y), expect, "dot ({x}, {y})");
        }
    }
}

#[test]
fn pattern_lands_on_its_cells() {
    check_alignment(ShaderConfig::default());
}

#[test]
fn pattern_lands_on_its_cells_at_one_tick_per_dot() {
    check_alignment(ShaderConfig {
        ticks_per_dot: 1,
        ..ShaderConfig::default()
    });
}

#[test]
fn time_reaches_the_unit() {
    let mut s = TinyShader::new(ShaderConfig::default(), PatternUnit::new()).expect("valid");
    for _ in 0..8 {
        s.run_frame();
    }
    assert_eq!(s.time().value(), 8);
    assert_eq!(s.time().high_bits(), 1);
    // First capture of the frame is cell (0, 0).
    s.tick();
    assert_eq!(s.pins().color, 0, "cell (0, 0) ran before time advanced");
    s.tick_n(Ticks::new(16));
    assert_eq!(s.pins().color, PatternUnit::pattern(1, 0, 1));
}

#[test]
fn spi_burst_while_paused_installs_the_words() {
    let mut s = TinyShader::new(ShaderConfig::default(), PatternUnit::new()).expect("valid");
    s.set_pause(true);
    s.tick_n(Ticks::new(2));
    s.upload(&[0x42; 16], 2);
    assert_eq!(s.store().slots(), &[0x42; 16]);
    assert_eq!(s.overruns(), 0);
    assert_eq!(s.query("spi.words"), Some(Value::U64(16)));
    assert_eq!(s.query("handoff.delivered"), Some(Value::U64(16)));
}

#[test]
fn spi_words_arrive_in_order() {
    let mut s = TinyShader::new(ShaderConfig::default(), PatternUnit::new()).expect("valid");
    s.set_pause(true);
    s.tick_n(Ticks::new(2));
    let program: Vec<u8> = (0x90..0xA0).collect();
    s.upload(&program, 1);
    assert_eq!(s.store().slots(), &program[..]);
    assert_eq!(s.current_instruction(), 0x90);
}

#[test]
fn full_handoff_drops_spi_word() {
    let mut s = TinyShader::new(ShaderConfig::default(), PatternUnit::new()).expect("valid");
    s.set_pause(true);
    s.tick_n(Ticks::new(2));
    s.offer_word(0x11).expect("handoff empty");
    // A whole SPI word arrives before the core ticks again.
    for pins in burst(&[0x22]) {
        s.spi_clock(pins);
    }
    assert_eq!(s.overruns(), 1);
    s.tick();
    assert_eq!(s.store().slots()[15], 0x11);
    assert_eq!(s.query("handoff.pending"), Some(Value::Bool(false)));
}

#[test]
fn offer_refused_while_word_pending() {
    let mut s = TinyShader::new(ShaderConfig::default(), PatternUnit::new()).expect("valid");
    s.offer_word(0x01).expect("handoff empty");
    assert!(s.offer_word(0x02).is_err());
    s.tick();
    assert!(s.offer_word(0x02).is_ok());
}
