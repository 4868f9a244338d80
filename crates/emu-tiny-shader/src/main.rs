//! Tiny shader runner binary.
//!
//! Runs the core headless for a number of frames, optionally saving the
//! picture or dumping the core state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use emu_tiny_shader::settings::{self, Settings};
use emu_tiny_shader::{capture, state_json};
use shader_core::Tickable;
use tiny_shader::{BlankUnit, PatternUnit, PixelUnit, TinyShader, VgaMonitor};

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum UnitKind {
    /// Always black.
    Blank,
    /// `(x ^ y) + time` per cell, for checking alignment.
    Pattern,
}

#[derive(Parser, Debug)]
#[command(name = "emu-tiny-shader")]
#[command(about = "Headless runner for the tiny shader core", long_about = None)]
struct Args {
    /// Program image in `.bit` format
    #[arg(long, value_name = "PATH")]
    program: Option<PathBuf>,

    /// Send the program over SPI while paused instead of installing it at reset
    #[arg(long, action = ArgAction::SetTrue)]
    upload: bool,

    /// Core ticks per SPI clock edge when uploading
    #[arg(long, default_value_t = 4)]
    spi_ticks: u64,

    /// TOML settings file
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Frames to run
    #[arg(long, default_value_t = 2)]
    frames: u32,

    /// Save the final picture as PNG
    #[arg(long, value_name = "PATH")]
    screenshot: Option<PathBuf>,

    /// Save every frame as PNG under DIR/frames
    #[arg(long, value_name = "DIR")]
    record: Option<PathBuf>,

    /// Pixel arithmetic unit attached to the core
    #[arg(long, value_enum, default_value_t = UnitKind::Pattern)]
    unit: UnitKind,

    /// Print every observable value as JSON after the run
    #[arg(long, action = ArgAction::SetTrue)]
    dump_state: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let program = match args.program.as_ref().or(settings.program.as_ref()) {
        Some(path) => Some(settings::load_program(path)?),
        None => None,
    };

    let clock = settings.clock();
    let mut config = settings.shader;
    if !args.upload && program.is_some() {
        config.program.clone_from(&program);
    }
    let unit: Box<dyn PixelUnit> = match args.unit {
        UnitKind::Blank => Box::new(BlankUnit),
        UnitKind::Pattern => Box::new(PatternUnit::new()),
    };
    let mut shader = TinyShader::new(config, unit).context("failed to build shader core")?;
    log::info!("core clock {} Hz, dot clock {} Hz", clock.core_hz, clock.dot_hz());
    let mut monitor = VgaMonitor::new(&shader.config().mode, shader.config().ticks_per_dot);

    if args.upload {
        let Some(image) = program.as_deref() else {
            bail!("--upload needs a program (--program or settings file)");
        };
        upload(&mut shader, &mut monitor, image, args.spi_ticks)?;
    }

    if let Some(dir) = &args.record {
        capture::record(&mut shader, &mut monitor, dir, args.frames)?;
    } else {
        for _ in 0..args.frames {
            shader.run_frame_with(|pins| {
                monitor.sample(pins);
            });
        }
    }
    log::info!(
        "ran {} frames, {} ticks ({} ms simulated), {} monitor frames",
        shader.frame_count(),
        shader.tick_count(),
        shader.tick_count() * 1000 / clock.core_hz.max(1),
        monitor.frames()
    );

    if let Some(path) = &args.screenshot {
        save(&monitor, path)?;
    }
    if args.dump_state {
        println!("{}", serde_json::to_string_pretty(&state_json(&shader))?);
    }
    Ok(())
}

/// Pause the core, shift the image in over SPI, then release the pause
/// during vertical blanking so the next frame starts with whole programs.
fn upload<U: PixelUnit>(
    shader: &mut TinyShader<U>,
    monitor: &mut VgaMonitor,
    image: &[u8],
    ticks_per_edge: u64,
) -> Result<()> {
    let capacity = shader.store().capacity();
    if image.len() != capacity {
        bail!("program has {} words, the store holds {capacity}", image.len());
    }

    shader.set_pause(true);
    while !shader.is_paused() {
        shader.tick();
        monitor.sample(&shader.pins());
    }
    let ticks = shader.upload_with(image, ticks_per_edge, |pins| {
        monitor.sample(pins);
    });
    if shader.overruns() != 0 {
        bail!("{} words lost during upload", shader.overruns());
    }
    log::info!("uploaded {} words in {ticks} ticks", image.len());

    while !shader.raster_signals().blank_v {
        shader.tick();
        monitor.sample(&shader.pins());
    }
    shader.set_pause(false);
    Ok(())
}

fn save(monitor: &VgaMonitor, path: &Path) -> Result<()> {
    capture::save_screenshot(monitor, path)?;
    eprintln!("Saved screenshot to {}", path.display());
    Ok(())
}
