//! Headless capture: PNG screenshots of the monitor picture.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use tiny_shader::{PixelUnit, TinyShader, VgaMonitor};

/// Save the monitor's current picture as a PNG file.
pub fn save_screenshot(monitor: &VgaMonitor, path: &Path) -> Result<()> {
    let file =
        fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        monitor.width() as u32,
        monitor.height() as u32,
    );
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&monitor.to_rgb888())?;
    Ok(())
}

/// Run `num_frames` frames, saving the picture after each one.
pub fn record<U: PixelUnit>(
    shader: &mut TinyShader<U>,
    monitor: &mut VgaMonitor,
    dir: &Path,
    num_frames: u32,
) -> Result<()> {
    let frames_dir = dir.join("frames");
    fs::create_dir_all(&frames_dir)
        .with_context(|| format!("failed to create {}", frames_dir.display()))?;

    for i in 1..=num_frames {
        shader.run_frame_with(|pins| {
            monitor.sample(pins);
        });
        save_screenshot(monitor, &frames_dir.join(format!("{i:06}.png")))?;
    }

    log::info!("captured {num_frames} frames to {}", frames_dir.display());
    Ok(())
}
