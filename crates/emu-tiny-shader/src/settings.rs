//! Runner settings file.
//!
//! # File format
//!
//! ```toml
//! # Program image to install at reset (or upload with --upload).
//! program = "shaders/rings.bit"
//! # Core clock, used to report simulated time.
//! core_hz = 50_000_000
//!
//! [shader]
//! program_len = 16
//! double_buffered = false
//! ticks_per_dot = 2
//!
//! [shader.mode.horizontal]
//! visible = 640
//! front_porch = 16
//! sync_pulse = 96
//! back_porch = 48
//! ```
//!
//! Every field is optional; missing ones take the core's defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use shader_core::PixelClock;
use tiny_shader::ShaderConfig;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("bad program image {path}: {source}")]
    Program {
        path: PathBuf,
        source: format_shader_bit::BitError,
    },
}

/// Contents of a settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// `.bit` program image, relative to the settings file.
    pub program: Option<PathBuf>,
    pub core_hz: u64,
    pub shader: ShaderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            program: None,
            core_hz: PixelClock::default().core_hz,
            shader: ShaderConfig::default(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn clock(&self) -> PixelClock {
        PixelClock::new(self.core_hz, self.shader.ticks_per_dot)
    }

    /// Parse settings text. Relative program paths are left as written.
    pub fn parse(text: &str, path: &Path) -> Result<Self, SettingsError> {
        toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a settings file, resolving the program path against the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::parse(&text, path)?;
        if let (Some(program), Some(dir)) = (settings.program.as_mut(), path.parent())
            && program.is_relative()
        {
            *program = dir.join(&*program);
        }
        log::info!("loaded settings from {}", path.display());
        log::debug!("settings: {settings:?}");
        Ok(settings)
    }
}

/// Read a `.bit` program image.
pub fn load_program(path: &Path) -> Result<Vec<u8>, SettingsError> {
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let words = format_shader_bit::parse(&text).map_err(|source| SettingsError::Program {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("loaded {} program words from {}", words.len(), path.display());
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Settings, SettingsError> {
        Settings::parse(text, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse("").expect("parses"), Settings::default());
    }

    #[test]
    fn shader_table_overrides_fields() {
        let settings = parse(
            r#"
            program = "a.bit"

            [shader]
            double_buffered = true
            ticks_per_dot = 1
            "#,
        )
        .expect("parses");
        assert_eq!(settings.program.as_deref(), Some(Path::new("a.bit")));
        assert!(settings.shader.double_buffered);
        assert_eq!(settings.shader.ticks_per_dot, 1);
        assert_eq!(settings.shader.program_len, 16);
        assert_eq!(settings.clock().dot_hz(), 50_000_000);
    }

    #[test]
    fn raster_timing_is_configurable() {
        let settings = parse(
            r"
            [shader.mode.vertical]
            visible = 480
            front_porch = 11
            sync_pulse = 2
            back_porch = 31
            ",
        )
        .expect("parses");
        assert_eq!(settings.shader.mode.vertical.front_porch, 11);
        assert_eq!(settings.shader.mode.vertical.total(), 524);
        assert_eq!(settings.shader.mode.horizontal.total(), 800);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            parse("[shader]\nprogram_length = 16\n"),
            Err(SettingsError::Parse { .. })
        ));
        assert!(parse("speed = 3\n").is_err());
    }

    #[test]
    fn inline_program_image() {
        let settings = parse("[shader]\nprogram = [64, 64, 64, 64, 64, 64, 64, 64, 64, 64, 64, 64, 64, 64, 64, 64]\n")
            .expect("parses");
        assert_eq!(settings.shader.program, Some(vec![0x40; 16]));
    }
}
