//! Headless runner for the tiny shader core.
//!
//! The core clock runs at 50 MHz with two ticks per 25 MHz VGA dot. One
//! 640x480 frame is 800 x 525 dots, 840,000 core ticks. The output pins feed
//! a [`tiny_shader::VgaMonitor`], whose picture can be saved as PNG.

pub mod capture;
pub mod settings;

use shader_core::Observable;

/// Every observable path and its value, as a JSON object.
#[must_use]
pub fn state_json(component: &impl Observable) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = component
        .snapshot()
        .into_iter()
        .map(|(path, value)| (path.to_string(), value.to_json()))
        .collect();
    serde_json::Value::Object(map)
}
