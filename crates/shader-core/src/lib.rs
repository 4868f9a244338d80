//! Tick, clock and observability traits shared by the shader components.
//!
//! Every stateful component advances on the core clock. A tick evaluates
//! from the state left by the previous tick and then commits; nothing is
//! visible half-way through a tick.

mod clock;
mod observable;
mod tickable;
mod ticks;

pub use clock::PixelClock;
pub use observable::{Observable, Value};
pub use tickable::Tickable;
pub use ticks::Ticks;
