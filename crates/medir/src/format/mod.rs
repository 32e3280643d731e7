//! Formatting utilities: rounding, ISO-8601 durations, color strings, and
//! display-value rounding for assertion messages.

pub mod color;
pub mod display;
pub mod duration;
pub mod rounding;

pub use color::{hex_to_rgb, parse_color, Rgb};
pub use display::format_actual;
pub use duration::{format_iso8601_ms, is_iso8601, parse_iso8601_ms};
pub use rounding::{round, RoundMode};
