#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`FrameDecoder`**: Classifies serial bytes into `Command`s (immediate color, gradient, stop)
//! - **`parse_keyframes`**: Tolerant scanner turning a gradient payload into `Keyframes`
//! - **`Keyframe`**: A color plus the duration of the transition leaving it
//! - **`GradientEngine`**: Loops through keyframes with cubic ease-in-out, driven by ticks
//! - **`GradientController`**: The poll loop tying decoder and engine together
//! - **`ColorSink`**: Trait to implement for your RGB output hardware
//! - **`ByteSource`**: Trait to implement for your serial receive buffer
//! - **`TimeSource`**: Trait to implement for your timing system
//!
//! Keyframe and output colors are `Srgb<u8>`. Interpolation happens on the
//! same 0-255 scale in `f32` and is truncated back to `u8` for output.

// Re-export Srgb from palette for user convenience
pub use palette::Srgb;

#[macro_use]
mod fmt;

pub mod time;
pub mod types;
pub mod easing;
pub mod parser;
pub mod command;
pub mod decoder;
pub mod sink;
pub mod gradient;
pub mod controller;

pub use command::Command;
pub use controller::{ControllerError, GradientController, TICK_INTERVAL_MS};
pub use decoder::{
    ByteSource, DEFAULT_PAYLOAD_CAPACITY, FrameDecoder, FrameError, PAYLOAD_TIMEOUT_MS,
    read_payload,
};
pub use easing::ease_in_out_cubic;
pub use gradient::{GradientEngine, GradientError, GradientState};
pub use parser::parse_keyframes;
pub use sink::{ColorSink, PwmColorSink};
pub use time::{TimeDuration, TimeInstant, TimeSource};
pub use types::{Channel, Keyframe, Keyframes, MAX_KEYFRAMES, MIN_KEYFRAME_DURATION_SECS, ParsedKeyframes};

pub const BLACK: Srgb<u8> = Srgb::new(0, 0, 0);
pub const RED: Srgb<u8> = Srgb::new(255, 0, 0);
pub const GREEN: Srgb<u8> = Srgb::new(0, 255, 0);
pub const BLUE: Srgb<u8> = Srgb::new(0, 0, 255);
