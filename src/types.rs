//! Core types for keyframe lists.

use heapless::Vec;
use palette::Srgb;

/// Maximum number of keyframes a gradient can hold.
pub const MAX_KEYFRAMES: usize = 10;

/// Shortest transition a keyframe may request, in seconds.
///
/// Shorter (including zero) durations are clamped up to this value.
pub const MIN_KEYFRAME_DURATION_SECS: f32 = 0.001;

/// Bounded, ordered keyframe list. Insertion order is transition order.
pub type Keyframes = Vec<Keyframe, MAX_KEYFRAMES>;

/// A target color and the time spent transitioning away from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Keyframe color.
    pub color: Srgb<u8>,

    duration: f32,
}

impl Keyframe {
    /// Creates a keyframe, clamping `duration_secs` to
    /// [`MIN_KEYFRAME_DURATION_SECS`]`..=f32::MAX`.
    #[inline]
    pub fn new(color: Srgb<u8>, duration_secs: f32) -> Self {
        Self {
            color,
            duration: clamp_duration(duration_secs),
        }
    }

    /// Transition duration in seconds. Always finite and positive.
    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }
}

fn clamp_duration(secs: f32) -> f32 {
    if secs.is_nan() {
        return MIN_KEYFRAME_DURATION_SECS;
    }
    secs.clamp(MIN_KEYFRAME_DURATION_SECS, f32::MAX)
}

/// Result of scanning a configuration payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedKeyframes {
    /// Keyframes in payload order.
    pub keyframes: Keyframes,

    /// True if the payload held more keyframes than [`MAX_KEYFRAMES`];
    /// the extra entries were ignored.
    pub truncated: bool,
}

/// One of the three PWM output channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Red channel.
    Red,

    /// Green channel.
    Green,

    /// Blue channel.
    Blue,
}
