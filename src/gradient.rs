//! Looping gradient animation with state management and timing control.
//!
//! Provides [`GradientEngine`], which owns the keyframe list and the animation
//! position, advances it on each tick using wall-clock time, and writes the
//! eased, interpolated color to a [`ColorSink`].

use crate::BLACK;
use crate::easing::ease_in_out_cubic;
use crate::sink::ColorSink;
use crate::time::{TimeDuration, TimeInstant, TimeSource};
use crate::types::{Keyframe, Keyframes};
use palette::{Mix, Srgb};

/// The current state of a gradient engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GradientState {
    /// Not animating. The output holds its last color.
    Inactive,
    /// Animating through the keyframe list.
    Active,
}

/// Errors that can occur during engine operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GradientError {
    /// Fewer than two keyframes; there is nothing to transition between.
    InsufficientKeyframes {
        /// Number of keyframes available.
        found: usize,
    },
    /// Tick called while the engine is inactive.
    NotActive,
}

impl core::fmt::Display for GradientError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GradientError::InsufficientKeyframes { found } => {
                write!(f, "need at least 2 keyframes, found {}", found)
            }
            GradientError::NotActive => {
                write!(f, "gradient is not active")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GradientError {}

/// Animates a color sink through a looping list of keyframes.
///
/// Each transition runs from `keyframes[current]` to `keyframes[next]` over
/// `keyframes[current].duration()` seconds with cubic ease-in-out, after which
/// the engine moves on to the following pair. The list wraps around, so an
/// active gradient never ends on its own.
///
/// The engine has no timer of its own: call [`tick`](Self::tick) at any rate
/// and it uses the time elapsed since the previous tick.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `S` - Color sink implementation type
/// * `T` - Time source implementation type
pub struct GradientEngine<'t, I: TimeInstant, S: ColorSink, T: TimeSource<I>> {
    sink: S,
    time_source: &'t T,
    state: GradientState,
    keyframes: Keyframes,
    current: usize,
    next: usize,
    progress: f32,
    last_tick: Option<I>,
    current_color: Srgb<f32>,
}

impl<'t, I: TimeInstant, S: ColorSink, T: TimeSource<I>> GradientEngine<'t, I, S, T> {
    /// Creates an inactive engine with the output turned off.
    pub fn new(mut sink: S, time_source: &'t T) -> Self {
        sink.set_color(BLACK);

        Self {
            sink,
            time_source,
            state: GradientState::Inactive,
            keyframes: Keyframes::new(),
            current: 0,
            next: 0,
            progress: 0.0,
            last_tick: None,
            current_color: to_f32(BLACK),
        }
    }

    /// Replaces the keyframe list and restarts the animation from the first
    /// keyframe.
    ///
    /// The list is replaced even on failure, leaving the engine inactive with
    /// the output holding its last color.
    ///
    /// # Errors
    /// * `InsufficientKeyframes` - Fewer than two keyframes
    pub fn load(&mut self, keyframes: Keyframes) -> Result<(), GradientError> {
        self.keyframes = keyframes;
        self.current = 0;
        self.progress = 0.0;

        let found = self.keyframes.len();
        if found < 2 {
            self.next = 0;
            self.last_tick = None;
            self.state = GradientState::Inactive;
            warn!("gradient needs at least 2 keyframes, got {}", found);
            return Err(GradientError::InsufficientKeyframes { found });
        }

        self.next = 1;
        self.last_tick = Some(self.time_source.now());
        self.state = GradientState::Active;
        info!("gradient started with {} keyframes", found);
        Ok(())
    }

    /// Advances the animation by the time elapsed since the previous tick and
    /// updates the output.
    ///
    /// A transition that completes during this tick snaps progress back to 0
    /// and moves to the next keyframe pair; at most one pair is advanced per
    /// tick.
    ///
    /// # Returns
    /// * `Ok(color)` - The color written to the sink
    /// * `Err(NotActive)` - The engine is inactive
    /// * `Err(InsufficientKeyframes)` - The list is too short; the engine is now inactive
    pub fn tick(&mut self) -> Result<Srgb<u8>, GradientError> {
        if self.state != GradientState::Active {
            return Err(GradientError::NotActive);
        }

        let count = self.keyframes.len();
        if count < 2 {
            self.state = GradientState::Inactive;
            return Err(GradientError::InsufficientKeyframes { found: count });
        }

        let now = self.time_source.now();
        let delta = self
            .last_tick
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        self.progress += delta / self.keyframes[self.current].duration();
        if self.progress >= 1.0 {
            self.progress = 0.0;
            self.current = self.next;
            self.next = (self.current + 1) % count;
            debug!("transition towards keyframe {}", self.next);
        }

        let eased = ease_in_out_cubic(self.progress);
        let from = to_f32(self.keyframes[self.current].color);
        let to = to_f32(self.keyframes[self.next].color);
        self.current_color = from.mix(to, eased);

        let output = truncate(self.current_color);
        self.sink.set_color(output);
        Ok(output)
    }

    /// Stops the animation and turns the output off.
    ///
    /// The keyframe list is kept. Can be called from any state.
    pub fn stop(&mut self) {
        self.state = GradientState::Inactive;
        self.last_tick = None;
        self.current_color = to_f32(BLACK);
        self.sink.set_color(BLACK);
        info!("gradient stopped");
    }

    /// Stops any animation and shows `color`.
    pub fn show_color(&mut self, color: Srgb<u8>) {
        self.state = GradientState::Inactive;
        self.last_tick = None;
        self.current_color = to_f32(color);
        self.sink.set_color(color);
        info!("color set: r={} g={} b={}", color.red, color.green, color.blue);
    }

    /// Returns the current state of the engine.
    pub fn state(&self) -> GradientState {
        self.state
    }

    /// Returns true if the engine is animating.
    pub fn is_active(&self) -> bool {
        self.state == GradientState::Active
    }

    /// Returns the loaded keyframes.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Index of the keyframe the current transition starts from.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Index of the keyframe the current transition moves towards.
    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Linear progress through the current transition, before easing.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Last computed color, on the 8-bit scale (0.0-255.0) before truncation.
    pub fn current_color(&self) -> Srgb<f32> {
        self.current_color
    }

    /// Returns a reference to the color sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// Lifts an 8-bit color onto an `f32` color with the same 0-255 scale.
fn to_f32(color: Srgb<u8>) -> Srgb<f32> {
    Srgb::new(
        f32::from(color.red),
        f32::from(color.green),
        f32::from(color.blue),
    )
}

/// Truncates each channel toward zero.
fn truncate(color: Srgb<f32>) -> Srgb<u8> {
    Srgb::new(color.red as u8, color.green as u8, color.blue as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Channel;
    use core::cell::Cell;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct TestDuration(u64);

    impl TimeDuration for TestDuration {
        fn as_millis(&self) -> u64 {
            self.0
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct TestInstant(u64);

    impl TimeInstant for TestInstant {
        type Duration = TestDuration;

        fn duration_since(&self, earlier: Self) -> Self::Duration {
            TestDuration(self.0.saturating_sub(earlier.0))
        }
    }

    struct MockTimeSource {
        current_time: Cell<TestInstant>,
    }

    impl MockTimeSource {
        fn new() -> Self {
            Self {
                current_time: Cell::new(TestInstant(0)),
            }
        }

        fn advance(&self, millis: u64) {
            let current = self.current_time.get();
            self.current_time.set(TestInstant(current.0 + millis));
        }
    }

    impl TimeSource<TestInstant> for MockTimeSource {
        fn now(&self) -> TestInstant {
            self.current_time.get()
        }
    }

    struct MockSink {
        rgb: [u8; 3],
        writes: usize,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                rgb: [0; 3],
                writes: 0,
            }
        }
    }

    impl ColorSink for MockSink {
        fn set_channel(&mut self, channel: Channel, intensity: u8) {
            let index = match channel {
                Channel::Red => 0,
                Channel::Green => 1,
                Channel::Blue => 2,
            };
            self.rgb[index] = intensity;
            self.writes += 1;
        }
    }

    fn red_blue() -> Keyframes {
        let mut keyframes = Keyframes::new();
        keyframes.push(Keyframe::new(Srgb::new(255, 0, 0), 1.0)).unwrap();
        keyframes.push(Keyframe::new(Srgb::new(0, 0, 255), 1.0)).unwrap();
        keyframes
    }

    #[test]
    fn new_engine_is_inactive_and_dark() {
        let timer = MockTimeSource::new();
        let engine = GradientEngine::new(MockSink::new(), &timer);

        assert_eq!(engine.state(), GradientState::Inactive);
        assert_eq!(engine.sink().rgb, [0, 0, 0]);
        assert_eq!(engine.sink().writes, 3);
    }

    #[test]
    fn tick_requires_active_state() {
        let timer = MockTimeSource::new();
        let mut engine = GradientEngine::new(MockSink::new(), &timer);

        assert_eq!(engine.tick(), Err(GradientError::NotActive));
        assert_eq!(engine.sink().writes, 3);
    }

    #[test]
    fn load_resets_position() {
        let timer = MockTimeSource::new();
        let mut engine = GradientEngine::new(MockSink::new(), &timer);

        engine.load(red_blue()).unwrap();
        timer.advance(700);
        engine.tick().unwrap();
        assert!(engine.progress() > 0.0);

        engine.load(red_blue()).unwrap();
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.next_index(), 1);
        assert_eq!(engine.progress(), 0.0);
    }

    #[test]
    fn first_tick_without_elapsed_time_shows_first_keyframe() {
        let timer = MockTimeSource::new();
        let mut engine = GradientEngine::new(MockSink::new(), &timer);

        engine.load(red_blue()).unwrap();
        assert_eq!(engine.tick(), Ok(Srgb::new(255, 0, 0)));
        assert_eq!(engine.sink().rgb, [255, 0, 0]);
    }

    #[test]
    fn halfway_is_eased_midpoint_truncated() {
        let timer = MockTimeSource::new();
        let mut engine = GradientEngine::new(MockSink::new(), &timer);

        engine.load(red_blue()).unwrap();
        timer.advance(500);
        // eased(0.5) = 0.5, 255 * 0.5 = 127.5 truncates to 127
        assert_eq!(engine.tick(), Ok(Srgb::new(127, 0, 127)));
    }

    #[test]
    fn stop_blanks_output_and_deactivates() {
        let timer = MockTimeSource::new();
        let mut engine = GradientEngine::new(MockSink::new(), &timer);

        engine.load(red_blue()).unwrap();
        engine.tick().unwrap();
        engine.stop();

        assert!(!engine.is_active());
        assert_eq!(engine.sink().rgb, [0, 0, 0]);
        assert_eq!(engine.keyframes().len(), 2);
    }

    #[test]
    fn truncate_rounds_toward_zero() {
        assert_eq!(truncate(Srgb::new(0.99, 254.999, 12.5)), Srgb::new(0, 254, 12));
    }
}
