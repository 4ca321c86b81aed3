//! Shared test infrastructure for rgb-gradient integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::Cell;
use embedded_hal::delay::DelayNs;
use heapless::{Deque, Vec};
use rgb_gradient::command::GRADIENT_COMMAND;
use rgb_gradient::{ByteSource, Channel, ColorSink, Srgb, TimeDuration, TimeInstant, TimeSource};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    fn as_millis(&self) -> u64 {
        self.0
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0.saturating_sub(earlier.0))
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: Cell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + millis));
    }

    pub fn millis(&self) -> u64 {
        self.current_time.get().0
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Delay
// ============================================================================

/// Delay that advances the mock clock instead of sleeping (rounded up to 1ms)
pub struct MockDelay<'a> {
    time: &'a MockTimeSource,
    calls: usize,
}

impl<'a> MockDelay<'a> {
    pub fn new(time: &'a MockTimeSource) -> Self {
        Self { time, calls: 0 }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl DelayNs for MockDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.time.advance(u64::from(ns).div_ceil(1_000_000));
    }
}

// ============================================================================
// Mock Byte Sources
// ============================================================================

pub type RxQueue = Deque<u8, 2048>;

/// Queue pre-filled with `bytes`
pub fn rx_queue(bytes: &[u8]) -> RxQueue {
    let mut queue = RxQueue::new();
    for &byte in bytes {
        queue.push_back(byte).unwrap();
    }
    queue
}

/// Byte source releasing each byte at a given mock time
pub struct ScriptedRx<'a> {
    time: &'a MockTimeSource,
    script: Vec<(u64, u8), 1024>,
    position: usize,
}

impl<'a> ScriptedRx<'a> {
    pub fn new(time: &'a MockTimeSource) -> Self {
        Self {
            time,
            script: Vec::new(),
            position: 0,
        }
    }

    /// Schedule `bytes` to become readable at `at_millis`
    pub fn release_at(mut self, at_millis: u64, bytes: &[u8]) -> Self {
        for &byte in bytes {
            self.script.push((at_millis, byte)).unwrap();
        }
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len() - self.position
    }

    fn released(&self) -> &[(u64, u8)] {
        let now = self.time.millis();
        let pending = &self.script[self.position..];
        let count = pending.iter().take_while(|(at, _)| *at <= now).count();
        &pending[..count]
    }
}

impl ByteSource for ScriptedRx<'_> {
    fn available(&self) -> usize {
        self.released().len()
    }

    fn peek(&self) -> Option<u8> {
        self.released().first().map(|&(_, byte)| byte)
    }

    fn read(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.position += 1;
        Some(byte)
    }
}

// ============================================================================
// Mock Color Sink
// ============================================================================

/// Sink recording every channel write
pub struct MockSink {
    rgb: [u8; 3],
    writes: Vec<(Channel, u8), 512>,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            rgb: [0; 3],
            writes: Vec::new(),
        }
    }

    pub fn color(&self) -> Srgb<u8> {
        Srgb::new(self.rgb[0], self.rgb[1], self.rgb[2])
    }

    pub fn writes(&self) -> &[(Channel, u8)] {
        &self.writes
    }

    pub fn write_count(&self) -> usize {
        self.writes.len()
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
        let _ = self.writes.push((channel, intensity));
    }
}

// ============================================================================
// Frame Builders
// ============================================================================

/// Immediate-color frame
pub fn color_frame(red: u8, green: u8, blue: u8) -> [u8; 5] {
    [b'S', red, green, blue, b'E']
}

/// Gradient frame with a correct big-endian length prefix
pub fn gradient_frame(payload: &[u8]) -> Vec<u8, 1100> {
    let len = u16::try_from(payload.len()).unwrap();
    let mut frame = Vec::new();
    frame.push(GRADIENT_COMMAND).unwrap();
    frame.extend_from_slice(&len.to_be_bytes()).unwrap();
    frame.extend_from_slice(payload).unwrap();
    frame
}

pub const RED_BLUE_PAYLOAD: &[u8] =
    br#"{"r":255,"g":0,"b":0,"duration":1.0},{"r":0,"g":0,"b":255,"duration":1.0}"#;
