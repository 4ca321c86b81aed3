//! Frame decoding over a polled serial byte stream.
//!
//! Provides [`FrameDecoder`], which classifies bytes from a [`ByteSource`] into
//! [`Command`]s, and [`read_payload`], the bounded wait used to receive
//! gradient payloads.
//!
//! Resynchronization is byte-at-a-time: any byte that does not start a known
//! frame is dropped on its own. A stray `'S'` in the stream will therefore be
//! taken as the start of an immediate-color frame and the following four bytes
//! consumed with it.

use crate::command::{
    COLOR_FRAME_LEN, Command, END_MARKER, GRADIENT_COMMAND, START_MARKER, STOP_COMMAND,
};
use crate::parser::parse_keyframes;
use crate::time::{TimeDuration, TimeInstant, TimeSource};
use embedded_hal::delay::DelayNs;
use heapless::{Deque, Vec};
use palette::Srgb;

/// Deadline for receiving a gradient frame's length and payload, measured
/// from the command byte.
pub const PAYLOAD_TIMEOUT_MS: u64 = 2000;

/// Wait between polls while a payload is incomplete.
pub const POLL_INTERVAL_US: u32 = 1000;

/// Default payload buffer size of a [`FrameDecoder`].
pub const DEFAULT_PAYLOAD_CAPACITY: usize = 1024;

/// Trait for abstracting the receive side of a serial link.
///
/// Implement this for your UART driver's receive buffer. Reads never block.
pub trait ByteSource {
    /// Number of bytes that can be read without waiting.
    fn available(&self) -> usize;

    /// Returns the next byte without consuming it.
    fn peek(&self) -> Option<u8>;

    /// Consumes and returns the next byte.
    fn read(&mut self) -> Option<u8>;
}

impl<const N: usize> ByteSource for Deque<u8, N> {
    fn available(&self) -> usize {
        self.len()
    }

    fn peek(&self) -> Option<u8> {
        self.front().copied()
    }

    fn read(&mut self) -> Option<u8> {
        self.pop_front()
    }
}

/// Errors that can occur while decoding a frame.
///
/// None of these are fatal: the offending frame is dropped and decoding
/// resumes with the next byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Immediate-color frame did not end with `'E'`. Its color was discarded.
    MalformedFrame {
        /// The byte found where the end marker belongs.
        end_marker: u8,
    },

    /// The two length bytes of a gradient frame did not arrive in time.
    LengthTimeout,

    /// The gradient payload did not arrive in time. Partial data was discarded.
    PayloadTimeout {
        /// Announced payload length.
        expected: usize,
        /// Bytes received before the deadline.
        received: usize,
    },

    /// The announced payload does not fit the decoder's buffer. The payload
    /// bytes were drained and discarded.
    PayloadTooLarge {
        /// Announced payload length.
        len: usize,
        /// Buffer capacity.
        capacity: usize,
    },
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::MalformedFrame { end_marker } => {
                write!(f, "invalid end marker 0x{:02x}, expected 'E'", end_marker)
            }
            FrameError::LengthTimeout => {
                write!(f, "timed out waiting for gradient payload length")
            }
            FrameError::PayloadTimeout { expected, received } => {
                write!(
                    f,
                    "timed out after receiving {} of {} payload bytes",
                    received, expected
                )
            }
            FrameError::PayloadTooLarge { len, capacity } => {
                write!(
                    f,
                    "payload of {} bytes exceeds capacity of {}",
                    len, capacity
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}

/// Receives exactly `len` bytes from `rx` before the payload deadline.
///
/// The deadline is [`PAYLOAD_TIMEOUT_MS`] after `started` and covers the whole
/// transfer, not each byte. While no byte is available the function waits
/// [`POLL_INTERVAL_US`] between polls.
///
/// # Errors
/// * `PayloadTimeout` - Fewer than `len` bytes arrived; they are discarded
/// * `PayloadTooLarge` - `len` exceeds `N`; the bytes are drained and discarded
pub fn read_payload<I, R, D, T, const N: usize>(
    rx: &mut R,
    delay: &mut D,
    time_source: &T,
    started: I,
    len: usize,
) -> Result<Vec<u8, N>, FrameError>
where
    I: TimeInstant,
    R: ByteSource,
    D: DelayNs,
    T: TimeSource<I>,
{
    if len > N {
        let _ = receive_within(rx, delay, time_source, started, len, |_| {});
        return Err(FrameError::PayloadTooLarge { len, capacity: N });
    }

    let mut payload = Vec::new();
    receive_within(rx, delay, time_source, started, len, |byte| {
        // Fits: len <= N.
        let _ = payload.push(byte);
    })
    .map_err(|received| FrameError::PayloadTimeout {
        expected: len,
        received,
    })?;

    Ok(payload)
}

/// Feeds `len` bytes to `store`, or returns how many arrived before the deadline.
fn receive_within<I, R, D, T>(
    rx: &mut R,
    delay: &mut D,
    time_source: &T,
    started: I,
    len: usize,
    mut store: impl FnMut(u8),
) -> Result<(), usize>
where
    I: TimeInstant,
    R: ByteSource,
    D: DelayNs,
    T: TimeSource<I>,
{
    let mut received = 0;
    while received < len {
        if time_source.now().duration_since(started).as_millis() >= PAYLOAD_TIMEOUT_MS {
            return Err(received);
        }

        match rx.read() {
            Some(byte) => {
                store(byte);
                received += 1;
            }
            None => delay.delay_us(POLL_INTERVAL_US),
        }
    }
    Ok(())
}

/// Classifies bytes from a serial link into [`Command`]s.
///
/// # Type Parameters
/// * `R` - Byte source implementation type
/// * `P` - Maximum gradient payload size in bytes
pub struct FrameDecoder<R: ByteSource, const P: usize = DEFAULT_PAYLOAD_CAPACITY> {
    rx: R,
}

impl<R: ByteSource, const P: usize> FrameDecoder<R, P> {
    /// Creates a decoder reading from `rx`.
    pub fn new(rx: R) -> Self {
        Self { rx }
    }

    /// Returns a reference to the byte source.
    pub fn source(&self) -> &R {
        &self.rx
    }

    /// Returns a mutable reference to the byte source.
    pub fn source_mut(&mut self) -> &mut R {
        &mut self.rx
    }

    /// Decodes the next complete frame, if any.
    ///
    /// Unknown bytes are discarded one at a time. An immediate-color frame is
    /// only consumed once all five bytes are available. A gradient frame blocks
    /// (polling with `delay`) until its payload arrives or the deadline passes.
    ///
    /// # Returns
    /// * `Ok(Some(command))` - A frame was decoded
    /// * `Ok(None)` - No complete frame is available yet
    /// * `Err` - A frame was consumed but rejected
    pub fn poll<I, D, T>(
        &mut self,
        delay: &mut D,
        time_source: &T,
    ) -> Result<Option<Command>, FrameError>
    where
        I: TimeInstant,
        D: DelayNs,
        T: TimeSource<I>,
    {
        while let Some(byte) = self.rx.peek() {
            match byte {
                START_MARKER => {
                    if self.rx.available() < COLOR_FRAME_LEN {
                        return Ok(None);
                    }
                    return self.read_color_frame().map(Some);
                }
                GRADIENT_COMMAND => {
                    self.rx.read();
                    return self.read_gradient_frame(delay, time_source).map(Some);
                }
                STOP_COMMAND => {
                    self.rx.read();
                    return Ok(Some(Command::Stop));
                }
                other => {
                    self.rx.read();
                    debug!("discarding stray byte 0x{=u8:x}", other);
                }
            }
        }
        Ok(None)
    }

    fn read_color_frame(&mut self) -> Result<Command, FrameError> {
        let mut frame = [0u8; COLOR_FRAME_LEN];
        for byte in frame.iter_mut() {
            *byte = self.rx.read().unwrap_or_default();
        }

        let [_, red, green, blue, end_marker] = frame;
        if end_marker != END_MARKER {
            return Err(FrameError::MalformedFrame { end_marker });
        }
        Ok(Command::SetColor(Srgb::new(red, green, blue)))
    }

    fn read_gradient_frame<I, D, T>(
        &mut self,
        delay: &mut D,
        time_source: &T,
    ) -> Result<Command, FrameError>
    where
        I: TimeInstant,
        D: DelayNs,
        T: TimeSource<I>,
    {
        let started = time_source.now();

        let mut header = [0u8; 2];
        let mut filled = 0;
        receive_within(&mut self.rx, delay, time_source, started, header.len(), |byte| {
            header[filled] = byte;
            filled += 1;
        })
        .map_err(|_| FrameError::LengthTimeout)?;

        let len = usize::from(u16::from_be_bytes(header));
        info!("receiving {} byte gradient payload", len);

        let payload: Vec<u8, P> = read_payload(&mut self.rx, delay, time_source, started, len)?;
        Ok(Command::StartGradient(parse_keyframes(&payload)))
    }
}
