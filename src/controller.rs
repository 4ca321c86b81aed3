//! The cooperative control loop tying decoder and engine together.

use crate::command::Command;
use crate::decoder::{ByteSource, DEFAULT_PAYLOAD_CAPACITY, FrameDecoder, FrameError};
use crate::gradient::{GradientEngine, GradientError};
use crate::sink::ColorSink;
use crate::time::{TimeInstant, TimeSource};
use embedded_hal::delay::DelayNs;

/// Time between loop iterations in [`GradientController::run`] (about 100 Hz).
pub const TICK_INTERVAL_MS: u32 = 10;

/// Errors reported by a control loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    /// A frame was received but rejected.
    Frame(FrameError),

    /// A gradient payload could not be started.
    Gradient(GradientError),
}

impl core::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ControllerError::Frame(err) => write!(f, "frame error: {}", err),
            ControllerError::Gradient(err) => write!(f, "gradient error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ControllerError {}

impl From<FrameError> for ControllerError {
    fn from(err: FrameError) -> Self {
        ControllerError::Frame(err)
    }
}

impl From<GradientError> for ControllerError {
    fn from(err: GradientError) -> Self {
        ControllerError::Gradient(err)
    }
}

/// Drives a color sink from serial commands.
///
/// Single-threaded and poll-driven: each [`poll`](Self::poll) drains every
/// complete frame from the byte source, then ticks the gradient once if it is
/// active. Receiving a gradient payload blocks the loop for up to
/// [`PAYLOAD_TIMEOUT_MS`](crate::decoder::PAYLOAD_TIMEOUT_MS).
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `R` - Byte source implementation type
/// * `D` - Delay implementation type
/// * `S` - Color sink implementation type
/// * `T` - Time source implementation type
/// * `P` - Maximum gradient payload size in bytes
pub struct GradientController<
    't,
    I: TimeInstant,
    R: ByteSource,
    D: DelayNs,
    S: ColorSink,
    T: TimeSource<I>,
    const P: usize = DEFAULT_PAYLOAD_CAPACITY,
> {
    decoder: FrameDecoder<R, P>,
    engine: GradientEngine<'t, I, S, T>,
    delay: D,
    time_source: &'t T,
}

impl<'t, I, R, D, S, T, const P: usize> GradientController<'t, I, R, D, S, T, P>
where
    I: TimeInstant,
    R: ByteSource,
    D: DelayNs,
    S: ColorSink,
    T: TimeSource<I>,
{
    /// Creates a controller with the output off and no gradient loaded.
    pub fn new(rx: R, delay: D, sink: S, time_source: &'t T) -> Self {
        info!("waiting for commands");
        Self {
            decoder: FrameDecoder::new(rx),
            engine: GradientEngine::new(sink, time_source),
            delay,
            time_source,
        }
    }

    /// Runs one loop iteration: drain input, then tick.
    ///
    /// Every frame error is logged and the loop carries on with the next
    /// frame; the most recent one is returned after the tick has run.
    pub fn poll(&mut self) -> Result<(), ControllerError> {
        let mut last_error = None;

        loop {
            match self.decoder.poll(&mut self.delay, self.time_source) {
                Ok(Some(command)) => {
                    if let Err(err) = self.handle_command(command) {
                        last_error = Some(err);
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!("frame dropped: {}", err);
                    last_error = Some(err.into());
                }
            }
        }

        if self.engine.is_active() {
            if let Err(err) = self.engine.tick() {
                warn!("gradient halted: {}", err);
            }
        }

        match last_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Applies a decoded command.
    ///
    /// # Errors
    /// * `Gradient(InsufficientKeyframes)` - A gradient payload held fewer than two keyframes
    pub fn handle_command(&mut self, command: Command) -> Result<(), ControllerError> {
        match command {
            Command::SetColor(color) => {
                self.engine.show_color(color);
                Ok(())
            }
            Command::StartGradient(parsed) => {
                self.engine.load(parsed.keyframes)?;
                Ok(())
            }
            Command::Stop => {
                self.engine.stop();
                Ok(())
            }
        }
    }

    /// Runs the control loop forever at [`TICK_INTERVAL_MS`].
    pub fn run(&mut self) -> ! {
        loop {
            // Errors are already logged by poll.
            let _ = self.poll();
            self.delay.delay_ms(TICK_INTERVAL_MS);
        }
    }

    /// Returns a reference to the gradient engine.
    pub fn engine(&self) -> &GradientEngine<'t, I, S, T> {
        &self.engine
    }

    /// Returns a reference to the frame decoder.
    pub fn decoder(&self) -> &FrameDecoder<R, P> {
        &self.decoder
    }

    /// Returns a mutable reference to the byte source, e.g. to feed it from a
    /// receive interrupt.
    pub fn source_mut(&mut self) -> &mut R {
        self.decoder.source_mut()
    }
}
