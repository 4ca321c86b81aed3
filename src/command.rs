//! Serial wire protocol commands.

use crate::types::ParsedKeyframes;
use palette::Srgb;

/// First byte of an immediate-color frame, also its command byte.
pub const START_MARKER: u8 = b'S';

/// Last byte of an immediate-color frame.
pub const END_MARKER: u8 = b'E';

/// Command byte announcing a length-prefixed gradient payload.
pub const GRADIENT_COMMAND: u8 = b'G';

/// Command byte stopping the gradient and blanking the output.
pub const STOP_COMMAND: u8 = b'X';

/// Length of an immediate-color frame: `'S', r, g, b, 'E'`.
pub const COLOR_FRAME_LEN: usize = 5;

/// A fully decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set the output to this color now.
    SetColor(Srgb<u8>),
    /// Load these keyframes and start animating.
    StartGradient(ParsedKeyframes),
    /// Stop animating and blank the output.
    Stop,
}
