//! Color output.
//!
//! Defines the [`ColorSink`] trait the engine writes to, and [`PwmColorSink`],
//! which drives three PWM channels through `embedded-hal`.

use crate::types::Channel;
use embedded_hal::pwm::SetDutyCycle;
use palette::Srgb;

/// Trait for abstracting RGB output hardware.
///
/// Implement this for your hardware to let the engine control it. Writes are
/// applied immediately and cannot fail; handle hardware errors internally.
pub trait ColorSink {
    /// Sets one channel's intensity, 0 (off) to 255 (full).
    fn set_channel(&mut self, channel: Channel, intensity: u8);

    /// Sets all three channels.
    fn set_color(&mut self, color: Srgb<u8>) {
        self.set_channel(Channel::Red, color.red);
        self.set_channel(Channel::Green, color.green);
        self.set_channel(Channel::Blue, color.blue);
    }
}

/// [`ColorSink`] over three PWM channels.
///
/// Intensity `v` maps to a duty cycle of `v / 255` of each channel's maximum.
pub struct PwmColorSink<R, G, B>
where
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    red: R,
    green: G,
    blue: B,
    common_anode: bool,
}

impl<R, G, B> PwmColorSink<R, G, B>
where
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    /// Creates a sink from three PWM channels.
    ///
    /// # Arguments
    /// * `red` - PWM channel for red LED
    /// * `green` - PWM channel for green LED
    /// * `blue` - PWM channel for blue LED
    /// * `common_anode` - true for common anode LED (inverted logic), false for common cathode
    pub fn new(red: R, green: G, blue: B, common_anode: bool) -> Self {
        Self {
            red,
            green,
            blue,
            common_anode,
        }
    }

    /// Releases the PWM channels.
    pub fn release(self) -> (R, G, B) {
        (self.red, self.green, self.blue)
    }

    fn level(&self, intensity: u8) -> u16 {
        let intensity = if self.common_anode {
            u8::MAX - intensity
        } else {
            intensity
        };
        u16::from(intensity)
    }
}

impl<R, G, B> ColorSink for PwmColorSink<R, G, B>
where
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    fn set_channel(&mut self, channel: Channel, intensity: u8) {
        let level = self.level(intensity);
        let denominator = u16::from(u8::MAX);
        match channel {
            Channel::Red => {
                let _ = self.red.set_duty_cycle_fraction(level, denominator);
            }
            Channel::Green => {
                let _ = self.green.set_duty_cycle_fraction(level, denominator);
            }
            Channel::Blue => {
                let _ = self.blue.set_duty_cycle_fraction(level, denominator);
            }
        }
    }
}
