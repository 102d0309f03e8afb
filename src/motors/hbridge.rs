// SPDX-License-Identifier: MIT

//! H-bridge motor actuator.
//!
//! Each wheel motor is driven by two direction pins (both low = coast,
//! A high = forward, B high = reverse) and one PWM-enable channel. The
//! actuator consumes a [`DutyCommand`] and owns the only code path that
//! touches the pins, so the bridge-shorting state (both direction pins
//! high) can be ruled out in one place: both pins are driven low before
//! either one is raised.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

/// Signed duty fraction in [-1.0, 1.0].
///
/// Sign selects the H-bridge direction, magnitude the PWM duty. The range
/// invariant holds by construction: out-of-range input is clamped,
/// non-finite input becomes zero.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DutyCommand(f32);

impl DutyCommand {
    pub const ZERO: DutyCommand = DutyCommand(0.0);

    pub fn new(duty: f32) -> Self {
        if duty.is_finite() {
            Self(duty.clamp(-1.0, 1.0))
        } else {
            Self::ZERO
        }
    }

    /// Signed duty fraction.
    #[inline]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Unsigned duty fraction.
    #[inline]
    pub fn magnitude(self) -> f32 {
        if self.0 < 0.0 {
            -self.0
        } else {
            self.0
        }
    }
}

/// Actuation failure at the pin/PWM boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActuatorError {
    Pin,
    Pwm,
}

/// Denominator used for duty fractions handed to the PWM channel.
const DUTY_SCALE: u16 = 10_000;

/// One wheel's H-bridge: a PWM-enable channel plus two direction pins.
pub struct HBridge<P, A, B> {
    pwm: P,
    dir_a: A,
    dir_b: B,
}

impl<P, A, B> HBridge<P, A, B>
where
    P: SetDutyCycle,
    A: OutputPin,
    B: OutputPin,
{
    /// Take ownership of the pins; the bridge starts out coasting.
    pub fn new(pwm: P, dir_a: A, dir_b: B) -> Result<Self, ActuatorError> {
        let mut bridge = Self { pwm, dir_a, dir_b };
        bridge.coast()?;
        Ok(bridge)
    }

    /// Apply a duty command: direction pins + PWM compare value.
    pub fn apply(&mut self, duty: DutyCommand) -> Result<(), ActuatorError> {
        // Never let both direction pins be high, even transiently: drop
        // both before raising one.
        self.dir_a.set_low().map_err(|_| ActuatorError::Pin)?;
        self.dir_b.set_low().map_err(|_| ActuatorError::Pin)?;

        let v = duty.value();
        if v > 0.0 {
            self.dir_a.set_high().map_err(|_| ActuatorError::Pin)?;
        } else if v < 0.0 {
            self.dir_b.set_high().map_err(|_| ActuatorError::Pin)?;
        }

        let num = (duty.magnitude() * DUTY_SCALE as f32) as u16;
        self.pwm
            .set_duty_cycle_fraction(num, DUTY_SCALE)
            .map_err(|_| ActuatorError::Pwm)
    }

    /// Both direction pins low, PWM fully off.
    pub fn coast(&mut self) -> Result<(), ActuatorError> {
        self.dir_a.set_low().map_err(|_| ActuatorError::Pin)?;
        self.dir_b.set_low().map_err(|_| ActuatorError::Pin)?;
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(|_| ActuatorError::Pwm)
    }
}
