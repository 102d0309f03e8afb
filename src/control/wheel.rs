// SPDX-License-Identifier: MIT

//! Closed-loop velocity controller for a single wheel.
//!
//! Wraps a [`Pid`] and a target angular velocity behind a two-state mode
//! machine. A disabled wheel always emits zero duty with zeroed PID state,
//! so re-enabling can never surge from stale integrator contents.

use crate::config::PidGains;
use crate::control::Pid;
use crate::motors::DutyCommand;

/// Operating mode of a wheel controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WheelMode {
    /// Closed-loop velocity control toward the current target.
    Active,

    /// Output forced to zero duty; PID state held at zero.
    Disabled,
}

/// Controller state for one wheel.
pub struct WheelController {
    pid: Pid,
    mode: WheelMode,

    /// Commanded wheel angular velocity (rad/s).
    target: f32,
}

impl WheelController {
    pub fn new(gains: PidGains) -> Self {
        Self {
            pid: Pid::new(gains.kp, gains.ki, gains.kd),
            mode: WheelMode::Disabled,
            target: 0.0,
        }
    }

    #[inline]
    pub fn mode(&self) -> WheelMode {
        self.mode
    }

    /// Integrator value, exposed for diagnostics.
    #[inline]
    pub fn integral(&self) -> f32 {
        self.pid.integral()
    }

    /// Enter closed-loop control. Fresh PID history so the first tick
    /// cannot kick.
    pub fn enable(&mut self) {
        if self.mode == WheelMode::Disabled {
            self.pid.reset();
            self.mode = WheelMode::Active;
        }
    }

    /// Force zero duty and clear all controller state.
    ///
    /// The reset is the correctness half of the stop: a wheel that kept its
    /// integrator while disabled would surge on re-enable.
    pub fn disable(&mut self) {
        self.mode = WheelMode::Disabled;
        self.target = 0.0;
        self.pid.reset();
    }

    /// Set the velocity target (rad/s) for subsequent ticks.
    pub fn set_target(&mut self, rad_per_s: f32) {
        self.target = rad_per_s;
    }

    /// Run one control tick against the measured velocity (rad/s).
    pub fn update(&mut self, measured: f32, dt: f32) -> DutyCommand {
        match self.mode {
            WheelMode::Disabled => DutyCommand::ZERO,
            WheelMode::Active => {
                let m = if measured.is_finite() { measured } else { 0.0 };
                DutyCommand::new(self.pid.update(self.target, m, dt))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gains() -> PidGains {
        PidGains {
            kp: 0.05,
            ki: 0.4,
            kd: 0.0,
        }
    }

    #[test]
    fn disabled_wheel_outputs_zero() {
        let mut wheel = WheelController::new(gains());
        wheel.set_target(10.0);
        assert_eq!(wheel.update(0.0, 0.01), DutyCommand::ZERO);
        assert_eq!(wheel.mode(), WheelMode::Disabled);
    }

    #[test]
    fn active_wheel_drives_toward_target() {
        let mut wheel = WheelController::new(gains());
        wheel.enable();
        wheel.set_target(10.0);
        let duty = wheel.update(0.0, 0.01);
        assert!(duty.value() > 0.0);

        wheel.set_target(-10.0);
        let duty = wheel.update(0.0, 0.01);
        assert!(duty.value() < 0.0);
    }

    #[test]
    fn disable_zeroes_integrator_and_output() {
        let mut wheel = WheelController::new(gains());
        wheel.enable();
        wheel.set_target(10.0);
        for _ in 0..20 {
            wheel.update(0.0, 0.01);
        }
        assert!(wheel.integral() > 0.0);

        wheel.disable();
        assert_eq!(wheel.integral(), 0.0);
        assert_eq!(wheel.update(0.0, 0.01), DutyCommand::ZERO);
    }

    #[test]
    fn re_enable_starts_from_clean_state() {
        let mut wheel = WheelController::new(gains());
        wheel.enable();
        wheel.set_target(10.0);
        for _ in 0..20 {
            wheel.update(0.0, 0.01);
        }
        wheel.disable();
        wheel.enable();
        // Target was cleared on disable; with zero target and zero
        // measurement the clean controller holds zero duty.
        assert_eq!(wheel.update(0.0, 0.01), DutyCommand::ZERO);
    }
}
