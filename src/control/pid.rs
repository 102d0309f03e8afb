// SPDX-License-Identifier: MIT

//! Generic PID controller for closed-loop control.
//!
//! Works in `no_std` and does not allocate memory.

/// PID controller with tunable gains, output clamping, and conditional
/// anti-windup.
pub struct Pid {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,
    /// Derivative gain
    kd: f32,

    /// Integrator state
    integral: f32,
    /// Last error (for derivative term)
    prev_error: f32,

    /// Output clamp
    out_min: f32,
    out_max: f32,

    /// Integral clamp
    int_min: f32,
    int_max: f32,

    first_update: bool,
}

impl Pid {
    /// Create a new PID controller.
    ///
    /// `kp`, `ki`, `kd` are the gain constants.
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,

            integral: 0.0,
            prev_error: 0.0,

            out_min: -1.0,
            out_max: 1.0,

            int_min: -1.0,
            int_max: 1.0,

            first_update: true,
        }
    }

    /// Set output limits.
    pub fn with_output_limits(mut self, min: f32, max: f32) -> Self {
        self.out_min = min;
        self.out_max = max;
        self
    }

    /// Set integral limits.
    pub fn with_integral_limits(mut self, min: f32, max: f32) -> Self {
        self.int_min = min;
        self.int_max = max;
        self
    }

    /// Reset integrator + derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.first_update = true;
    }

    /// Current integrator value.
    #[inline]
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Update the controller.
    ///
    /// `setpoint` — desired value
    /// `measurement` — current value
    /// `dt` — timestep in seconds (e.g. 0.01 for 100 Hz control loop)
    ///
    /// Returns a command in [`out_min`, `out_max`] which can be mapped to
    /// motor drive.
    pub fn update(&mut self, setpoint: f32, measurement: f32, dt: f32) -> f32 {
        let error = setpoint - measurement;

        // ----- P term -----
        let p = self.kp * error;

        // ----- D term -----
        let d = if self.first_update {
            self.first_update = false;
            0.0
        } else {
            self.kd * ((error - self.prev_error) / dt)
        };
        self.prev_error = error;

        // ----- I term, conditional anti-windup -----
        // Freeze the integrator whenever the unsaturated output is already
        // past a limit and this error would push it further out.
        let provisional = p + self.integral + d;
        let windup_hi = provisional > self.out_max && error > 0.0;
        let windup_lo = provisional < self.out_min && error < 0.0;
        if !windup_hi && !windup_lo {
            self.integral =
                (self.integral + error * dt * self.ki).clamp(self.int_min, self.int_max);
        }

        // ----- Output clamp -----
        (p + self.integral + d).clamp(self.out_min, self.out_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_only_tracks_error() {
        let mut pid = Pid::new(0.5, 0.0, 0.0);
        let out = pid.update(1.0, 0.0, 0.01);
        assert!((out - 0.5).abs() < 1e-6);
    }

    #[test]
    fn output_is_clamped() {
        let mut pid = Pid::new(100.0, 0.0, 0.0);
        assert_eq!(pid.update(1.0, 0.0, 0.01), 1.0);
        assert_eq!(pid.update(-1.0, 0.0, 0.01), -1.0);
    }

    #[test]
    fn integral_frozen_while_saturated() {
        // Large sustained error with the output pinned at the limit must
        // not grow the integrator.
        let mut pid = Pid::new(10.0, 1.0, 0.0);
        let mut last_integral = 0.0;
        for i in 0..50 {
            let out = pid.update(100.0, 0.0, 0.01);
            assert_eq!(out, 1.0);
            if i > 0 {
                assert_eq!(pid.integral(), last_integral);
            }
            last_integral = pid.integral();
        }
        assert_eq!(last_integral, 0.0);
    }

    #[test]
    fn integral_accumulates_when_unsaturated() {
        let mut pid = Pid::new(0.1, 1.0, 0.0);
        pid.update(0.5, 0.0, 0.01);
        pid.update(0.5, 0.0, 0.01);
        assert!(pid.integral() > 0.0);
    }

    #[test]
    fn first_update_skips_derivative_kick() {
        let mut pid = Pid::new(0.0, 0.0, 10.0);
        let out = pid.update(5.0, 0.0, 0.01);
        assert_eq!(out, 0.0);
        // Second step with unchanged error: Δerror = 0, still no D.
        let out = pid.update(5.0, 0.0, 0.01);
        assert_eq!(out, 0.0);
    }

    #[test]
    fn reset_clears_state() {
        let mut pid = Pid::new(0.1, 1.0, 0.1);
        pid.update(0.5, 0.0, 0.01);
        pid.update(0.4, 0.1, 0.01);
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        let out = pid.update(0.0, 0.0, 0.01);
        assert_eq!(out, 0.0);
    }
}
