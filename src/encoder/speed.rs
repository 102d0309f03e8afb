// SPDX-License-Identifier: MIT

//! Wheel speed estimation from tick deltas.
//!
//! Each control tick the estimator differences the (wrapping) tick
//! accumulator against the previous reading and scales by the encoder
//! resolution. The raw estimate is quantized to one tick per window, so a
//! light exponential smoothing is applied before it reaches the PID.

use core::f32::consts::TAU;

/// Per-wheel speed estimator, run in the control-loop context.
pub struct SpeedEstimator {
    rad_per_tick: f32,
    last_ticks: i32,
    velocity: f32,
    /// Smoothing factor in (0, 1]; 1 disables smoothing.
    alpha: f32,
}

impl SpeedEstimator {
    /// `ticks_per_rev` — encoder ticks per wheel revolution after 4x decode.
    pub fn new(ticks_per_rev: f32) -> Self {
        Self {
            rad_per_tick: TAU / ticks_per_rev,
            last_ticks: 0,
            velocity: 0.0,
            alpha: 0.25,
        }
    }

    /// Override the smoothing factor.
    pub fn with_smoothing(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.01, 1.0);
        self
    }

    /// Update from the latest tick reading and return the smoothed wheel
    /// angular velocity (rad/s).
    ///
    /// `dt` — control window in seconds.
    pub fn update(&mut self, ticks: i32, dt: f32) -> f32 {
        // Wrapping difference keeps the estimate correct across i32
        // overflow of the accumulator.
        let delta = ticks.wrapping_sub(self.last_ticks);
        self.last_ticks = ticks;

        let raw = delta as f32 * self.rad_per_tick / dt;
        self.velocity += self.alpha * (raw - self.velocity);
        self.velocity
    }

    /// Last smoothed estimate (rad/s) without consuming a new reading.
    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Forget history, e.g. after the encoders were idle for a long time.
    pub fn reset(&mut self, ticks: i32) {
        self.last_ticks = ticks;
        self.velocity = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_tick_rate_converges_to_true_speed() {
        // 1440 ticks/rev, 72 ticks per 100 ms window = 0.5 rev/s.
        let mut est = SpeedEstimator::new(1440.0);
        let dt = 0.1;
        let mut ticks = 0i32;
        let mut v = 0.0;
        for _ in 0..100 {
            ticks += 72; // 0.5 rev/s
            v = est.update(ticks, dt);
        }
        let expected = 0.5 * TAU;
        assert!((v - expected).abs() < 1e-3, "v = {v}, expected {expected}");
    }

    #[test]
    fn estimate_holds_when_window_length_varies() {
        // One tick per millisecond delivered in uneven windows (a stretched
        // control tick must not read as a velocity change).
        let mut est = SpeedEstimator::new(1440.0);
        let mut ticks = 0i32;
        let mut v = 0.0;
        for i in 0..200 {
            let dt_ms = if i % 2 == 0 { 10 } else { 13 };
            ticks += dt_ms;
            v = est.update(ticks, dt_ms as f32 / 1000.0);
        }
        let expected = 1000.0 * TAU / 1440.0;
        assert!((v - expected).abs() < 1e-3, "v = {v}, expected {expected}");
    }

    #[test]
    fn accumulator_wraparound_is_transparent() {
        let mut est = SpeedEstimator::new(1440.0).with_smoothing(1.0);
        est.reset(i32::MAX - 5);
        let v = est.update((i32::MAX - 5).wrapping_add(10), 0.01);
        assert!(v > 0.0);
        let expected = 10.0 * TAU / 1440.0 / 0.01;
        assert!((v - expected).abs() < 1e-3);
    }

    #[test]
    fn no_ticks_decays_to_zero() {
        let mut est = SpeedEstimator::new(1440.0);
        est.update(100, 0.01);
        let mut v = f32::MAX;
        for _ in 0..200 {
            v = est.update(100, 0.01);
        }
        assert!(v.abs() < 1e-3);
    }
}
