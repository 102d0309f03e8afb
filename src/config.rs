// SPDX-License-Identifier: MIT

//! Static rover configuration.
//!
//! Everything here is fixed at build time: drive geometry, PID gains,
//! encoder resolution, loop timing, and the command watchdog. There is no
//! runtime-mutable configuration and nothing persists across power cycles.

/// Drive geometry of the mecanum base.
#[derive(Copy, Clone, Debug)]
pub struct DriveGeometry {
    /// Wheel radius in meters.
    pub wheel_radius_m: f32,
    /// Longitudinal half-distance between axles (L) in meters.
    pub half_length_m: f32,
    /// Lateral half-distance between wheel centers (W) in meters.
    pub half_width_m: f32,
}

/// PID gains shared by all four wheel velocity loops.
#[derive(Copy, Clone, Debug)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

/// Complete firmware configuration.
#[derive(Copy, Clone, Debug)]
pub struct RoverConfig {
    pub geometry: DriveGeometry,
    pub gains: PidGains,

    /// Encoder ticks per wheel revolution, after 4x quadrature decode.
    pub ticks_per_rev: f32,

    /// Control loop period in milliseconds.
    pub control_period_ms: u32,
    /// Telemetry emission period in milliseconds.
    pub telemetry_period_ms: u32,
    /// Command watchdog timeout in milliseconds. No valid command frame
    /// within this window forces an emergency stop.
    pub watchdog_timeout_ms: u32,
}

impl RoverConfig {
    /// Default tuning for the rover hardware. Gains and the watchdog window
    /// are placeholders pending tuning on the real base; the geometry and
    /// encoder resolution match the build.
    pub const fn default() -> Self {
        Self {
            geometry: DriveGeometry {
                wheel_radius_m: 0.05,
                half_length_m: 0.2,
                half_width_m: 0.15,
            },
            gains: PidGains {
                kp: 0.05,
                ki: 0.4,
                kd: 0.001,
            },
            ticks_per_rev: 1440.0,
            control_period_ms: 10,
            telemetry_period_ms: 100,
            watchdog_timeout_ms: 500,
        }
    }

    /// Control loop period in seconds.
    #[inline]
    pub fn control_dt(&self) -> f32 {
        self.control_period_ms as f32 / 1000.0
    }
}
