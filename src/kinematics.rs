// SPDX-License-Identifier: MIT

//! Mecanum kinematics: body-frame velocity ⇄ wheel angular velocities.
//!
//! Forward kinematics maps a body command (vx, vy, omega) onto the four
//! wheel speeds; the inverse direction folds measured wheel speeds back
//! into a body-frame odometry estimate through the least-squares
//! pseudo-inverse of the same matrix, hard-coded for the configured
//! geometry. Both directions are pure functions with no failure mode
//! beyond input sanitizing.

use crate::config::DriveGeometry;
use crate::wheel::WheelId;

/// Body-frame velocity: vx forward (m/s), vy lateral (m/s), omega yaw
/// rate (rad/s).
///
/// Used both as a command (from the protocol) and as an estimate (from
/// odometry).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BodyVelocity {
    pub vx: f32,
    pub vy: f32,
    pub omega: f32,
}

impl BodyVelocity {
    pub const ZERO: BodyVelocity = BodyVelocity {
        vx: 0.0,
        vy: 0.0,
        omega: 0.0,
    };

    pub const fn new(vx: f32, vy: f32, omega: f32) -> Self {
        Self { vx, vy, omega }
    }

    /// Replace NaN/infinite components with zero.
    ///
    /// Returns the sanitized value and whether anything was rejected, so
    /// the caller can count the fault.
    pub fn sanitized(self) -> (Self, bool) {
        let ok = self.vx.is_finite() && self.vy.is_finite() && self.omega.is_finite();
        if ok {
            (self, false)
        } else {
            let keep = |v: f32| if v.is_finite() { v } else { 0.0 };
            (
                Self {
                    vx: keep(self.vx),
                    vy: keep(self.vy),
                    omega: keep(self.omega),
                },
                true,
            )
        }
    }
}

/// Per-wheel angular velocities (rad/s) in [`WheelId::ALL`] order.
pub type WheelSpeeds = [f32; WheelId::COUNT];

/// Kinematic model for the configured geometry.
pub struct MecanumKinematics {
    /// Wheel radius r (m).
    radius: f32,
    /// L + W (m), the mecanum lever arm.
    lever: f32,
}

impl MecanumKinematics {
    pub fn new(geometry: DriveGeometry) -> Self {
        Self {
            radius: geometry.wheel_radius_m,
            lever: geometry.half_length_m + geometry.half_width_m,
        }
    }

    /// Forward kinematics: body command to wheel angular velocities.
    pub fn wheel_targets(&self, body: BodyVelocity) -> WheelSpeeds {
        let BodyVelocity { vx, vy, omega } = body;
        let k = self.lever;
        let r = self.radius;
        [
            (vx - vy - k * omega) / r, // FrontLeft
            (vx + vy + k * omega) / r, // FrontRight
            (vx + vy - k * omega) / r, // BackLeft
            (vx - vy + k * omega) / r, // BackRight
        ]
    }

    /// Inverse kinematics: measured wheel speeds to a body estimate.
    ///
    /// Rows are the pseudo-inverse of the forward matrix:
    /// vx = r/4·(ωFL + ωFR + ωBL + ωBR),
    /// vy = r/4·(−ωFL + ωFR + ωBL − ωBR),
    /// omega = r/(4(L+W))·(−ωFL + ωFR − ωBL + ωBR).
    pub fn body_estimate(&self, wheels: WheelSpeeds) -> BodyVelocity {
        let [fl, fr, bl, br] = wheels;
        let q = self.radius / 4.0;
        BodyVelocity {
            vx: q * (fl + fr + bl + br),
            vy: q * (-fl + fr + bl - br),
            omega: q * (-fl + fr - bl + br) / self.lever,
        }
    }
}
