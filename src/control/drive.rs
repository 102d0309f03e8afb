// SPDX-License-Identifier: MIT

//! Four-wheel drive orchestration.
//!
//! [`DriveController`] ties the protocol, kinematics, and the per-wheel
//! velocity loops together: commands arrive through [`DriveController::apply`],
//! and every fixed control tick the measured wheel speeds go in and four
//! duty commands come out, alongside a refreshed body-frame odometry
//! estimate.
//!
//! Safety lives here too. An explicit EStop or a command-watchdog timeout
//! latches all wheels Disabled (zero duty, zeroed integrators) within the
//! same tick; only an explicit Enable clears the latch. Setpoints received
//! while latched are dropped.

use crate::config::RoverConfig;
use crate::control::wheel::{WheelController, WheelMode};
use crate::kinematics::{BodyVelocity, MecanumKinematics, WheelSpeeds};
use crate::motors::DutyCommand;
use crate::protocol::Command;
use crate::wheel::WheelId;

/// Non-fatal fault counters, readable for diagnostics/telemetry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DriveFaults {
    /// Setpoints with NaN/infinite components (clamped to zero).
    pub invalid_setpoints: u32,
    /// Watchdog expirations since boot.
    pub watchdog_trips: u32,
}

/// Top-level drive state machine.
pub struct DriveController {
    kinematics: MecanumKinematics,
    wheels: [WheelController; WheelId::COUNT],

    command: BodyVelocity,
    estimate: BodyVelocity,

    watchdog_timeout_ms: u32,
    last_command_ms: u32,
    /// Safety latch: set by EStop or watchdog, cleared only by Enable.
    faulted: bool,

    faults: DriveFaults,
}

impl DriveController {
    pub fn new(config: &RoverConfig) -> Self {
        Self {
            kinematics: MecanumKinematics::new(config.geometry),
            wheels: [
                WheelController::new(config.gains),
                WheelController::new(config.gains),
                WheelController::new(config.gains),
                WheelController::new(config.gains),
            ],
            command: BodyVelocity::ZERO,
            estimate: BodyVelocity::ZERO,
            watchdog_timeout_ms: config.watchdog_timeout_ms,
            last_command_ms: 0,
            faulted: false,
            faults: DriveFaults::default(),
        }
    }

    /// Latest body-frame odometry estimate.
    #[inline]
    pub fn estimate(&self) -> BodyVelocity {
        self.estimate
    }

    /// True while the safety latch holds the wheels disabled.
    #[inline]
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    #[inline]
    pub fn faults(&self) -> DriveFaults {
        self.faults
    }

    /// True if any wheel is under closed-loop control.
    pub fn is_active(&self) -> bool {
        self.wheels.iter().any(|w| w.mode() == WheelMode::Active)
    }

    /// Feed one parsed command frame into the state machine.
    pub fn apply(&mut self, command: Command, now_ms: u32) {
        match command {
            Command::SetVelocity(body) => {
                let (body, rejected) = body.sanitized();
                if rejected {
                    self.faults.invalid_setpoints = self.faults.invalid_setpoints.wrapping_add(1);
                }
                self.last_command_ms = now_ms;
                if self.faulted {
                    // Latched: only Enable re-arms the wheels.
                    return;
                }
                self.command = body;
                // First valid setpoint activates the controllers.
                for wheel in &mut self.wheels {
                    wheel.enable();
                }
            }
            Command::EStop => {
                self.halt();
                self.faulted = true;
            }
            Command::Enable => {
                self.faulted = false;
                self.command = BodyVelocity::ZERO;
                self.last_command_ms = now_ms;
                for wheel in &mut self.wheels {
                    wheel.enable();
                }
            }
        }
    }

    /// Emergency stop: all wheels Disabled, zero duty, zero command.
    ///
    /// Effective immediately; the next [`tick`](Self::tick) already emits
    /// all-zero duties.
    pub fn halt(&mut self) {
        self.command = BodyVelocity::ZERO;
        for wheel in &mut self.wheels {
            wheel.disable();
        }
    }

    /// Run one fixed-period control tick.
    ///
    /// `measured` — wheel angular velocities (rad/s) in [`WheelId::ALL`]
    /// order; `dt` — tick period in seconds; `now_ms` — monotonic
    /// milliseconds (wrapping).
    ///
    /// Returns the duty command per wheel, in the same order.
    pub fn tick(
        &mut self,
        measured: WheelSpeeds,
        dt: f32,
        now_ms: u32,
    ) -> [DutyCommand; WheelId::COUNT] {
        // Command watchdog. Only armed while driving, so a silent link at
        // boot or after a commanded stop is not a fault.
        if self.is_active()
            && now_ms.wrapping_sub(self.last_command_ms) > self.watchdog_timeout_ms
        {
            self.halt();
            self.faulted = true;
            self.faults.watchdog_trips = self.faults.watchdog_trips.wrapping_add(1);
        }

        // Odometry runs regardless of mode: wheels pushed by hand while
        // disabled still move the estimate.
        self.estimate = self.kinematics.body_estimate(measured);

        let targets = self.kinematics.wheel_targets(self.command);

        let mut duties = [DutyCommand::ZERO; WheelId::COUNT];
        for id in WheelId::ALL {
            let i = id.index();
            self.wheels[i].set_target(targets[i]);
            duties[i] = self.wheels[i].update(measured[i], dt);
        }
        duties
    }

    /// Integrator values per wheel, for diagnostics.
    pub fn integrals(&self) -> [f32; WheelId::COUNT] {
        let mut out = [0.0; WheelId::COUNT];
        for id in WheelId::ALL {
            out[id.index()] = self.wheels[id.index()].integral();
        }
        out
    }
}
