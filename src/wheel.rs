// SPDX-License-Identifier: MIT

//! Wheel identity and the canonical wheel ordering.
//!
//! Every per-wheel array in the firmware (decoders, controllers, actuators,
//! telemetry tick counts) is indexed by [`WheelId`] in the order of
//! [`WheelId::ALL`]. No component may reorder or alias wheel identity.

/// One of the four mecanum wheels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WheelId {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl WheelId {
    /// Number of wheels on the rover.
    pub const COUNT: usize = 4;

    /// Canonical ordering shared by all per-wheel arrays.
    pub const ALL: [WheelId; WheelId::COUNT] = [
        WheelId::FrontLeft,
        WheelId::FrontRight,
        WheelId::BackLeft,
        WheelId::BackRight,
    ];

    /// Index of this wheel into a per-wheel array.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}
