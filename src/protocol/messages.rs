// SPDX-License-Identifier: MIT

//! Command/telemetry message definitions and framing.
//!
//! Every frame on the rover link looks the same in both directions:
//!
//! ```text
//! [SYNC][LEN][CMD_TYPE][payload...][CHECKSUM]
//! ```
//!
//! `LEN` counts the CMD_TYPE byte plus the payload; `CHECKSUM` is the XOR
//! of LEN, CMD_TYPE, and every payload byte. Multi-byte fields are
//! little-endian `f32`/`i32`.

use crate::kinematics::BodyVelocity;
use crate::wheel::WheelId;

/// Sync byte for the protocol.
pub const SYNC_BYTE: u8 = 0xA5;

// Message IDs
pub const MSG_SET_VELOCITY: u8 = 0x10;
pub const MSG_ESTOP: u8 = 0x11;
pub const MSG_ENABLE: u8 = 0x12;
pub const MSG_TELEMETRY: u8 = 0x20;

/// Largest accepted LEN value (CMD_TYPE + payload bytes).
pub const MAX_BODY_LEN: usize = 1 + Telemetry::PAYLOAD_LEN;

/// Inbound commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Body-frame velocity setpoint.
    SetVelocity(BodyVelocity),
    /// Immediate emergency stop; latches until [`Command::Enable`].
    EStop,
    /// Clear the safety latch and re-arm the controllers.
    Enable,
}

/// XOR checksum over LEN, CMD_TYPE, and payload.
#[inline]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Encode a SetVelocity command frame (useful for the host side and for
/// loopback tests).
pub fn encode_set_velocity(body: BodyVelocity, out: &mut [u8; 16]) {
    out[0] = SYNC_BYTE;
    out[1] = 13; // type + 3 × f32
    out[2] = MSG_SET_VELOCITY;
    out[3..7].copy_from_slice(&body.vx.to_le_bytes());
    out[7..11].copy_from_slice(&body.vy.to_le_bytes());
    out[11..15].copy_from_slice(&body.omega.to_le_bytes());
    out[15] = checksum(&out[1..15]);
}

/// Encode a payload-free command frame (EStop, Enable).
pub fn encode_simple(msg_id: u8, out: &mut [u8; 4]) {
    out[0] = SYNC_BYTE;
    out[1] = 1;
    out[2] = msg_id;
    out[3] = checksum(&out[1..3]);
}

/// Outbound telemetry: odometry estimate plus raw per-wheel tick counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    pub body: BodyVelocity,
    /// Tick accumulators in [`WheelId::ALL`] order.
    pub ticks: [i32; WheelId::COUNT],
}

impl Telemetry {
    /// Payload bytes after CMD_TYPE: 3 × f32 + 4 × i32.
    pub const PAYLOAD_LEN: usize = 12 + 16;
    /// Full frame size on the wire.
    pub const FRAME_LEN: usize = 3 + Self::PAYLOAD_LEN + 1;

    /// Serialize into a wire frame.
    pub fn encode(&self) -> [u8; Self::FRAME_LEN] {
        let mut out = [0u8; Self::FRAME_LEN];
        out[0] = SYNC_BYTE;
        out[1] = (1 + Self::PAYLOAD_LEN) as u8;
        out[2] = MSG_TELEMETRY;
        out[3..7].copy_from_slice(&self.body.vx.to_le_bytes());
        out[7..11].copy_from_slice(&self.body.vy.to_le_bytes());
        out[11..15].copy_from_slice(&self.body.omega.to_le_bytes());
        let mut at = 15;
        for t in self.ticks {
            out[at..at + 4].copy_from_slice(&t.to_le_bytes());
            at += 4;
        }
        out[Self::FRAME_LEN - 1] = checksum(&out[1..Self::FRAME_LEN - 1]);
        out
    }
}
