// SPDX-License-Identifier: MIT

//! End-to-end pipeline test on the host: raw command bytes through the
//! frame parser into the drive controller, duty commands out, telemetry
//! frames back.

use mecanum_rover::config::RoverConfig;
use mecanum_rover::control::DriveController;
use mecanum_rover::kinematics::BodyVelocity;
use mecanum_rover::motors::DutyCommand;
use mecanum_rover::protocol::messages::{encode_set_velocity, encode_simple, MSG_ESTOP};
use mecanum_rover::protocol::{Parser, Telemetry};

struct Harness {
    parser: Parser,
    drive: DriveController,
    now_ms: u32,
}

impl Harness {
    fn new() -> Self {
        Self {
            parser: Parser::new(),
            drive: DriveController::new(&RoverConfig::default()),
            now_ms: 0,
        }
    }

    /// Feed a byte stream as the UART RX path would.
    fn receive(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if let Some(cmd) = self.parser.push(b) {
                self.drive.apply(cmd, self.now_ms);
            }
        }
    }

    /// Advance one 10 ms control tick with the given measured wheel speeds.
    fn tick(&mut self, measured: [f32; 4]) -> [DutyCommand; 4] {
        self.now_ms += 10;
        self.drive.tick(measured, 0.01, self.now_ms)
    }
}

#[test]
fn setpoint_frame_drives_the_wheels() {
    let mut h = Harness::new();

    let mut frame = [0u8; 16];
    encode_set_velocity(BodyVelocity::new(1.0, 0.0, 0.0), &mut frame);
    h.receive(&frame);

    let duties = h.tick([0.0; 4]);
    // Pure forward: every wheel pushes forward, all equally.
    for d in duties {
        assert!(d.value() > 0.0);
        assert!((d.value() - duties[0].value()).abs() < 1e-6);
    }
}

#[test]
fn estop_frame_stops_everything_in_one_tick() {
    let mut h = Harness::new();

    let mut frame = [0u8; 16];
    encode_set_velocity(BodyVelocity::new(1.0, 0.0, 0.5), &mut frame);
    h.receive(&frame);
    for _ in 0..10 {
        h.tick([5.0, 5.0, 5.0, 5.0]);
    }

    let mut estop = [0u8; 4];
    encode_simple(MSG_ESTOP, &mut estop);
    h.receive(&estop);

    let duties = h.tick([5.0, 5.0, 5.0, 5.0]);
    assert_eq!(duties, [DutyCommand::ZERO; 4]);
    assert_eq!(h.drive.integrals(), [0.0; 4]);
    assert!(h.drive.is_faulted());
}

#[test]
fn corrupted_frame_ignored_but_following_frame_applies() {
    let mut h = Harness::new();

    let mut good = [0u8; 16];
    encode_set_velocity(BodyVelocity::new(0.5, 0.0, 0.0), &mut good);
    let mut bad = good;
    bad[9] ^= 0x40;

    h.receive(&bad);
    let duties = h.tick([0.0; 4]);
    assert_eq!(duties, [DutyCommand::ZERO; 4]);
    assert_eq!(h.parser.dropped_frames(), 1);

    h.receive(&good);
    let duties = h.tick([0.0; 4]);
    assert!(duties.iter().all(|d| d.value() > 0.0));
}

#[test]
fn telemetry_reports_odometry_from_wheel_motion() {
    let mut h = Harness::new();

    // All wheels measured at 20 rad/s, r = 0.05 m: 1 m/s forward.
    h.tick([20.0; 4]);

    let frame = Telemetry {
        body: h.drive.estimate(),
        ticks: [100, 100, 100, 100],
    }
    .encode();

    let vx = f32::from_le_bytes(frame[3..7].try_into().unwrap());
    let vy = f32::from_le_bytes(frame[7..11].try_into().unwrap());
    assert!((vx - 1.0).abs() < 1e-5);
    assert!(vy.abs() < 1e-6);
    let fl_ticks = i32::from_le_bytes(frame[15..19].try_into().unwrap());
    assert_eq!(fl_ticks, 100);
}

#[test]
fn silent_link_watchdog_halts_the_rover() {
    let mut h = Harness::new();

    let mut frame = [0u8; 16];
    encode_set_velocity(BodyVelocity::new(0.5, 0.0, 0.0), &mut frame);
    h.receive(&frame);
    assert!(h.tick([0.0; 4]).iter().any(|d| d.value() != 0.0));

    // 600 ms with no frames: past the 500 ms watchdog.
    let mut duties = [DutyCommand::ZERO; 4];
    for _ in 0..60 {
        duties = h.tick([0.0; 4]);
    }
    assert_eq!(duties, [DutyCommand::ZERO; 4]);
    assert!(h.drive.is_faulted());
}
