// SPDX-License-Identifier: MIT

//! Firmware entry point for the STM32F446 rover board.
//!
//! Execution contexts:
//! - TIM2 interrupt at 10 kHz: samples all eight encoder lines, feeds the
//!   quadrature decoders, and maintains the millisecond time base.
//! - USART6 RX interrupt: pushes command bytes into the receive queue.
//! - Main loop, paced by TIM5 at 100 Hz: drains the queue through the
//!   frame parser, polls the user button, runs the drive controller,
//!   applies duty commands to the H-bridges, and emits telemetry at its
//!   own cadence. The loop period is held by the hardware timer, and the
//!   controllers are fed the measured inter-tick dt so a long body (e.g.
//!   a telemetry write) cannot skew the velocity estimates.

#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_std)]
#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_main)]

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod firmware {
    use core::cell::RefCell;
    use core::fmt::Write as _;
    use core::sync::atomic::{AtomicU32, Ordering};

    use cortex_m::interrupt::{self as critical, Mutex};
    use cortex_m_rt::entry;
    use heapless::spsc::Queue;
    use nb::block;
    use panic_halt as _;

    use hal::{
        gpio::{ErasedPin, Input},
        interrupt, pac,
        prelude::*,
        serial::{Config, Event as SerialEvent, Rx},
        timer::{CounterHz, Event as TimerEvent},
    };
    use stm32f4xx_hal as hal;

    use mecanum_rover::button::DebouncedButton;
    use mecanum_rover::config::RoverConfig;
    use mecanum_rover::control::DriveController;
    use mecanum_rover::encoder::{EncoderChannel, QuadratureDecoder, SpeedEstimator};
    use mecanum_rover::hw::{BoardPins, Usart};
    use mecanum_rover::motors::HBridge;
    use mecanum_rover::protocol::{Command, Parser, Telemetry};
    use mecanum_rover::wheel::WheelId;

    /// Encoder sampling rate (Hz). Must exceed 4x the maximum tick rate.
    const SAMPLE_HZ: u32 = 10_000;

    /// Shared tick accumulators, one per wheel in `WheelId::ALL` order.
    static ENCODERS: [EncoderChannel; WheelId::COUNT] = [
        EncoderChannel::new(),
        EncoderChannel::new(),
        EncoderChannel::new(),
        EncoderChannel::new(),
    ];

    /// Milliseconds since boot, accumulated by the sampling interrupt.
    /// Plain wrapping counter, so `wrapping_sub` intervals stay correct
    /// across the ~49-day rollover.
    static MILLIS: AtomicU32 = AtomicU32::new(0);

    /// Bytes lost to a full receive queue.
    static RX_OVERFLOWS: AtomicU32 = AtomicU32::new(0);

    /// Encoder sampling context owned by the TIM2 interrupt.
    struct Sampler {
        timer: CounterHz<pac::TIM2>,
        lines: [(ErasedPin<Input>, ErasedPin<Input>); WheelId::COUNT],
        decoders: [QuadratureDecoder<'static>; WheelId::COUNT],
        /// Samples since the last millisecond rollover.
        subsamples: u32,
    }

    static SAMPLER: Mutex<RefCell<Option<Sampler>>> = Mutex::new(RefCell::new(None));
    static RX: Mutex<RefCell<Option<Rx<pac::USART6>>>> = Mutex::new(RefCell::new(None));
    static RX_QUEUE: Mutex<RefCell<Queue<u8, 256>>> = Mutex::new(RefCell::new(Queue::new()));

    fn now_ms() -> u32 {
        MILLIS.load(Ordering::Relaxed)
    }

    #[entry]
    fn main() -> ! {
        let dp = pac::Peripherals::take().unwrap();

        // Clocks
        let rcc = dp.RCC.constrain();
        let clocks = rcc.cfgr.sysclk(84.MHz()).freeze();

        let config = RoverConfig::default();
        let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC);
        let [fl, fr, bl, br] = pins.wheels;

        // TIM1 PWM enables, one channel per wheel
        let (_, (c1, c2, c3, c4)) = dp.TIM1.pwm_hz(20.kHz(), &clocks).split();
        let mut pwm_fl = c1.with(pins.pwm.ch1);
        let mut pwm_fr = c2.with(pins.pwm.ch2);
        let mut pwm_bl = c3.with(pins.pwm.ch3);
        let mut pwm_br = c4.with(pins.pwm.ch4);
        pwm_fl.enable();
        pwm_fr.enable();
        pwm_bl.enable();
        pwm_br.enable();

        // H-bridges start out coasting
        let mut bridge_fl = HBridge::new(pwm_fl, fl.dir_a, fl.dir_b).unwrap();
        let mut bridge_fr = HBridge::new(pwm_fr, fr.dir_a, fr.dir_b).unwrap();
        let mut bridge_bl = HBridge::new(pwm_bl, bl.dir_a, bl.dir_b).unwrap();
        let mut bridge_br = HBridge::new(pwm_br, br.dir_a, br.dir_b).unwrap();

        // USART2 (debug terminal)
        let serial = dp
            .USART2
            .serial(
                (pins.debug_usart.tx, pins.debug_usart.rx),
                Config::default().baudrate(115_200.bps()),
                &clocks,
            )
            .unwrap();
        let (tx, _rx) = serial.split();
        let mut debug = Usart::new(tx);

        // USART6 (rover link), RX interrupt-driven
        let mut serial = dp
            .USART6
            .serial(
                (pins.rover_usart.tx, pins.rover_usart.rx),
                Config::default().baudrate(115_200.bps()),
                &clocks,
            )
            .unwrap();
        serial.listen(SerialEvent::RxNotEmpty);
        let (tx, rx) = serial.split();
        let mut rover = Usart::new(tx);

        // Encoder sampling timer
        let mut timer = dp.TIM2.counter_hz(&clocks);
        timer.start(SAMPLE_HZ.Hz()).unwrap();
        timer.listen(TimerEvent::Update);

        let lines = [
            (fl.enc_a, fl.enc_b),
            (fr.enc_a, fr.enc_b),
            (bl.enc_a, bl.enc_b),
            (br.enc_a, br.enc_b),
        ];
        let decoders = [
            QuadratureDecoder::new(lines[0].0.is_high(), lines[0].1.is_high(), &ENCODERS[0]),
            QuadratureDecoder::new(lines[1].0.is_high(), lines[1].1.is_high(), &ENCODERS[1]),
            QuadratureDecoder::new(lines[2].0.is_high(), lines[2].1.is_high(), &ENCODERS[2]),
            QuadratureDecoder::new(lines[3].0.is_high(), lines[3].1.is_high(), &ENCODERS[3]),
        ];

        critical::free(|cs| {
            SAMPLER.borrow(cs).replace(Some(Sampler {
                timer,
                lines,
                decoders,
                subsamples: 0,
            }));
            RX.borrow(cs).replace(Some(rx));
        });

        unsafe {
            pac::NVIC::unmask(pac::Interrupt::TIM2);
            pac::NVIC::unmask(pac::Interrupt::USART6);
        }

        let mut drive = DriveController::new(&config);
        let mut parser = Parser::new();
        let mut estimators = [
            SpeedEstimator::new(config.ticks_per_rev),
            SpeedEstimator::new(config.ticks_per_rev),
            SpeedEstimator::new(config.ticks_per_rev),
            SpeedEstimator::new(config.ticks_per_rev),
        ];

        // Control loop pacing. A hardware timer holds the period even when
        // the loop body runs long (telemetry writes block).
        let mut loop_timer = dp.TIM5.counter_hz(&clocks);
        loop_timer
            .start((1000 / config.control_period_ms).Hz())
            .unwrap();

        let mut button = DebouncedButton::new(3);
        let mut last_telemetry_ms = 0u32;
        let mut last_tick_ms = now_ms();

        debug.println("mecanum-rover up");

        loop {
            let _ = block!(loop_timer.wait());
            let now = now_ms();
            // Measured inter-tick window; the estimators and PID see the
            // real elapsed time, not the nominal period.
            let dt_ms = now.wrapping_sub(last_tick_ms);
            last_tick_ms = now;
            let dt = if dt_ms == 0 {
                config.control_dt()
            } else {
                dt_ms as f32 / 1000.0
            };

            // Drain the receive queue through the frame parser
            loop {
                let byte = critical::free(|cs| RX_QUEUE.borrow(cs).borrow_mut().dequeue());
                match byte {
                    Some(b) => {
                        if let Some(cmd) = parser.push(b) {
                            drive.apply(cmd, now);
                        }
                    }
                    None => break,
                }
            }

            // User button: manual EStop, or re-arm when already latched.
            if button.update(pins.button.is_low()) {
                let cmd = if drive.is_faulted() {
                    Command::Enable
                } else {
                    Command::EStop
                };
                drive.apply(cmd, now);
            }

            // Measure, control, actuate
            let mut ticks = [0i32; WheelId::COUNT];
            let mut measured = [0.0f32; WheelId::COUNT];
            for id in WheelId::ALL {
                let i = id.index();
                ticks[i] = ENCODERS[i].snapshot().ticks;
                measured[i] = estimators[i].update(ticks[i], dt);
            }
            let duties = drive.tick(measured, dt, now);

            let _ = bridge_fl.apply(duties[0]);
            let _ = bridge_fr.apply(duties[1]);
            let _ = bridge_bl.apply(duties[2]);
            let _ = bridge_br.apply(duties[3]);

            // Telemetry cadence
            if now.wrapping_sub(last_telemetry_ms) >= config.telemetry_period_ms {
                last_telemetry_ms = now;
                let frame = Telemetry {
                    body: drive.estimate(),
                    ticks,
                }
                .encode();
                rover.write_frame(&frame);

                if drive.is_faulted() {
                    let _ = write!(
                        debug,
                        "fault: dropped={} rx_overflow={}\r\n",
                        parser.dropped_frames(),
                        RX_OVERFLOWS.load(Ordering::Relaxed),
                    );
                }
            }
        }
    }

    /// Encoder sampling context: read all eight lines, step the decoders,
    /// advance the millisecond clock.
    #[interrupt]
    fn TIM2() {
        critical::free(|cs| {
            if let Some(sampler) = SAMPLER.borrow(cs).borrow_mut().as_mut() {
                sampler.timer.clear_all_flags();

                sampler.subsamples += 1;
                if sampler.subsamples == SAMPLE_HZ / 1000 {
                    sampler.subsamples = 0;
                    MILLIS.fetch_add(1, Ordering::Relaxed);
                }

                let now = MILLIS.load(Ordering::Relaxed);
                for i in 0..WheelId::COUNT {
                    let (a, b) = &sampler.lines[i];
                    sampler.decoders[i].update(a.is_high(), b.is_high(), now);
                }
            }
        });
    }

    /// Rover link receive: queue bytes for the control loop.
    #[interrupt]
    fn USART6() {
        critical::free(|cs| {
            if let Some(rx) = RX.borrow(cs).borrow_mut().as_mut() {
                while let Ok(b) = rx.read() {
                    if RX_QUEUE.borrow(cs).borrow_mut().enqueue(b).is_err() {
                        // Lost byte; the frame checksum catches the damage,
                        // the counter records it.
                        RX_OVERFLOWS.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        });
    }
}

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
fn main() {
    // The firmware entry only exists for the embedded target; host builds
    // stop at the library crate and its tests.
}
