// SPDX-License-Identifier: MIT

//! Pin definitions for the STM32F446 rover board.
//!
//! The pin/peripheral mapping lives here as one structure, built once at
//! startup — nothing else in the firmware names a raw pin. Each wheel gets
//! a [`WheelPins`] record (H-bridge direction pair + encoder A/B); the four
//! PWM enables sit on TIM1 CH1–CH4.

use stm32f4xx_hal::{
    gpio::{gpioa, gpioc, Alternate, ErasedPin, Input, Output, PushPull},
    pac,
    prelude::*,
};

/// Direction and encoder pins for one wheel, in board-agnostic (erased)
/// form so the wheels can live in an array.
pub struct WheelPins {
    pub dir_a: ErasedPin<Output<PushPull>>,
    pub dir_b: ErasedPin<Output<PushPull>>,
    pub enc_a: ErasedPin<Input>,
    pub enc_b: ErasedPin<Input>,
}

/// TIM1 CH1–CH4 PWM enables, one per wheel in wheel order.
pub struct PwmPins {
    pub ch1: gpioa::PA8<Alternate<1>>,
    pub ch2: gpioa::PA9<Alternate<1>>,
    pub ch3: gpioa::PA10<Alternate<1>>,
    pub ch4: gpioa::PA11<Alternate<1>>,
}

/// USART2 (debug terminal).
pub struct DebugUsartPins {
    pub tx: gpioa::PA2<Alternate<7>>,
    pub rx: gpioa::PA3<Alternate<7>>,
}

/// USART6 (rover command/telemetry link).
pub struct RoverUsartPins {
    pub tx: gpioc::PC6<Alternate<8>>,
    pub rx: gpioc::PC7<Alternate<8>>,
}

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC);
/// ```
pub struct BoardPins {
    /// Per-wheel records in `WheelId::ALL` order: FL, FR, BL, BR.
    pub wheels: [WheelPins; 4],
    pub pwm: PwmPins,
    pub debug_usart: DebugUsartPins,
    pub rover_usart: RoverUsartPins,
    /// User button (B1), active low.
    pub button: ErasedPin<Input>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpioc: pac::GPIOC) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpioc = gpioc.split();

        Self {
            wheels: [
                // Front left
                WheelPins {
                    dir_a: gpioc.pc0.into_push_pull_output().erase(),
                    dir_b: gpioc.pc1.into_push_pull_output().erase(),
                    enc_a: gpioa.pa5.into_pull_up_input().erase(),
                    enc_b: gpiob.pb3.into_pull_up_input().erase(),
                },
                // Front right
                WheelPins {
                    dir_a: gpioc.pc2.into_push_pull_output().erase(),
                    dir_b: gpioc.pc3.into_push_pull_output().erase(),
                    enc_a: gpioa.pa6.into_pull_up_input().erase(),
                    enc_b: gpioa.pa7.into_pull_up_input().erase(),
                },
                // Back left
                WheelPins {
                    dir_a: gpioc.pc5.into_push_pull_output().erase(),
                    dir_b: gpioc.pc10.into_push_pull_output().erase(),
                    enc_a: gpiob.pb6.into_pull_up_input().erase(),
                    enc_b: gpiob.pb7.into_pull_up_input().erase(),
                },
                // Back right
                WheelPins {
                    dir_a: gpioc.pc11.into_push_pull_output().erase(),
                    dir_b: gpioc.pc12.into_push_pull_output().erase(),
                    enc_a: gpioa.pa0.into_pull_up_input().erase(),
                    enc_b: gpioa.pa1.into_pull_up_input().erase(),
                },
            ],

            pwm: PwmPins {
                ch1: gpioa.pa8.into_alternate::<1>(),
                ch2: gpioa.pa9.into_alternate::<1>(),
                ch3: gpioa.pa10.into_alternate::<1>(),
                ch4: gpioa.pa11.into_alternate::<1>(),
            },

            debug_usart: DebugUsartPins {
                tx: gpioa.pa2.into_alternate::<7>(),
                rx: gpioa.pa3.into_alternate::<7>(),
            },

            rover_usart: RoverUsartPins {
                tx: gpioc.pc6.into_alternate::<8>(),
                rx: gpioc.pc7.into_alternate::<8>(),
            },

            button: gpioc.pc13.into_pull_up_input().erase(),
        }
    }
}
