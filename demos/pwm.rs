//! Ramps a PWM duty cycle on PB7 (T0CCP1), one step per millisecond

#![no_std]
#![no_main]

extern crate tm4c123_launchpad;
extern crate tm4c123x_hal;

use tm4c123x_hal::sysctl::{control_power, Domain, PowerState, RunMode};

use tm4c123_launchpad::board::{clocks, safe, Board};
use tm4c123_launchpad::drivers::gpio::{GpioPort, Port};
use tm4c123_launchpad::drivers::gptm::{Mode, Timer, TimerConfig, TimerHalf, Width};

/// 80 MHz / 16000 = 5 kHz carrier
const PERIOD: u32 = 16_000;

#[no_mangle]
pub fn stellaris_main(board: Board) -> ! {
    // PB7 to T0CCP1
    control_power(&board.power_control, Domain::GpioB, RunMode::Run, PowerState::On);
    let mut port_b = unsafe { GpioPort::steal(Port::B) };
    port_b.select_alternate(1 << 7, 7);
    port_b.enable_digital(1 << 7);

    let mut pwm = Timer::timer0(board.TIMER0, &board.power_control, TimerHalf::B);
    let pwm_config = TimerConfig {
        mode: Mode::Pwm,
        period: PERIOD,
        match_value: PERIOD - 1,
        ..TimerConfig::default()
    };
    if pwm.init(pwm_config).is_err() {
        safe();
    }

    // 1 ms tick from a full-width periodic timer
    let mut tick = Timer::timer1(board.TIMER1, &board.power_control, TimerHalf::A);
    let tick_config = TimerConfig {
        width: Width::Concatenated32,
        mode: Mode::Periodic,
        period: clocks().sysclk.0 / 1000 - 1,
        ..TimerConfig::default()
    };
    if tick.init(tick_config).is_err() {
        safe();
    }

    let mut level = PERIOD - 1;
    loop {
        if tick.wait_timeout().is_err() {
            safe();
        }
        level = if level < 100 { PERIOD - 1 } else { level - 100 };
        pwm.set_match(level).unwrap_or_default();
    }
}
