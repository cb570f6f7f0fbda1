//! Cycles the RGB LED; SW1 picks the next colour, SW2 goes back to cycling

#![no_std]
#![no_main]

extern crate tm4c123_launchpad;
extern crate tm4c123x_hal;

use core::sync::atomic::{AtomicU8, Ordering};

use irq::{handler, scope};
use tm4c123_launchpad::board::{clocks, Board};
use tm4c123_launchpad::drivers::led::{LedColor, LedConfig, RgbLed};
use tm4c123_launchpad::drivers::interrupt::InterruptController;
use tm4c123_launchpad::drivers::switches::{Switch, Switches, DEFAULT_PRIORITY};
use tm4c123_launchpad::startup::device::Interrupt;
use tm4c123x_hal::tm4c123x::Interrupt as NvicLine;

#[no_mangle]
pub fn stellaris_main(board: Board) -> ! {
    let mut nvic = board.core_peripherals.NVIC;
    let mut delay = tm4c123x_hal::delay::Delay::new(board.core_peripherals.SYST, clocks());
    let mut led = RgbLed::new(
        board.led_red,
        board.led_green,
        board.led_blue,
        LedConfig::default(),
    );
    let mut switches = Switches::new(board.sw1, board.sw2);
    switches.arm_both(&mut nvic);
    // Held off until the handler is registered
    nvic.disable(NvicLine::GPIOF);

    // 0 cycles through all three, 1..=3 holds one colour
    let selected = AtomicU8::new(0);

    handler!(
        port_f = || {
            if switches.pending(Switch::Sw1) {
                switches.clear(Switch::Sw1);
                let next = selected.load(Ordering::Relaxed) % 3 + 1;
                selected.store(next, Ordering::Relaxed);
            }
            if switches.pending(Switch::Sw2) {
                switches.clear(Switch::Sw2);
                selected.store(0, Ordering::Relaxed);
            }
        }
    );

    scope(|s| {
        s.register(Interrupt::GPIOF, port_f);
        nvic.enable(NvicLine::GPIOF, DEFAULT_PRIORITY);

        loop {
            let flashed = match selected.load(Ordering::Relaxed) {
                1 => led.flash(LedColor::Red, &mut delay),
                2 => led.flash(LedColor::Green, &mut delay),
                3 => led.flash(LedColor::Blue, &mut delay),
                _ => led.flash_rgb(&mut delay),
            };
            flashed.unwrap_or_default();
        }
    });

    // Main must not return
    loop {}
}
