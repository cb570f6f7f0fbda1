//! Reports keypad presses (rows PC4-PC7, columns PE0-PE3) on the debug
//! serial port and echoes typed characters back in upper case

#![no_std]
#![no_main]

extern crate tm4c123_launchpad;
extern crate tm4c123x_hal;

use embedded_hal::serial::Read as ReadHal;
use ufmt::uwriteln;

use tm4c123_launchpad::board::{clocks, safe, Board};
use tm4c123_launchpad::drivers::keypad::{Keypad, KeypadConfig, PortLines, Wiring};
use tm4c123_launchpad::drivers::led::{LedColor, LedConfig, RgbLed};
use tm4c123_launchpad::drivers::uart::{NewlineMode, Uart, UartConfig};

#[no_mangle]
pub fn stellaris_main(board: Board) -> ! {
    let config = UartConfig {
        newline: NewlineMode::SwapLFtoCRLF,
        ..UartConfig::default()
    };
    let mut uart = match Uart::uart0(board.UART0, &board.power_control, clocks(), config) {
        Ok(uart) => uart,
        Err(_) => safe(),
    };
    let mut delay = tm4c123x_hal::delay::Delay::new(board.core_peripherals.SYST, clocks());
    let mut led = RgbLed::new(
        board.led_red,
        board.led_green,
        board.led_blue,
        LedConfig { flash_ms: 50 },
    );

    // Ports C and E are not handed out anywhere else in this program
    let lines = unsafe { PortLines::for_wiring(Wiring::PortsCE, &board.power_control) };
    let mut keypad = Keypad::new(lines, KeypadConfig::default());

    uwriteln!(uart, "Press a key").unwrap_or_default();
    loop {
        match keypad.poll(&mut delay) {
            Ok(key) => {
                uwriteln!(uart, "key {}", key as char).unwrap_or_default();
                led.flash(LedColor::Blue, &mut delay).unwrap_or_default();
            }
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(e)) => {
                uwriteln!(uart, "keypad: {:?}", e).unwrap_or_default();
                led.flash(LedColor::Red, &mut delay).unwrap_or_default();
            }
        }

        while let Ok(byte) = uart.read() {
            uart.send(byte.to_ascii_uppercase()).unwrap_or_default();
        }
    }
}
