//! Prints AIN0 (PE3) and the die temperature over the debug serial port

#![no_std]
#![no_main]

extern crate tm4c123_launchpad;
extern crate tm4c123x_hal;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use ufmt::uwriteln;

use tm4c123_launchpad::board::{clocks, safe, Board};
use tm4c123_launchpad::drivers::adc::{Adc, AdcConfig, AdcModule, Channel};
use tm4c123_launchpad::drivers::uart::{NewlineMode, Uart, UartConfig};

/// Die temperature in tenths of a degree from a 12-bit reading,
/// TEMP = 147.5 - 75 * 3.3 * raw / 4096
fn decidegrees(raw: u16) -> i32 {
    1475 - (2475 * raw as i32) / 4096
}

#[no_mangle]
pub fn stellaris_main(mut board: Board) -> ! {
    let config = UartConfig {
        newline: NewlineMode::SwapLFtoCRLF,
        ..UartConfig::default()
    };
    let mut uart = match Uart::uart0(board.UART0, &board.power_control, clocks(), config) {
        Ok(uart) => uart,
        Err(_) => safe(),
    };
    let mut delay = tm4c123x_hal::delay::Delay::new(board.core_peripherals.SYST, clocks());

    let mut ain0 = Adc::adc0(board.ADC0, &board.power_control, AdcConfig::default());
    let mut die = Adc::adc1(
        board.ADC1,
        &board.power_control,
        AdcConfig {
            channel: Channel::Temperature,
            ..AdcConfig::for_module(AdcModule::Adc1)
        },
    );

    uwriteln!(uart, "Welcome to Launchpad ADC").unwrap_or_default();
    let mut loops: u32 = 0;
    loop {
        match (ain0.read(), die.read()) {
            (Ok(raw), Ok(temp)) => {
                let t = decidegrees(temp);
                uwriteln!(uart, "{}: AIN0 {} temp {}.{} C", loops, raw, t / 10, t % 10)
                    .unwrap_or_default();
                // Green above mid-scale
                if raw > 2048 {
                    board.led_green.set_high().unwrap_or_default();
                } else {
                    board.led_green.set_low().unwrap_or_default();
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                uwriteln!(uart, "ADC error {:?}", e).unwrap_or_default();
            }
        }

        loops = loops.wrapping_add(1);
        delay.delay_ms(500u32);
    }
}
