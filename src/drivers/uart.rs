//! Polled UART0/UART1
//!
//! Blocking byte send/receive with a poll budget, the non-blocking
//! embedded-hal serial traits, and `ufmt`/`core::fmt` text output for use as a
//! console.

use core::mem::offset_of;
use modular_bitfield::prelude::*;
use tm4c123x_hal::sysctl::{control_power, Clocks, Domain, PowerControl, PowerState, RunMode};
use tm4c123x_hal::tm4c123x::uart0::RegisterBlock;
use tm4c123x_hal::tm4c123x::{UART0, UART1};
use ufmt::derive::uDebug;

use super::gpio::{GpioPort, Port};
use crate::registers::{Mmio, Registers, Timeout, DEFAULT_POLLS};

const DR: usize = offset_of!(RegisterBlock, dr);
/// RSR/ECR is the word after DR; the PAC only reaches it through accessors
const ECR: usize = DR + 4;
const FR: usize = offset_of!(RegisterBlock, fr);
const IBRD: usize = offset_of!(RegisterBlock, ibrd);
const FBRD: usize = offset_of!(RegisterBlock, fbrd);
const LCRH: usize = offset_of!(RegisterBlock, lcrh);
const CTL: usize = offset_of!(RegisterBlock, ctl);

// UARTDR receive status
const DR_FE: u32 = 1 << 8;
const DR_PE: u32 = 1 << 9;
const DR_BE: u32 = 1 << 10;
const DR_OE: u32 = 1 << 11;

// UARTFR
const FR_BUSY: u32 = 1 << 3;
const FR_RXFE: u32 = 1 << 4;
const FR_TXFF: u32 = 1 << 5;

// UARTLCRH
const LCRH_PEN: u32 = 1 << 1;
const LCRH_EPS: u32 = 1 << 2;
const LCRH_STP2: u32 = 1 << 3;
const LCRH_FEN: u32 = 1 << 4;
const LCRH_WLEN_8: u32 = 0x3 << 5;

// UARTCTL
const CTL_UARTEN: u32 = 1 << 0;
const CTL_HSE: u32 = 1 << 5;
const CTL_TXE: u32 = 1 << 8;
const CTL_RXE: u32 = 1 << 9;

/// Fractional divisor resolution, 1/64
const FRACTION_STEPS: u64 = 64;

/// UART driver errors
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub enum UartError {
    /// Requested baud rate can't be produced from the clock
    InvalidBaudRate,
    /// FIFO didn't drain/fill within the poll budget
    Timeout,
    /// Missing stop bit
    Framing,
    /// Parity mismatch
    Parity,
    /// Line held low longer than a frame
    Break,
    /// Receive FIFO overflowed
    Overrun,
}

impl From<Timeout> for UartError {
    fn from(_: Timeout) -> Self {
        UartError::Timeout
    }
}

/// IBRD/FBRD pair
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub struct BaudDivisor {
    /// UARTIBRD, 16 bits
    pub integer: u16,
    /// UARTFBRD, 6 bits
    pub fraction: u8,
}

/// Baud rate divisor for `baud` from a UART clock of `clock_hz`.
///
/// `BRD = clock / (ClkDiv * baud)` with `ClkDiv` 16, or 8 in high-speed mode.
/// The integer part goes to IBRD and `round(frac(BRD) * 64)` to FBRD; a
/// fraction that rounds up to 64 carries into the integer part.
pub fn baud_divisor(clock_hz: u32, baud: u32, high_speed: bool) -> Result<BaudDivisor, UartError> {
    let clk_div: u64 = if high_speed { 8 } else { 16 };
    // round(BRD * 64) == floor((floor(BRD * 128) + 1) / 2)
    let doubled = (clock_hz as u64 * 2 * FRACTION_STEPS)
        .checked_div(clk_div * baud as u64)
        .ok_or(UartError::InvalidBaudRate)?;
    let scaled = (doubled + 1) / 2;
    let integer = scaled / FRACTION_STEPS;
    let fraction = scaled % FRACTION_STEPS;
    if integer == 0 || integer > 0xFFFF {
        return Err(UartError::InvalidBaudRate);
    }
    Ok(BaudDivisor {
        integer: integer as u16,
        fraction: fraction as u8,
    })
}

/// Parity bit
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Stop bits per frame
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum StopBits {
    One,
    Two,
}

/// How `\n` is sent by the text writers
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub enum NewlineMode {
    /// Bytes go out unchanged
    Binary,
    /// `\n` goes out as `\r\n`, for terminals
    SwapLFtoCRLF,
}

/// Line settings; data is always 8 bits
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub struct UartConfig {
    /// Bits per second
    pub baud: u32,
    /// Parity bit
    pub parity: Parity,
    /// Stop bits
    pub stop_bits: StopBits,
    /// 16-byte FIFOs instead of single-byte holding registers
    pub fifo: bool,
    /// Divide the clock by 8 instead of 16
    pub high_speed: bool,
    /// Text output newline handling
    pub newline: NewlineMode,
}

impl Default for UartConfig {
    /// 115200 8N1, no FIFO
    fn default() -> Self {
        UartConfig {
            baud: 115_200,
            parity: Parity::None,
            stop_bits: StopBits::One,
            fifo: false,
            high_speed: false,
            newline: NewlineMode::Binary,
        }
    }
}

impl UartConfig {
    fn line_control(&self) -> u32 {
        let mut lcrh = LCRH_WLEN_8;
        match self.parity {
            Parity::None => {}
            Parity::Even => lcrh |= LCRH_PEN | LCRH_EPS,
            Parity::Odd => lcrh |= LCRH_PEN,
        }
        if self.stop_bits == StopBits::Two {
            lcrh |= LCRH_STP2;
        }
        if self.fifo {
            lcrh |= LCRH_FEN;
        }
        lcrh
    }
}

/// UARTFR register parser
#[bitfield(bits = 32)]
#[derive(Clone, Copy, Eq, PartialEq)]
#[allow(missing_docs)]
struct UartFlagsBitfield {
    pub clear_to_send: B1,
    _reserved0: B2,
    pub busy: B1,
    pub rx_fifo_empty: B1,
    pub tx_fifo_full: B1,
    pub rx_fifo_full: B1,
    pub tx_fifo_empty: B1,
    _reserved1: B24,
}

/// Display intermediary for UARTFR
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub struct UartFlags {
    pub clear_to_send: bool,
    pub busy: bool,
    pub rx_fifo_empty: bool,
    pub tx_fifo_full: bool,
    pub rx_fifo_full: bool,
    pub tx_fifo_empty: bool,
}

impl UartFlags {
    /// Parse register into debuggable format
    pub fn new(reg: u32) -> Self {
        let b = UartFlagsBitfield::from_bytes(reg.to_le_bytes());
        UartFlags {
            clear_to_send: b.clear_to_send() != 0,
            busy: b.busy() != 0,
            rx_fifo_empty: b.rx_fifo_empty() != 0,
            tx_fifo_full: b.tx_fifo_full() != 0,
            rx_fifo_full: b.rx_fifo_full() != 0,
            tx_fifo_empty: b.tx_fifo_empty() != 0,
        }
    }
}

/// A configured UART
pub struct Uart<R> {
    regs: R,
    newline: NewlineMode,
    polls: u32,
}

impl Uart<Mmio> {
    /// UART1 on PB0 (U1Rx) / PB1 (U1Tx)
    pub fn uart1(
        _uart: UART1,
        power_control: &PowerControl,
        clocks: &Clocks,
        config: UartConfig,
    ) -> Result<Self, UartError> {
        control_power(power_control, Domain::Uart1, RunMode::Run, PowerState::On);
        control_power(power_control, Domain::GpioB, RunMode::Run, PowerState::On);
        let regs = unsafe { Mmio::from_ptr(UART1::ptr()) };
        let uart = Uart::new(regs, clocks.sysclk.0, config)?;
        route_pins(Port::B);
        Ok(uart)
    }

    /// UART0 on PA0 (U0Rx) / PA1 (U0Tx), the Launchpad's debug USB serial port
    pub fn uart0(
        _uart: UART0,
        power_control: &PowerControl,
        clocks: &Clocks,
        config: UartConfig,
    ) -> Result<Self, UartError> {
        control_power(power_control, Domain::Uart0, RunMode::Run, PowerState::On);
        control_power(power_control, Domain::GpioA, RunMode::Run, PowerState::On);
        let regs = unsafe { Mmio::from_ptr(UART0::ptr()) };
        let uart = Uart::new(regs, clocks.sysclk.0, config)?;
        route_pins(Port::A);
        Ok(uart)
    }
}

/// Pins 0 and 1 of `port` to PCTL function 1 (UnRx, UnTx)
fn route_pins(port: Port) {
    let mut gpio = unsafe { GpioPort::steal(port) };
    gpio.select_alternate(0b11, 1);
    gpio.enable_digital(0b11);
}

impl<R: Registers> Uart<R> {
    /// Configure a UART register block clocked at `clock_hz`
    pub fn new(regs: R, clock_hz: u32, config: UartConfig) -> Result<Self, UartError> {
        let divisor = baud_divisor(clock_hz, config.baud, config.high_speed)?;
        let mut uart = Uart {
            regs,
            newline: config.newline,
            polls: DEFAULT_POLLS,
        };

        // Off while the divisors change
        uart.regs.clear_bits(CTL, CTL_UARTEN);
        if config.high_speed {
            uart.regs.set_bits(CTL, CTL_HSE);
        } else {
            uart.regs.clear_bits(CTL, CTL_HSE);
        }

        uart.regs.write(IBRD, divisor.integer as u32);
        uart.regs.write(FBRD, divisor.fraction as u32);
        // The divisor latches on the LCRH write
        uart.regs.write(LCRH, config.line_control());

        uart.regs.set_bits(CTL, CTL_UARTEN | CTL_TXE | CTL_RXE);
        Ok(uart)
    }

    /// Change how long `send`/`receive` spin before giving up
    pub fn set_poll_budget(&mut self, polls: u32) {
        self.polls = polls;
    }

    /// Change how text writers send `\n`
    pub fn set_newline_mode(&mut self, mode: NewlineMode) {
        self.newline = mode;
    }

    /// Snapshot of the flag register
    pub fn flags(&self) -> UartFlags {
        UartFlags::new(self.regs.read(FR))
    }

    /// Wait for room in the transmitter, then queue `byte`
    pub fn send(&mut self, byte: u8) -> Result<(), UartError> {
        self.regs.wait_clear(FR, FR_TXFF, self.polls)?;
        self.regs.write(DR, byte as u32);
        Ok(())
    }

    /// Send every byte of `bytes`
    pub fn send_all(&mut self, bytes: &[u8]) -> Result<(), UartError> {
        bytes.iter().try_for_each(|b| self.send(*b))
    }

    /// Wait for a received byte
    pub fn receive(&mut self) -> Result<u8, UartError> {
        self.regs.wait_clear(FR, FR_RXFE, self.polls)?;
        self.take_received()
    }

    /// Pop the receive holding register, reporting line errors
    fn take_received(&mut self) -> Result<u8, UartError> {
        let data = self.regs.read(DR);
        let error = if data & DR_OE != 0 {
            Some(UartError::Overrun)
        } else if data & DR_BE != 0 {
            Some(UartError::Break)
        } else if data & DR_PE != 0 {
            Some(UartError::Parity)
        } else if data & DR_FE != 0 {
            Some(UartError::Framing)
        } else {
            None
        };
        match error {
            Some(e) => {
                self.regs.write(ECR, 0);
                Err(e)
            }
            None => Ok((data & 0xFF) as u8),
        }
    }

    /// Send text, applying the newline mode
    fn send_text(&mut self, s: &str) -> Result<(), UartError> {
        for byte in s.bytes() {
            if byte == b'\n' && self.newline == NewlineMode::SwapLFtoCRLF {
                self.send(b'\r')?;
            }
            self.send(byte)?;
        }
        Ok(())
    }
}

impl<R: Registers> embedded_hal::serial::Read<u8> for Uart<R> {
    type Error = UartError;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        if self.regs.read(FR) & FR_RXFE != 0 {
            return Err(nb::Error::WouldBlock);
        }
        self.take_received().map_err(nb::Error::Other)
    }
}

impl<R: Registers> embedded_hal::serial::Write<u8> for Uart<R> {
    type Error = UartError;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        if self.regs.read(FR) & FR_TXFF != 0 {
            return Err(nb::Error::WouldBlock);
        }
        self.regs.write(DR, word as u32);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        if self.regs.read(FR) & FR_BUSY != 0 {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }
}

impl<R: Registers> ufmt::uWrite for Uart<R> {
    type Error = UartError;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.send_text(s)
    }
}

impl<R: Registers> core::fmt::Write for Uart<R> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.send_text(s).map_err(|_| core::fmt::Error)
    }
}
