//! 4x4 matrix keypad scanned through pull resistors
//!
//! The row lines sit on one port and the column lines on another. Columns are
//! inputs with pull-downs; a row is selected by turning on only its pull-up,
//! so a pressed key on that row pulls its column high. Keys are decoded through
//! [`KEYMAP`], which assumes the pad is mounted face up and upside down.

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use tm4c123x_hal::sysctl::{control_power, Domain, PowerControl, PowerState, RunMode};
use ufmt::derive::uDebug;

use super::gpio::{GpioPort, Port};
use crate::registers::{Mmio, Registers};

/// ASCII code of the key at `[row][column]`
pub const KEYMAP: [[u8; 4]; 4] = [*b"D#0*", *b"C987", *b"B654", *b"A321"];

/// Rows and columns on the pad
pub const LINES: usize = 4;

/// Key code at a matrix position
pub fn key_at(row: usize, col: usize) -> Option<u8> {
    KEYMAP.get(row)?.get(col).copied()
}

/// Keypad errors
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub enum KeypadError {
    /// No key in the requested number of passes
    Timeout,
    /// A key was still down when the hold limit ran out
    KeyHeld,
}

/// Row and column lines of a keypad
pub trait KeypadLines {
    /// Make `row` the only row with its pull-up on
    fn activate_row(&mut self, row: usize);

    /// Column levels, bit n set when column n reads high
    fn columns(&self) -> u8;
}

/// Board wirings the keypad has been used with
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub enum Wiring {
    /// Rows PC4-PC7, columns PE0-PE3
    PortsCE,
    /// Rows PB4-PB7, columns PA4-PA7
    PortsAB,
    /// Rows PD0-PD3, columns PE0-PE3
    PortsDE,
}

impl Wiring {
    /// Port and first pin of the rows
    pub fn rows(self) -> (Port, u8) {
        match self {
            Wiring::PortsCE => (Port::C, 4),
            Wiring::PortsAB => (Port::B, 4),
            Wiring::PortsDE => (Port::D, 0),
        }
    }

    /// Port and first pin of the columns
    pub fn columns(self) -> (Port, u8) {
        match self {
            Wiring::PortsCE => (Port::E, 0),
            Wiring::PortsAB => (Port::A, 4),
            Wiring::PortsDE => (Port::E, 0),
        }
    }
}

fn domain(port: Port) -> Domain {
    match port {
        Port::A => Domain::GpioA,
        Port::B => Domain::GpioB,
        Port::C => Domain::GpioC,
        Port::D => Domain::GpioD,
        Port::E => Domain::GpioE,
        Port::F => Domain::GpioF,
    }
}

/// Keypad lines on two GPIO ports
pub struct PortLines<R> {
    rows: GpioPort<R>,
    columns: GpioPort<R>,
    row_shift: u8,
    column_shift: u8,
}

impl PortLines<Mmio> {
    /// Power and configure the ports of `wiring`.
    ///
    /// # Safety
    ///
    /// Takes the eight keypad pins without a HAL pin handle; nothing else may
    /// drive them.
    pub unsafe fn for_wiring(wiring: Wiring, power_control: &PowerControl) -> Self {
        let (row_port, _) = wiring.rows();
        let (column_port, _) = wiring.columns();
        control_power(power_control, domain(row_port), RunMode::Run, PowerState::On);
        control_power(power_control, domain(column_port), RunMode::Run, PowerState::On);
        PortLines::new(
            GpioPort::steal(row_port),
            GpioPort::steal(column_port),
            wiring,
        )
    }
}

impl<R: Registers> PortLines<R> {
    /// Configure the row and column ports for scanning, with row 0 active
    pub fn new(rows: GpioPort<R>, columns: GpioPort<R>, wiring: Wiring) -> Self {
        let (_, row_shift) = wiring.rows();
        let (_, column_shift) = wiring.columns();
        let mut lines = PortLines {
            rows,
            columns,
            row_shift,
            column_shift,
        };

        let row_mask = 0xF << row_shift;
        lines.rows.enable_digital(row_mask);
        lines.activate_row(0);

        let column_mask = 0xF << column_shift;
        lines.columns.set_input(column_mask);
        lines.columns.select_gpio(column_mask);
        lines.columns.enable_digital(column_mask);
        lines.columns.pull_down(column_mask);

        lines
    }
}

impl<R: Registers> KeypadLines for PortLines<R> {
    fn activate_row(&mut self, row: usize) {
        let row_mask = 0xF << self.row_shift;
        self.rows.clear_pull_up(row_mask);
        self.rows.pull_up(1 << (self.row_shift as usize + row % LINES));
    }

    fn columns(&self) -> u8 {
        (self.columns.read_data() >> self.column_shift) & 0xF
    }
}

/// Scan timing
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub struct KeypadConfig {
    /// Settling time after switching rows
    pub debounce_us: u32,
    /// How long a key may stay down before the scan gives up on its release
    pub hold_limit_ms: u32,
}

impl Default for KeypadConfig {
    fn default() -> Self {
        KeypadConfig {
            debounce_us: 1_000,
            hold_limit_ms: 10_000,
        }
    }
}

/// Keypad scanner
pub struct Keypad<L> {
    lines: L,
    config: KeypadConfig,
}

impl<L: KeypadLines> Keypad<L> {
    /// Scan `lines` with the given timing
    pub fn new(lines: L, config: KeypadConfig) -> Self {
        Keypad { lines, config }
    }

    /// Hand back the lines
    pub fn free(self) -> L {
        self.lines
    }

    /// One pass over the four rows.
    ///
    /// Returns the first pressed key (lowest row, then lowest column) once it
    /// is released, or `WouldBlock` if nothing is down.
    pub fn poll<D>(&mut self, delay: &mut D) -> nb::Result<u8, KeypadError>
    where
        D: DelayUs<u32> + DelayMs<u32>,
    {
        for row in 0..LINES {
            self.lines.activate_row(row);
            delay.delay_us(self.config.debounce_us);

            let columns = self.lines.columns() & 0xF;
            if columns != 0 {
                let col = columns.trailing_zeros() as usize;
                let released = self.wait_release(1 << col, delay);
                self.lines.activate_row(0);
                released.map_err(nb::Error::Other)?;
                return key_at(row, col).ok_or(nb::Error::WouldBlock);
            }
        }
        self.lines.activate_row(0);
        Err(nb::Error::WouldBlock)
    }

    /// Poll up to `passes` times for a key
    pub fn scan<D>(&mut self, passes: u32, delay: &mut D) -> Result<u8, KeypadError>
    where
        D: DelayUs<u32> + DelayMs<u32>,
    {
        for _ in 0..passes {
            match self.poll(delay) {
                Ok(key) => return Ok(key),
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
        Err(KeypadError::Timeout)
    }

    /// Press-and-hold yields a single key
    fn wait_release<D: DelayMs<u32>>(&mut self, column: u8, delay: &mut D) -> Result<(), KeypadError> {
        for _ in 0..self.config.hold_limit_ms {
            if self.lines.columns() & column == 0 {
                return Ok(());
            }
            delay.delay_ms(1);
        }
        if self.lines.columns() & column == 0 {
            Ok(())
        } else {
            Err(KeypadError::KeyHeld)
        }
    }
}
