//! Peripheral drivers for the TM4C123GH6PM
//!
//! The register-level drivers (`adc`, `gptm`, `gpio`, `uart`) are generic
//! over [`Registers`](crate::registers::Registers) so they can run against
//! memory-mapped hardware or a simulated register file.

pub mod adc;
pub mod gpio;
pub mod gptm;
pub mod interrupt;
pub mod keypad;
pub mod lcd;
pub mod led;
pub mod switches;
pub mod uart;
