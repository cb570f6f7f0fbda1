//! Crate for operating the TM4C123GXL Launchpad (TM4C123GH6PM)
//!
//! Register-level drivers for the ADC, timers, UART, GPIO keypad, switches
//! and RGB LED, plus board bring-up for firmware built on top of them.

#![cfg_attr(not(test), no_std)]
#![warn(dead_code)]
#![deny(missing_docs)]

// In release mode, cause linker error if panic is possible
// Developing with panic-never can be difficult because it does not indicate *where*
// a panicking branch exists
#[cfg(all(not(debug_assertions), target_os = "none"))]
extern crate panic_never;

extern crate cortex_m;
extern crate cortex_m_rt;
extern crate embedded_hal;
extern crate tm4c123x_hal;

pub mod drivers;
pub mod registers;

// Board bring-up only exists on the target; the drivers also build for the host
#[cfg(target_os = "none")]
pub mod board;
#[cfg(target_os = "none")]
pub mod builtins;
#[cfg(target_os = "none")]
pub mod startup;
