//! Register-level GPIO port access
//!
//! The HAL's typestate pins are the right tool for pins that keep one mode for
//! the life of the program (LEDs, switches). The keypad scan reconfigures pull
//! resistors on every pass, and peripheral drivers need to route a couple of
//! pins to an alternate function without taking the whole port, so those go
//! through this module instead.

use core::mem::offset_of;
use tm4c123x_hal::tm4c123x::gpio_porta::RegisterBlock;
use tm4c123x_hal::tm4c123x::{
    GPIO_PORTA, GPIO_PORTB, GPIO_PORTC, GPIO_PORTD, GPIO_PORTE, GPIO_PORTF,
};

use crate::registers::{Mmio, Registers};

/// GPIODATA with every address mask bit set, so all eight pins are visible
pub(crate) const DATA: usize = offset_of!(RegisterBlock, data);
pub(crate) const DIR: usize = offset_of!(RegisterBlock, dir);
pub(crate) const AFSEL: usize = offset_of!(RegisterBlock, afsel);
pub(crate) const PUR: usize = offset_of!(RegisterBlock, pur);
pub(crate) const PDR: usize = offset_of!(RegisterBlock, pdr);
pub(crate) const DEN: usize = offset_of!(RegisterBlock, den);
pub(crate) const LOCK: usize = offset_of!(RegisterBlock, lock);
pub(crate) const CR: usize = offset_of!(RegisterBlock, cr);
pub(crate) const AMSEL: usize = offset_of!(RegisterBlock, amsel);
pub(crate) const PCTL: usize = offset_of!(RegisterBlock, pctl);

/// Value that unlocks GPIOCR for the NMI/JTAG-protected pins (PF0, PD7)
pub const UNLOCK_KEY: u32 = 0x4C4F_434B;

/// APB GPIO ports on the TM4C123GH6PM
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Port {
    /// Register block address of the port's APB aperture
    pub fn base(self) -> usize {
        match self {
            Port::A => GPIO_PORTA::ptr() as usize,
            Port::B => GPIO_PORTB::ptr() as usize,
            Port::C => GPIO_PORTC::ptr() as usize,
            Port::D => GPIO_PORTD::ptr() as usize,
            Port::E => GPIO_PORTE::ptr() as usize,
            Port::F => GPIO_PORTF::ptr() as usize,
        }
    }
}

/// One GPIO port, manipulated a pin mask at a time.
///
/// All operations are read-modify-write on the selected pins only, so several
/// owners can share a port as long as their masks don't overlap.
pub struct GpioPort<R> {
    regs: R,
}

impl GpioPort<Mmio> {
    /// Direct access to an APB port.
    ///
    /// # Safety
    ///
    /// The port's clock must be enabled, and the caller must only touch pins it
    /// owns; the HAL may hold typestate pins on the same port.
    pub unsafe fn steal(port: Port) -> Self {
        GpioPort {
            regs: Mmio::new(port.base()),
        }
    }
}

impl<R: Registers> GpioPort<R> {
    /// Wrap a register block
    pub fn new(regs: R) -> Self {
        GpioPort { regs }
    }

    /// Enable the digital function of the pins
    pub fn enable_digital(&mut self, mask: u8) {
        self.regs.clear_bits(AMSEL, mask as u32);
        self.regs.set_bits(DEN, mask as u32);
    }

    /// Make the pins inputs
    pub fn set_input(&mut self, mask: u8) {
        self.regs.clear_bits(DIR, mask as u32);
    }

    /// Make the pins outputs
    pub fn set_output(&mut self, mask: u8) {
        self.regs.set_bits(DIR, mask as u32);
    }

    /// Hand the pins back to the GPIO block (no alternate function)
    pub fn select_gpio(&mut self, mask: u8) {
        self.regs.clear_bits(AFSEL, mask as u32);
    }

    /// Route the pins to peripheral function `function` (PCTL encoding, 1..=15)
    pub fn select_alternate(&mut self, mask: u8, function: u8) {
        let mut field_mask = 0_u32;
        let mut field_value = 0_u32;
        for pin in 0..8 {
            if mask & (1 << pin) != 0 {
                field_mask |= 0xF << (pin * 4);
                field_value |= ((function & 0xF) as u32) << (pin * 4);
            }
        }
        self.regs.write_field(PCTL, field_mask, field_value);
        self.regs.set_bits(AFSEL, mask as u32);
    }

    /// Disconnect the digital buffer and connect the analog input (ADC pins)
    pub fn select_analog(&mut self, mask: u8) {
        self.regs.clear_bits(DIR, mask as u32);
        self.regs.set_bits(AFSEL, mask as u32);
        self.regs.clear_bits(DEN, mask as u32);
        self.regs.set_bits(AMSEL, mask as u32);
    }

    /// Enable the weak pull-ups on the pins
    pub fn pull_up(&mut self, mask: u8) {
        self.regs.set_bits(PUR, mask as u32);
    }

    /// Disable the weak pull-ups on the pins
    pub fn clear_pull_up(&mut self, mask: u8) {
        self.regs.clear_bits(PUR, mask as u32);
    }

    /// Enable the weak pull-downs on the pins
    pub fn pull_down(&mut self, mask: u8) {
        self.regs.set_bits(PDR, mask as u32);
    }

    /// Current pull-up selection, whole port
    #[cfg(test)]
    pub(crate) fn pull_ups(&self) -> u8 {
        self.regs.read(PUR) as u8
    }

    /// Allow writes to the committed configuration of protected pins
    pub fn unlock(&mut self, mask: u8) {
        self.regs.write(LOCK, UNLOCK_KEY);
        self.regs.set_bits(CR, mask as u32);
    }

    /// Pin levels, whole port
    pub fn read_data(&self) -> u8 {
        self.regs.read(DATA) as u8
    }

    /// Drive the pins in `mask` to the matching bits of `value`
    pub fn write_data(&mut self, mask: u8, value: u8) {
        self.regs.write_field(DATA, mask as u32, value as u32);
    }
}
