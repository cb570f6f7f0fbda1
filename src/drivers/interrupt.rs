//! NVIC priorities and enabling for the peripherals in this crate
//!
//! Interrupt lines are the PAC's [`Interrupt`] numbers.

use cortex_m::peripheral::NVIC;
use tm4c123x_hal::tm4c123x::Interrupt;
use ufmt::derive::uDebug;

/// Number of priority bits implemented by the TM4C123 NVIC
pub const PRIORITY_BITS: u8 = 3;

/// Interrupt priority level, 0 (most urgent) to 7
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq, PartialOrd, Ord)]
pub struct Priority(u8);

impl Priority {
    /// Most urgent configurable level
    pub const HIGHEST: Priority = Priority(0);
    /// Least urgent level
    pub const LOWEST: Priority = Priority((1 << PRIORITY_BITS) - 1);

    /// Priority level in 0..=7, or `None` if out of range
    pub const fn new(level: u8) -> Option<Priority> {
        if level < (1 << PRIORITY_BITS) {
            Some(Priority(level))
        } else {
            None
        }
    }

    /// The level this was built from
    pub const fn level(self) -> u8 {
        self.0
    }

    /// Value of this priority's byte lane in the NVIC PRIn registers.
    /// Only the top three bits are implemented.
    pub const fn to_nvic_byte(self) -> u8 {
        self.0 << (8 - PRIORITY_BITS)
    }
}

/// Enables device interrupts at a priority
pub trait InterruptController {
    /// Set the priority of `irq`, then unmask it
    fn enable(&mut self, irq: Interrupt, priority: Priority);

    /// Mask `irq`
    fn disable(&mut self, irq: Interrupt);
}

impl InterruptController for NVIC {
    fn enable(&mut self, irq: Interrupt, priority: Priority) {
        unsafe {
            self.set_priority(irq, priority.to_nvic_byte());
            NVIC::unmask(irq);
        }
    }

    fn disable(&mut self, irq: Interrupt) {
        NVIC::mask(irq);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_five_on_gpio_port_f_lands_in_pri7() {
        // PRI7 holds IRQs 28..=31; IRQ 30 is the third byte lane
        let irq = Interrupt::GPIOF;
        let prio = Priority::new(5).unwrap();
        let lane = (irq as u32) % 4;
        let pri7 = (prio.to_nvic_byte() as u32) << (lane * 8);
        assert_eq!((irq as u32) / 4, 7);
        assert_eq!(pri7, 0x00A0_0000);
    }

    #[test]
    fn pac_numbers_match_the_vector_table() {
        assert_eq!(Interrupt::GPIOF as u16, 30);
        assert_eq!(Interrupt::ADC1SS2 as u16, 50);
        assert_eq!(Interrupt::TIMER5B as u16, 93);
    }

    #[test]
    fn priority_range() {
        assert_eq!(Priority::new(7), Some(Priority::LOWEST));
        assert_eq!(Priority::new(8), None);
        assert_eq!(Priority::HIGHEST.to_nvic_byte(), 0);
        assert_eq!(Priority::LOWEST.to_nvic_byte(), 0xE0);
    }
}
