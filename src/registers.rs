//! Volatile access to memory-mapped peripheral register blocks
//!
//! Drivers in this crate address their registers by byte offset from the base
//! of the peripheral block, taking the offsets from the PAC's register block
//! layouts. On hardware the block is backed by [`Mmio`]; the unit tests back
//! it with an in-memory register file instead.

use ufmt::derive::uDebug;

/// Poll budget used by drivers that are not given one explicitly.
///
/// At 80 MHz this is on the order of tens of milliseconds of spinning,
/// which is far longer than any conversion or FIFO drain should take.
pub const DEFAULT_POLLS: u32 = 1_000_000;

/// A status bit did not reach the expected state within the poll budget
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub struct Timeout;

/// Word access to one peripheral register block
pub trait Registers {
    /// Read the 32-bit register at `offset`
    fn read(&self, offset: usize) -> u32;

    /// Write the 32-bit register at `offset`
    fn write(&mut self, offset: usize, value: u32);

    /// Read-modify-write
    fn modify<F>(&mut self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(offset);
        self.write(offset, f(value));
    }

    /// Set every bit in `mask`
    fn set_bits(&mut self, offset: usize, mask: u32) {
        self.modify(offset, |v| v | mask);
    }

    /// Clear every bit in `mask`
    fn clear_bits(&mut self, offset: usize, mask: u32) {
        self.modify(offset, |v| v & !mask);
    }

    /// Replace the bits selected by `mask` with the same bits of `value`.
    /// Bits outside `mask` are left as they were.
    fn write_field(&mut self, offset: usize, mask: u32, value: u32) {
        self.modify(offset, |v| (v & !mask) | (value & mask));
    }

    /// Spin until any bit in `mask` reads as set, or give up after `polls` reads.
    ///
    /// Returns the last value read.
    fn wait_set(&self, offset: usize, mask: u32, polls: u32) -> Result<u32, Timeout> {
        for _ in 0..polls {
            let value = self.read(offset);
            if value & mask != 0 {
                return Ok(value);
            }
        }
        Err(Timeout)
    }

    /// Spin until every bit in `mask` reads as clear, or give up after `polls` reads
    fn wait_clear(&self, offset: usize, mask: u32, polls: u32) -> Result<u32, Timeout> {
        for _ in 0..polls {
            let value = self.read(offset);
            if value & mask == 0 {
                return Ok(value);
            }
        }
        Err(Timeout)
    }
}

/// A register block at a fixed physical address
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Address a register block starting at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the start of a peripheral register block, and the caller
    /// is responsible for not creating aliasing drivers for the same block.
    pub const unsafe fn new(base: usize) -> Self {
        Mmio { base }
    }

    /// Address the register block behind a PAC register-block pointer
    ///
    /// # Safety
    ///
    /// Same requirements as [`Mmio::new`].
    pub unsafe fn from_ptr<T>(ptr: *const T) -> Self {
        Mmio { base: ptr as usize }
    }
}

impl Registers for Mmio {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    #[inline(always)]
    fn write(&mut self, offset: usize, value: u32) {
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }
}

impl<T: Registers> Registers for &mut T {
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    fn write(&mut self, offset: usize, value: u32) {
        (**self).write(offset, value)
    }
}
