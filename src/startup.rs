//! Handles board-specific CPU startup

use cortex_m;
use cortex_m_rt::{entry, exception, ExceptionFrame};

use super::board::{clocks, safe, Board};
use crate::drivers::uart::{NewlineMode, Uart, UartConfig};
use tm4c123x_hal::sysctl::SysctlExt;

use irq::{handler, scope, scoped_interrupts};

#[cfg(debug_assertions)]
use core::fmt::Write;

// This function must be implemented by the application that uses the crate
// and is the entry-point for that application after board initialization
extern "Rust" {
    fn stellaris_main(board: Board);
}

/// Performs what you might otherwise call 'C Startup'.
/// This routine is specified at the reset vector in the ISR vector table.
///
/// Copies global .data init from flash to SRAM and then
/// zeros the bss segment.
#[entry]
unsafe fn call_main() -> ! {
    // Initialize runtime-defined exception handlers before running any
    // application code or doing anything that might trigger them
    handler!(systick_default_handler = || {});
    handler!(pendsv_default_handler = || {});
    handler!(svcall_default_handler = || {});

    scope(|default| {
        default.register(Interrupt::SysTick, systick_default_handler);
        default.register(Interrupt::PendSV, pendsv_default_handler);
        default.register(Interrupt::SVCall, svcall_default_handler);

        let board = Board::new();
        stellaris_main(board);
    });

    loop {
        cortex_m::asm::wfi();
    }
}

/// A HardFault is an exception that occurs because of an error during
/// exception processing, or because an exception cannot be managed by any
/// other exception mechanism. HardFaults have a fixed priority of -1, meaning
/// they have higher priority than any exception with configurable priority.
///
/// The stacked frame is reported on UART0 (the debug USB serial port) in
/// debug builds before falling into `safe`.
#[exception]
unsafe fn HardFault(_sf: &ExceptionFrame) -> ! {
    let peripherals = tm4c123x_hal::Peripherals::steal();
    let sysctl = peripherals.SYSCTL.constrain();
    let config = UartConfig {
        newline: NewlineMode::SwapLFtoCRLF,
        ..UartConfig::default()
    };
    let _uart = Uart::uart0(peripherals.UART0, &sysctl.power_control, clocks(), config);

    // Debug formatter can panic, so this can't be run with panic_never
    #[cfg(debug_assertions)]
    if let Ok(mut uart) = _uart {
        writeln!(uart, "SF: {:?}", _sf).unwrap_or_default();
    }

    safe();
}

/// A Non Maskable Interrupt (NMI) can be signalled by a peripheral or
/// triggered by software. This is the highest priority exception other than
/// reset. It is permanently enabled and has a fixed priority of -2.
#[exception]
unsafe fn NonMaskableInt() {
    safe();
}

/// A MemManage fault is an exception that occurs because of a memory
/// protection related fault, including instruction fetches from Execute
/// Never (XN) regions.
#[exception]
fn MemoryManagement() {
    safe();
}

/// A BusFault is an exception that occurs because of a memory related fault
/// for an instruction or data memory transaction.
#[exception]
fn BusFault() {
    safe();
}

/// A UsageFault is an exception that occurs because of a fault related to
/// instruction execution: an undefined instruction, an illegal unaligned
/// access, invalid state on instruction execution or an error on exception
/// return. Division by zero also lands here when the core is configured to
/// report it.
#[exception]
fn UsageFault() {
    safe();
}

/// Debug monitor interrupt handler.
#[exception]
fn DebugMonitor() {
    // Nothing
}

/// A place-holder ISR used when we have nothing better to use.
#[exception]
unsafe fn DefaultHandler(_irq_number: i16) -> () {
    // Nothing
}

scoped_interrupts! {
    /// Exception interrupts that can be overridden by the user at runtime
    ///
    /// A SysTick exception is an exception the system timer generates when it
    /// reaches zero. A supervisor call (SVC) is triggered by the SVC
    /// instruction. PendSV is an interrupt-driven request for system-level
    /// service.
    #[allow(missing_docs)]
    pub enum Interrupt {
        SysTick,
        SVCall,
        PendSV
    }

    use #[exception];
}

/// Device interrupts raised by the drivers in this crate
///
/// Handlers are registered with `irq::scope` the same way as the exceptions
/// above, using `device::Interrupt` as the key.
pub mod device {
    use irq::scoped_interrupts;
    use tm4c123x_hal::tm4c123x::interrupt;

    scoped_interrupts! {
        /// Switches on port F, the default ADC sequencers, and the timers
        /// and UART the demos drive
        #[allow(missing_docs)]
        pub enum Interrupt {
            GPIOF,
            ADC0SS3,
            ADC1SS2,
            TIMER0A,
            TIMER0B,
            TIMER1A,
            UART1
        }

        use #[interrupt];
    }
}
