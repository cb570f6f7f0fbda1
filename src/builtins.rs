//! Functions required by rustc/LLVM

use super::board;

#[cfg(debug_assertions)]
use core::panic::PanicInfo;

/// Required by the compiler.
#[no_mangle]
pub extern "C" fn __aeabi_unwind_cpp_pr0() -> () {
    board::safe();
}

/// Required by the compiler.
#[no_mangle]
pub extern "C" fn __aeabi_unwind_cpp_pr1() -> () {
    board::safe();
}

/// Required by modules that haven't been build with panic = "abort"
#[allow(non_snake_case)]
#[no_mangle]
pub extern "C" fn _Unwind_Resume() -> () {
    board::safe();
}

/// Debug builds only; release builds link `panic_never` instead.
/// Reports where the panic happened on UART0, then flashes the red LED.
#[cfg(debug_assertions)]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    use crate::drivers::uart::{NewlineMode, Uart, UartConfig};
    use core::fmt::Write;
    use tm4c123x_hal::sysctl::SysctlExt;

    let peripherals = unsafe { tm4c123x_hal::Peripherals::steal() };
    let sysctl = peripherals.SYSCTL.constrain();
    let config = UartConfig {
        newline: NewlineMode::SwapLFtoCRLF,
        ..UartConfig::default()
    };
    if let Ok(mut uart) = Uart::uart0(peripherals.UART0, &sysctl.power_control, board::clocks(), config) {
        writeln!(uart, "{}", info).unwrap_or_default();
    }

    board::safe();
}
