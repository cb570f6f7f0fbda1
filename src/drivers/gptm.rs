//! General-purpose timer modules (GPTM) 0 through 5
//!
//! A [`Timer`] drives one half (A or B) of a 16/32-bit timer block in
//! one-shot, periodic, edge-count capture or PWM mode.

use core::mem::offset_of;
use modular_bitfield::prelude::*;
use static_assertions::const_assert_eq;
use tm4c123x_hal::sysctl::{control_power, Domain, PowerControl, PowerState, RunMode};
use tm4c123x_hal::tm4c123x::timer0::RegisterBlock;
use tm4c123x_hal::tm4c123x::{Interrupt, TIMER0, TIMER1, TIMER2, TIMER3, TIMER4, TIMER5};
use ufmt::derive::uDebug;

use super::interrupt::{InterruptController, Priority};
use crate::registers::{Mmio, Registers, Timeout, DEFAULT_POLLS};

const CFG: usize = offset_of!(RegisterBlock, cfg);
const TAMR: usize = offset_of!(RegisterBlock, tamr);
const TBMR: usize = offset_of!(RegisterBlock, tbmr);
const CTL: usize = offset_of!(RegisterBlock, ctl);
const IMR: usize = offset_of!(RegisterBlock, imr);
const RIS: usize = offset_of!(RegisterBlock, ris);
const ICR: usize = offset_of!(RegisterBlock, icr);
const TAILR: usize = offset_of!(RegisterBlock, tailr);
const TBILR: usize = offset_of!(RegisterBlock, tbilr);
const TAMATCHR: usize = offset_of!(RegisterBlock, tamatchr);
const TBMATCHR: usize = offset_of!(RegisterBlock, tbmatchr);
const TAPR: usize = offset_of!(RegisterBlock, tapr);
const TBPR: usize = offset_of!(RegisterBlock, tbpr);
const TAR: usize = offset_of!(RegisterBlock, tar);
const TBR: usize = offset_of!(RegisterBlock, tbr);

/// Largest value a half holds in split 16-bit configuration
pub const MAX_16: u32 = 0xFFFF;

/// Timer block
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum TimerBlock {
    Timer0,
    Timer1,
    Timer2,
    Timer3,
    Timer4,
    Timer5,
}

/// Which counter of the block
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum TimerHalf {
    A,
    B,
}

impl TimerHalf {
    fn mode_reg(self) -> usize {
        match self {
            TimerHalf::A => TAMR,
            TimerHalf::B => TBMR,
        }
    }

    fn load_reg(self) -> usize {
        match self {
            TimerHalf::A => TAILR,
            TimerHalf::B => TBILR,
        }
    }

    fn match_reg(self) -> usize {
        match self {
            TimerHalf::A => TAMATCHR,
            TimerHalf::B => TBMATCHR,
        }
    }

    fn prescale_reg(self) -> usize {
        match self {
            TimerHalf::A => TAPR,
            TimerHalf::B => TBPR,
        }
    }

    fn value_reg(self) -> usize {
        match self {
            TimerHalf::A => TAR,
            TimerHalf::B => TBR,
        }
    }

    /// TnEN in GPTMCTL
    fn enable_bit(self) -> u32 {
        match self {
            TimerHalf::A => 1 << 0,
            TimerHalf::B => 1 << 8,
        }
    }

    /// TnPWML in GPTMCTL
    fn invert_bit(self) -> u32 {
        match self {
            TimerHalf::A => 1 << 6,
            TimerHalf::B => 1 << 14,
        }
    }

    /// TnTORIS / TnTOIM / TnTOCINT
    fn timeout_bit(self) -> u32 {
        match self {
            TimerHalf::A => 1 << 0,
            TimerHalf::B => 1 << 8,
        }
    }
}

/// GPTMCFG
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub enum Width {
    /// Both halves chained into one 32-bit counter, driven through half A
    Concatenated32 = 0x0,
    /// 32-bit real-time clock, half A
    RealTimeClock = 0x1,
    /// Two independent 16-bit counters
    Split16 = 0x4,
}

/// Counting mode
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Mode {
    OneShot,
    Periodic,
    /// Edge-count capture
    Capture,
    PwmOneShot,
    Pwm,
}

impl Mode {
    fn is_pwm(self) -> bool {
        matches!(self, Mode::Pwm | Mode::PwmOneShot)
    }
}

/// Count direction; PWM always counts down
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Direction {
    Up,
    Down,
}

/// PWM output polarity
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Output {
    Normal,
    Inverted,
}

/// Timer setup
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub struct TimerConfig {
    /// Block configuration (shared by both halves)
    pub width: Width,
    /// Counting mode
    pub mode: Mode,
    /// Ignored in PWM modes
    pub direction: Direction,
    /// Ignored outside PWM modes
    pub output: Output,
    /// Clock divider minus one; ignored in PWM modes
    pub prescale: u8,
    /// Reload value
    pub period: u32,
    /// Match value (PWM duty threshold)
    pub match_value: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        TimerConfig {
            width: Width::Split16,
            mode: Mode::Periodic,
            direction: Direction::Down,
            output: Output::Normal,
            prescale: 0,
            period: MAX_16,
            match_value: 0,
        }
    }
}

/// Timer driver errors
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub enum TimerError {
    /// 32-bit and RTC configurations are only reachable through half A
    HalfUnavailable,
    /// Value does not fit a 16-bit half
    ValueTooWide(u32),
    /// No timeout event within the poll budget
    Timeout,
}

impl From<Timeout> for TimerError {
    fn from(_: Timeout) -> Self {
        TimerError::Timeout
    }
}

/// GPTMTnMR layout
#[bitfield(bits = 32)]
#[derive(Clone, Copy, Eq, PartialEq)]
struct ModeRegister {
    /// 1 one-shot, 2 periodic, 3 capture
    mode: B2,
    capture_mode: bool,
    alternate_mode: bool,
    count_up: bool,
    #[skip]
    __: B27,
}

const_assert_eq!(core::mem::size_of::<ModeRegister>(), 4);

fn mode_word(config: &TimerConfig) -> u32 {
    let reg = ModeRegister::new();
    let reg = match config.mode {
        Mode::OneShot => reg.with_mode(0x1),
        Mode::Periodic => reg.with_mode(0x2),
        Mode::Capture => reg.with_mode(0x3),
        Mode::PwmOneShot => reg.with_mode(0x1).with_alternate_mode(true),
        Mode::Pwm => reg.with_mode(0x2).with_alternate_mode(true),
    };
    let reg = reg.with_count_up(!config.mode.is_pwm() && config.direction == Direction::Up);
    u32::from_le_bytes(reg.into_bytes())
}

/// One half of a GPTM block
pub struct Timer<R> {
    regs: R,
    block: TimerBlock,
    half: TimerHalf,
    width: Width,
    polls: u32,
}

macro_rules! hw_timers {
    ($($name:ident, $halves:ident: $TIMER:ident, $domain:ident, $block:ident;)+) => {
        impl Timer<Mmio> {
            $(
                #[doc = concat!("Power ", stringify!($TIMER), " and drive one of its halves")]
                pub fn $name(_timer: $TIMER, power_control: &PowerControl, half: TimerHalf) -> Self {
                    control_power(power_control, Domain::$domain, RunMode::Run, PowerState::On);
                    let regs = unsafe { Mmio::from_ptr($TIMER::ptr()) };
                    Timer::new(regs, TimerBlock::$block, half)
                }

                #[doc = concat!("Power ", stringify!($TIMER), " and drive both halves independently")]
                ///
                /// Only split 16-bit configurations can be used on half B. The
                /// halves share GPTMCFG and GPTMCTL, so they must not be
                /// reconfigured from different interrupt priorities.
                pub fn $halves(_timer: $TIMER, power_control: &PowerControl) -> (Self, Self) {
                    control_power(power_control, Domain::$domain, RunMode::Run, PowerState::On);
                    let (a, b) = unsafe { (Mmio::from_ptr($TIMER::ptr()), Mmio::from_ptr($TIMER::ptr())) };
                    Timer::pair(a, b, TimerBlock::$block)
                }
            )+
        }
    };
}

hw_timers! {
    timer0, timer0_halves: TIMER0, Timer0, Timer0;
    timer1, timer1_halves: TIMER1, Timer1, Timer1;
    timer2, timer2_halves: TIMER2, Timer2, Timer2;
    timer3, timer3_halves: TIMER3, Timer3, Timer3;
    timer4, timer4_halves: TIMER4, Timer4, Timer4;
    timer5, timer5_halves: TIMER5, Timer5, Timer5;
}

impl<R: Registers> Timer<R> {
    /// Wrap a timer block's registers; nothing is written until `init`
    pub fn new(regs: R, block: TimerBlock, half: TimerHalf) -> Self {
        Timer {
            regs,
            block,
            half,
            width: Width::Split16,
            polls: DEFAULT_POLLS,
        }
    }

    /// Half A and half B of one block, each over its own handle to the
    /// block's registers
    pub fn pair(a: R, b: R, block: TimerBlock) -> (Self, Self) {
        (
            Timer::new(a, block, TimerHalf::A),
            Timer::new(b, block, TimerHalf::B),
        )
    }

    /// Change how long `wait_timeout` spins by default
    pub fn set_poll_budget(&mut self, polls: u32) {
        self.polls = polls;
    }

    /// Check that `value` fits the counter this half drives
    fn check_value(&self, width: Width, value: u32) -> Result<(), TimerError> {
        if width == Width::Split16 && value > MAX_16 {
            Err(TimerError::ValueTooWide(value))
        } else {
            Ok(())
        }
    }

    /// Configure and start the counter
    pub fn init(&mut self, config: TimerConfig) -> Result<(), TimerError> {
        if config.width != Width::Split16 && self.half == TimerHalf::B {
            return Err(TimerError::HalfUnavailable);
        }
        self.check_value(config.width, config.period)?;
        self.check_value(config.width, config.match_value)?;

        let half = self.half;

        // Stop this half while it is reprogrammed
        self.disable();

        self.regs.write_field(CFG, 0x7, config.width as u32);
        self.regs.write(half.mode_reg(), mode_word(&config));

        // PWM uses the prescaler as an extension of the load value
        let prescale = if config.mode.is_pwm() {
            0
        } else {
            config.prescale as u32
        };
        self.regs.write(half.prescale_reg(), prescale);

        self.regs.write(half.load_reg(), config.period);
        self.regs.write(half.match_reg(), config.match_value);

        match config.output {
            Output::Normal => self.regs.clear_bits(CTL, half.invert_bit()),
            Output::Inverted => self.regs.set_bits(CTL, half.invert_bit()),
        }

        self.width = config.width;
        self.enable();
        Ok(())
    }

    /// Start counting
    pub fn enable(&mut self) {
        self.regs.set_bits(CTL, self.half.enable_bit());
    }

    /// Stop counting
    pub fn disable(&mut self) {
        self.regs.clear_bits(CTL, self.half.enable_bit());
    }

    /// Change the match value (PWM duty) while running
    pub fn set_match(&mut self, value: u32) -> Result<(), TimerError> {
        self.check_value(self.width, value)?;
        self.regs.write(self.half.match_reg(), value);
        Ok(())
    }

    /// Current count
    pub fn value(&self) -> u32 {
        self.regs.read(self.half.value_reg())
    }

    /// Whether the counter has reached its timeout event since the last clear
    pub fn timed_out(&self) -> bool {
        self.regs.read(RIS) & self.half.timeout_bit() != 0
    }

    /// Acknowledge the timeout event
    pub fn clear_timeout(&mut self) {
        self.regs.write(ICR, self.half.timeout_bit());
    }

    /// Spin until the next timeout event, then acknowledge it
    pub fn wait_timeout(&mut self) -> Result<(), TimerError> {
        self.regs
            .wait_set(RIS, self.half.timeout_bit(), self.polls)?;
        self.clear_timeout();
        Ok(())
    }

    /// NVIC line of this half
    pub fn irq(&self) -> Interrupt {
        use TimerBlock::*;
        use TimerHalf::*;
        match (self.block, self.half) {
            (Timer0, A) => Interrupt::TIMER0A,
            (Timer0, B) => Interrupt::TIMER0B,
            (Timer1, A) => Interrupt::TIMER1A,
            (Timer1, B) => Interrupt::TIMER1B,
            (Timer2, A) => Interrupt::TIMER2A,
            (Timer2, B) => Interrupt::TIMER2B,
            (Timer3, A) => Interrupt::TIMER3A,
            (Timer3, B) => Interrupt::TIMER3B,
            (Timer4, A) => Interrupt::TIMER4A,
            (Timer4, B) => Interrupt::TIMER4B,
            (Timer5, A) => Interrupt::TIMER5A,
            (Timer5, B) => Interrupt::TIMER5B,
        }
    }

    /// Interrupt on every timeout event
    pub fn enable_timeout_interrupt<C: InterruptController>(
        &mut self,
        nvic: &mut C,
        priority: Priority,
    ) {
        self.clear_timeout();
        self.regs.set_bits(IMR, self.half.timeout_bit());
        nvic.enable(self.irq(), priority);
    }
}
