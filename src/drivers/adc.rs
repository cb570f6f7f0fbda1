//! Single-sample analog-to-digital conversion on ADC0/ADC1
//!
//! Each [`Adc`] drives one sample sequencer with a one-step sequence: step 0
//! converts the configured channel, raises the sequencer's raw interrupt flag
//! and ends the sequence. [`Adc::read`] polls that flag rather than taking an
//! interrupt. Step 0 can instead be routed to one of the eight digital
//! comparators, which raise a real NVIC interrupt when the sample falls in the
//! programmed band; processor-triggered conversions for the comparator are
//! started with [`Adc::start`].

use core::mem::offset_of;
use modular_bitfield::{prelude::*, BitfieldSpecifier};
use static_assertions::const_assert_eq;
use tm4c123x_hal::sysctl::{control_power, Domain, PowerControl, PowerState, RunMode};
use tm4c123x_hal::tm4c123x::adc0::RegisterBlock;
use tm4c123x_hal::tm4c123x::{Interrupt, ADC0, ADC1};
use ufmt::derive::uDebug;

use super::gpio::{GpioPort, Port};
use super::interrupt::{InterruptController, Priority};
use crate::registers::{Mmio, Registers, Timeout, DEFAULT_POLLS};

const ACTSS: usize = offset_of!(RegisterBlock, actss);
const RIS: usize = offset_of!(RegisterBlock, ris);
const IM: usize = offset_of!(RegisterBlock, im);
const ISC: usize = offset_of!(RegisterBlock, isc);
const EMUX: usize = offset_of!(RegisterBlock, emux);
const SSPRI: usize = offset_of!(RegisterBlock, sspri);
const PSSI: usize = offset_of!(RegisterBlock, pssi);
const DCISC: usize = offset_of!(RegisterBlock, dcisc);
const DCRIC: usize = offset_of!(RegisterBlock, dcric);
const PC: usize = offset_of!(RegisterBlock, pc);

/// Sequencer n's registers repeat at this stride from SS0's
const SEQUENCER_STRIDE: usize =
    offset_of!(RegisterBlock, ssmux1) - offset_of!(RegisterBlock, ssmux0);

const fn ssmux(n: usize) -> usize {
    offset_of!(RegisterBlock, ssmux0) + SEQUENCER_STRIDE * n
}
const fn ssctl(n: usize) -> usize {
    offset_of!(RegisterBlock, ssctl0) + SEQUENCER_STRIDE * n
}
const fn ssfifo(n: usize) -> usize {
    offset_of!(RegisterBlock, ssfifo0) + SEQUENCER_STRIDE * n
}
const fn ssop(n: usize) -> usize {
    offset_of!(RegisterBlock, ssop0) + SEQUENCER_STRIDE * n
}
const fn ssdc(n: usize) -> usize {
    offset_of!(RegisterBlock, ssdc0) + SEQUENCER_STRIDE * n
}
const fn dcctl(k: usize) -> usize {
    offset_of!(RegisterBlock, dcctl0) + 4 * k
}
const fn dccmp(k: usize) -> usize {
    offset_of!(RegisterBlock, dccmp0) + 4 * k
}

/// SS3 highest, SS0 lowest
const SEQUENCER_PRIORITIES: u32 = 0x0123;

/// First-step control bits in ADCSSCTLn
const END0: u32 = 1 << 1;
const IE0: u32 = 1 << 2;
const TS0: u32 = 1 << 3;

/// Step 0 goes to the digital comparator instead of the FIFO
const S0DCOP: u32 = 1 << 0;

/// Conversion results are 12 bits wide
pub const SAMPLE_MASK: u16 = 0xFFF;

/// Which of the two converters
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum AdcModule {
    Adc0,
    Adc1,
}

/// Sample sequencer; SS0 holds eight steps, SS3 one, but only step 0 is used here
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Sequencer {
    Ss0 = 0,
    Ss1 = 1,
    Ss2 = 2,
    Ss3 = 3,
}

impl Sequencer {
    /// Sequencer number, also its bit position in ACTSS/RIS/IM/ISC/PSSI
    pub const fn index(self) -> usize {
        self as usize
    }

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Bit of the comparator interrupt for this sequencer in IM/ISC
    const fn comparator_bit(self) -> u32 {
        1 << (16 + self as u32)
    }
}

/// Maximum conversion rate, written to ADCPC
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum SampleRate {
    _125k = 0x1,
    _250k = 0x3,
    _500k = 0x5,
    _1M = 0x7,
}

/// What starts a conversion, as encoded in the sequencer's ADCEMUX field
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Trigger {
    Processor = 0x0,
    AnalogComparator0 = 0x1,
    AnalogComparator1 = 0x2,
    External = 0x4,
    Timer = 0x5,
    Always = 0xF,
}

impl TryFrom<u8> for Trigger {
    type Error = AdcError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x0 => Ok(Trigger::Processor),
            0x1 => Ok(Trigger::AnalogComparator0),
            0x2 => Ok(Trigger::AnalogComparator1),
            0x4 => Ok(Trigger::External),
            0x5 => Ok(Trigger::Timer),
            0xF => Ok(Trigger::Always),
            other => Err(AdcError::InvalidTrigger(other)),
        }
    }
}

/// Analog input for step 0
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Channel {
    Ain0,
    Ain1,
    Ain2,
    Ain3,
    Ain4,
    Ain5,
    Ain6,
    Ain7,
    Ain8,
    Ain9,
    Ain10,
    Ain11,
    /// Internal temperature sensor (TS0 instead of a mux input)
    Temperature,
}

impl Channel {
    /// ADCSSMUX field value
    pub fn mux(self) -> u32 {
        match self {
            Channel::Temperature => 0,
            other => other as u32,
        }
    }

    /// GPIO port and pin mask carrying this input, if it is a pin
    pub fn pin(self) -> Option<(Port, u8)> {
        use Channel::*;
        match self {
            Ain0 => Some((Port::E, 1 << 3)),
            Ain1 => Some((Port::E, 1 << 2)),
            Ain2 => Some((Port::E, 1 << 1)),
            Ain3 => Some((Port::E, 1 << 0)),
            Ain4 => Some((Port::D, 1 << 3)),
            Ain5 => Some((Port::D, 1 << 2)),
            Ain6 => Some((Port::D, 1 << 1)),
            Ain7 => Some((Port::D, 1 << 0)),
            Ain8 => Some((Port::E, 1 << 5)),
            Ain9 => Some((Port::E, 1 << 4)),
            Ain10 => Some((Port::B, 1 << 4)),
            Ain11 => Some((Port::B, 1 << 5)),
            Temperature => None,
        }
    }
}

impl TryFrom<u8> for Channel {
    type Error = AdcError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        use Channel::*;
        const CHANNELS: [Channel; 12] = [
            Ain0, Ain1, Ain2, Ain3, Ain4, Ain5, Ain6, Ain7, Ain8, Ain9, Ain10, Ain11,
        ];
        CHANNELS
            .get(n as usize)
            .copied()
            .ok_or(AdcError::InvalidChannel(n))
    }
}

/// Converter setup
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub struct AdcConfig {
    /// Conversion rate
    pub sample_rate: SampleRate,
    /// Conversion start source
    pub trigger: Trigger,
    /// Input sampled by step 0
    pub channel: Channel,
    /// Sequencer to dedicate to this input
    pub sequencer: Sequencer,
}

impl AdcConfig {
    /// Processor-triggered 125 ksps on AIN0, on the sequencer each module's
    /// recipe uses (SS3 on ADC0, SS2 on ADC1)
    pub const fn for_module(module: AdcModule) -> Self {
        AdcConfig {
            sample_rate: SampleRate::_125k,
            trigger: Trigger::Processor,
            channel: Channel::Ain0,
            sequencer: match module {
                AdcModule::Adc0 => Sequencer::Ss3,
                AdcModule::Adc1 => Sequencer::Ss2,
            },
        }
    }
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self::for_module(AdcModule::Adc0)
    }
}

/// ADC driver errors
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum AdcError {
    /// Conversion did not complete within the poll budget
    Timeout,
    InvalidTrigger(u8),
    InvalidChannel(u8),
    /// There are eight comparators, 0..=7
    InvalidComparator(u8),
    /// Band limits must be 12-bit with low <= high
    InvalidBand { low: u16, high: u16 },
    /// Step 0 feeds the digital comparator, so nothing reaches the FIFO
    RoutedToComparator,
}

impl From<Timeout> for AdcError {
    fn from(_: Timeout) -> Self {
        AdcError::Timeout
    }
}

/// When the comparator asserts its interrupt, ADCDCCTLn.CIM
#[derive(BitfieldSpecifier, Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[bits = 2]
#[allow(missing_docs)]
pub enum ComparatorMode {
    Always = 0,
    Once = 1,
    HysteresisAlways = 2,
    HysteresisOnce = 3,
}

/// Band the sample must fall in, ADCDCCTLn.CIC
#[derive(BitfieldSpecifier, Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[bits = 2]
pub enum Band {
    /// sample < low
    Low = 0,
    /// low <= sample < high
    Mid = 1,
    /// sample >= high
    High = 3,
}

/// ADCDCCTLn layout
#[bitfield(bits = 32)]
#[derive(Clone, Copy, Eq, PartialEq)]
struct ComparatorControl {
    interrupt_mode: ComparatorMode,
    interrupt_condition: Band,
    interrupt_enable: bool,
    #[skip]
    __: B27,
}

const_assert_eq!(core::mem::size_of::<ComparatorControl>(), 4);

/// Digital comparator setup
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub struct ComparatorConfig {
    /// Comparator unit, 0..=7
    pub comparator: u8,
    /// When to interrupt
    pub mode: ComparatorMode,
    /// Which band to interrupt on
    pub band: Band,
    /// Lower band limit (COMP0)
    pub low: u16,
    /// Upper band limit (COMP1)
    pub high: u16,
}

impl ComparatorConfig {
    fn check(&self) -> Result<(), AdcError> {
        if self.comparator > 7 {
            return Err(AdcError::InvalidComparator(self.comparator));
        }
        if self.low > self.high || self.high > SAMPLE_MASK {
            return Err(AdcError::InvalidBand {
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    fn control_word(&self) -> u32 {
        let ctl = ComparatorControl::new()
            .with_interrupt_mode(self.mode)
            .with_interrupt_condition(self.band)
            .with_interrupt_enable(true);
        u32::from_le_bytes(ctl.into_bytes())
    }

    fn compare_word(&self) -> u32 {
        ((self.high as u32) << 16) | self.low as u32
    }
}

/// ADCRIS register parser
#[bitfield(bits = 32)]
#[derive(Clone, Copy, Eq, PartialEq)]
#[allow(missing_docs)]
struct AdcStatusBitfield {
    pub sequencer_done: B4,
    _reserved0: B4,
    pub comparator: B1,
    _reserved1: B7,
    pub comparator_sequencer: B4,
    _reserved2: B12,
}

/// Display intermediary for ADCRIS
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub struct AdcStatus {
    pub sequencer_done: u8,
    pub comparator: bool,
    pub comparator_sequencer: u8,
}

impl AdcStatus {
    /// Parse register into debuggable format
    pub fn new(reg: u32) -> Self {
        let b = AdcStatusBitfield::from_bytes(reg.to_le_bytes());
        AdcStatus {
            sequencer_done: b.sequencer_done(),
            comparator: b.comparator() != 0,
            comparator_sequencer: b.comparator_sequencer(),
        }
    }
}

/// One sequencer of one converter, sampling a single input
pub struct Adc<R> {
    regs: R,
    module: AdcModule,
    config: AdcConfig,
    comparator: Option<u8>,
    polls: u32,
}

impl Adc<Mmio> {
    /// Power ADC0, put the channel's pin in analog mode and configure
    pub fn adc0(_adc: ADC0, power_control: &PowerControl, config: AdcConfig) -> Self {
        control_power(power_control, Domain::Adc0, RunMode::Run, PowerState::On);
        analog_pin(power_control, config.channel);
        let regs = unsafe { Mmio::from_ptr(ADC0::ptr()) };
        Adc::new(regs, AdcModule::Adc0, config)
    }

    /// Power ADC1, put the channel's pin in analog mode and configure
    pub fn adc1(_adc: ADC1, power_control: &PowerControl, config: AdcConfig) -> Self {
        control_power(power_control, Domain::Adc1, RunMode::Run, PowerState::On);
        analog_pin(power_control, config.channel);
        let regs = unsafe { Mmio::from_ptr(ADC1::ptr()) };
        Adc::new(regs, AdcModule::Adc1, config)
    }
}

fn analog_pin(power_control: &PowerControl, channel: Channel) {
    if let Some((port, mask)) = channel.pin() {
        let domain = match port {
            Port::A => Domain::GpioA,
            Port::B => Domain::GpioB,
            Port::C => Domain::GpioC,
            Port::D => Domain::GpioD,
            Port::E => Domain::GpioE,
            Port::F => Domain::GpioF,
        };
        control_power(power_control, domain, RunMode::Run, PowerState::On);
        // Only the one input pin is touched
        let mut gpio = unsafe { GpioPort::steal(port) };
        gpio.select_analog(mask);
    }
}

impl<R: Registers> Adc<R> {
    /// Take a register block and configure it
    pub fn new(regs: R, module: AdcModule, config: AdcConfig) -> Self {
        let mut adc = Adc {
            regs,
            module,
            config,
            comparator: None,
            polls: DEFAULT_POLLS,
        };
        adc.init(config);
        adc
    }

    /// Change how long `read` spins before giving up
    pub fn set_poll_budget(&mut self, polls: u32) {
        self.polls = polls;
    }

    /// (Re)configure the sequencer. Every field is replaced, so this can be
    /// called again with a different configuration.
    pub fn init(&mut self, config: AdcConfig) {
        let n = config.sequencer.index();
        let bit = config.sequencer.bit();

        // Sample rate and sequencer priorities
        self.regs.write_field(PC, 0xF, config.sample_rate as u32);
        self.regs.write(SSPRI, SEQUENCER_PRIORITIES);

        // Sequencer must be off while it is reprogrammed
        self.regs.clear_bits(ACTSS, bit);

        // Trigger source
        let shift = 4 * n;
        self.regs
            .write_field(EMUX, 0xF << shift, (config.trigger as u32) << shift);

        // Step 0 input, end of sequence, raw interrupt flag on completion
        self.regs.write_field(ssmux(n), 0xF, config.channel.mux());
        let mut step = IE0 | END0;
        if config.channel == Channel::Temperature {
            step |= TS0;
        }
        self.regs.write_field(ssctl(n), 0xF, step);
        self.regs.clear_bits(ssop(n), S0DCOP);

        // Completion is polled, so keep it away from the NVIC
        self.regs.clear_bits(IM, bit);

        self.regs.set_bits(ACTSS, bit);

        self.config = config;
        self.comparator = None;
    }

    /// Converter this drives
    pub fn module(&self) -> AdcModule {
        self.module
    }

    /// Active configuration
    pub fn config(&self) -> AdcConfig {
        self.config
    }

    /// Kick off one conversion on a processor-triggered sequencer. Hardware
    /// triggers start their own conversions, so for them this does nothing.
    ///
    /// With a comparator enabled this is how samples reach it.
    pub fn start(&mut self) {
        if self.config.trigger == Trigger::Processor {
            self.regs.write(PSSI, self.config.sequencer.bit());
        }
    }

    /// Start (if processor-triggered) and wait for one conversion, returning
    /// the 12-bit result
    pub fn read(&mut self) -> Result<u16, AdcError> {
        if self.comparator.is_some() {
            return Err(AdcError::RoutedToComparator);
        }
        let seq = self.config.sequencer;
        self.start();
        self.regs.wait_set(RIS, seq.bit(), self.polls)?;
        let sample = self.regs.read(ssfifo(seq.index())) as u16 & SAMPLE_MASK;
        self.regs.write(ISC, seq.bit());
        Ok(sample)
    }

    /// Snapshot of the raw interrupt status
    pub fn status(&self) -> AdcStatus {
        AdcStatus::new(self.regs.read(RIS))
    }

    /// NVIC line of the sequencer in use
    pub fn irq(&self) -> Interrupt {
        use Sequencer::*;
        match (self.module, self.config.sequencer) {
            (AdcModule::Adc0, Ss0) => Interrupt::ADC0SS0,
            (AdcModule::Adc0, Ss1) => Interrupt::ADC0SS1,
            (AdcModule::Adc0, Ss2) => Interrupt::ADC0SS2,
            (AdcModule::Adc0, Ss3) => Interrupt::ADC0SS3,
            (AdcModule::Adc1, Ss0) => Interrupt::ADC1SS0,
            (AdcModule::Adc1, Ss1) => Interrupt::ADC1SS1,
            (AdcModule::Adc1, Ss2) => Interrupt::ADC1SS2,
            (AdcModule::Adc1, Ss3) => Interrupt::ADC1SS3,
        }
    }

    /// Route step 0 to a digital comparator and interrupt when the sample
    /// lands in `config.band`
    pub fn enable_comparator<C: InterruptController>(
        &mut self,
        config: ComparatorConfig,
        nvic: &mut C,
        priority: Priority,
    ) -> Result<(), AdcError> {
        config.check()?;
        let seq = self.config.sequencer;
        let n = seq.index();
        let k = config.comparator as usize;

        self.regs.clear_bits(ACTSS, seq.bit());

        // Step 0 -> comparator k
        self.regs.set_bits(ssop(n), S0DCOP);
        self.regs.write_field(ssdc(n), 0xF, k as u32);

        self.regs.write(dcctl(k), config.control_word());
        self.regs.write(dccmp(k), config.compare_word());

        // Reset the comparator's interrupt and trigger state
        self.regs.write(DCRIC, (1 << k) | (1 << (16 + k)));
        self.regs.write(DCISC, 1 << k);
        self.regs.write(ISC, seq.comparator_bit());

        self.regs.set_bits(IM, seq.comparator_bit());
        self.regs.set_bits(ACTSS, seq.bit());

        nvic.enable(self.irq(), priority);
        self.comparator = Some(config.comparator);
        Ok(())
    }

    /// Whether comparator `k` has flagged an interrupt
    pub fn comparator_triggered(&self, k: u8) -> bool {
        k < 8 && self.regs.read(DCISC) & (1 << k) != 0
    }

    /// Acknowledge comparator `k` and the sequencer's comparator interrupt
    pub fn clear_comparator(&mut self, k: u8) {
        if k < 8 {
            self.regs.write(DCISC, 1 << k);
        }
        self.regs.write(ISC, self.config.sequencer.comparator_bit());
    }

    /// Send step 0 back to the FIFO and mask the comparator interrupt
    pub fn disable_comparator<C: InterruptController>(&mut self, nvic: &mut C) {
        let seq = self.config.sequencer;
        nvic.disable(self.irq());
        self.regs.clear_bits(ACTSS, seq.bit());
        self.regs.clear_bits(IM, seq.comparator_bit());
        self.regs.clear_bits(ssop(seq.index()), S0DCOP);
        self.regs.set_bits(ACTSS, seq.bit());
        self.comparator = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::interrupt::fake::RecordingNvic;
    use crate::registers::sim::SimRegisters;

    fn with_completion(seq: Sequencer) -> SimRegisters {
        let mut regs = SimRegisters::new();
        regs.react(PSSI, seq.bit(), RIS, seq.bit());
        regs.write_one_to_clear(ISC, RIS);
        regs
    }

    #[test]
    fn adc0_recipe_programs_sequencer_3() {
        let mut regs = SimRegisters::new();
        Adc::new(&mut regs, AdcModule::Adc0, AdcConfig::default());

        assert_eq!(regs.get(PC), 0x1);
        assert_eq!(regs.get(SSPRI), 0x0123);
        assert_eq!(regs.get(EMUX) & 0xF000, 0);
        assert_eq!(regs.get(ssmux(3)) & 0xF, 0);
        assert_eq!(regs.get(ssctl(3)), 0b0110);
        assert_eq!(regs.get(IM) & 0x8, 0);
        assert_eq!(regs.get(ACTSS), 0x8);

        // Disabled before reprogramming, enabled after
        assert_eq!(regs.writes_to(ACTSS), [0x0, 0x8]);
        assert!(regs.last_write(ACTSS) > regs.last_write(ssctl(3)));
        assert!(regs.first_write(ACTSS) < regs.first_write(EMUX));
    }

    #[test]
    fn adc1_recipe_uses_sequencer_2_fields() {
        let mut regs = SimRegisters::new();
        let config = AdcConfig {
            trigger: Trigger::Timer,
            channel: Channel::Ain9,
            sample_rate: SampleRate::_1M,
            ..AdcConfig::for_module(AdcModule::Adc1)
        };
        Adc::new(&mut regs, AdcModule::Adc1, config);

        assert_eq!(regs.get(PC), 0x7);
        assert_eq!(regs.get(EMUX), 0x5 << 8);
        assert_eq!(regs.get(ssmux(2)), 9);
        assert_eq!(regs.get(ssctl(2)), 0b0110);
        assert_eq!(regs.get(ACTSS), 0x4);
    }

    #[test]
    fn reinit_replaces_fields() {
        let mut regs = SimRegisters::new();
        regs.preset(EMUX, 0x0000_0F00);
        let mut adc = Adc::new(
            &mut regs,
            AdcModule::Adc0,
            AdcConfig {
                trigger: Trigger::Always,
                channel: Channel::Ain7,
                ..AdcConfig::default()
            },
        );
        adc.init(AdcConfig {
            trigger: Trigger::External,
            channel: Channel::Ain2,
            ..AdcConfig::default()
        });
        // SS2's field is someone else's and survives
        assert_eq!(regs.get(EMUX), 0x0000_4F00);
        assert_eq!(regs.get(ssmux(3)), 2);
    }

    #[test]
    fn temperature_sensor_sets_ts0() {
        let mut regs = SimRegisters::new();
        Adc::new(
            &mut regs,
            AdcModule::Adc0,
            AdcConfig {
                channel: Channel::Temperature,
                ..AdcConfig::default()
            },
        );
        assert_eq!(regs.get(ssctl(3)), 0b1110);
    }

    #[test]
    fn read_masks_to_12_bits_and_acknowledges() {
        let mut regs = with_completion(Sequencer::Ss3);
        regs.preset(ssfifo(3), 0xF123);
        let mut adc = Adc::new(&mut regs, AdcModule::Adc0, AdcConfig::default());

        assert_eq!(adc.read(), Ok(0x123));
        assert_eq!(regs.writes_to(PSSI), [0x8]);
        assert_eq!(regs.writes_to(ISC), [0x8]);
        assert_eq!(regs.get(RIS), 0);
    }

    #[test]
    fn read_times_out_without_completion() {
        let mut regs = SimRegisters::new();
        let mut adc = Adc::new(&mut regs, AdcModule::Adc0, AdcConfig::default());
        adc.set_poll_budget(10);
        assert_eq!(adc.read(), Err(AdcError::Timeout));
        assert_eq!(regs.reads_of(RIS), 10);
    }

    #[test]
    fn hardware_triggered_read_does_not_touch_pssi() {
        let mut regs = SimRegisters::new();
        regs.queue_reads(RIS, &[0, 0x4]);
        regs.preset(ssfifo(2), 0x0800);
        let mut adc = Adc::new(
            &mut regs,
            AdcModule::Adc1,
            AdcConfig {
                trigger: Trigger::Timer,
                ..AdcConfig::for_module(AdcModule::Adc1)
            },
        );
        assert_eq!(adc.read(), Ok(0x800));
        assert!(regs.writes_to(PSSI).is_empty());
    }

    #[test]
    fn trigger_codes() {
        assert_eq!(Trigger::try_from(0x5), Ok(Trigger::Timer));
        assert_eq!(Trigger::try_from(0xF), Ok(Trigger::Always));
        assert_eq!(Trigger::try_from(0x3), Err(AdcError::InvalidTrigger(3)));
        assert_eq!(Channel::try_from(11), Ok(Channel::Ain11));
        assert_eq!(Channel::try_from(12), Err(AdcError::InvalidChannel(12)));
    }

    #[test]
    fn channel_pins() {
        assert_eq!(Channel::Ain0.pin(), Some((Port::E, 0x08)));
        assert_eq!(Channel::Ain10.pin(), Some((Port::B, 0x10)));
        assert_eq!(Channel::Temperature.pin(), None);
    }

    #[test]
    fn comparator_routes_step_zero_and_unmasks() {
        let mut regs = SimRegisters::new();
        let mut nvic = RecordingNvic::default();
        let mut adc = Adc::new(&mut regs, AdcModule::Adc0, AdcConfig::default());
        let prio = Priority::new(2).unwrap();
        adc.enable_comparator(
            ComparatorConfig {
                comparator: 1,
                mode: ComparatorMode::Once,
                band: Band::High,
                low: 0x100,
                high: 0xC00,
            },
            &mut nvic,
            prio,
        )
        .unwrap();
        assert_eq!(adc.read(), Err(AdcError::RoutedToComparator));

        assert_eq!(regs.get(ssop(3)), 0x1);
        assert_eq!(regs.get(ssdc(3)), 0x1);
        assert_eq!(regs.get(dcctl(1)), 0x1D);
        assert_eq!(regs.get(dccmp(1)), 0x0C00_0100);
        assert_eq!(regs.writes_to(DCRIC), [0x0002_0002]);
        assert_eq!(regs.get(IM), 1 << 19);
        assert_eq!(regs.get(ACTSS), 0x8);
        assert_eq!(nvic.enabled, [(Interrupt::ADC0SS3 as u16, prio)]);
    }

    #[test]
    fn comparator_rejects_bad_band() {
        let mut regs = SimRegisters::new();
        let mut nvic = RecordingNvic::default();
        let mut adc = Adc::new(&mut regs, AdcModule::Adc1, AdcConfig::default());
        let config = ComparatorConfig {
            comparator: 0,
            mode: ComparatorMode::Always,
            band: Band::Mid,
            low: 0x900,
            high: 0x100,
        };
        assert_eq!(
            adc.enable_comparator(config, &mut nvic, Priority::LOWEST),
            Err(AdcError::InvalidBand {
                low: 0x900,
                high: 0x100
            })
        );
        let config = ComparatorConfig {
            comparator: 8,
            ..config
        };
        assert_eq!(
            adc.enable_comparator(config, &mut nvic, Priority::LOWEST),
            Err(AdcError::InvalidComparator(8))
        );
        assert!(nvic.enabled.is_empty());
    }

    #[test]
    fn disabling_comparator_restores_reads() {
        let mut regs = with_completion(Sequencer::Ss3);
        regs.preset(ssfifo(3), 0x42);
        let mut nvic = RecordingNvic::default();
        let mut adc = Adc::new(&mut regs, AdcModule::Adc0, AdcConfig::default());
        let config = ComparatorConfig {
            comparator: 0,
            mode: ComparatorMode::Always,
            band: Band::Low,
            low: 0,
            high: 0x200,
        };
        adc.enable_comparator(config, &mut nvic, Priority::HIGHEST)
            .unwrap();
        adc.disable_comparator(&mut nvic);
        assert_eq!(nvic.disabled, [Interrupt::ADC0SS3 as u16]);
        assert_eq!(adc.read(), Ok(0x42));
    }

    #[test]
    fn status_parses_ris() {
        let status = AdcStatus::new(0x0004_0108);
        assert_eq!(
            status,
            AdcStatus {
                sequencer_done: 0x8,
                comparator: true,
                comparator_sequencer: 0x4,
            }
        );
    }

    #[test]
    fn start_feeds_the_comparator() {
        let mut regs = SimRegisters::new();
        let mut nvic = RecordingNvic::default();
        let mut adc = Adc::new(&mut regs, AdcModule::Adc0, AdcConfig::default());
        let config = ComparatorConfig {
            comparator: 2,
            mode: ComparatorMode::Always,
            band: Band::Mid,
            low: 0x400,
            high: 0x800,
        };
        adc.enable_comparator(config, &mut nvic, Priority::LOWEST)
            .unwrap();
        adc.start();
        adc.start();
        assert_eq!(regs.writes_to(PSSI), [0x8, 0x8]);
    }

    #[test]
    fn start_leaves_hardware_triggers_alone() {
        let mut regs = SimRegisters::new();
        let mut adc = Adc::new(
            &mut regs,
            AdcModule::Adc0,
            AdcConfig {
                trigger: Trigger::Always,
                ..AdcConfig::default()
            },
        );
        adc.start();
        assert!(regs.writes_to(PSSI).is_empty());
    }

    #[test]
    fn offsets_follow_the_datasheet() {
        assert_eq!(PSSI, 0x028);
        assert_eq!(ssfifo(3), 0x0A8);
        assert_eq!(ssdc(2), 0x094);
        assert_eq!(DCRIC, 0xD00);
        assert_eq!(dccmp(7), 0xE5C);
        assert_eq!(PC, 0xFC4);
    }
}
