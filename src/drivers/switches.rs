//! SW1 (PF4) and SW2 (PF0) with GPIO port F interrupts
//!
//! Both switches pull their pin to ground, so they are pull-up inputs and read
//! low while pressed. PF0 is an NMI pin and comes out of reset locked; the
//! board unlocks it before handing it over.

use embedded_hal::digital::v2::InputPin;
use tm4c123x_hal::gpio::gpiof::{PF0, PF4};
use tm4c123x_hal::gpio::{Input, InterruptMode, PullUp};
use tm4c123x_hal::tm4c123x::Interrupt;
use ufmt::derive::uDebug;

use super::interrupt::{InterruptController, Priority};

/// Priority the combined switch setup uses
pub const DEFAULT_PRIORITY: Priority = match Priority::new(5) {
    Some(p) => p,
    None => Priority::LOWEST,
};

/// Which switch
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub enum Switch {
    /// PF4
    Sw1,
    /// PF0
    Sw2,
}

/// Edge or level detection (GPIOIS)
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Sense {
    Edge,
    Level,
}

/// Falling edge / low level or rising edge / high level (GPIOIEV)
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Event {
    Falling,
    Rising,
}

/// When a switch raises its interrupt
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub struct SwitchTrigger {
    /// Edge or level
    pub sense: Sense,
    /// Both edges (GPIOIBE); only meaningful for edge sense
    pub both_edges: bool,
    /// Which edge or level
    pub event: Event,
}

impl SwitchTrigger {
    /// Interrupt on press
    pub const PRESS: SwitchTrigger = SwitchTrigger {
        sense: Sense::Edge,
        both_edges: false,
        event: Event::Falling,
    };

    /// HAL interrupt mode for this trigger
    pub fn mode(self) -> InterruptMode {
        match (self.sense, self.both_edges, self.event) {
            (Sense::Edge, true, _) => InterruptMode::EdgeBoth,
            (Sense::Edge, false, Event::Falling) => InterruptMode::EdgeFalling,
            (Sense::Edge, false, Event::Rising) => InterruptMode::EdgeRising,
            (Sense::Level, _, Event::Falling) => InterruptMode::LevelLow,
            (Sense::Level, _, Event::Rising) => InterruptMode::LevelHigh,
        }
    }
}

impl Default for SwitchTrigger {
    fn default() -> Self {
        SwitchTrigger::PRESS
    }
}

/// An interrupt-capable switch input
pub trait SwitchPin {
    /// Configure (and unmask) the pin interrupt, or mask it with `Disabled`
    fn set_sense(&mut self, mode: InterruptMode);

    /// Clear the pin's interrupt flag
    fn clear_flag(&self);

    /// Whether the pin's interrupt flag is set
    fn flag(&self) -> bool;

    /// Whether the switch is held down
    fn pressed(&self) -> bool;
}

macro_rules! switch_pin {
    ($($PXi:ident),+) => {
        $(
            impl SwitchPin for $PXi<Input<PullUp>> {
                fn set_sense(&mut self, mode: InterruptMode) {
                    self.set_interrupt_mode(mode);
                }

                fn clear_flag(&self) {
                    self.clear_interrupt();
                }

                fn flag(&self) -> bool {
                    self.get_interrupt_status()
                }

                fn pressed(&self) -> bool {
                    self.is_low().unwrap_or(false)
                }
            }
        )+
    };
}

switch_pin!(PF0, PF4);

/// The two Launchpad switches
pub struct Switches<S1, S2> {
    sw1: S1,
    sw2: S2,
}

impl<S1: SwitchPin, S2: SwitchPin> Switches<S1, S2> {
    /// Take both switch pins, already configured as pull-up inputs
    pub fn new(sw1: S1, sw2: S2) -> Self {
        Switches { sw1, sw2 }
    }

    /// Give the pins back
    pub fn free(self) -> (S1, S2) {
        (self.sw1, self.sw2)
    }

    fn pin(&self, switch: Switch) -> &dyn SwitchPin {
        match switch {
            Switch::Sw1 => &self.sw1,
            Switch::Sw2 => &self.sw2,
        }
    }

    fn pin_mut(&mut self, switch: Switch) -> &mut dyn SwitchPin {
        match switch {
            Switch::Sw1 => &mut self.sw1,
            Switch::Sw2 => &mut self.sw2,
        }
    }

    /// Mask the pin, clear its stale flag, configure and unmask it, then set
    /// the port F priority and enable it in the NVIC
    pub fn arm<C: InterruptController>(
        &mut self,
        switch: Switch,
        trigger: SwitchTrigger,
        priority: Priority,
        nvic: &mut C,
    ) {
        let pin = self.pin_mut(switch);
        pin.set_sense(InterruptMode::Disabled);
        pin.clear_flag();
        pin.set_sense(trigger.mode());
        nvic.enable(Interrupt::GPIOF, priority);
    }

    /// Both switches on press (falling edge) at priority 5
    pub fn arm_both<C: InterruptController>(&mut self, nvic: &mut C) {
        self.arm(Switch::Sw1, SwitchTrigger::PRESS, DEFAULT_PRIORITY, nvic);
        self.arm(Switch::Sw2, SwitchTrigger::PRESS, DEFAULT_PRIORITY, nvic);
    }

    /// Mask the switch's interrupt and drop any pending flag. The port
    /// stays enabled in the NVIC for the other switch.
    pub fn disarm(&mut self, switch: Switch) {
        let pin = self.pin_mut(switch);
        pin.set_sense(InterruptMode::Disabled);
        pin.clear_flag();
    }

    /// Whether the switch is held down now
    pub fn is_pressed(&self, switch: Switch) -> bool {
        self.pin(switch).pressed()
    }

    /// Whether the switch has an interrupt flagged
    pub fn pending(&self, switch: Switch) -> bool {
        self.pin(switch).flag()
    }

    /// Acknowledge the switch's interrupt
    pub fn clear(&mut self, switch: Switch) {
        self.pin(switch).clear_flag();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::interrupt::fake::RecordingNvic;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Debug, PartialEq)]
    enum Op {
        Sense(&'static str),
        Clear,
    }

    fn name(mode: InterruptMode) -> &'static str {
        match mode {
            InterruptMode::EdgeRising => "edge-rising",
            InterruptMode::EdgeFalling => "edge-falling",
            InterruptMode::EdgeBoth => "edge-both",
            InterruptMode::LevelHigh => "level-high",
            InterruptMode::LevelLow => "level-low",
            InterruptMode::Disabled => "disabled",
        }
    }

    #[derive(Default)]
    struct FakeSwitch {
        ops: Rc<RefCell<Vec<Op>>>,
        flagged: Cell<bool>,
        down: bool,
    }

    impl SwitchPin for FakeSwitch {
        fn set_sense(&mut self, mode: InterruptMode) {
            self.ops.borrow_mut().push(Op::Sense(name(mode)));
        }

        fn clear_flag(&self) {
            self.flagged.set(false);
            self.ops.borrow_mut().push(Op::Clear);
        }

        fn flag(&self) -> bool {
            self.flagged.get()
        }

        fn pressed(&self) -> bool {
            self.down
        }
    }

    fn trigger(sense: Sense, both_edges: bool, event: Event) -> &'static str {
        name(
            SwitchTrigger {
                sense,
                both_edges,
                event,
            }
            .mode(),
        )
    }

    #[test]
    fn trigger_to_interrupt_mode() {
        use Event::*;
        use Sense::*;
        assert_eq!(trigger(Edge, false, Falling), "edge-falling");
        assert_eq!(trigger(Edge, false, Rising), "edge-rising");
        assert_eq!(trigger(Edge, true, Falling), "edge-both");
        assert_eq!(trigger(Edge, true, Rising), "edge-both");
        assert_eq!(trigger(Level, false, Falling), "level-low");
        assert_eq!(trigger(Level, true, Rising), "level-high");
    }

    #[test]
    fn arm_masks_clears_then_configures() {
        let sw1 = FakeSwitch::default();
        let ops = sw1.ops.clone();
        let mut switches = Switches::new(sw1, FakeSwitch::default());
        let mut nvic = RecordingNvic::default();
        let trigger = SwitchTrigger {
            sense: Sense::Edge,
            both_edges: true,
            event: Event::Rising,
        };
        switches.arm(Switch::Sw1, trigger, Priority::new(2).unwrap(), &mut nvic);

        assert_eq!(
            *ops.borrow(),
            [Op::Sense("disabled"), Op::Clear, Op::Sense("edge-both")]
        );
        assert_eq!(
            nvic.enabled,
            [(Interrupt::GPIOF as u16, Priority::new(2).unwrap())]
        );
    }

    #[test]
    fn arm_both_uses_falling_edge_at_priority_five() {
        let sw1 = FakeSwitch::default();
        let sw2 = FakeSwitch::default();
        let (ops1, ops2) = (sw1.ops.clone(), sw2.ops.clone());
        let mut switches = Switches::new(sw1, sw2);
        let mut nvic = RecordingNvic::default();
        switches.arm_both(&mut nvic);

        for ops in [ops1, ops2] {
            assert_eq!(ops.borrow().last(), Some(&Op::Sense("edge-falling")));
        }
        assert_eq!(DEFAULT_PRIORITY.level(), 5);
        assert!(nvic
            .enabled
            .iter()
            .all(|e| *e == (Interrupt::GPIOF as u16, DEFAULT_PRIORITY)));
    }

    #[test]
    fn pending_clear_and_pressed() {
        let sw2 = FakeSwitch {
            down: true,
            ..FakeSwitch::default()
        };
        sw2.flagged.set(true);
        let mut switches = Switches::new(FakeSwitch::default(), sw2);

        assert!(switches.is_pressed(Switch::Sw2));
        assert!(!switches.is_pressed(Switch::Sw1));
        assert!(switches.pending(Switch::Sw2));
        switches.clear(Switch::Sw2);
        assert!(!switches.pending(Switch::Sw2));
    }

    #[test]
    fn disarm_masks_and_clears() {
        let sw1 = FakeSwitch::default();
        let ops = sw1.ops.clone();
        let mut switches = Switches::new(sw1, FakeSwitch::default());
        switches.disarm(Switch::Sw1);
        assert_eq!(*ops.borrow(), [Op::Sense("disabled"), Op::Clear]);
    }
}
