//! The Launchpad's RGB LED (PF1 red, PF2 blue, PF3 green)

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use ufmt::derive::uDebug;

/// One die of the RGB LED
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum LedColor {
    Red,
    Green,
    Blue,
}

/// Flash timing
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub struct LedConfig {
    /// On time, and the off time that follows it
    pub flash_ms: u32,
}

impl Default for LedConfig {
    fn default() -> Self {
        LedConfig { flash_ms: 250 }
    }
}

/// Three LED pins that share an error type
pub struct RgbLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    config: LedConfig,
}

impl<R, G, B, E> RgbLed<R, G, B>
where
    R: OutputPin<Error = E>,
    G: OutputPin<Error = E>,
    B: OutputPin<Error = E>,
{
    /// Take the pins; the LED state is left as it is
    pub fn new(red: R, green: G, blue: B, config: LedConfig) -> Self {
        RgbLed {
            red,
            green,
            blue,
            config,
        }
    }

    /// Give the pins back
    pub fn free(self) -> (R, G, B) {
        (self.red, self.green, self.blue)
    }

    /// Change the flash duration
    pub fn set_config(&mut self, config: LedConfig) {
        self.config = config;
    }

    /// Turn one colour on and leave it on
    pub fn stay_on(&mut self, color: LedColor) -> Result<(), E> {
        match color {
            LedColor::Red => self.red.set_high(),
            LedColor::Green => self.green.set_high(),
            LedColor::Blue => self.blue.set_high(),
        }
    }

    /// Turn one colour off
    pub fn turn_off(&mut self, color: LedColor) -> Result<(), E> {
        match color {
            LedColor::Red => self.red.set_low(),
            LedColor::Green => self.green.set_low(),
            LedColor::Blue => self.blue.set_low(),
        }
    }

    /// All three on
    pub fn white(&mut self) -> Result<(), E> {
        self.red.set_high()?;
        self.green.set_high()?;
        self.blue.set_high()
    }

    /// All three off
    pub fn all_off(&mut self) -> Result<(), E> {
        self.red.set_low()?;
        self.green.set_low()?;
        self.blue.set_low()
    }

    /// On for the flash time, then off for the flash time
    pub fn flash<D: DelayMs<u32>>(&mut self, color: LedColor, delay: &mut D) -> Result<(), E> {
        self.stay_on(color)?;
        delay.delay_ms(self.config.flash_ms);
        self.turn_off(color)?;
        delay.delay_ms(self.config.flash_ms);
        Ok(())
    }

    /// Flash red, then green, then blue
    pub fn flash_rgb<D: DelayMs<u32>>(&mut self, delay: &mut D) -> Result<(), E> {
        self.flash(LedColor::Red, delay)?;
        self.flash(LedColor::Green, delay)?;
        self.flash(LedColor::Blue, delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, PartialEq)]
    enum Event {
        Pin(LedColor, bool),
        Wait(u32),
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct FakePin {
        color: LedColor,
        log: Log,
    }

    impl OutputPin for FakePin {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push(Event::Pin(self.color, false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push(Event::Pin(self.color, true));
            Ok(())
        }
    }

    struct FakeDelay(Log);

    impl DelayMs<u32> for FakeDelay {
        fn delay_ms(&mut self, ms: u32) {
            self.0.borrow_mut().push(Event::Wait(ms));
        }
    }

    fn led(config: LedConfig) -> (RgbLed<FakePin, FakePin, FakePin>, FakeDelay, Log) {
        let log: Log = Rc::default();
        let pin = |color| FakePin {
            color,
            log: log.clone(),
        };
        let led = RgbLed::new(pin(LedColor::Red), pin(LedColor::Green), pin(LedColor::Blue), config);
        (led, FakeDelay(log.clone()), log)
    }

    #[test]
    fn flash_is_on_wait_off_wait() {
        let (mut led, mut delay, log) = led(LedConfig::default());
        led.flash(LedColor::Green, &mut delay).unwrap();
        assert_eq!(
            *log.borrow(),
            [
                Event::Pin(LedColor::Green, true),
                Event::Wait(250),
                Event::Pin(LedColor::Green, false),
                Event::Wait(250),
            ]
        );
    }

    #[test]
    fn flash_rgb_order() {
        let (mut led, mut delay, log) = led(LedConfig { flash_ms: 10 });
        led.flash_rgb(&mut delay).unwrap();
        let lit: Vec<LedColor> = log
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Pin(c, true) => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(lit, [LedColor::Red, LedColor::Green, LedColor::Blue]);
        assert_eq!(log.borrow().len(), 12);
    }

    #[test]
    fn white_and_all_off() {
        let (mut led, _delay, log) = led(LedConfig::default());
        led.white().unwrap();
        led.all_off().unwrap();
        led.stay_on(LedColor::Red).unwrap();
        assert_eq!(
            *log.borrow(),
            [
                Event::Pin(LedColor::Red, true),
                Event::Pin(LedColor::Green, true),
                Event::Pin(LedColor::Blue, true),
                Event::Pin(LedColor::Red, false),
                Event::Pin(LedColor::Green, false),
                Event::Pin(LedColor::Blue, false),
                Event::Pin(LedColor::Red, true),
            ]
        );
    }
}
