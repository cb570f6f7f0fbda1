//! Text and number helpers for an ST7735 character display
//!
//! The panel driver itself lives outside this crate; anything that can draw
//! a glyph cell implements [`CharDisplay`] and gets the helpers through
//! [`Lcd`].

use ufmt::derive::uDebug;

/// Left margin used by the line writers
pub const LEFT_MARGIN: i16 = 10;

/// 16-bit panel colour. The ST7735 is wired BGR, so red sits in the low bits.
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub struct Color(pub u16);

#[allow(missing_docs)]
impl Color {
    pub const BLACK: Color = Color(0x0000);
    pub const BLUE: Color = Color(0xF800);
    pub const RED: Color = Color(0x001F);
    pub const GREEN: Color = Color(0x07E0);
    pub const CYAN: Color = Color(0xFFE0);
    pub const MAGENTA: Color = Color(0xF81F);
    pub const YELLOW: Color = Color(0x07FF);
    pub const WHITE: Color = Color(0xFFFF);
}

/// Panel variant selected at init, named after the tab on the protective film
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum InitTab {
    GreenTab = 0,
    RedTab = 1,
    BlackTab = 2,
}

/// Screen orientation in quarter turns
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Rotation {
    R0 = 0,
    R90 = 1,
    R180 = 2,
    R270 = 3,
}

/// Glyph scale
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub enum FontSize {
    /// 5x7 glyphs
    Small = 1,
    /// Double size
    Medium = 2,
    /// Triple size
    Large = 3,
}

impl FontSize {
    /// Scale factor passed to the driver
    pub fn scale(self) -> u8 {
        self as u8
    }

    /// Horizontal distance between successive characters
    pub fn advance(self) -> i16 {
        match self {
            FontSize::Small => 6,
            FontSize::Medium => 13,
            FontSize::Large => 18,
        }
    }
}

/// Primitive operations of the display driver
pub trait CharDisplay {
    /// Driver error
    type Error;

    /// Run the panel's init sequence for `tab`
    fn init(&mut self, tab: InitTab) -> Result<(), Self::Error>;

    /// Paint the whole screen
    fn fill_screen(&mut self, color: Color) -> Result<(), Self::Error>;

    /// Change orientation
    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Self::Error>;

    /// Draw one glyph cell with its top-left corner at (x, y)
    fn draw_char(
        &mut self,
        x: i16,
        y: i16,
        byte: u8,
        fg: Color,
        bg: Color,
        size: FontSize,
    ) -> Result<(), Self::Error>;
}

/// Display helper errors
#[derive(Clone, Copy, Debug, uDebug, Eq, PartialEq)]
pub enum LcdError<E> {
    /// The driver failed
    Display(E),
    /// Number too large for the field
    OutOfRange(u16),
}

/// Hex digit for a nibble, uppercase
pub fn hex_to_char(nibble: u8) -> Option<u8> {
    match nibble {
        0x0..=0x9 => Some(b'0' + nibble),
        0xA..=0xF => Some(b'A' + nibble - 0xA),
        _ => None,
    }
}

/// Character-cell helpers over a display driver
pub struct Lcd<D> {
    display: D,
}

impl<D: CharDisplay> Lcd<D> {
    /// Wrap a driver
    pub fn new(display: D) -> Self {
        Lcd { display }
    }

    /// Hand back the driver
    pub fn free(self) -> D {
        self.display
    }

    /// Init the panel, paint the background and set the orientation.
    /// The panel init takes over a second on an ST7735.
    pub fn init(
        &mut self,
        tab: InitTab,
        background: Color,
        rotation: Rotation,
    ) -> Result<(), LcdError<D::Error>> {
        self.display.init(tab).map_err(LcdError::Display)?;
        self.display
            .fill_screen(background)
            .map_err(LcdError::Display)?;
        self.display
            .set_rotation(rotation)
            .map_err(LcdError::Display)
    }

    fn draw_run<I>(
        &mut self,
        mut x: i16,
        y: i16,
        bytes: I,
        fg: Color,
        bg: Color,
        font: FontSize,
    ) -> Result<(), LcdError<D::Error>>
    where
        I: IntoIterator<Item = u8>,
    {
        for byte in bytes {
            self.display
                .draw_char(x, y, byte, fg, bg, font)
                .map_err(LcdError::Display)?;
            x = x.saturating_add(font.advance());
        }
        Ok(())
    }

    /// Write `msg` on the line at `y`, from the left margin
    pub fn write_text(
        &mut self,
        msg: &str,
        y: i16,
        fg: Color,
        bg: Color,
        font: FontSize,
    ) -> Result<(), LcdError<D::Error>> {
        self.draw_run(LEFT_MARGIN, y, msg.bytes(), fg, bg, font)
    }

    /// Blank `length` character cells of the line at `y`
    pub fn clear_line(&mut self, y: i16, length: usize, font: FontSize) -> Result<(), LcdError<D::Error>> {
        let spaces = core::iter::repeat(b' ').take(length);
        self.draw_run(LEFT_MARGIN, y, spaces, Color::BLACK, Color::BLACK, font)
    }

    /// Zero-padded decimal 00..=99 at (x, y)
    pub fn two_digit(
        &mut self,
        num: u8,
        x: i16,
        y: i16,
        fg: Color,
        bg: Color,
        font: FontSize,
    ) -> Result<(), LcdError<D::Error>> {
        if num > 99 {
            return Err(LcdError::OutOfRange(num as u16));
        }
        let digits = [b'0' + num / 10, b'0' + num % 10];
        self.draw_run(x, y, digits, fg, bg, font)
    }

    /// Three hex digits 000..=FFF at (x, y), most significant first
    pub fn hex12(
        &mut self,
        num: u16,
        x: i16,
        y: i16,
        fg: Color,
        bg: Color,
        font: FontSize,
    ) -> Result<(), LcdError<D::Error>> {
        if num > 0xFFF {
            return Err(LcdError::OutOfRange(num));
        }
        let mut digits = [0_u8; 3];
        for (i, digit) in digits.iter_mut().enumerate() {
            let shift = 8 - 4 * i;
            let nibble = ((num >> shift) & 0xF) as u8;
            *digit = hex_to_char(nibble).unwrap_or(b'?');
        }
        self.draw_run(x, y, digits, fg, bg, font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        Init(InitTab),
        Fill(Color),
        Rotate(Rotation),
        Char(i16, i16, u8, Color, Color, FontSize),
    }

    #[derive(Default)]
    struct RecordingDisplay {
        calls: Vec<Call>,
        fail_after: Option<usize>,
    }

    impl CharDisplay for RecordingDisplay {
        type Error = ();

        fn init(&mut self, tab: InitTab) -> Result<(), ()> {
            self.calls.push(Call::Init(tab));
            Ok(())
        }

        fn fill_screen(&mut self, color: Color) -> Result<(), ()> {
            self.calls.push(Call::Fill(color));
            Ok(())
        }

        fn set_rotation(&mut self, rotation: Rotation) -> Result<(), ()> {
            self.calls.push(Call::Rotate(rotation));
            Ok(())
        }

        fn draw_char(
            &mut self,
            x: i16,
            y: i16,
            byte: u8,
            fg: Color,
            bg: Color,
            size: FontSize,
        ) -> Result<(), ()> {
            if self.fail_after == Some(self.calls.len()) {
                return Err(());
            }
            self.calls.push(Call::Char(x, y, byte, fg, bg, size));
            Ok(())
        }
    }

    fn glyphs(calls: &[Call]) -> Vec<(i16, u8)> {
        calls
            .iter()
            .filter_map(|c| match c {
                Call::Char(x, _, b, _, _, _) => Some((*x, *b)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn hex_digits() {
        assert_eq!(hex_to_char(0), Some(b'0'));
        assert_eq!(hex_to_char(9), Some(b'9'));
        assert_eq!(hex_to_char(0xA), Some(b'A'));
        assert_eq!(hex_to_char(0xF), Some(b'F'));
        assert_eq!(hex_to_char(0x10), None);
    }

    #[test]
    fn init_order() {
        let mut lcd = Lcd::new(RecordingDisplay::default());
        lcd.init(InitTab::BlackTab, Color::BLUE, Rotation::R90).unwrap();
        assert_eq!(
            lcd.free().calls,
            [
                Call::Init(InitTab::BlackTab),
                Call::Fill(Color::BLUE),
                Call::Rotate(Rotation::R90)
            ]
        );
    }

    #[test]
    fn text_advances_per_font_size() {
        let mut lcd = Lcd::new(RecordingDisplay::default());
        lcd.write_text("Hi!", 50, Color::WHITE, Color::BLACK, FontSize::Small)
            .unwrap();
        lcd.write_text("ok", 60, Color::WHITE, Color::BLACK, FontSize::Large)
            .unwrap();
        let calls = lcd.free().calls;
        assert_eq!(
            glyphs(&calls),
            [(10, b'H'), (16, b'i'), (22, b'!'), (10, b'o'), (28, b'k')]
        );
        assert_eq!(
            calls[0],
            Call::Char(10, 50, b'H', Color::WHITE, Color::BLACK, FontSize::Small)
        );
    }

    #[test]
    fn clear_line_blanks_every_cell() {
        let mut lcd = Lcd::new(RecordingDisplay::default());
        lcd.clear_line(100, 4, FontSize::Medium).unwrap();
        let calls = lcd.free().calls;
        assert_eq!(
            glyphs(&calls),
            [(10, b' '), (23, b' '), (36, b' '), (49, b' ')]
        );
        assert!(calls.iter().all(|c| matches!(
            c,
            Call::Char(_, 100, b' ', Color::BLACK, Color::BLACK, FontSize::Medium)
        )));
    }

    #[test]
    fn two_digit_is_zero_padded() {
        let mut lcd = Lcd::new(RecordingDisplay::default());
        lcd.two_digit(7, 40, 5, Color::GREEN, Color::BLACK, FontSize::Small)
            .unwrap();
        lcd.two_digit(0, 40, 5, Color::GREEN, Color::BLACK, FontSize::Small)
            .unwrap();
        lcd.two_digit(99, 40, 5, Color::RED, Color::BLACK, FontSize::Small)
            .unwrap();
        assert_eq!(
            lcd.two_digit(100, 40, 5, Color::RED, Color::BLACK, FontSize::Small),
            Err(LcdError::OutOfRange(100))
        );
        let calls = lcd.free().calls;
        assert_eq!(
            glyphs(&calls),
            [(40, b'0'), (46, b'7'), (40, b'0'), (46, b'0'), (40, b'9'), (46, b'9')]
        );
        // Caller's colour is honoured
        assert_eq!(
            calls[4],
            Call::Char(40, 5, b'9', Color::RED, Color::BLACK, FontSize::Small)
        );
    }

    #[test]
    fn hex12_msb_first() {
        let mut lcd = Lcd::new(RecordingDisplay::default());
        lcd.hex12(0xA3, 10, 20, Color::CYAN, Color::BLACK, FontSize::Medium)
            .unwrap();
        lcd.hex12(0xFFF, 10, 20, Color::CYAN, Color::BLACK, FontSize::Medium)
            .unwrap();
        assert_eq!(
            lcd.hex12(0x1000, 10, 20, Color::CYAN, Color::BLACK, FontSize::Medium),
            Err(LcdError::OutOfRange(0x1000))
        );
        assert_eq!(
            glyphs(&lcd.free().calls),
            [(10, b'0'), (23, b'A'), (36, b'3'), (10, b'F'), (23, b'F'), (36, b'F')]
        );
    }

    #[test]
    fn driver_errors_propagate() {
        let mut lcd = Lcd::new(RecordingDisplay {
            fail_after: Some(1),
            ..RecordingDisplay::default()
        });
        assert_eq!(
            lcd.write_text("abc", 0, Color::WHITE, Color::BLACK, FontSize::Small),
            Err(LcdError::Display(()))
        );
        assert_eq!(lcd.free().calls.len(), 1);
    }

    #[test]
    fn errors_print_over_ufmt() {
        struct Text(String);

        impl ufmt::uWrite for Text {
            type Error = core::convert::Infallible;

            fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
                self.0.push_str(s);
                Ok(())
            }
        }

        let mut out = Text(String::new());
        let display = LcdError::Display(3u8);
        let range = LcdError::<u8>::OutOfRange(120);
        ufmt::uwrite!(out, "{:?} {:?}", display, range).unwrap();
        assert_eq!(out.0, "Display(3) OutOfRange(120)");
    }
}
