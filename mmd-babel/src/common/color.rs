//! Colors as stored in topic attributes (`#RRGGBB`).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#RRGGBB`, `#AARRGGBB` or the short `#RGB` form. A short digit `d` expands to `d0`.
    pub fn parse(text: &str) -> Option<Self> {
        let hex = text.trim().strip_prefix('#').unwrap_or(text.trim());
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let digit = |i: usize| byte(&format!("{}0", &hex[i..i + 1]));
                Some(Self::rgb(digit(0)?, digit(1)?, digit(2)?))
            }
            6 => Some(Self::rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            8 => Some(
                Self::rgb(byte(&hex[2..4])?, byte(&hex[4..6])?, byte(&hex[6..8])?)
                    .with_alpha(byte(&hex[0..2])?),
            ),
            _ => None,
        }
    }

    /// Uppercase `#RRGGBB`, alpha ignored.
    pub fn to_html(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Bitwise inverse, used to pick a readable text color over an imported fill.
    pub fn contrast(self) -> Self {
        Self::rgb(self.r ^ 0xFF, self.g ^ 0xFF, self.b ^ 0xFF)
    }

    pub fn to_svg(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_forms() {
        assert_eq!(Color::parse("#031A31"), Some(Color::rgb(0x03, 0x1A, 0x31)));
        assert_eq!(Color::parse("ff0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#f80"), Some(Color::rgb(0xF0, 0x80, 0x00)));
        assert_eq!(
            Color::parse("#80FF0000"),
            Some(Color::rgb(255, 0, 0).with_alpha(0x80))
        );
        assert_eq!(Color::parse("#zzz"), None);
        assert_eq!(Color::parse("#1234"), None);
    }

    #[test]
    fn html_and_contrast() {
        let c = Color::rgb(0xB1, 0xBF, 0xCC);
        assert_eq!(c.to_html(), "#B1BFCC");
        assert_eq!(c.contrast().to_html(), "#4E4033");
        assert_eq!(c.to_svg(), "rgb(177,191,204)");
    }
}
