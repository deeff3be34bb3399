//! Pixel color codes.
//!
//! A color is a 4-bit plane selector: red, green, blue, and a flashing
//! modifier. On the wire a color is a single byte `'0' + code`, so the
//! sixteen codes run `'0'..='9',':',';','<','=','>','?'`.

use crate::{Error, Result};

/// Plane bit for red.
pub const PLANE_RED: u8 = 0x01;
/// Plane bit for green.
pub const PLANE_GREEN: u8 = 0x02;
/// Plane bit for blue.
pub const PLANE_BLUE: u8 = 0x04;
/// Plane bit for the flashing modifier.
pub const PLANE_FLASH: u8 = 0x08;

/// A 4-bit color code (RGB planes plus flashing modifier).
///
/// The flashing bit never stands alone in a painted frame: painting
/// only writes the flash plane where at least one color plane is also
/// written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(u8);

impl Color {
    pub const BLACK: Color = Color(0);
    pub const RED: Color = Color(PLANE_RED);
    pub const GREEN: Color = Color(PLANE_GREEN);
    pub const AMBER: Color = Color(PLANE_RED | PLANE_GREEN);
    pub const BLUE: Color = Color(PLANE_BLUE);
    pub const WHITE: Color = Color(PLANE_RED | PLANE_GREEN | PLANE_BLUE);

    /// Builds a color from a 4-bit code. Values above 15 are rejected.
    pub fn from_code(code: u8) -> Result<Self> {
        if code > 0x0F {
            return Err(Error::InvalidColor(code));
        }
        Ok(Color(code))
    }

    /// Decodes the single-byte wire form (`'0' + code`).
    pub fn from_wire(byte: u8) -> Result<Self> {
        let code = byte.wrapping_sub(b'0');
        if code > 0x0F {
            return Err(Error::InvalidColor(byte));
        }
        Ok(Color(code))
    }

    /// Wire form of this color.
    pub fn wire(&self) -> u8 {
        b'0' + self.0
    }

    /// Raw 4-bit code.
    pub fn code(&self) -> u8 {
        self.0
    }

    /// Color plane bits without the flashing modifier.
    pub fn rgb_bits(&self) -> u8 {
        self.0 & (PLANE_RED | PLANE_GREEN | PLANE_BLUE)
    }

    /// True if the flashing modifier is set.
    pub fn flashing(&self) -> bool {
        self.0 & PLANE_FLASH != 0
    }

    /// True if at least one color plane is lit.
    pub fn visible(&self) -> bool {
        self.rgb_bits() != 0
    }

    /// Adds the flashing modifier.
    pub fn with_flash(self) -> Color {
        Color(self.0 | PLANE_FLASH)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::RED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_roundtrip() {
        for code in 0..=15u8 {
            let c = Color::from_code(code).unwrap();
            assert_eq!(Color::from_wire(c.wire()).unwrap(), c);
        }
        assert!(Color::from_code(16).is_err());
    }

    #[test]
    fn test_wire_bytes() {
        assert_eq!(Color::RED.wire(), b'1');
        assert_eq!(Color::WHITE.wire(), b'7');
        // Flashing white is code 15, wire byte '?'
        assert_eq!(Color::WHITE.with_flash().wire(), b'?');
        assert!(Color::from_wire(b'@').is_err());
    }

    #[test]
    fn test_flash_alone_is_invisible() {
        let flash_only = Color::from_code(PLANE_FLASH).unwrap();
        assert!(flash_only.flashing());
        assert!(!flash_only.visible());
    }
}
