//! Persistent device settings and the storage seam.
//!
//! Settings travel on the wire in the `=` command and the `Q` status
//! reply, and persist through a [`ConfigStore`] implementation
//! supplied by the embedding runtime.

use crate::protocol::wire::{decode_int6, encode_int6};
use crate::{Error, Result};

/// Serial speeds carried as single-byte codes on the wire.
///
/// The code table is fixed; an unknown code is rejected without
/// touching the current setting.
const BAUD_TABLE: [(u8, u32); 13] = [
    (b'0', 300),
    (b'1', 600),
    (b'2', 1200),
    (b'3', 2400),
    (b'4', 4800),
    (b'5', 9600),
    (b'6', 14400),
    (b'7', 19200),
    (b'8', 28800),
    (b'9', 31250),
    (b'A', 38400),
    (b'B', 57600),
    (b'C', 115200),
];

/// A validated serial speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BaudRate(u32);

impl BaudRate {
    pub fn from_code(code: u8) -> Result<Self> {
        BAUD_TABLE
            .iter()
            .find(|&&(c, _)| c == code)
            .map(|&(_, rate)| BaudRate(rate))
            .ok_or(Error::InvalidBaudCode(code))
    }

    pub fn from_rate(rate: u32) -> Result<Self> {
        BAUD_TABLE
            .iter()
            .find(|&&(_, r)| r == rate)
            .map(|&(_, rate)| BaudRate(rate))
            .ok_or(Error::InvalidBaudCode(0))
    }

    /// Wire code for this speed.
    pub fn code(&self) -> u8 {
        // Constructed only from the table, so the lookup cannot miss.
        BAUD_TABLE
            .iter()
            .find(|&&(_, r)| r == self.0)
            .map(|&(c, _)| c)
            .unwrap_or(b'5')
    }

    pub fn rate(&self) -> u32 {
        self.0
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        BaudRate(9600)
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = Error;

    fn try_from(rate: u32) -> Result<Self> {
        BaudRate::from_rate(rate)
    }
}

impl From<BaudRate> for u32 {
    fn from(b: BaudRate) -> u32 {
        b.0
    }
}

fn default_global_address() -> u8 {
    15
}

fn default_dimmers() -> Vec<u8> {
    vec![255; 8]
}

fn default_serial_number() -> String {
    String::new()
}

/// Factory color assignment of the status LED positions, as 4-bit
/// color codes: red, amber, green, blue, magenta, cyan, white, and
/// flashing red.
fn default_led_colors() -> Vec<u8> {
    vec![1, 3, 2, 4, 5, 6, 7, 9]
}

/// Operator-adjustable unit settings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceConfig {
    /// RS-485 unit address, 0..=63. `None` disables RS-485 reception.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_address: Option<u8>,
    /// Global (broadcast group) address, 0..=15.
    #[serde(default = "default_global_address")]
    pub global_address: u8,
    /// USB serial speed.
    #[serde(default)]
    pub usb_speed: BaudRate,
    /// RS-485 serial speed.
    #[serde(default)]
    pub rs485_speed: BaudRate,
    /// Per-LED dimmer levels, 0..=255.
    #[serde(default = "default_dimmers")]
    pub dimmers: Vec<u8>,
    /// Color code installed at each status LED position.
    #[serde(default = "default_led_colors")]
    pub led_colors: Vec<u8>,
    /// Factory serial number, reported in the version stamp.
    #[serde(default = "default_serial_number")]
    pub serial_number: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            unit_address: None,
            global_address: default_global_address(),
            usb_speed: BaudRate::default(),
            rs485_speed: BaudRate::default(),
            dimmers: default_dimmers(),
            led_colors: default_led_colors(),
            serial_number: default_serial_number(),
        }
    }
}

impl DeviceConfig {
    /// Wire byte for the unit address (`'.'` when RS-485 is disabled).
    pub fn unit_address_byte(&self) -> u8 {
        match self.unit_address {
            Some(a) => encode_int6(a),
            None => b'.',
        }
    }

    /// Decodes and validates an address byte from the `=` command.
    pub fn parse_unit_address(byte: u8) -> Result<Option<u8>> {
        if byte == b'.' {
            return Ok(None);
        }
        let addr = decode_int6(byte).map_err(|_| Error::InvalidAddress(byte))?;
        Ok(Some(addr))
    }

    /// Validates a global address (0..=15).
    pub fn parse_global_address(byte: u8) -> Result<u8> {
        let addr = decode_int6(byte).map_err(|_| Error::InvalidAddress(byte))?;
        if addr > 15 {
            return Err(Error::InvalidAddress(byte));
        }
        Ok(addr)
    }
}

/// Persistence seam for [`DeviceConfig`]. The embedding runtime
/// provides the real store; units without storage use [`NullStore`].
pub trait ConfigStore: Send {
    /// Loads the saved settings, if any exist.
    fn load(&mut self) -> Result<Option<DeviceConfig>>;
    /// Saves the settings.
    fn save(&mut self, config: &DeviceConfig) -> Result<()>;
}

/// Store for units without persistent settings memory.
#[derive(Debug, Default)]
pub struct NullStore;

impl ConfigStore for NullStore {
    fn load(&mut self) -> Result<Option<DeviceConfig>> {
        Ok(None)
    }

    fn save(&mut self, _config: &DeviceConfig) -> Result<()> {
        Err(Error::ConfigStore("no settings storage installed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baud_codes() {
        assert_eq!(BaudRate::from_code(b'5').unwrap().rate(), 9600);
        assert_eq!(BaudRate::from_code(b'C').unwrap().rate(), 115200);
        assert_eq!(BaudRate::from_rate(31250).unwrap().code(), b'9');
        assert!(BaudRate::from_code(b'Z').is_err());
        assert!(BaudRate::from_rate(4000000).is_err());
    }

    #[test]
    fn test_invalid_code_leaves_setting_alone() {
        let config = DeviceConfig::default();
        assert!(BaudRate::from_code(b'Z').is_err());
        assert_eq!(config.usb_speed.rate(), 9600);
    }

    #[test]
    fn test_address_bytes() {
        let mut config = DeviceConfig::default();
        assert_eq!(config.unit_address_byte(), b'.');
        config.unit_address = Some(7);
        assert_eq!(config.unit_address_byte(), b'7');

        assert_eq!(DeviceConfig::parse_unit_address(b'.').unwrap(), None);
        assert_eq!(DeviceConfig::parse_unit_address(b'7').unwrap(), Some(7));
        assert_eq!(DeviceConfig::parse_unit_address(b'o').unwrap(), Some(63));
        assert!(DeviceConfig::parse_unit_address(b'p').is_err());

        assert_eq!(DeviceConfig::parse_global_address(b'?').unwrap(), 15);
        assert!(DeviceConfig::parse_global_address(b'@').is_err());
    }

    #[test]
    fn test_null_store() {
        let mut store = NullStore;
        assert_eq!(store.load().unwrap(), None);
        assert!(store.save(&DeviceConfig::default()).is_err());
    }
}
