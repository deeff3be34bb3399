//! Hardware model capability description.
//!
//! The original firmware selected the matrix size, color depth, and
//! status LED bank at compile time per hardware model. Here a single
//! capability value is resolved once at startup and the rest of the
//! core consults it.

use crate::{Error, Result};
use std::str::FromStr;

/// Number of pixel rows in the matrix; one byte per column per plane.
pub const ROWS: usize = 8;

/// Device model class, as reported in the full status reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ModelClass {
    /// Status LEDs only, no matrix.
    Busylight,
    /// Monochrome matrix: one on/off plane plus a flash plane.
    Monochrome,
    /// Full RGB matrix plus a flash plane.
    #[default]
    Rgb,
}

impl ModelClass {
    /// Class letter used in the `Q` status reply.
    pub fn class_byte(&self) -> u8 {
        match self {
            ModelClass::Busylight => b'B',
            ModelClass::Monochrome => b'M',
            ModelClass::Rgb => b'C',
        }
    }

    /// Number of bit planes per column (0 when there is no matrix).
    pub fn depth(&self) -> usize {
        match self {
            ModelClass::Busylight => 0,
            ModelClass::Monochrome => 2,
            ModelClass::Rgb => 4,
        }
    }
}

impl FromStr for ModelClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "busylight" => Ok(ModelClass::Busylight),
            "monochrome" | "mono" => Ok(ModelClass::Monochrome),
            "rgb" | "color" => Ok(ModelClass::Rgb),
            _ => Err(Error::ConfigStore(format!("unknown model class {s:?}"))),
        }
    }
}

impl std::fmt::Display for ModelClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelClass::Busylight => write!(f, "busylight"),
            ModelClass::Monochrome => write!(f, "monochrome"),
            ModelClass::Rgb => write!(f, "rgb"),
        }
    }
}

/// Resolved hardware capabilities for one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HardwareSpec {
    /// Model class (matrix type, if any).
    pub model: ModelClass,
    /// Matrix width in columns (0 for busylight models).
    pub columns: usize,
    /// Number of discrete status LEDs installed.
    pub status_leds: usize,
    /// Unit has persistent settings storage.
    pub has_storage: bool,
    /// Unit has a speaker for tone sequences.
    pub has_sound: bool,
}

impl HardwareSpec {
    /// Standard 64x8 RGB readerboard with 8 status LEDs.
    pub fn rgb_64x8() -> Self {
        Self {
            model: ModelClass::Rgb,
            columns: 64,
            status_leds: 8,
            has_storage: true,
            has_sound: false,
        }
    }

    /// Monochrome 64x8 readerboard.
    pub fn mono_64x8() -> Self {
        Self {
            model: ModelClass::Monochrome,
            columns: 64,
            status_leds: 8,
            has_storage: true,
            has_sound: false,
        }
    }

    /// Matrix-less busylight with 7 status LEDs.
    pub fn busylight() -> Self {
        Self {
            model: ModelClass::Busylight,
            columns: 0,
            status_leds: 7,
            has_storage: true,
            has_sound: false,
        }
    }

    /// True when the unit carries a display matrix.
    pub fn has_matrix(&self) -> bool {
        self.model.depth() > 0 && self.columns > 0
    }

    /// Bit planes per column for this model.
    pub fn depth(&self) -> usize {
        self.model.depth()
    }
}

impl Default for HardwareSpec {
    fn default() -> Self {
        Self::rgb_64x8()
    }
}
