//! Readerboard Core Library
//!
//! Rendering, transition, and protocol engine for addressable LED
//! readerboard and busylight units. The embedding runtime supplies the
//! transports (USB serial, RS-485) and a periodic timer tick; the core
//! owns everything else: frame buffers, fonts, the transition engine,
//! status LED sequencers, and the command protocol.

pub mod color;
pub mod config;
pub mod device;
pub mod error;
pub mod font;
pub mod frame;
pub mod hardware;
pub mod leds;
pub mod protocol;
pub mod transition;

pub use color::Color;
pub use config::{BaudRate, ConfigStore, DeviceConfig, NullStore};
pub use device::{Annunciator, Device, SilentAnnunciator};
pub use error::{Error, Result};
pub use font::FontLibrary;
pub use frame::{Frame, FrameStore};
pub use hardware::{HardwareSpec, ModelClass, ROWS};
pub use leds::StatusBank;
pub use transition::{TransitionEffect, TransitionEngine};
