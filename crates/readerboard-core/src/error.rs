//! Error types for the readerboard core library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding or executing commands.
///
/// Nothing here is fatal: a failed command is dropped (or answered with
/// a short error reply) and the control loop keeps running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Command byte does not select any dispatch table entry.
    #[error("unknown command byte 0x{0:02X}")]
    UnknownCommand(u8),

    /// A command frame could not be parsed.
    #[error("malformed {0} command frame")]
    MalformedFrame(char),

    /// Command frame exceeded the receive buffer.
    #[error("command frame too long (limit {0} bytes)")]
    FrameTooLong(usize),

    /// Column index outside the display matrix.
    #[error("column {0} out of range (width {1})")]
    ColumnOutOfRange(usize, usize),

    /// Font index beyond the compiled font count.
    #[error("font index {0} out of range")]
    FontOutOfRange(u8),

    /// Color code outside the 4-bit plane encoding.
    #[error("invalid color code byte 0x{0:02X}")]
    InvalidColor(u8),

    /// Transition effect byte not in the effect table.
    #[error("invalid transition effect byte 0x{0:02X}")]
    InvalidTransition(u8),

    /// Status LED selector outside the installed LED bank.
    #[error("invalid LED selector byte 0x{0:02X}")]
    InvalidLed(u8),

    /// Baud rate code not in the defined code table.
    #[error("invalid baud rate code byte 0x{0:02X}")]
    InvalidBaudCode(u8),

    /// Unit or global address outside its valid range.
    #[error("invalid device address byte 0x{0:02X}")]
    InvalidAddress(u8),

    /// Command requires a display matrix this model does not have.
    #[error("command '{0}' not supported on this hardware model")]
    Unsupported(char),

    /// Persistent configuration storage failed.
    #[error("configuration storage error: {0}")]
    ConfigStore(String),
}
