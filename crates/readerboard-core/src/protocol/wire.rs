//! Low-level wire encodings shared by the protocol layer.
//!
//! Small integers travel as a single printable byte `'0' + n`
//! (n in 0..=63, so the range runs `'0'..='o'`). Bitmap planes travel
//! as uppercase hex nybble pairs. RS-485 frame bodies are constrained
//! to 7-bit bytes; `escape_485`/`unescape_485` fold full 8-bit data
//! through that channel.

use crate::{Error, Result};

/// Encodes a 6-bit integer as a printable byte. Out-of-range values
/// encode as `'.'`, which no decoder accepts.
pub fn encode_int6(n: u8) -> u8 {
    if n <= 63 {
        b'0' + n
    } else {
        b'.'
    }
}

/// Decodes a 6-bit integer from its printable form.
pub fn decode_int6(byte: u8) -> Result<u8> {
    if (b'0'..=b'o').contains(&byte) {
        Ok(byte - b'0')
    } else {
        Err(Error::MalformedFrame(byte as char))
    }
}

/// Encodes the low nybble as an uppercase hex digit.
pub fn encode_nybble(n: u8) -> u8 {
    match n & 0x0F {
        d @ 0..=9 => b'0' + d,
        d => b'A' + d - 10,
    }
}

/// Decodes one hex digit (either case).
pub fn decode_nybble(byte: u8) -> Result<u8> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        _ => Err(Error::MalformedFrame(byte as char)),
    }
}

/// Appends `byte` as two hex digits.
pub fn push_hex_byte(out: &mut Vec<u8>, byte: u8) {
    out.push(encode_nybble(byte >> 4));
    out.push(encode_nybble(byte));
}

/// Escapes 8-bit data for an RS-485 frame body. The protocol reserves
/// the MSB for frame-start bytes, so `0x7E` marks "set the MSB of the
/// next byte" and `0x7F` marks "next byte is literal".
pub fn escape_485(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for &b in data {
        match b {
            0x7E | 0x7F => {
                out.push(0x7F);
                out.push(b);
            }
            _ if b & 0x80 != 0 => {
                out.push(0x7E);
                out.push(b & 0x7F);
            }
            _ => out.push(b),
        }
    }
    out
}

/// Incremental inverse of [`escape_485`], one byte at a time.
#[derive(Debug, Clone, Copy, Default)]
pub enum EscapeState {
    #[default]
    Normal,
    LiteralNext,
    SetMsbNext,
}

impl EscapeState {
    /// Feeds one received byte; returns the unescaped byte once one is
    /// available.
    pub fn feed(&mut self, byte: u8) -> Option<u8> {
        match *self {
            EscapeState::LiteralNext => {
                *self = EscapeState::Normal;
                Some(byte)
            }
            EscapeState::SetMsbNext => {
                *self = EscapeState::Normal;
                Some(byte | 0x80)
            }
            EscapeState::Normal => match byte {
                0x7F => {
                    *self = EscapeState::LiteralNext;
                    None
                }
                0x7E => {
                    *self = EscapeState::SetMsbNext;
                    None
                }
                _ => Some(byte),
            },
        }
    }
}
