//! Transport receivers: direct USB serial and the shared RS-485 bus.
//!
//! USB bytes feed the command parser directly; the only framing is
//! the 0x04 abort byte, which discards any partial command. On the
//! RS-485 bus every frame opens with an MSB-set byte: `1101aaaa`
//! addresses one unit directly, `1111gggg` opens a global frame for
//! group `g` followed by a count byte and that many 6-bit unit
//! addresses (count zero means every unit). Frame bodies are 7-bit
//! escaped data. Units never reply to global frames, so a shared bus
//! cannot see reply collisions.

use crate::protocol::wire::EscapeState;

/// Aborts any partially received command.
pub const ABORT: u8 = 0x04;

/// What a transport byte turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Nothing for the parser (addressing, escapes, other units).
    None,
    /// A frame addressed to this unit began; drop partial state.
    Start,
    /// One body byte for the command parser.
    Data(u8),
    /// Abort: drop partial state, stay ready.
    Abort,
}

/// Whether the active frame may generate a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyPolicy {
    #[default]
    Allowed,
    Suppressed,
}

/// Direct USB serial receiver.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsbReceiver;

impl UsbReceiver {
    pub fn feed(&mut self, byte: u8) -> Input {
        if byte == ABORT {
            Input::Abort
        } else {
            Input::Data(byte)
        }
    }
}

#[derive(Debug, Clone)]
enum BusState {
    /// Not in a frame addressed to this unit.
    Ignoring,
    /// Global frame header: reading the count and address list.
    Targets { count: Option<u8>, targets: Vec<u8> },
    Active(ReplyPolicy),
}

/// RS-485 bus receiver for one unit.
#[derive(Debug, Clone)]
pub struct BusReceiver {
    state: BusState,
    escape: EscapeState,
}

impl BusReceiver {
    pub fn new() -> Self {
        Self {
            state: BusState::Ignoring,
            escape: EscapeState::default(),
        }
    }

    /// True while an addressed frame that may reply is active.
    pub fn reply_allowed(&self) -> bool {
        matches!(self.state, BusState::Active(ReplyPolicy::Allowed))
    }

    /// Feeds one bus byte. `unit_address` of `None` means RS-485 is
    /// unconfigured and every frame is ignored.
    pub fn feed(&mut self, byte: u8, unit_address: Option<u8>, global_address: u8) -> Input {
        let Some(unit) = unit_address else {
            self.state = BusState::Ignoring;
            return Input::None;
        };

        // An MSB-set byte always starts a new frame, whatever state
        // the previous frame left us in.
        if byte & 0x80 != 0 {
            self.escape = EscapeState::default();
            return match byte & 0xF0 {
                0xD0 => {
                    if byte & 0x0F == unit {
                        self.state = BusState::Active(ReplyPolicy::Allowed);
                        Input::Start
                    } else {
                        self.state = BusState::Ignoring;
                        Input::None
                    }
                }
                0xF0 => {
                    if byte & 0x0F == global_address {
                        self.state = BusState::Targets {
                            count: None,
                            targets: Vec::new(),
                        };
                    } else {
                        self.state = BusState::Ignoring;
                    }
                    Input::None
                }
                _ => {
                    self.state = BusState::Ignoring;
                    Input::None
                }
            };
        }

        match &mut self.state {
            BusState::Ignoring => Input::None,
            BusState::Targets { count, targets } => match *count {
                None => {
                    if byte == 0 {
                        // Broadcast to every unit in the group.
                        self.state = BusState::Active(ReplyPolicy::Suppressed);
                        Input::Start
                    } else {
                        *count = Some(byte);
                        Input::None
                    }
                }
                Some(n) => {
                    targets.push(byte & 0x3F);
                    if targets.len() < n as usize {
                        return Input::None;
                    }
                    if targets.contains(&unit) {
                        self.state = BusState::Active(ReplyPolicy::Suppressed);
                        Input::Start
                    } else {
                        self.state = BusState::Ignoring;
                        Input::None
                    }
                }
            },
            BusState::Active(_) => {
                if byte == ABORT {
                    return Input::Abort;
                }
                match self.escape.feed(byte) {
                    Some(b) => Input::Data(b),
                    None => Input::None,
                }
            }
        }
    }
}

impl Default for BusReceiver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(rx: &mut BusReceiver, bytes: &[u8], unit: Option<u8>, global: u8) -> Vec<u8> {
        let mut data = Vec::new();
        for &b in bytes {
            if let Input::Data(d) = rx.feed(b, unit, global) {
                data.push(d);
            }
        }
        data
    }

    #[test]
    fn test_direct_frame_for_us() {
        let mut rx = BusReceiver::new();
        assert_eq!(rx.feed(0xD7, Some(7), 15), Input::Start);
        assert!(rx.reply_allowed());
        assert_eq!(feed_all(&mut rx, b"C", Some(7), 15), b"C");
    }

    #[test]
    fn test_direct_frame_for_another_unit() {
        let mut rx = BusReceiver::new();
        assert_eq!(rx.feed(0xD3, Some(7), 15), Input::None);
        assert_eq!(feed_all(&mut rx, b"CX%", Some(7), 15), b"");
        assert!(!rx.reply_allowed());
    }

    #[test]
    fn test_broadcast_frame() {
        let mut rx = BusReceiver::new();
        assert_eq!(rx.feed(0xFF, Some(7), 15), Input::None);
        assert_eq!(rx.feed(0x00, Some(7), 15), Input::Start);
        assert!(!rx.reply_allowed());
        assert_eq!(feed_all(&mut rx, b"C", Some(7), 15), b"C");
    }

    #[test]
    fn test_global_frame_with_list() {
        let mut rx = BusReceiver::new();
        // Group 15, two targets: units 3 and 7.
        for &b in &[0xFF, 0x02, 0x03] {
            assert_eq!(rx.feed(b, Some(7), 15), Input::None);
        }
        assert_eq!(rx.feed(0x07, Some(7), 15), Input::Start);
        assert!(!rx.reply_allowed());
        assert_eq!(feed_all(&mut rx, b"X", Some(7), 15), b"X");
    }

    #[test]
    fn test_global_frame_not_listed() {
        let mut rx = BusReceiver::new();
        for &b in &[0xFF, 0x01, 0x03] {
            assert_eq!(rx.feed(b, Some(7), 15), Input::None);
        }
        assert_eq!(feed_all(&mut rx, b"X", Some(7), 15), b"");
    }

    #[test]
    fn test_wrong_global_group() {
        let mut rx = BusReceiver::new();
        assert_eq!(rx.feed(0xF2, Some(7), 15), Input::None);
        assert_eq!(feed_all(&mut rx, &[0x00, b'C'], Some(7), 15), b"");
    }

    #[test]
    fn test_unconfigured_unit_ignores_bus() {
        let mut rx = BusReceiver::new();
        assert_eq!(rx.feed(0xD7, None, 15), Input::None);
        assert_eq!(feed_all(&mut rx, b"C", None, 15), b"");
    }

    #[test]
    fn test_body_unescaping() {
        let mut rx = BusReceiver::new();
        rx.feed(0xD7, Some(7), 15);
        // 0x7E 0x41 folds to 0xC1; 0x7F 0x7E is a literal 0x7E.
        assert_eq!(
            feed_all(&mut rx, &[0x7E, 0x41, 0x7F, 0x7E], Some(7), 15),
            vec![0xC1, 0x7E]
        );
    }

    #[test]
    fn test_new_frame_preempts_active() {
        let mut rx = BusReceiver::new();
        rx.feed(0xD7, Some(7), 15);
        assert_eq!(rx.feed(0xD3, Some(7), 15), Input::None);
        assert_eq!(feed_all(&mut rx, b"C", Some(7), 15), b"");
        assert_eq!(rx.feed(0xD7, Some(7), 15), Input::Start);
    }

    #[test]
    fn test_abort_inside_frame() {
        let mut rx = BusReceiver::new();
        rx.feed(0xD7, Some(7), 15);
        assert_eq!(rx.feed(ABORT, Some(7), 15), Input::Abort);
        // Frame stays active after an abort.
        assert_eq!(feed_all(&mut rx, b"C", Some(7), 15), b"C");
    }

    #[test]
    fn test_usb_receiver() {
        let mut rx = UsbReceiver;
        assert_eq!(rx.feed(b'C'), Input::Data(b'C'));
        assert_eq!(rx.feed(ABORT), Input::Abort);
    }
}
