//! Typed commands and the incremental command parser.
//!
//! The parser consumes one byte at a time as the transport delivers
//! it, holding partial state between calls; a complete command is
//! returned as a fully validated [`Command`] value, so the dispatcher
//! never mutates device state from a malformed request. Any parse
//! error resets the parser to its idle state, resynchronizing on the
//! next command byte.

use crate::color::Color;
use crate::config::{BaudRate, DeviceConfig};
use crate::leds::Timing;
use crate::protocol::wire::{decode_int6, decode_nybble};
use crate::transition::TransitionEffect;
use crate::{Error, Result};

/// Text terminator byte.
pub const ETX: u8 = 0x1B;

/// Longest accepted text or list payload; anything longer aborts the
/// command.
const MAX_PAYLOAD: usize = 1024;

/// Text placement within the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Start at the current cursor position.
    #[default]
    None,
    Left,
    Right,
    Center,
    /// Right-align within the remaining space after the cursor.
    LocalRight,
    /// Center within the remaining space, rounding left.
    LocalCenterLeft,
    /// Center within the remaining space, rounding right.
    LocalCenterRight,
}

impl Alignment {
    pub fn from_wire(byte: u8) -> Result<Self> {
        Ok(match byte {
            b'.' => Alignment::None,
            b'<' => Alignment::Left,
            b'>' => Alignment::Right,
            b'^' => Alignment::Center,
            b'R' => Alignment::LocalRight,
            b'L' => Alignment::LocalCenterLeft,
            b'C' => Alignment::LocalCenterRight,
            _ => return Err(Error::MalformedFrame(byte as char)),
        })
    }
}

/// Target of a dimmer setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimTarget {
    All,
    One(u8),
}

/// One histogram data point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphSpec {
    /// Bar height, 0..=8 lit rows.
    Value(u8),
    /// Per-row bar colors, bottom row first.
    Colors([Color; 8]),
}

/// A complete, validated device command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `C`: clear the display matrix.
    Clear,
    /// `A<digit>`: select the drawing font.
    SelectFont(u8),
    /// `K<color>`: select the drawing color.
    SetColor(Color),
    /// `@<pos>`: move the text cursor (`None` leaves it in place).
    MoveCursor(Option<u8>),
    /// `T<merge><align><trans><text>ESC`: draw a text message.
    Text {
        merge: bool,
        align: Alignment,
        transition: TransitionEffect,
        text: Vec<u8>,
    },
    /// `I<merge><pos><trans><planes>`: draw a bitmap image, one
    /// `$`-terminated hex plane per color plane of the model.
    Bitmap {
        merge: bool,
        column: Option<u8>,
        transition: TransitionEffect,
        planes: Vec<Vec<u8>>,
    },
    /// `<<loop><text>ESC`: scroll a text message across the display.
    Scroll { repeat: bool, text: Vec<u8> },
    /// `H<value>` or `HK<colors>`: plot a histogram data point.
    Graph(GraphSpec),
    /// `D<led><hh>`: set a dimmer level.
    Dim { target: DimTarget, level: u8 },
    /// `S<led>`: light exactly one status LED (`_` for none).
    Light(Option<u8>),
    /// `L<leds>$`: light a set of status LEDs.
    Lights(Vec<u8>),
    /// `F[/<timing>]<leds>$`: run the flasher over a light sequence.
    Flash {
        sequence: Vec<u8>,
        timing: Option<Timing>,
    },
    /// `*<leds>$`: run the strober over a light sequence.
    Strobe(Vec<u8>),
    /// `X`: all status LEDs off, sequencers stopped.
    AllOff,
    /// `%`: run the power-on test pattern.
    Test,
    /// `?`: report the status LED state.
    QueryLeds,
    /// `Q`: report the full device status.
    QueryStatus,
    /// `=<addr><uspd><rspd><glb>`: reconfigure addressing and speeds.
    Configure {
        unit_address: Option<u8>,
        usb_speed: BaudRate,
        rs485_speed: BaudRate,
        global_address: u8,
    },
    /// `=*=`: redisplay the power-on banners.
    RedisplayBanners,
    /// `=&D=`: save the current settings to persistent storage.
    SaveSettings,
    /// `M<led><text>ESC`: send a message in Morse code on an LED.
    Morse { led: Option<u8>, text: Vec<u8> },
    /// `B<loop><notes>ESC`: play a tone sequence.
    Sound { repeat: bool, notes: Vec<u8> },
}

#[derive(Debug, Clone)]
enum ParseState {
    Idle,
    /// Collecting a fixed number of argument bytes.
    Fixed { cmd: u8, need: usize, buf: Vec<u8> },
    /// Collecting ESC-terminated text after a fixed header.
    EscText {
        cmd: u8,
        header: Vec<u8>,
        buf: Vec<u8>,
    },
    /// Collecting a `$`-terminated LED list.
    List { cmd: u8, buf: Vec<u8> },
    /// `F/`: four timing bytes before the LED list.
    FlashTiming { buf: Vec<u8> },
    /// `F` list with timing already read.
    FlashList { timing: Timing, buf: Vec<u8> },
    /// `H` dispatch byte.
    GraphArg,
    /// `HK`: eight bar color bytes.
    GraphColors { buf: Vec<u8> },
    /// `I` header: merge, position, transition.
    BitmapHeader { buf: Vec<u8> },
    /// `I` hex planes, one `$`-terminated run per plane.
    BitmapPlanes {
        merge: bool,
        column: Option<u8>,
        transition: TransitionEffect,
        planes: Vec<Vec<u8>>,
        cur: Vec<u8>,
    },
    /// `=` argument bytes; the first byte selects the form.
    Settings { buf: Vec<u8> },
}

/// Byte-at-a-time command parser for one serial stream.
#[derive(Debug, Clone)]
pub struct CommandParser {
    state: ParseState,
    /// Bitmap planes the model expects (0 disables `I`).
    depth: usize,
}

impl CommandParser {
    pub fn new(depth: usize) -> Self {
        Self {
            state: ParseState::Idle,
            depth,
        }
    }

    /// Discards any partial command.
    pub fn reset(&mut self) {
        self.state = ParseState::Idle;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ParseState::Idle)
    }

    /// Feeds one byte. Returns a command once one is complete; a parse
    /// error discards the partial command and resynchronizes.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Command>> {
        match self.step(byte) {
            Ok(next) => Ok(next),
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    fn step(&mut self, byte: u8) -> Result<Option<Command>> {
        let state = std::mem::replace(&mut self.state, ParseState::Idle);
        match state {
            ParseState::Idle => self.begin(byte),
            ParseState::Fixed { cmd, need, mut buf } => {
                buf.push(byte);
                if buf.len() < need {
                    self.state = ParseState::Fixed { cmd, need, buf };
                    Ok(None)
                } else {
                    self.finish_fixed(cmd, buf)
                }
            }
            ParseState::EscText {
                cmd,
                header,
                mut buf,
            } => {
                if byte == ETX {
                    return finish_text(cmd, header, buf).map(Some);
                }
                push_capped(&mut buf, byte)?;
                self.state = ParseState::EscText { cmd, header, buf };
                Ok(None)
            }
            ParseState::List { cmd, mut buf } => {
                if byte == b'$' {
                    let leds = decode_led_list(&buf)?;
                    return Ok(Some(match cmd {
                        b'L' => Command::Lights(leds),
                        b'F' => Command::Flash {
                            sequence: leds,
                            timing: None,
                        },
                        _ => Command::Strobe(leds),
                    }));
                }
                if cmd == b'F' && buf.is_empty() && byte == b'/' {
                    self.state = ParseState::FlashTiming { buf: Vec::new() };
                    return Ok(None);
                }
                push_capped(&mut buf, byte)?;
                self.state = ParseState::List { cmd, buf };
                Ok(None)
            }
            ParseState::FlashTiming { mut buf } => {
                buf.push(decode_int6(byte)?);
                if buf.len() == 4 {
                    self.state = ParseState::FlashList {
                        timing: Timing {
                            up: buf[0],
                            on: buf[1],
                            down: buf[2],
                            off: buf[3],
                        },
                        buf: Vec::new(),
                    };
                } else {
                    self.state = ParseState::FlashTiming { buf };
                }
                Ok(None)
            }
            ParseState::FlashList { timing, mut buf } => {
                if byte == b'$' {
                    return Ok(Some(Command::Flash {
                        sequence: decode_led_list(&buf)?,
                        timing: Some(timing),
                    }));
                }
                push_capped(&mut buf, byte)?;
                self.state = ParseState::FlashList { timing, buf };
                Ok(None)
            }
            ParseState::GraphArg => match byte {
                b'K' => {
                    self.state = ParseState::GraphColors { buf: Vec::new() };
                    Ok(None)
                }
                b'0'..=b'8' => Ok(Some(Command::Graph(GraphSpec::Value(byte - b'0')))),
                _ => Err(Error::MalformedFrame(byte as char)),
            },
            ParseState::GraphColors { mut buf } => {
                buf.push(byte);
                if buf.len() < 8 {
                    self.state = ParseState::GraphColors { buf };
                    return Ok(None);
                }
                let mut colors = [Color::BLACK; 8];
                for (slot, &b) in colors.iter_mut().zip(&buf) {
                    *slot = Color::from_wire(b)?;
                }
                Ok(Some(Command::Graph(GraphSpec::Colors(colors))))
            }
            ParseState::BitmapHeader { mut buf } => {
                buf.push(byte);
                if buf.len() < 3 {
                    self.state = ParseState::BitmapHeader { buf };
                    return Ok(None);
                }
                self.state = ParseState::BitmapPlanes {
                    merge: parse_merge(buf[0])?,
                    column: parse_position(buf[1])?,
                    transition: TransitionEffect::from_wire(buf[2])?,
                    planes: Vec::new(),
                    cur: Vec::new(),
                };
                Ok(None)
            }
            ParseState::BitmapPlanes {
                merge,
                column,
                transition,
                mut planes,
                mut cur,
            } => {
                if byte == b'$' {
                    planes.push(decode_hex_plane(&cur)?);
                    if planes.len() == self.depth {
                        return Ok(Some(Command::Bitmap {
                            merge,
                            column,
                            transition,
                            planes,
                        }));
                    }
                    cur = Vec::new();
                } else {
                    push_capped(&mut cur, byte)?;
                }
                self.state = ParseState::BitmapPlanes {
                    merge,
                    column,
                    transition,
                    planes,
                    cur,
                };
                Ok(None)
            }
            ParseState::Settings { mut buf } => {
                buf.push(byte);
                match buf[0] {
                    b'*' => {
                        if buf.len() < 2 {
                            self.state = ParseState::Settings { buf };
                            Ok(None)
                        } else if buf[1] == b'=' {
                            Ok(Some(Command::RedisplayBanners))
                        } else {
                            Err(Error::MalformedFrame(buf[1] as char))
                        }
                    }
                    b'&' => {
                        if buf.len() < 3 {
                            self.state = ParseState::Settings { buf };
                            Ok(None)
                        } else if buf[1] == b'D' && buf[2] == b'=' {
                            Ok(Some(Command::SaveSettings))
                        } else {
                            Err(Error::MalformedFrame(buf[1] as char))
                        }
                    }
                    _ => {
                        if buf.len() < 4 {
                            self.state = ParseState::Settings { buf };
                            return Ok(None);
                        }
                        Ok(Some(Command::Configure {
                            unit_address: DeviceConfig::parse_unit_address(buf[0])?,
                            usb_speed: BaudRate::from_code(buf[1])?,
                            rs485_speed: BaudRate::from_code(buf[2])?,
                            global_address: DeviceConfig::parse_global_address(buf[3])?,
                        }))
                    }
                }
            }
        }
    }

    /// Handles a command byte in the idle state.
    fn begin(&mut self, byte: u8) -> Result<Option<Command>> {
        match byte {
            // Stream padding between commands.
            b'\r' | b'\n' | 0xFF => Ok(None),
            b'C' => Ok(Some(Command::Clear)),
            b'X' => Ok(Some(Command::AllOff)),
            b'%' => Ok(Some(Command::Test)),
            b'?' => Ok(Some(Command::QueryLeds)),
            b'Q' => Ok(Some(Command::QueryStatus)),
            b'A' | b'K' | b'@' | b'S' => {
                self.state = ParseState::Fixed {
                    cmd: byte,
                    need: 1,
                    buf: Vec::new(),
                };
                Ok(None)
            }
            b'D' => {
                self.state = ParseState::Fixed {
                    cmd: byte,
                    need: 3,
                    buf: Vec::new(),
                };
                Ok(None)
            }
            b'T' => {
                self.state = ParseState::Fixed {
                    cmd: byte,
                    need: 3,
                    buf: Vec::new(),
                };
                Ok(None)
            }
            b'<' | b'M' | b'B' => {
                self.state = ParseState::Fixed {
                    cmd: byte,
                    need: 1,
                    buf: Vec::new(),
                };
                Ok(None)
            }
            b'L' | b'F' | b'*' => {
                self.state = ParseState::List {
                    cmd: byte,
                    buf: Vec::new(),
                };
                Ok(None)
            }
            b'H' => {
                self.state = ParseState::GraphArg;
                Ok(None)
            }
            b'I' => {
                if self.depth == 0 {
                    return Err(Error::Unsupported('I'));
                }
                self.state = ParseState::BitmapHeader { buf: Vec::new() };
                Ok(None)
            }
            b'=' => {
                self.state = ParseState::Settings { buf: Vec::new() };
                Ok(None)
            }
            _ => Err(Error::UnknownCommand(byte)),
        }
    }

    /// Completes a fixed-argument command, or rolls into text
    /// collection for the commands that end in an ESC-terminated
    /// string.
    fn finish_fixed(&mut self, cmd: u8, buf: Vec<u8>) -> Result<Option<Command>> {
        match cmd {
            b'A' => {
                let b = buf[0];
                if !b.is_ascii_digit() {
                    return Err(Error::FontOutOfRange(b));
                }
                Ok(Some(Command::SelectFont(b - b'0')))
            }
            b'K' => Ok(Some(Command::SetColor(Color::from_wire(buf[0])?))),
            b'@' => Ok(Some(Command::MoveCursor(parse_position(buf[0])?))),
            b'S' => Ok(Some(Command::Light(parse_led(buf[0])?))),
            b'D' => {
                let target = match buf[0] {
                    b'*' | b'_' => DimTarget::All,
                    led => DimTarget::One(decode_int6(led)?),
                };
                let level = (decode_nybble(buf[1])? << 4) | decode_nybble(buf[2])?;
                Ok(Some(Command::Dim { target, level }))
            }
            // Header complete; the text follows.
            b'T' | b'<' | b'M' | b'B' => {
                self.state = ParseState::EscText {
                    cmd,
                    header: buf,
                    buf: Vec::new(),
                };
                Ok(None)
            }
            _ => Err(Error::UnknownCommand(cmd)),
        }
    }
}

fn push_capped(buf: &mut Vec<u8>, byte: u8) -> Result<()> {
    if buf.len() >= MAX_PAYLOAD {
        return Err(Error::FrameTooLong(buf.len()));
    }
    buf.push(byte);
    Ok(())
}

fn parse_merge(byte: u8) -> Result<bool> {
    match byte {
        b'M' => Ok(true),
        b'.' => Ok(false),
        _ => Err(Error::MalformedFrame(byte as char)),
    }
}

/// Position byte: `'0'..='o'` is a column, `'~'` leaves the cursor
/// where it is.
fn parse_position(byte: u8) -> Result<Option<u8>> {
    if byte == b'~' {
        return Ok(None);
    }
    decode_int6(byte).map(Some)
}

/// LED byte: `'_'` selects no LED.
fn parse_led(byte: u8) -> Result<Option<u8>> {
    if byte == b'_' {
        return Ok(None);
    }
    decode_int6(byte).map(Some)
}

fn decode_led_list(buf: &[u8]) -> Result<Vec<u8>> {
    buf.iter().map(|&b| decode_int6(b)).collect()
}

/// Decodes one `$`-terminated run of hex digits into column bytes.
fn decode_hex_plane(hex: &[u8]) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return Err(Error::MalformedFrame('$'));
    }
    hex.chunks_exact(2)
        .map(|pair| Ok((decode_nybble(pair[0])? << 4) | decode_nybble(pair[1])?))
        .collect()
}

/// Builds the text-bearing commands once their terminator arrives.
fn finish_text(cmd: u8, header: Vec<u8>, text: Vec<u8>) -> Result<Command> {
    match cmd {
        b'T' => Ok(Command::Text {
            merge: parse_merge(header[0])?,
            align: Alignment::from_wire(header[1])?,
            transition: TransitionEffect::from_wire(header[2])?,
            text,
        }),
        b'<' => Ok(Command::Scroll {
            repeat: header[0] == b'L',
            text,
        }),
        b'M' => Ok(Command::Morse {
            led: parse_led(header[0])?,
            text,
        }),
        b'B' => Ok(Command::Sound {
            repeat: header[0] == b'L',
            notes: text,
        }),
        _ => Err(Error::UnknownCommand(cmd)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(parser: &mut CommandParser, bytes: &[u8]) -> Vec<Command> {
        let mut out = Vec::new();
        for &b in bytes {
            if let Some(cmd) = parser.feed(b).unwrap() {
                out.push(cmd);
            }
        }
        out
    }

    #[test]
    fn test_single_byte_commands() {
        let mut p = CommandParser::new(4);
        assert_eq!(
            parse_all(&mut p, b"C%XQ?"),
            vec![
                Command::Clear,
                Command::Test,
                Command::AllOff,
                Command::QueryStatus,
                Command::QueryLeds,
            ]
        );
    }

    #[test]
    fn test_font_color_cursor() {
        let mut p = CommandParser::new(4);
        assert_eq!(parse_all(&mut p, b"A1"), vec![Command::SelectFont(1)]);
        assert_eq!(
            parse_all(&mut p, b"K9"),
            vec![Command::SetColor(Color::RED.with_flash())]
        );
        assert_eq!(parse_all(&mut p, b"@5"), vec![Command::MoveCursor(Some(5))]);
        assert_eq!(parse_all(&mut p, b"@~"), vec![Command::MoveCursor(None)]);
    }

    #[test]
    fn test_text_command() {
        let mut p = CommandParser::new(4);
        let cmds = parse_all(&mut p, b"T.^<Hello\x1b");
        assert_eq!(
            cmds,
            vec![Command::Text {
                merge: false,
                align: Alignment::Center,
                transition: TransitionEffect::ScrollLeft,
                text: b"Hello".to_vec(),
            }]
        );
        assert!(p.is_idle());
    }

    #[test]
    fn test_scroll_command() {
        let mut p = CommandParser::new(4);
        assert_eq!(
            parse_all(&mut p, b"<LAround we go\x1b"),
            vec![Command::Scroll {
                repeat: true,
                text: b"Around we go".to_vec(),
            }]
        );
    }

    #[test]
    fn test_bitmap_rgb_planes() {
        let mut p = CommandParser::new(4);
        let cmds = parse_all(&mut p, b"I.0.FF00$00FF$0000$0000$");
        assert_eq!(
            cmds,
            vec![Command::Bitmap {
                merge: false,
                column: Some(0),
                transition: TransitionEffect::None,
                planes: vec![
                    vec![0xFF, 0x00],
                    vec![0x00, 0xFF],
                    vec![0x00, 0x00],
                    vec![0x00, 0x00],
                ],
            }]
        );
    }

    #[test]
    fn test_bitmap_mono_takes_two_planes() {
        let mut p = CommandParser::new(2);
        let cmds = parse_all(&mut p, b"IM~.AA$00$");
        assert_eq!(
            cmds,
            vec![Command::Bitmap {
                merge: true,
                column: None,
                transition: TransitionEffect::None,
                planes: vec![vec![0xAA], vec![0x00]],
            }]
        );
    }

    #[test]
    fn test_bitmap_rejected_without_matrix() {
        let mut p = CommandParser::new(0);
        assert_eq!(p.feed(b'I'), Err(Error::Unsupported('I')));
        assert!(p.is_idle());
    }

    #[test]
    fn test_graph_forms() {
        let mut p = CommandParser::new(4);
        assert_eq!(
            parse_all(&mut p, b"H8"),
            vec![Command::Graph(GraphSpec::Value(8))]
        );
        let cmds = parse_all(&mut p, b"HK11223344");
        match &cmds[0] {
            Command::Graph(GraphSpec::Colors(colors)) => {
                assert_eq!(colors[0], Color::RED);
                assert_eq!(colors[7], Color::BLUE);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(p.feed(b'H'), Ok(None));
        assert!(p.feed(b'9').is_err());
    }

    #[test]
    fn test_led_commands() {
        let mut p = CommandParser::new(4);
        assert_eq!(parse_all(&mut p, b"S3"), vec![Command::Light(Some(3))]);
        assert_eq!(parse_all(&mut p, b"S_"), vec![Command::Light(None)]);
        assert_eq!(
            parse_all(&mut p, b"L046$"),
            vec![Command::Lights(vec![0, 4, 6])]
        );
        assert_eq!(parse_all(&mut p, b"*2$"), vec![Command::Strobe(vec![2])]);
    }

    #[test]
    fn test_flash_with_timing() {
        let mut p = CommandParser::new(4);
        assert_eq!(
            parse_all(&mut p, b"F01$"),
            vec![Command::Flash {
                sequence: vec![0, 1],
                timing: None,
            }]
        );
        assert_eq!(
            parse_all(&mut p, b"F/151:07$"),
            vec![Command::Flash {
                sequence: vec![0, 7],
                timing: Some(Timing {
                    up: 1,
                    on: 5,
                    down: 1,
                    off: 10,
                }),
            }]
        );
    }

    #[test]
    fn test_dim() {
        let mut p = CommandParser::new(4);
        assert_eq!(
            parse_all(&mut p, b"D3C0"),
            vec![Command::Dim {
                target: DimTarget::One(3),
                level: 0xC0,
            }]
        );
        assert_eq!(
            parse_all(&mut p, b"D*FF"),
            vec![Command::Dim {
                target: DimTarget::All,
                level: 0xFF,
            }]
        );
    }

    #[test]
    fn test_settings_forms() {
        let mut p = CommandParser::new(4);
        assert_eq!(
            parse_all(&mut p, b"=75C?"),
            vec![Command::Configure {
                unit_address: Some(7),
                usb_speed: BaudRate::from_code(b'5').unwrap(),
                rs485_speed: BaudRate::from_code(b'C').unwrap(),
                global_address: 15,
            }]
        );
        assert_eq!(parse_all(&mut p, b"=*="), vec![Command::RedisplayBanners]);
        assert_eq!(parse_all(&mut p, b"=&D="), vec![Command::SaveSettings]);
        // An unknown speed code rejects the whole command.
        let mut err = None;
        for &b in b"=7Z5?" {
            if let Err(e) = p.feed(b) {
                err = Some(e);
            }
        }
        assert_eq!(err, Some(Error::InvalidBaudCode(b'Z')));
    }

    #[test]
    fn test_morse_and_sound() {
        let mut p = CommandParser::new(4);
        assert_eq!(
            parse_all(&mut p, b"M2SOS\x1b"),
            vec![Command::Morse {
                led: Some(2),
                text: b"SOS".to_vec(),
            }]
        );
        assert_eq!(
            parse_all(&mut p, b"B.ceg\x1b"),
            vec![Command::Sound {
                repeat: false,
                notes: b"ceg".to_vec(),
            }]
        );
    }

    #[test]
    fn test_error_resynchronizes() {
        let mut p = CommandParser::new(4);
        assert_eq!(p.feed(b'z'), Err(Error::UnknownCommand(b'z')));
        // Bad color aborts K, then the next command parses cleanly.
        assert_eq!(p.feed(b'K'), Ok(None));
        assert!(p.feed(b'@').is_err());
        assert_eq!(parse_all(&mut p, b"C"), vec![Command::Clear]);
    }

    #[test]
    fn test_payload_cap() {
        let mut p = CommandParser::new(4);
        for &b in b"T..." {
            p.feed(b).unwrap();
        }
        let mut result = Ok(None);
        for _ in 0..=MAX_PAYLOAD {
            result = p.feed(b'x');
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(Error::FrameTooLong(_))));
        assert!(p.is_idle());
    }

    #[test]
    fn test_stream_padding_ignored() {
        let mut p = CommandParser::new(4);
        assert_eq!(parse_all(&mut p, b"\r\n\xffC"), vec![Command::Clear]);
    }
}
