//! The device core: one value owning every piece of unit state, fed
//! by transport bytes and a periodic timer tick.
//!
//! Drawing commands paint the image buffer; the transition engine is
//! the only writer of the display buffer. Command bytes may arrive on
//! the USB serial channel or the RS-485 bus; each channel has its own
//! parser, and replies are suppressed for global bus frames.

use crate::color::Color;
use crate::config::{ConfigStore, DeviceConfig};
use crate::font::FontLibrary;
use crate::frame::{Frame, FrameStore};
use crate::hardware::{HardwareSpec, ROWS};
use crate::leds::StatusBank;
use crate::protocol::bus::{BusReceiver, Input, UsbReceiver};
use crate::protocol::command::{Alignment, Command, CommandParser, DimTarget, GraphSpec};
use crate::protocol::wire::push_hex_byte;
use crate::transition::{TransitionEffect, TransitionEngine};
use crate::{Error, Result};

/// Hardware revision reported in the version stamp.
pub const HARDWARE_VERSION: &str = "2.0.0";

/// Firmware revision reported in the version stamp.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sets the drawing font: 0x06 followed by a digit.
const FMT_FONT: u8 = 0x06;
/// Sets the drawing color: 0x0B followed by a color byte.
const FMT_COLOR: u8 = 0x0B;
/// Moves the cursor: 0x03 followed by a position byte.
const FMT_MOVE: u8 = 0x03;
/// Backs the cursor up: 0x08 followed by a pixel count byte.
const FMT_LEFT: u8 = 0x08;
/// Advances the cursor: 0x0C followed by a pixel count byte.
const FMT_RIGHT: u8 = 0x0C;

/// External sounder/signal collaborator. Morse and tone playback
/// happen outside the rendering core; units without an annunciator
/// use [`SilentAnnunciator`].
pub trait Annunciator: Send {
    fn morse(&mut self, led: Option<u8>, message: &[u8]);
    fn play(&mut self, repeat: bool, notes: &[u8]);
    fn stop(&mut self);
}

/// Discards all annunciator requests.
#[derive(Debug, Default)]
pub struct SilentAnnunciator;

impl Annunciator for SilentAnnunciator {
    fn morse(&mut self, _led: Option<u8>, _message: &[u8]) {}
    fn play(&mut self, _repeat: bool, _notes: &[u8]) {}
    fn stop(&mut self) {}
}

/// The serial channel a byte arrived on. Each channel keeps its own
/// parser so a frame on one can never clobber a command half-received
/// on the other.
#[derive(Debug, Clone, Copy)]
enum Channel {
    Usb,
    Bus,
}

/// One readerboard or busylight unit.
pub struct Device {
    hw: HardwareSpec,
    config: DeviceConfig,
    store: Box<dyn ConfigStore>,
    fonts: FontLibrary,
    frames: FrameStore,
    engine: TransitionEngine,
    leds: StatusBank,
    annunciator: Box<dyn Annunciator>,
    usb_parser: CommandParser,
    bus_parser: CommandParser,
    usb: UsbReceiver,
    bus: BusReceiver,
    cursor: usize,
    font: u8,
    color: Color,
    graph_colors: [Color; 8],
}

impl Device {
    /// Builds a unit from its hardware description. Saved settings are
    /// loaded if the store has any; a failed load falls back to the
    /// defaults rather than refusing to boot.
    pub fn new(
        hw: HardwareSpec,
        mut store: Box<dyn ConfigStore>,
        annunciator: Box<dyn Annunciator>,
    ) -> Self {
        let config = match store.load() {
            Ok(Some(config)) => config,
            Ok(None) => DeviceConfig::default(),
            Err(e) => {
                tracing::warn!(error = %e, "saved settings unreadable, using defaults");
                DeviceConfig::default()
            }
        };
        let mut config = config;
        if config.dimmers.len() != hw.status_leds {
            config.dimmers.resize(hw.status_leds, 255);
        }
        Self {
            frames: FrameStore::new(&hw),
            leds: StatusBank::new(hw.status_leds),
            usb_parser: CommandParser::new(hw.depth()),
            bus_parser: CommandParser::new(hw.depth()),
            hw,
            config,
            store,
            fonts: FontLibrary::standard(),
            engine: TransitionEngine::new(),
            annunciator,
            usb: UsbReceiver,
            bus: BusReceiver::new(),
            cursor: 0,
            font: 0,
            color: Color::default(),
            graph_colors: [Color::GREEN; 8],
        }
    }

    pub fn hardware(&self) -> &HardwareSpec {
        &self.hw
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// The frame the hardware is scanning out right now.
    pub fn display(&self) -> &Frame {
        &self.frames.display
    }

    pub fn leds(&self) -> &StatusBank {
        &self.leds
    }

    /// Feeds bytes received on the USB serial channel. Any replies are
    /// appended to `reply`.
    pub fn feed_usb(&mut self, bytes: &[u8], reply: &mut Vec<u8>) {
        for &byte in bytes {
            match self.usb.feed(byte) {
                Input::Abort => self.usb_parser.reset(),
                Input::Data(b) => self.handle_byte(Channel::Usb, b, true, reply),
                Input::Start | Input::None => {}
            }
        }
    }

    /// Feeds bytes received on the RS-485 bus. Frames addressed to
    /// other units are skipped; global frames never reply.
    pub fn feed_bus(&mut self, bytes: &[u8], reply: &mut Vec<u8>) {
        for &byte in bytes {
            let input = self
                .bus
                .feed(byte, self.config.unit_address, self.config.global_address);
            match input {
                Input::Start | Input::Abort => self.bus_parser.reset(),
                Input::Data(b) => {
                    let reply_allowed = self.bus.reply_allowed();
                    self.handle_byte(Channel::Bus, b, reply_allowed, reply);
                }
                Input::None => {}
            }
        }
    }

    fn handle_byte(&mut self, channel: Channel, byte: u8, reply_allowed: bool, reply: &mut Vec<u8>) {
        let parsed = match channel {
            Channel::Usb => self.usb_parser.feed(byte),
            Channel::Bus => self.bus_parser.feed(byte),
        };
        match parsed {
            Ok(Some(cmd)) => {
                if let Err(e) = self.execute(cmd, reply_allowed, reply) {
                    tracing::warn!(error = %e, "command rejected");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, byte, "command stream error"),
        }
    }

    /// Advances all animation by one timer tick.
    pub fn tick(&mut self) {
        self.engine.tick(&mut self.frames.display, &self.fonts);
        self.leds.tick();
    }

    fn require_matrix(&self, cmd: char) -> Result<()> {
        if self.hw.has_matrix() {
            Ok(())
        } else {
            Err(Error::Unsupported(cmd))
        }
    }

    fn execute(&mut self, cmd: Command, reply_allowed: bool, reply: &mut Vec<u8>) -> Result<()> {
        tracing::debug!(cmd = ?cmd, "execute");
        match cmd {
            Command::Clear => {
                self.require_matrix('C')?;
                self.frames.image.clear();
                self.cursor = 0;
                self.commit(TransitionEffect::None);
            }
            Command::SelectFont(idx) => {
                self.require_matrix('A')?;
                if idx >= self.fonts.count() {
                    return Err(Error::FontOutOfRange(idx + b'0'));
                }
                self.font = idx;
            }
            Command::SetColor(color) => {
                self.require_matrix('K')?;
                self.color = color;
            }
            Command::MoveCursor(pos) => {
                self.require_matrix('@')?;
                if let Some(col) = pos {
                    self.cursor = (col as usize).min(self.frames.image.width());
                }
            }
            Command::Text {
                merge,
                align,
                transition,
                text,
            } => {
                self.require_matrix('T')?;
                if !merge {
                    self.frames.image.clear();
                    self.cursor = 0;
                }
                self.cursor = self.aligned_start(align, &text);
                self.render_formatted(&text);
                self.commit(transition);
            }
            Command::Bitmap {
                merge,
                column,
                transition,
                planes,
            } => {
                self.require_matrix('I')?;
                if !merge {
                    self.frames.image.clear();
                }
                let start = column.map(|c| c as usize).unwrap_or(self.cursor);
                for (plane, bits) in planes.iter().enumerate() {
                    for (i, &b) in bits.iter().enumerate() {
                        let col = start + i;
                        if col >= self.frames.image.width() {
                            break;
                        }
                        self.frames.image.set_plane_column(plane, col, b, merge);
                    }
                }
                self.commit(transition);
            }
            Command::Scroll { repeat, text } => {
                self.require_matrix('<')?;
                let text = strip_formatting(&text);
                self.engine
                    .start_text(&self.fonts, text, self.font, self.color, repeat, 1);
            }
            Command::Graph(GraphSpec::Colors(colors)) => {
                self.require_matrix('H')?;
                self.graph_colors = colors;
            }
            Command::Graph(GraphSpec::Value(value)) => {
                self.require_matrix('H')?;
                self.plot_graph(value);
                self.commit(TransitionEffect::None);
            }
            Command::Dim { target, level } => match target {
                DimTarget::All => self.config.dimmers.fill(level),
                DimTarget::One(led) => {
                    let slot = self
                        .config
                        .dimmers
                        .get_mut(led as usize)
                        .ok_or(Error::InvalidLed(led))?;
                    *slot = level;
                }
            },
            Command::Light(led) => self.leds.set_light(led)?,
            Command::Lights(leds) => self.leds.set_lights(&leds)?,
            Command::Flash { sequence, timing } => self.leds.set_flasher(sequence, timing)?,
            Command::Strobe(sequence) => self.leds.set_strober(sequence)?,
            Command::AllOff => {
                self.leds.all_off();
                self.annunciator.stop();
            }
            Command::Test => {
                self.test_pattern();
            }
            Command::QueryLeds => {
                if reply_allowed {
                    self.leds.status_bytes(reply);
                    reply.push(b'\n');
                }
            }
            Command::QueryStatus => {
                if reply_allowed {
                    self.query_reply(reply);
                }
            }
            Command::Configure {
                unit_address,
                usb_speed,
                rs485_speed,
                global_address,
            } => {
                self.config.unit_address = unit_address;
                self.config.usb_speed = usb_speed;
                self.config.rs485_speed = rs485_speed;
                self.config.global_address = global_address;
                tracing::info!(
                    unit = ?unit_address,
                    global = global_address,
                    "addressing reconfigured"
                );
            }
            Command::RedisplayBanners => self.show_banner(),
            Command::SaveSettings => self.store.save(&self.config)?,
            Command::Morse { led, text } => self.annunciator.morse(led, &text),
            Command::Sound { repeat, notes } => self.annunciator.play(repeat, &notes),
        }
        Ok(())
    }

    /// Hands the image buffer to the transition engine.
    fn commit(&mut self, transition: TransitionEffect) {
        self.engine.start(
            transition,
            self.frames.image.clone(),
            1,
            &mut self.frames.display,
        );
    }

    /// Starting column for a text draw under the given alignment.
    fn aligned_start(&self, align: Alignment, text: &[u8]) -> usize {
        let width = self.frames.image.width();
        let text_width = self.fonts.text_width(self.font, &strip_formatting(text));
        match align {
            Alignment::None => self.cursor,
            Alignment::Left => 0,
            Alignment::Right | Alignment::LocalRight => width.saturating_sub(text_width),
            Alignment::Center | Alignment::LocalCenterLeft => {
                width.saturating_sub(text_width) / 2
            }
            Alignment::LocalCenterRight => width.saturating_sub(text_width).div_ceil(2),
        }
    }

    /// Paints text into the image buffer, honoring the in-text
    /// formatting codes. Unknown glyphs are skipped.
    fn render_formatted(&mut self, text: &[u8]) {
        let mut bytes = text.iter().copied();
        while let Some(cp) = bytes.next() {
            match cp {
                FMT_FONT => {
                    if let Some(arg) = bytes.next() {
                        let idx = arg.wrapping_sub(b'0');
                        if idx < self.fonts.count() {
                            self.font = idx;
                        }
                    }
                }
                FMT_COLOR => {
                    if let Some(arg) = bytes.next() {
                        if let Ok(color) = Color::from_wire(arg) {
                            self.color = color;
                        }
                    }
                }
                FMT_MOVE => {
                    if let Some(arg) = bytes.next() {
                        if (b'0'..=b'o').contains(&arg) {
                            self.cursor =
                                ((arg - b'0') as usize).min(self.frames.image.width());
                        }
                    }
                }
                FMT_LEFT => {
                    if let Some(arg) = bytes.next() {
                        self.cursor = self.cursor.saturating_sub(arg.wrapping_sub(b'0') as usize);
                    }
                }
                FMT_RIGHT => {
                    if let Some(arg) = bytes.next() {
                        self.cursor = (self.cursor + arg.wrapping_sub(b'0') as usize)
                            .min(self.frames.image.width());
                    }
                }
                _ => {
                    let width = self.frames.image.draw_character(
                        &self.fonts,
                        self.font,
                        cp,
                        self.cursor,
                        self.color,
                        true,
                    );
                    if width > 0 {
                        let Some(glyph) = self.fonts.glyph(self.font, cp) else {
                            continue;
                        };
                        self.cursor += glyph.advance();
                    }
                }
            }
        }
    }

    /// Scrolls the new data point in from the right: every prior
    /// column moves left and the bar is drawn at the rightmost column
    /// using the configured per-row bar colors.
    fn plot_graph(&mut self, value: u8) {
        let image = &mut self.frames.image;
        image.shift_left();
        let last = image.width().saturating_sub(1);
        for row in 0..ROWS {
            // Bars grow up from the bottom row.
            let bar = (ROWS - 1 - row) as u8;
            if bar < value {
                image.draw_column(last, 1 << row, self.graph_colors[bar as usize], true);
            }
        }
    }

    /// Power-on self test: full-intensity color bars.
    fn test_pattern(&mut self) {
        if self.hw.has_matrix() {
            const BARS: [Color; 4] = [Color::RED, Color::GREEN, Color::BLUE, Color::WHITE];
            let image = &mut self.frames.image;
            image.clear();
            for col in 0..image.width() {
                image.draw_column(col, 0xFF, BARS[(col / 8) % BARS.len()], false);
            }
            self.commit(TransitionEffect::None);
        }
        let lit: Vec<u8> = (0..self.leds.installed() as u8).collect();
        // Sweep all status LEDs; harmless if the bank is empty.
        if self.leds.set_flasher(lit, None).is_err() {
            self.leds.all_off();
        }
    }

    /// Redisplays the power-on banner as a one-shot scroll.
    fn show_banner(&mut self) {
        if !self.hw.has_matrix() {
            return;
        }
        let mut banner = format!("HW {HARDWARE_VERSION}  FW {FIRMWARE_VERSION}");
        if !self.config.serial_number.is_empty() {
            banner.push_str("  S/N ");
            banner.push_str(&self.config.serial_number);
        }
        self.engine.start_text(
            &self.fonts,
            banner.into_bytes(),
            0,
            Color::default(),
            false,
            1,
        );
    }

    /// The version stamp: `V<hardware>$R<firmware>$S<serial>$`.
    pub fn version_stamp(&self) -> Vec<u8> {
        format!(
            "V{HARDWARE_VERSION}$R{FIRMWARE_VERSION}$S{}$",
            self.config.serial_number
        )
        .into_bytes()
    }

    /// Builds the full `Q` status reply.
    fn query_reply(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"Q0");
        out.push(self.hw.model.class_byte());
        out.push(b'=');
        out.push(self.config.unit_address_byte());
        out.push(self.config.usb_speed.code());
        out.push(self.config.rs485_speed.code());
        out.push(b'0' + self.config.global_address);
        out.push(if self.hw.has_storage { b'I' } else { b'_' });
        out.push(if self.hw.has_sound { b'S' } else { b'_' });
        out.push(b'$');
        out.extend_from_slice(&self.version_stamp());
        self.leds.status_bytes(out);
        out.push(b'D');
        for &level in &self.config.dimmers {
            push_hex_byte(out, level);
        }
        out.push(b'$');
        if self.hw.has_matrix() {
            let image = &self.frames.image;
            for plane in 0..image.depth() {
                if plane == 0 {
                    out.push(b'M');
                }
                for col in 0..image.width() {
                    push_hex_byte(out, image.plane_column(plane, col));
                }
                out.push(b'$');
            }
        }
        out.push(b'\n');
    }
}

/// Drops formatting codes (and their argument bytes) from text, for
/// width measurement and scrolling.
fn strip_formatting(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut bytes = text.iter().copied();
    while let Some(cp) = bytes.next() {
        match cp {
            FMT_FONT | FMT_COLOR | FMT_MOVE | FMT_LEFT | FMT_RIGHT => {
                bytes.next();
            }
            _ => out.push(cp),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NullStore;
    use std::sync::{Arc, Mutex};

    fn rgb_device() -> Device {
        Device::new(
            HardwareSpec::rgb_64x8(),
            Box::new(NullStore),
            Box::new(SilentAnnunciator),
        )
    }

    fn run_usb(dev: &mut Device, bytes: &[u8]) -> Vec<u8> {
        let mut reply = Vec::new();
        dev.feed_usb(bytes, &mut reply);
        reply
    }

    /// Ticks until the display buffer settles.
    fn settle(dev: &mut Device) {
        for _ in 0..256 {
            dev.tick();
        }
    }

    #[test]
    fn test_text_draw_and_commit() {
        let mut dev = rgb_device();
        run_usb(&mut dev, b"K2T..<Hi\x1b");
        assert!(dev.display().is_blank());
        settle(&mut dev);
        assert!(!dev.display().is_blank());
        // Green plane only
        assert!((0..64).all(|c| dev.display().plane_column(0, c) == 0));
    }

    #[test]
    fn test_clear_is_immediate() {
        let mut dev = rgb_device();
        run_usb(&mut dev, b"T...Hi\x1b");
        settle(&mut dev);
        assert!(!dev.display().is_blank());
        run_usb(&mut dev, b"C");
        assert!(dev.display().is_blank());
    }

    #[test]
    fn test_alignment_centers_text() {
        let mut dev = rgb_device();
        run_usb(&mut dev, b"T.^.Hi\x1b");
        settle(&mut dev);
        // Nothing at the extreme edges, something near the middle.
        assert_eq!(dev.display().plane_column(0, 0), 0);
        assert_eq!(dev.display().plane_column(0, 63), 0);
        assert!((24..40).any(|c| dev.display().plane_column(0, c) != 0));
    }

    #[test]
    fn test_in_text_color_change() {
        let mut dev = rgb_device();
        // Red 'A', then switch to blue for 'B'.
        run_usb(&mut dev, b"K1T...A\x0b4B\x1b");
        settle(&mut dev);
        let red: Vec<usize> = (0..64)
            .filter(|&c| dev.display().plane_column(0, c) != 0)
            .collect();
        let blue: Vec<usize> = (0..64)
            .filter(|&c| dev.display().plane_column(2, c) != 0)
            .collect();
        assert!(!red.is_empty());
        assert!(!blue.is_empty());
        assert!(red.iter().max() < blue.iter().min());
    }

    #[test]
    fn test_bitmap_draw() {
        let mut dev = rgb_device();
        run_usb(&mut dev, b"I.0.FF$00$00$00$");
        settle(&mut dev);
        assert_eq!(dev.display().plane_column(0, 0), 0xFF);
        assert_eq!(dev.display().plane_column(1, 0), 0);
    }

    #[test]
    fn test_graph_scrolls_in_from_right() {
        let mut dev = rgb_device();
        run_usb(&mut dev, b"H3");
        settle(&mut dev);
        // Bottom three rows lit in the rightmost column.
        assert_eq!(dev.display().plane_column(1, 63), 0xE0);
        run_usb(&mut dev, b"H8");
        settle(&mut dev);
        assert_eq!(dev.display().plane_column(1, 62), 0xE0);
        assert_eq!(dev.display().plane_column(1, 63), 0xFF);
    }

    #[test]
    fn test_led_status_reply() {
        let mut dev = rgb_device();
        let reply = run_usb(&mut dev, b"L25$?");
        assert_eq!(reply, b"L025$FS_$SS_$\n");
    }

    #[test]
    fn test_query_reply_shape() {
        let mut dev = rgb_device();
        let reply = run_usb(&mut dev, b"Q");
        let text = String::from_utf8(reply).unwrap();
        assert!(text.starts_with("Q0C=.55?I_$V2.0.0$R"));
        assert!(text.contains("$L0$FS_$SS_$D"));
        assert!(text.ends_with("$\n"));
        // Four bitmap planes of 64 columns each.
        assert_eq!(text.matches('$').count(), 8 + 4);
    }

    #[test]
    fn test_configure_and_reject_bad_speed() {
        let mut dev = rgb_device();
        run_usb(&mut dev, b"=75C?");
        assert_eq!(dev.config().unit_address, Some(7));
        assert_eq!(dev.config().usb_speed.rate(), 9600);
        assert_eq!(dev.config().rs485_speed.rate(), 115200);
        assert_eq!(dev.config().global_address, 15);
        // A bad baud code rejects the whole command, state unchanged.
        run_usb(&mut dev, b"=3Z3?");
        assert_eq!(dev.config().unit_address, Some(7));
        assert_eq!(dev.config().usb_speed.rate(), 9600);
    }

    #[test]
    fn test_save_without_storage_fails_quietly() {
        let mut dev = rgb_device();
        // NullStore rejects the save; the device carries on.
        run_usb(&mut dev, b"=&D=C");
        assert!(dev.display().is_blank());
    }

    #[test]
    fn test_usb_abort_discards_partial_command() {
        let mut dev = rgb_device();
        run_usb(&mut dev, b"T...junk\x04C");
        settle(&mut dev);
        assert!(dev.display().is_blank());
    }

    #[test]
    fn test_bus_addressing() {
        let mut dev = rgb_device();
        run_usb(&mut dev, b"=75C?");
        // Direct frame for unit 7: executes and may reply.
        let mut reply = Vec::new();
        dev.feed_bus(&[0xD7, b'?'], &mut reply);
        assert!(reply.ends_with(b"\n"));
        // Frame for unit 3: ignored entirely.
        reply.clear();
        dev.feed_bus(&[0xD3, b'S', b'1', 0xD7, b'?'], &mut reply);
        assert!(!String::from_utf8_lossy(&reply).contains("L01"));
    }

    #[test]
    fn test_bus_frame_leaves_partial_usb_command_intact() {
        let mut dev = rgb_device();
        run_usb(&mut dev, b"=75C?");
        let mut reply = Vec::new();
        // A bus frame arrives in the middle of a USB text command.
        dev.feed_usb(b"T..<HEL", &mut reply);
        dev.feed_bus(&[0xD7, b'S', b'2'], &mut reply);
        dev.feed_usb(b"LO\x1b", &mut reply);
        settle(&mut dev);
        assert_eq!(dev.leds().lit_codes(), b"2");
        let mut fresh = rgb_device();
        run_usb(&mut fresh, b"T..<HELLO\x1b");
        settle(&mut fresh);
        assert_eq!(dev.display(), fresh.display());
    }

    #[test]
    fn test_fresh_text_starts_at_left_edge() {
        let mut dev = rgb_device();
        run_usb(&mut dev, b"T...FIRST\x1b");
        settle(&mut dev);
        // A non-merge draw starts over at column 0, not at the old cursor.
        run_usb(&mut dev, b"T...SECOND\x1b");
        settle(&mut dev);
        let mut fresh = rgb_device();
        run_usb(&mut fresh, b"T...SECOND\x1b");
        settle(&mut fresh);
        assert_eq!(dev.display(), fresh.display());
    }

    #[test]
    fn test_broadcast_executes_without_reply() {
        let mut dev = rgb_device();
        run_usb(&mut dev, b"=75C?");
        let mut reply = Vec::new();
        dev.feed_bus(&[0xFF, 0x00, b'S', b'2', b'?'], &mut reply);
        assert_eq!(reply, b"");
        assert_eq!(dev.leds().lit_codes(), b"2");
    }

    #[test]
    fn test_morse_routed_to_annunciator() {
        #[derive(Default)]
        struct Recorder(Arc<Mutex<Vec<u8>>>);
        impl Annunciator for Recorder {
            fn morse(&mut self, _led: Option<u8>, message: &[u8]) {
                self.0.lock().unwrap().extend_from_slice(message);
            }
            fn play(&mut self, _repeat: bool, _notes: &[u8]) {}
            fn stop(&mut self) {}
        }
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dev = Device::new(
            HardwareSpec::rgb_64x8(),
            Box::new(NullStore),
            Box::new(Recorder(log.clone())),
        );
        run_usb(&mut dev, b"M0SOS\x1b");
        assert_eq!(*log.lock().unwrap(), b"SOS");
    }

    #[test]
    fn test_busylight_rejects_matrix_commands() {
        let mut dev = Device::new(
            HardwareSpec::busylight(),
            Box::new(NullStore),
            Box::new(SilentAnnunciator),
        );
        // Matrix commands are rejected; LED commands still work.
        run_usb(&mut dev, b"CS3");
        assert_eq!(dev.leds().lit_codes(), b"3");
        let reply = run_usb(&mut dev, b"Q");
        let text = String::from_utf8(reply).unwrap();
        assert!(text.starts_with("Q0B="));
        assert!(!text.contains('M'));
    }
}
