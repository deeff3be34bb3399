//! Discrete status LED bank: static lights plus the flasher and
//! strober sequencers.
//!
//! The flasher cycles its light sequence at a steady (optionally
//! custom) cadence; the strober fires short pulses through its
//! sequence. Both run off the same timer tick as the display engine.

use crate::protocol::wire::encode_int6;
use crate::{Error, Result};

/// Flasher cadence in tenths of a second, as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub up: u8,
    pub on: u8,
    pub down: u8,
    pub off: u8,
}

/// A cycling light sequencer (flasher or strober).
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    sequence: Vec<u8>,
    position: usize,
    running: bool,
    timing: Option<Timing>,
    countdown: u32,
}

impl Sequencer {
    /// Arms the sequencer with a new light sequence and starts it.
    /// An empty sequence stops and clears it.
    fn set(&mut self, sequence: Vec<u8>, timing: Option<Timing>) {
        self.position = 0;
        self.running = !sequence.is_empty();
        self.sequence = sequence;
        self.timing = timing;
        self.countdown = self.period();
    }

    fn clear(&mut self) {
        self.sequence.clear();
        self.position = 0;
        self.running = false;
        self.timing = None;
        self.countdown = 0;
    }

    /// Ticks each light is held for. A custom timing stretches the
    /// hold to its full up/on/down/off cycle; without one, every tick
    /// steps the sequence.
    fn period(&self) -> u32 {
        self.timing
            .map(|t| u32::from(t.up) + u32::from(t.on) + u32::from(t.down) + u32::from(t.off))
            .filter(|&p| p > 0)
            .unwrap_or(1)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The light currently selected by the sequencer.
    pub fn current(&self) -> Option<u8> {
        if self.running {
            self.sequence.get(self.position).copied()
        } else {
            None
        }
    }

    /// Advances one timer tick, stepping to the next light once the
    /// current one's hold period has elapsed.
    fn advance(&mut self) {
        if !self.running || self.sequence.is_empty() {
            return;
        }
        if self.countdown > 1 {
            self.countdown -= 1;
            return;
        }
        self.countdown = self.period();
        self.position = (self.position + 1) % self.sequence.len();
    }

    /// Appends the wire status form: an optional `/` timing block,
    /// `R` or `S` for the run state, then `_` for an empty sequence or
    /// `<position>@<lights>`.
    fn status_bytes(&self, out: &mut Vec<u8>) {
        if let Some(t) = self.timing {
            out.push(b'/');
            out.push(encode_int6(t.up));
            out.push(encode_int6(t.on));
            out.push(encode_int6(t.down));
            out.push(encode_int6(t.off));
        }
        out.push(if self.running { b'R' } else { b'S' });
        if self.sequence.is_empty() {
            out.push(b'_');
        } else {
            // The position field is a single int6; a longer sequence
            // saturates at the top of the encodable range.
            out.push(encode_int6(self.position.min(63) as u8));
            out.push(b'@');
            for &led in &self.sequence {
                out.push(b'0' + led);
            }
        }
    }
}

/// State of the unit's discrete status LEDs.
#[derive(Debug, Clone)]
pub struct StatusBank {
    installed: usize,
    lit: Vec<bool>,
    flasher: Sequencer,
    strober: Sequencer,
}

impl StatusBank {
    pub fn new(installed: usize) -> Self {
        Self {
            installed,
            lit: vec![false; installed],
            flasher: Sequencer::default(),
            strober: Sequencer::default(),
        }
    }

    pub fn installed(&self) -> usize {
        self.installed
    }

    fn check(&self, led: u8) -> Result<()> {
        if (led as usize) < self.installed {
            Ok(())
        } else {
            Err(Error::InvalidLed(led))
        }
    }

    /// Lights exactly one LED (or none), stopping the flasher.
    pub fn set_light(&mut self, led: Option<u8>) -> Result<()> {
        if let Some(led) = led {
            self.check(led)?;
        }
        self.lit.fill(false);
        if let Some(led) = led {
            self.lit[led as usize] = true;
        }
        self.flasher.clear();
        Ok(())
    }

    /// Lights a static set of LEDs, stopping the flasher.
    pub fn set_lights(&mut self, leds: &[u8]) -> Result<()> {
        for &led in leds {
            self.check(led)?;
        }
        self.lit.fill(false);
        for &led in leds {
            self.lit[led as usize] = true;
        }
        self.flasher.clear();
        Ok(())
    }

    /// Arms the flasher. The first light of the sequence becomes the
    /// static state; an empty sequence just stops the flasher.
    pub fn set_flasher(&mut self, sequence: Vec<u8>, timing: Option<Timing>) -> Result<()> {
        for &led in &sequence {
            self.check(led)?;
        }
        match sequence.first() {
            Some(&first) => self.set_light(Some(first))?,
            None => self.flasher.clear(),
        }
        self.flasher.set(sequence, timing);
        Ok(())
    }

    /// Arms the strober. An empty sequence stops it.
    pub fn set_strober(&mut self, sequence: Vec<u8>) -> Result<()> {
        for &led in &sequence {
            self.check(led)?;
        }
        self.strober.set(sequence, None);
        Ok(())
    }

    /// Turns everything off and stops both sequencers.
    pub fn all_off(&mut self) {
        self.lit.fill(false);
        self.flasher.clear();
        self.strober.clear();
    }

    pub fn flasher(&self) -> &Sequencer {
        &self.flasher
    }

    pub fn strober(&self) -> &Sequencer {
        &self.strober
    }

    /// Advances both sequencers by one timer tick. The flasher's
    /// current light is mirrored into the static state so a status
    /// query reflects what is visibly lit.
    pub fn tick(&mut self) {
        self.flasher.advance();
        self.strober.advance();
        if self.flasher.is_running() {
            self.lit.fill(false);
            if let Some(led) = self.flasher.current() {
                self.lit[led as usize] = true;
            }
        }
    }

    /// True if the given LED is currently on.
    pub fn is_lit(&self, led: u8) -> bool {
        self.lit.get(led as usize).copied().unwrap_or(false)
    }

    /// Wire bytes of the lights currently on, in position order.
    pub fn lit_codes(&self) -> Vec<u8> {
        self.lit
            .iter()
            .enumerate()
            .filter(|(_, &on)| on)
            .map(|(i, _)| b'0' + i as u8)
            .collect()
    }

    /// Appends the full LED status block:
    /// `L0<lights>$F<flasher>$S<strober>$`.
    pub fn status_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"L0");
        out.extend_from_slice(&self.lit_codes());
        out.extend_from_slice(b"$F");
        self.flasher.status_bytes(out);
        out.extend_from_slice(b"$S");
        self.strober.status_bytes(out);
        out.push(b'$');
    }
}
