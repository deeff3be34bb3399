//! Timer-driven transition engine.
//!
//! The engine is the only writer of the display buffer. A transition
//! is armed with a snapshot of the image buffer and advances one step
//! per elapsed tick interval until the display buffer has fully caught
//! up, then retires to idle. Arming a new transition discards any
//! progress of the previous one.

use crate::color::Color;
use crate::font::FontLibrary;
use crate::frame::Frame;
use crate::hardware::ROWS;
use crate::{Error, Result};

/// Named transition effects and their wire bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionEffect {
    /// Immediate copy, no animation.
    #[default]
    None,
    ScrollLeft,
    ScrollRight,
    ScrollUp,
    ScrollDown,
    WipeLeft,
    WipeRight,
    WipeUp,
    WipeDown,
    /// Two wipes converging from the side edges.
    WipeLeftRight,
    /// Two wipes converging from the top and bottom edges.
    WipeUpDown,
    /// Resolved to a concrete effect when the transition is armed.
    Random,
}

/// Concrete (non-none, non-random) effects, for random selection.
const CONCRETE_EFFECTS: [TransitionEffect; 10] = [
    TransitionEffect::ScrollLeft,
    TransitionEffect::ScrollRight,
    TransitionEffect::ScrollUp,
    TransitionEffect::ScrollDown,
    TransitionEffect::WipeLeft,
    TransitionEffect::WipeRight,
    TransitionEffect::WipeUp,
    TransitionEffect::WipeDown,
    TransitionEffect::WipeLeftRight,
    TransitionEffect::WipeUpDown,
];

impl TransitionEffect {
    /// Decodes the single-byte wire form.
    pub fn from_wire(byte: u8) -> Result<Self> {
        Ok(match byte {
            b'.' => TransitionEffect::None,
            b'<' => TransitionEffect::ScrollLeft,
            b'>' => TransitionEffect::ScrollRight,
            b'^' => TransitionEffect::ScrollUp,
            b'v' => TransitionEffect::ScrollDown,
            b'L' => TransitionEffect::WipeLeft,
            b'R' => TransitionEffect::WipeRight,
            b'U' => TransitionEffect::WipeUp,
            b'D' => TransitionEffect::WipeDown,
            b'|' => TransitionEffect::WipeLeftRight,
            b'-' => TransitionEffect::WipeUpDown,
            b'?' => TransitionEffect::Random,
            _ => return Err(Error::InvalidTransition(byte)),
        })
    }

    /// Wire byte for this effect.
    pub fn wire(&self) -> u8 {
        match self {
            TransitionEffect::None => b'.',
            TransitionEffect::ScrollLeft => b'<',
            TransitionEffect::ScrollRight => b'>',
            TransitionEffect::ScrollUp => b'^',
            TransitionEffect::ScrollDown => b'v',
            TransitionEffect::WipeLeft => b'L',
            TransitionEffect::WipeRight => b'R',
            TransitionEffect::WipeUp => b'U',
            TransitionEffect::WipeDown => b'D',
            TransitionEffect::WipeLeftRight => b'|',
            TransitionEffect::WipeUpDown => b'-',
            TransitionEffect::Random => b'?',
        }
    }
}

/// xorshift32 step; good enough to pick transition effects.
#[derive(Debug, Clone)]
struct XorShift32(u32);

impl XorShift32 {
    fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}

/// Scrolling-text progress. Glyph columns are regenerated from the
/// font service as they scroll into view rather than materializing the
/// whole strip.
#[derive(Debug, Clone)]
struct TextScroll {
    text: Vec<u8>,
    font: u8,
    color: Color,
    repeat: bool,
    /// Next strip column to scroll in.
    offset: usize,
    /// Rendered width of the text in pixels.
    total: usize,
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    Running {
        effect: TransitionEffect,
        src: Frame,
        step: usize,
    },
    ScrollingText(TextScroll),
}

/// The transition state machine of one display unit.
#[derive(Debug, Clone)]
pub struct TransitionEngine {
    state: State,
    /// Ticks per animation step.
    interval: u32,
    countdown: u32,
    rng: XorShift32,
}

impl TransitionEngine {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            interval: 1,
            countdown: 0,
            rng: XorShift32(0x2545_F491),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    /// Effect currently running, if any.
    pub fn current_effect(&self) -> Option<TransitionEffect> {
        match &self.state {
            State::Running { effect, .. } => Some(*effect),
            _ => None,
        }
    }

    pub fn is_scrolling_text(&self) -> bool {
        matches!(self.state, State::ScrollingText(_))
    }

    /// Arms a transition from `src` into the display buffer.
    ///
    /// `TransitionEffect::None` copies synchronously and leaves the
    /// engine idle; anything else takes effect starting at the next
    /// tick. `Random` is resolved here, once, to a concrete effect.
    pub fn start(
        &mut self,
        effect: TransitionEffect,
        src: Frame,
        interval_ticks: u32,
        display: &mut Frame,
    ) {
        let effect = match effect {
            TransitionEffect::Random => {
                CONCRETE_EFFECTS[self.rng.next() as usize % CONCRETE_EFFECTS.len()]
            }
            other => other,
        };
        if effect == TransitionEffect::None || total_steps(effect, src.width()) == 0 {
            display.copy_from(&src);
            self.state = State::Idle;
            return;
        }
        tracing::debug!(effect = ?effect, "transition armed");
        self.interval = interval_ticks.max(1);
        self.countdown = self.interval;
        self.state = State::Running {
            effect,
            src,
            step: 0,
        };
    }

    /// Arms continuous scrolling text. The text width is precomputed
    /// from the font metrics; the traversal covers the text width plus
    /// the display width so the tail fully exits before it finishes.
    pub fn start_text(
        &mut self,
        fonts: &FontLibrary,
        text: Vec<u8>,
        font: u8,
        color: Color,
        repeat: bool,
        interval_ticks: u32,
    ) {
        let total = fonts.text_width(font, &text);
        if total == 0 {
            self.state = State::Idle;
            return;
        }
        self.interval = interval_ticks.max(1);
        self.countdown = self.interval;
        self.state = State::ScrollingText(TextScroll {
            text,
            font,
            color,
            repeat,
            offset: 0,
            total,
        });
    }

    /// Forces idle, leaving the display buffer as last updated.
    pub fn stop(&mut self) {
        self.state = State::Idle;
    }

    /// Advances the transition by one timer tick. Total: never fails.
    pub fn tick(&mut self, display: &mut Frame, fonts: &FontLibrary) {
        // Stir the generator so back-to-back random transitions vary
        // with tick timing.
        self.rng.next();
        if self.is_idle() {
            return;
        }
        self.countdown -= 1;
        if self.countdown > 0 {
            return;
        }
        self.countdown = self.interval;

        let done = match &mut self.state {
            State::Idle => false,
            State::Running { effect, src, step } => {
                let effect = *effect;
                let done = advance(effect, src, *step, display);
                *step += 1;
                if done {
                    tracing::debug!(effect = ?effect, "transition complete");
                }
                done
            }
            State::ScrollingText(ts) => {
                display.shift_left();
                let mask = strip_column(fonts, ts.font, &ts.text, ts.offset);
                let last = display.width().saturating_sub(1);
                display.draw_column(last, mask, ts.color, false);
                ts.offset += 1;
                if ts.offset >= ts.total + display.width() {
                    if ts.repeat {
                        ts.offset = 0;
                        false
                    } else {
                        true
                    }
                } else {
                    false
                }
            }
        };
        if done {
            self.state = State::Idle;
        }
    }
}

impl Default for TransitionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Steps needed to complete `effect` on a display `width` wide.
fn total_steps(effect: TransitionEffect, width: usize) -> usize {
    match effect {
        TransitionEffect::None | TransitionEffect::Random => 0,
        TransitionEffect::ScrollLeft
        | TransitionEffect::ScrollRight
        | TransitionEffect::WipeLeft
        | TransitionEffect::WipeRight => width,
        TransitionEffect::ScrollUp | TransitionEffect::ScrollDown => ROWS,
        TransitionEffect::WipeLeftRight => width.div_ceil(2),
        TransitionEffect::WipeUpDown => ROWS / 2,
        TransitionEffect::WipeUp | TransitionEffect::WipeDown => ROWS,
    }
}

/// Performs step number `step` (0-based) of `effect`; returns true
/// when the traversal is complete.
fn advance(effect: TransitionEffect, src: &Frame, step: usize, display: &mut Frame) -> bool {
    let width = display.width();
    match effect {
        TransitionEffect::None | TransitionEffect::Random => true,
        TransitionEffect::ScrollLeft => {
            display.shift_left();
            display.copy_column_from(src, step, width - 1);
            step + 1 >= width
        }
        TransitionEffect::ScrollRight => {
            display.shift_right();
            display.copy_column_from(src, width - 1 - step, 0);
            step + 1 >= width
        }
        TransitionEffect::ScrollUp => {
            display.shift_up();
            display.copy_row_from(src, step, ROWS - 1);
            step + 1 >= ROWS
        }
        TransitionEffect::ScrollDown => {
            display.shift_down();
            display.copy_row_from(src, ROWS - 1 - step, 0);
            step + 1 >= ROWS
        }
        TransitionEffect::WipeLeft => {
            display.copy_column_from(src, width - 1 - step, width - 1 - step);
            step + 1 >= width
        }
        TransitionEffect::WipeRight => {
            display.copy_column_from(src, step, step);
            step + 1 >= width
        }
        TransitionEffect::WipeUp => {
            display.copy_row_from(src, ROWS - 1 - step, ROWS - 1 - step);
            step + 1 >= ROWS
        }
        TransitionEffect::WipeDown => {
            display.copy_row_from(src, step, step);
            step + 1 >= ROWS
        }
        TransitionEffect::WipeLeftRight => {
            display.copy_column_from(src, step, step);
            display.copy_column_from(src, width - 1 - step, width - 1 - step);
            (step + 1) * 2 >= width
        }
        TransitionEffect::WipeUpDown => {
            display.copy_row_from(src, step, step);
            display.copy_row_from(src, ROWS - 1 - step, ROWS - 1 - step);
            (step + 1) * 2 >= ROWS
        }
    }
}

/// Regenerates one column of the virtual text strip: glyph columns in
/// order, each followed by its spacing gap. Columns past the end of
/// the text (and in-gap columns) are blank. In-text formatting codes
/// are zero-width here, so they simply never produce a column.
fn strip_column(fonts: &FontLibrary, font: u8, text: &[u8], x: usize) -> u8 {
    let mut x = x;
    for &cp in text {
        let Some(glyph) = fonts.glyph(font, cp) else {
            continue;
        };
        if x < glyph.width as usize {
            return fonts.column(font, glyph.offset + x as u32);
        }
        if x < glyph.advance() {
            return 0; // spacing gap
        }
        x -= glyph.advance();
    }
    0
}
