//! Image and display frame buffers.
//!
//! A frame is a stack of bit planes, one byte per column per plane,
//! with bit 0 as the top pixel row. RGB models carry four planes
//! (red, green, blue, flash); monochrome models carry two (on, flash).
//!
//! Drawing primitives only ever touch the *image* buffer; the
//! transition engine is the sole writer of the *display* buffer. That
//! split is what lets transitions animate without tearing.

use crate::color::Color;
use crate::font::FontLibrary;
use crate::hardware::{HardwareSpec, ROWS};

/// One frame of plane data.
///
/// Out-of-range column arguments are a caller contract violation: the
/// dispatcher validates ranges before drawing, so these primitives
/// `debug_assert!` and clip silently in release builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    depth: usize,
    planes: Vec<Vec<u8>>,
}

impl Frame {
    /// Creates a blank frame. A zero width or depth yields an inert
    /// frame whose operations are all no-ops (matrix-less models).
    pub fn new(width: usize, depth: usize) -> Self {
        Self {
            width,
            depth,
            planes: vec![vec![0; width]; depth],
        }
    }

    /// Frame shaped for the given hardware.
    pub fn for_hardware(hw: &HardwareSpec) -> Self {
        Self::new(hw.columns, hw.depth())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Index of the flash plane (the last plane).
    fn flash_plane(&self) -> usize {
        self.depth.saturating_sub(1)
    }

    /// Sets every cell of every plane to zero.
    pub fn clear(&mut self) {
        for plane in &mut self.planes {
            plane.fill(0);
        }
    }

    /// True if no pixel is lit in any plane.
    pub fn is_blank(&self) -> bool {
        self.planes.iter().all(|p| p.iter().all(|&b| b == 0))
    }

    /// Reads one plane's column byte. Out-of-range reads are blank.
    pub fn plane_column(&self, plane: usize, col: usize) -> u8 {
        self.planes
            .get(plane)
            .and_then(|p| p.get(col))
            .copied()
            .unwrap_or(0)
    }

    /// Writes raw bits into one plane's column.
    pub fn set_plane_column(&mut self, plane: usize, col: usize, bits: u8, merge: bool) {
        debug_assert!(col < self.width || self.width == 0, "column {col} out of range");
        if let Some(cell) = self.planes.get_mut(plane).and_then(|p| p.get_mut(col)) {
            if merge {
                *cell |= bits;
            } else {
                *cell = bits;
            }
        }
    }

    /// Paints a pixel mask into one column in the given color.
    ///
    /// The mask lands in each plane the color selects. The flash plane
    /// is only written where color planes are also written, so the
    /// flashing bit never appears alone. With `merge` false the whole
    /// column is replaced.
    pub fn draw_column(&mut self, col: usize, mask: u8, color: Color, merge: bool) {
        debug_assert!(col < self.width || self.width == 0, "column {col} out of range");
        if col >= self.width || self.depth == 0 {
            return;
        }
        let flash = self.flash_plane();
        for plane in 0..self.depth {
            let selected = if plane == flash {
                color.flashing() && color.visible()
            } else if self.depth == 2 {
                color.visible()
            } else {
                color.rgb_bits() & (1 << plane) != 0
            };
            let bits = if selected { mask } else { 0 };
            if merge {
                self.planes[plane][col] |= bits;
            } else {
                self.planes[plane][col] = bits;
            }
        }
    }

    /// Plane membership of a single pixel, as a bitmask of plane
    /// indexes (bit 0 set means plane 0 is lit there).
    pub fn pixel(&self, col: usize, row: usize) -> u8 {
        let mut bits = 0;
        for plane in 0..self.depth {
            if self.plane_column(plane, col) >> row & 1 != 0 {
                bits |= 1 << plane;
            }
        }
        bits
    }

    /// Shifts every column one position toward index 0, discarding
    /// column 0 and blanking the rightmost column.
    pub fn shift_left(&mut self) {
        for plane in &mut self.planes {
            if plane.is_empty() {
                continue;
            }
            plane.rotate_left(1);
            if let Some(last) = plane.last_mut() {
                *last = 0;
            }
        }
    }

    /// Shifts every column one position away from index 0, discarding
    /// the rightmost column and blanking column 0.
    pub fn shift_right(&mut self) {
        for plane in &mut self.planes {
            if plane.is_empty() {
                continue;
            }
            plane.rotate_right(1);
            plane[0] = 0;
        }
    }

    /// Shifts every row one position toward the top, discarding the
    /// top row and blanking the bottom row.
    pub fn shift_up(&mut self) {
        for plane in &mut self.planes {
            for cell in plane.iter_mut() {
                *cell >>= 1;
            }
        }
    }

    /// Shifts every row one position toward the bottom, discarding the
    /// bottom row and blanking the top row.
    pub fn shift_down(&mut self) {
        for plane in &mut self.planes {
            for cell in plane.iter_mut() {
                *cell <<= 1;
            }
        }
    }

    /// Replaces this frame's contents with `src`'s.
    pub fn copy_from(&mut self, src: &Frame) {
        debug_assert_eq!((self.width, self.depth), (src.width, src.depth));
        for (dst, sp) in self.planes.iter_mut().zip(&src.planes) {
            dst.copy_from_slice(sp);
        }
    }

    /// Copies one column of `src` into a column of this frame.
    pub fn copy_column_from(&mut self, src: &Frame, src_col: usize, dst_col: usize) {
        for plane in 0..self.depth {
            let bits = src.plane_column(plane, src_col);
            self.set_plane_column(plane, dst_col, bits, false);
        }
    }

    /// Copies one row of `src` into a row of this frame.
    pub fn copy_row_from(&mut self, src: &Frame, src_row: usize, dst_row: usize) {
        let dst_bit = 1u8 << dst_row;
        for plane in 0..self.depth {
            for col in 0..self.width {
                let lit = src.plane_column(plane, col) >> src_row & 1 != 0;
                let cell = &mut self.planes[plane][col];
                if lit {
                    *cell |= dst_bit;
                } else {
                    *cell &= !dst_bit;
                }
            }
        }
    }

    /// Paints one glyph starting at `col`, returning its pixel width
    /// (0, with no mutation, when the glyph is not found).
    pub fn draw_character(
        &mut self,
        fonts: &FontLibrary,
        font: u8,
        codepoint: u8,
        col: usize,
        color: Color,
        merge: bool,
    ) -> usize {
        let Some(glyph) = fonts.glyph(font, codepoint) else {
            return 0;
        };
        for i in 0..glyph.width as usize {
            let target = col + i;
            if target >= self.width {
                break; // clip at the right edge
            }
            let mask = fonts.column(font, glyph.offset + i as u32);
            self.draw_column(target, mask, color, merge);
        }
        glyph.width as usize
    }

    /// Renders a string starting at `start_col`, advancing by each
    /// glyph's width plus spacing. Returns the total advance, which is
    /// also used to pre-size scrolling text.
    pub fn render_text(
        &mut self,
        fonts: &FontLibrary,
        font: u8,
        text: &[u8],
        start_col: usize,
        color: Color,
        merge: bool,
    ) -> usize {
        let mut advance = 0;
        for &cp in text {
            let Some(glyph) = fonts.glyph(font, cp) else {
                continue;
            };
            self.draw_character(fonts, font, cp, start_col + advance, color, merge);
            advance += glyph.advance();
        }
        advance
    }

    /// Renders the frame as ASCII art, one string per row.
    ///
    /// RGB frames use `.RGYBMCW` (lowercase for flashing pixels),
    /// monochrome frames use `.` / `@` / `#` (flashing).
    pub fn sketch(&self) -> Vec<String> {
        const CODES: &[u8; 16] = b".RGYBMCW.rgybmcw";
        let mut rows = Vec::with_capacity(ROWS);
        for row in 0..ROWS {
            let mut line = String::with_capacity(self.width);
            for col in 0..self.width {
                let bits = self.pixel(col, row);
                let ch = match self.depth {
                    2 => match bits {
                        0 => '.',
                        0b01 => '@',
                        _ => '#',
                    },
                    4 => CODES[bits as usize] as char,
                    _ => '.',
                };
                line.push(ch);
            }
            rows.push(line);
        }
        rows
    }
}

/// The image buffer (what should be shown next) and the display buffer
/// (what the hardware is scanning out right now).
#[derive(Debug, Clone)]
pub struct FrameStore {
    pub image: Frame,
    pub display: Frame,
}

impl FrameStore {
    pub fn new(hw: &HardwareSpec) -> Self {
        Self {
            image: Frame::for_hardware(hw),
            display: Frame::for_hardware(hw),
        }
    }
}
