//! Font service: maps (font index, codepoint) to glyph metrics and
//! bitmap columns.
//!
//! Glyph cells are stored fixed-pitch in the bitmap tables; the
//! proportional width and the offset of each glyph's first used column
//! are computed once when the library is built. Lookup is pure: a font
//! index beyond the compiled count or an unmapped codepoint yields
//! `None` and the caller skips the character.

mod data;

/// Columns stored per glyph cell in the bitmap tables.
const CELL_COLUMNS: usize = 5;

/// Inter-glyph spacing in pixels, applied after every glyph.
const GLYPH_SPACING: u8 = 1;

/// Advance width used for glyphs whose cell is entirely blank (space).
const BLANK_WIDTH: u8 = 3;

/// Metrics for one glyph: proportional width, trailing spacing, and
/// the offset of its first column in the font's bitmap table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub width: u8,
    pub spacing: u8,
    pub offset: u32,
}

impl Glyph {
    /// Total horizontal advance of this glyph.
    pub fn advance(&self) -> usize {
        self.width as usize + self.spacing as usize
    }
}

struct Font {
    first: u8,
    glyphs: Vec<Glyph>,
    bitmap: &'static [u8],
}

impl Font {
    /// Derives proportional metrics from a fixed-pitch cell table.
    fn from_cells(first: u8, bitmap: &'static [u8]) -> Self {
        let mut glyphs = Vec::with_capacity(bitmap.len() / CELL_COLUMNS);
        for (index, cell) in bitmap.chunks_exact(CELL_COLUMNS).enumerate() {
            let leading = cell.iter().take_while(|&&c| c == 0).count();
            if leading == CELL_COLUMNS {
                // Blank cell: keep a fixed advance, no columns to paint.
                glyphs.push(Glyph {
                    width: BLANK_WIDTH,
                    spacing: GLYPH_SPACING,
                    offset: (index * CELL_COLUMNS) as u32,
                });
                continue;
            }
            let trailing = cell.iter().rev().take_while(|&&c| c == 0).count();
            glyphs.push(Glyph {
                width: (CELL_COLUMNS - leading - trailing) as u8,
                spacing: GLYPH_SPACING,
                offset: (index * CELL_COLUMNS + leading) as u32,
            });
        }
        Self {
            first,
            glyphs,
            bitmap,
        }
    }

    fn glyph(&self, codepoint: u8) -> Option<Glyph> {
        let index = codepoint.checked_sub(self.first)? as usize;
        self.glyphs.get(index).copied()
    }
}

/// The set of fonts compiled into this firmware build.
pub struct FontLibrary {
    fonts: Vec<Font>,
}

impl FontLibrary {
    /// Builds the standard library: font 0 is the full ASCII face,
    /// font 1 the tall digits face.
    pub fn standard() -> Self {
        Self {
            fonts: vec![
                Font::from_cells(data::STANDARD_FIRST, data::STANDARD_BITMAP),
                Font::from_cells(data::DIGITS_FIRST, data::DIGITS_BITMAP),
            ],
        }
    }

    /// Number of compiled fonts.
    pub fn count(&self) -> u8 {
        self.fonts.len() as u8
    }

    /// Looks up glyph metrics. `None` for an out-of-range font index
    /// or an unmapped codepoint.
    pub fn glyph(&self, font: u8, codepoint: u8) -> Option<Glyph> {
        self.fonts.get(font as usize)?.glyph(codepoint)
    }

    /// Reads one bitmap column (bit 0 = top row). Out-of-range offsets
    /// read as a blank column.
    pub fn column(&self, font: u8, offset: u32) -> u8 {
        self.fonts
            .get(font as usize)
            .and_then(|f| f.bitmap.get(offset as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Total pixel width of `text` in `font`. Unresolved codepoints
    /// contribute nothing.
    pub fn text_width(&self, font: u8, text: &[u8]) -> usize {
        text.iter()
            .filter_map(|&cp| self.glyph(font, cp))
            .map(|g| g.advance())
            .sum()
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::standard()
    }
}
