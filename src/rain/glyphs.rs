//! Shared glyph registry and colour palette.
//!
//! A single `GlyphSet` is built up front and handed to the animation system
//! behind an `Arc`; streaks borrow it for glyph draws and mutations. Glyphs are
//! addressed by index so a renderer can map them onto atlas cells.

use glam::Vec4;
use rand::Rng;

pub type GlyphIndex = u16;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub head: Vec4,
    pub trail: Vec4,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            head: Vec4::new(0.85, 1.0, 0.85, 1.0),
            trail: Vec4::new(0.0, 0.9, 0.25, 1.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GlyphSet {
    glyphs: Vec<char>,
    palette: Palette,
}

impl GlyphSet {
    /// Builds a set from `glyphs`; an empty list falls back to ASCII digits.
    pub fn new(glyphs: impl IntoIterator<Item = char>, palette: Palette) -> Self {
        let mut glyphs: Vec<char> = glyphs
            .into_iter()
            .take(GlyphIndex::MAX as usize)
            .collect();
        if glyphs.is_empty() {
            glyphs = ('0'..='9').collect();
        }
        Self { glyphs, palette }
    }

    /// Half-width katakana, digits and a few symbols.
    pub fn katakana(palette: Palette) -> Self {
        let kana = (0xFF66u32..=0xFF9D).filter_map(char::from_u32);
        let digits = '0'..='9';
        let symbols = [':', '.', '"', '=', '*', '+', '-', '<', '>', '|'];
        Self::new(kana.chain(digits).chain(symbols), palette)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyph(&self, index: GlyphIndex) -> Option<char> {
        self.glyphs.get(index as usize).copied()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn head_color(&self) -> Vec4 {
        self.palette.head
    }

    pub fn trail_color(&self) -> Vec4 {
        self.palette.trail
    }

    pub fn random_index<R: Rng + ?Sized>(&self, rng: &mut R) -> GlyphIndex {
        rng.random_range(0..self.glyphs.len()) as GlyphIndex
    }
}

impl Default for GlyphSet {
    fn default() -> Self {
        Self::katakana(Palette::default())
    }
}
