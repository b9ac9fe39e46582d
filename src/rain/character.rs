use glam::{Vec3, Vec4};

use super::glyphs::GlyphIndex;

/// Where a trailing character sits on its fade curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadePhase {
    Bright,
    Fading,
    Dead,
}

/// One glyph of a streak with its timed brightness.
///
/// Trailing characters count `lifetime` down to zero. While `lifetime` exceeds
/// `fade_time` they stay fully lit, then dim linearly. Heads ignore the clock
/// and stay at full brightness until they are turned into trailing characters.
#[derive(Clone, Debug)]
pub struct CharacterInstance {
    pub glyph: GlyphIndex,
    pub color: Vec4,
    pub scale: f32,
    /// Absolute position in viewport pixels, `z` mirroring the streak depth.
    pub offset: Vec3,
    brightness: f32,
    is_head: bool,
    lifetime: f32,
    fade_time: f32,
}

impl CharacterInstance {
    pub fn head(glyph: GlyphIndex, color: Vec4, scale: f32, offset: Vec3, fade_time: f32) -> Self {
        Self {
            glyph,
            color,
            scale,
            offset,
            brightness: 1.0,
            is_head: true,
            lifetime: 0.0,
            fade_time: fade_time.max(0.0),
        }
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn is_head(&self) -> bool {
        self.is_head
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    pub fn fade_time(&self) -> f32 {
        self.fade_time
    }

    pub fn phase(&self) -> FadePhase {
        if self.is_head || self.lifetime > self.fade_time {
            FadePhase::Bright
        } else if self.lifetime > 0.0 {
            FadePhase::Fading
        } else {
            FadePhase::Dead
        }
    }

    /// Ends head status: the character takes `color` and starts counting down
    /// from `lifetime`.
    pub fn make_trailing(&mut self, color: Vec4, lifetime: f32) {
        self.is_head = false;
        self.color = color;
        self.lifetime = if lifetime.is_finite() {
            lifetime.max(0.0)
        } else {
            0.0
        };
        self.brightness = self.brightness_for_lifetime();
    }

    /// Swaps the glyph without touching the fade clock.
    pub fn set_glyph(&mut self, glyph: GlyphIndex) {
        self.glyph = glyph;
    }

    pub fn update(&mut self, dt: f32) {
        if self.is_head {
            self.brightness = 1.0;
            return;
        }
        if dt.is_finite() && dt > 0.0 {
            self.lifetime = (self.lifetime - dt).max(0.0);
        }
        self.brightness = self.brightness_for_lifetime();
    }

    fn brightness_for_lifetime(&self) -> f32 {
        match self.phase() {
            FadePhase::Bright => 1.0,
            FadePhase::Fading => (self.lifetime / self.fade_time).clamp(0.0, 1.0),
            FadePhase::Dead => 0.0,
        }
    }
}
