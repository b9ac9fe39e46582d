//! One falling column of glyphs.
//!
//! A streak drops its head one cell per `drop_interval`. Every drop turns the
//! previous head into a trailing character whose fade clock is staggered by its
//! position, so the tail dims first. Once the head leaves the bottom of the
//! viewport the streak stops growing and waits for its characters to fade out.

use glam::Vec3;
use rand::Rng;

use super::character::CharacterInstance;
use super::glyphs::GlyphSet;
use super::{MAX_DEPTH, wrap_depth};
use crate::config::StreakConfig;

const MIN_DROP_INTERVAL: f32 = 1e-3;
const MIN_SPACING: f32 = 1.0;
/// Glyph scale at the far end of depth space.
const FAR_SCALE: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreakState {
    Growing,
    FadingAtBottom,
    Empty,
}

#[derive(Clone, Debug)]
pub struct CharacterStreak {
    id: u64,
    position: Vec3,
    velocity: Vec3,
    /// Tail first, head last.
    characters: Vec<CharacterInstance>,
    base_drop_interval: f32,
    drop_interval: f32,
    drop_timer: f32,
    max_length: usize,
    fading: bool,
    character_spacing: f32,
    fade_time: f32,
    mutation_probability: f32,
    scale: f32,
}

/// Farther streaks fall faster.
pub fn depth_speed_scale(z: f32, gain: f32) -> f32 {
    1.0 + gain.max(0.0) * (z / MAX_DEPTH).clamp(0.0, 1.0)
}

pub fn depth_scale(z: f32) -> f32 {
    1.0 - (1.0 - FAR_SCALE) * (z / MAX_DEPTH).clamp(0.0, 1.0)
}

/// Animation speed percent as a drop-rate multiplier.
pub fn speed_factor(percent: f32) -> f32 {
    if percent.is_finite() {
        (percent / 100.0).max(0.01)
    } else {
        1.0
    }
}

impl CharacterStreak {
    pub fn spawn<R: Rng + ?Sized>(
        id: u64,
        position: Vec3,
        config: &StreakConfig,
        speed: f32,
        glyphs: &GlyphSet,
        rng: &mut R,
    ) -> Self {
        let z = wrap_depth(position.z);
        let position = Vec3::new(position.x, position.y, z);
        let (min_len, max_len) = config.length_range();
        let max_length = rng.random_range(min_len..=max_len);
        let base_drop_interval = config.base_drop_interval.max(MIN_DROP_INTERVAL)
            / depth_speed_scale(z, config.depth_speed_gain);
        let character_spacing = config.character_spacing.max(MIN_SPACING);
        let scale = depth_scale(z);

        let head = CharacterInstance::head(
            glyphs.random_index(rng),
            glyphs.head_color(),
            scale,
            position,
            config.fade_time,
        );

        let mut streak = Self {
            id,
            position,
            velocity: Vec3::ZERO,
            characters: vec![head],
            base_drop_interval,
            drop_interval: base_drop_interval,
            drop_timer: 0.0,
            max_length,
            fading: false,
            character_spacing,
            fade_time: config.fade_time.max(0.0),
            mutation_probability: config.mutation_probability.max(0.0),
            scale,
        };
        streak.set_speed_factor(speed);
        streak
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Head position; `z` is depth.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Nominal fall speed in pixels per second. Motion itself is discrete.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn depth(&self) -> f32 {
        self.position.z
    }

    pub fn characters(&self) -> &[CharacterInstance] {
        &self.characters
    }

    pub fn head(&self) -> Option<&CharacterInstance> {
        self.characters.last().filter(|c| c.is_head())
    }

    pub fn drop_interval(&self) -> f32 {
        self.drop_interval
    }

    pub fn base_drop_interval(&self) -> f32 {
        self.base_drop_interval
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn character_spacing(&self) -> f32 {
        self.character_spacing
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_fading(&self) -> bool {
        self.fading
    }

    pub fn state(&self) -> StreakState {
        if self.characters.is_empty() {
            StreakState::Empty
        } else if self.fading {
            StreakState::FadingAtBottom
        } else {
            StreakState::Growing
        }
    }

    pub fn should_despawn(&self) -> bool {
        self.characters.is_empty()
    }

    /// Still extending with its head inside `[0, viewport_height)`.
    pub fn has_active_head(&self, viewport_height: f32) -> bool {
        !self.fading
            && self.head().is_some()
            && self.position.y >= 0.0
            && self.position.y < viewport_height
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        viewport_height: f32,
        glyphs: &GlyphSet,
        rng: &mut R,
    ) {
        if self.characters.is_empty() {
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.drop_timer += dt;
        if self.drop_timer >= self.drop_interval {
            // One cell per frame at most; a stalled frame does not replay drops.
            self.drop_timer = (self.drop_timer - self.drop_interval).min(self.drop_interval);
            self.advance(viewport_height, glyphs, rng);
        }

        for c in self.characters.iter_mut() {
            c.update(dt);
        }
        self.mutate(dt, glyphs, rng);
        self.prune();
    }

    fn advance<R: Rng + ?Sized>(&mut self, viewport_height: f32, glyphs: &GlyphSet, rng: &mut R) {
        if self.fading {
            return;
        }
        self.retire_head(glyphs);
        if self.position.y < viewport_height {
            self.position.y += self.character_spacing;
            self.characters.push(CharacterInstance::head(
                glyphs.random_index(rng),
                glyphs.head_color(),
                self.scale,
                self.position,
                self.fade_time,
            ));
        } else {
            self.fading = true;
        }
    }

    fn retire_head(&mut self, glyphs: &GlyphSet) {
        let index = self.characters.len().saturating_sub(1) as f32;
        let lifetime = index * self.drop_interval + self.fade_time;
        if let Some(head) = self.characters.last_mut().filter(|c| c.is_head()) {
            head.make_trailing(glyphs.trail_color(), lifetime);
        }
    }

    fn mutate<R: Rng + ?Sized>(&mut self, dt: f32, glyphs: &GlyphSet, rng: &mut R) {
        let p = self.mutation_probability * dt;
        if p <= 0.0 {
            return;
        }
        for c in self.characters.iter_mut().filter(|c| !c.is_head()) {
            if rng.random::<f32>() < p {
                c.set_glyph(glyphs.random_index(rng));
            }
        }
    }

    /// Drops dark characters from both ends. The tail usually empties first,
    /// but the character retired at the bottom can outlive or precede it.
    fn prune(&mut self) {
        let dead = |c: &CharacterInstance| !c.is_head() && c.brightness() <= 0.0;
        let front = self.characters.iter().take_while(|&c| dead(c)).count();
        self.characters.drain(..front);
        while self.characters.last().is_some_and(dead) {
            self.characters.pop();
        }
    }

    pub fn set_speed_factor(&mut self, factor: f32) {
        let factor = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            1.0
        };
        self.drop_interval = (self.base_drop_interval / factor).max(MIN_DROP_INTERVAL);
        self.velocity = Vec3::new(0.0, self.character_spacing / self.drop_interval, 0.0);
    }

    pub fn set_depth(&mut self, z: f32) {
        let z = wrap_depth(z);
        self.position.z = z;
        self.scale = depth_scale(z);
        for c in self.characters.iter_mut() {
            c.offset.z = z;
            c.scale = self.scale;
        }
    }

    /// Whole rows between each character and the head position.
    fn rows_behind_head(&self) -> Vec<f32> {
        self.characters
            .iter()
            .map(|c| ((self.position.y - c.offset.y) / self.character_spacing).round())
            .collect()
    }

    fn place_rows(&mut self, rows: &[f32]) {
        for (c, row) in self.characters.iter_mut().zip(rows) {
            c.offset.x = self.position.x;
            c.offset.y = self.position.y - row * self.character_spacing;
        }
    }

    /// Scales the head position by `(scale_x, scale_y)`, shifts it by
    /// `jitter_x` and rebuilds every character offset at uniform spacing.
    pub fn rescale_positions(&mut self, scale_x: f32, scale_y: f32, jitter_x: f32) {
        if !(scale_x.is_finite() && scale_y.is_finite()) || scale_x <= 0.0 || scale_y <= 0.0 {
            return;
        }
        let jitter_x = if jitter_x.is_finite() { jitter_x } else { 0.0 };
        let rows = self.rows_behind_head();
        self.position.x = self.position.x * scale_x + jitter_x;
        self.position.y *= scale_y;
        self.place_rows(&rows);
    }

    pub fn set_character_spacing(&mut self, spacing: f32) {
        if !spacing.is_finite() {
            return;
        }
        let rows = self.rows_behind_head();
        self.character_spacing = spacing.max(MIN_SPACING);
        self.place_rows(&rows);
        self.velocity = Vec3::new(0.0, self.character_spacing / self.drop_interval, 0.0);
    }
}
