//! Density knob: maps a percentage of the viewport's column capacity to a
//! target streak count.

use super::viewport::Viewport;

/// Step applied by `increase_level` / `decrease_level`, in percent.
pub const DENSITY_STEP: f32 = 5.0;

/// Streaks at different depths may share a screen column; each column hosts
/// up to this many depth layers.
pub const DEPTH_LAYERS: usize = 8;

#[derive(Clone, Debug)]
pub struct DensityController {
    percentage: f32,
    character_width: f32,
}

impl DensityController {
    pub fn new(character_width: f32, percentage: f32) -> Self {
        let mut ctl = Self {
            percentage: 0.0,
            character_width,
        };
        ctl.set_percentage(percentage);
        ctl
    }

    pub fn percentage(&self) -> f32 {
        self.percentage
    }

    pub fn character_width(&self) -> f32 {
        self.character_width
    }

    pub fn set_percentage(&mut self, percentage: f32) {
        if !percentage.is_finite() {
            return;
        }
        self.percentage = percentage.clamp(0.0, 100.0);
    }

    pub fn increase_level(&mut self) {
        self.set_percentage(self.percentage + DENSITY_STEP);
    }

    pub fn decrease_level(&mut self) {
        self.set_percentage(self.percentage - DENSITY_STEP);
    }

    /// Streaks per depth layer are capped at half the column count so that
    /// neighbouring columns in one layer never both host a streak.
    pub fn streaks_per_layer(&self, viewport: &Viewport) -> usize {
        if viewport.is_degenerate() || !(self.character_width > 0.0) {
            return 0;
        }
        (viewport.width / self.character_width / 2.0).floor() as usize
    }

    pub fn max_possible_streaks(&self, viewport: &Viewport) -> usize {
        self.streaks_per_layer(viewport) * DEPTH_LAYERS
    }

    /// Never below one, so a fully lowered knob still shows a single streak.
    pub fn target_streak_count(&self, viewport: &Viewport) -> usize {
        let max = self.max_possible_streaks(viewport) as f32;
        let target = (max * self.percentage / 100.0).floor() as usize;
        target.max(1)
    }

    pub fn should_spawn_streak(&self, active_count: usize, viewport: &Viewport) -> bool {
        active_count < self.target_streak_count(viewport)
    }
}
