//! Per-frame orchestration of the streak population.

use std::sync::Arc;

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::density::DensityController;
use super::glyphs::GlyphSet;
use super::streak::{CharacterStreak, speed_factor};
use super::viewport::Viewport;
use super::{MAX_DEPTH, wrap_depth};
use crate::config::{AppConfig, StreakConfig};

/// Surplus of active heads tolerated before culling.
pub const HYSTERESIS_BAND: usize = 5;
/// Target growth between frames above which the deficit fills the whole view.
pub const BURST_THRESHOLD: usize = 10;
/// Horizontal jitter bound applied to streaks when the viewport width changes.
pub const MAX_X_JITTER: f32 = 16.0;

/// Aggregate counts for a statistics overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub streaks: usize,
    pub active_heads: usize,
    pub target: usize,
    pub characters: usize,
}

#[derive(Clone, Debug)]
struct Stage {
    viewport: Viewport,
    density: DensityController,
}

pub struct AnimationSystem {
    streaks: Vec<CharacterStreak>,
    stage: Option<Stage>,
    glyphs: Arc<GlyphSet>,
    streak_config: StreakConfig,
    rng: SmallRng,
    zoom_velocity: f32,
    speed_percent: f32,
    previous_target: usize,
    next_id: u64,
    frame: u64,
    // Reused across frames by the cull pass.
    cull_candidates: Vec<(usize, f32)>,
    cull_indices: Vec<usize>,
}

impl AnimationSystem {
    pub fn new(glyphs: Arc<GlyphSet>, streak_config: StreakConfig, rng: SmallRng) -> Self {
        Self {
            streaks: Vec::new(),
            stage: None,
            glyphs,
            streak_config,
            rng,
            zoom_velocity: 0.0,
            speed_percent: 100.0,
            previous_target: 0,
            next_id: 0,
            frame: 0,
            cull_candidates: Vec::new(),
            cull_indices: Vec::new(),
        }
    }

    /// Seeded systems replay identically; `None` draws a seed from OS entropy.
    pub fn seeded(glyphs: Arc<GlyphSet>, streak_config: StreakConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        Self::new(glyphs, streak_config, rng)
    }

    /// Builds and initializes a system from a full application config.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let glyphs = Arc::new(GlyphSet::katakana(cfg.streak.palette()));
        let mut system = Self::seeded(glyphs, cfg.streak.clone(), cfg.animation.seed);
        system.set_zoom_velocity(cfg.animation.zoom_velocity);
        system.set_animation_speed(cfg.animation.speed_percent);
        system.initialize(
            Viewport::new(cfg.viewport.width, cfg.viewport.height),
            DensityController::new(cfg.density.character_width, cfg.density.percentage),
        );
        system
    }

    /// Binds the viewport and density knob and fills the whole view, top to
    /// bottom, with the target population.
    pub fn initialize(&mut self, viewport: Viewport, density: DensityController) {
        self.streaks.clear();
        let target = density.target_streak_count(&viewport);
        self.stage = Some(Stage { viewport, density });
        self.previous_target = target;
        if viewport.is_degenerate() {
            info!(
                target: "rain::population",
                width = viewport.width,
                height = viewport.height,
                "initialized with degenerate viewport; spawning deferred"
            );
            return;
        }
        for _ in 0..target {
            self.spawn_in_view(&viewport);
        }
        info!(
            target: "rain::population",
            streaks = self.streaks.len(),
            width = viewport.width,
            height = viewport.height,
            "initialized"
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.stage.is_some()
    }

    pub fn update(&mut self, dt: f32) {
        let Some(viewport) = self.stage.as_ref().map(|s| s.viewport) else {
            return;
        };
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        for s in self.streaks.iter_mut() {
            s.update(dt, viewport.height, &self.glyphs, &mut self.rng);
        }

        self.apply_zoom(dt);

        let before = self.streaks.len();
        self.streaks.retain(|s| !s.should_despawn());
        let removed = before - self.streaks.len();
        if removed > 0 {
            debug!(
                target: "rain::population",
                removed,
                remaining = self.streaks.len(),
                "despawned empty streaks"
            );
        }

        if !viewport.is_degenerate() {
            self.reconcile(&viewport);
        }
        self.frame += 1;
    }

    fn reconcile(&mut self, viewport: &Viewport) {
        let Some(density) = self.stage.as_ref().map(|s| s.density.clone()) else {
            return;
        };
        let active = self.count_active_heads(viewport.height);
        let target = density.target_streak_count(viewport);

        if active > target + HYSTERESIS_BAND {
            self.cull_farthest(active - target, viewport.height);
        } else if density.should_spawn_streak(active, viewport) {
            let deficit = target - active;
            let burst = target > self.previous_target + BURST_THRESHOLD && active > 0;
            for _ in 0..deficit {
                if burst {
                    self.spawn_in_view(viewport);
                } else {
                    self.spawn_at_top(viewport);
                }
            }
            debug!(
                target: "rain::population",
                deficit,
                wanted = target,
                burst,
                "spawned streaks"
            );
        }
        self.previous_target = target;
    }

    /// Removes `count` active-head streaks, farthest first.
    fn cull_farthest(&mut self, count: usize, viewport_height: f32) {
        self.cull_candidates.clear();
        self.cull_candidates.extend(
            self.streaks
                .iter()
                .enumerate()
                .filter(|(_, s)| s.has_active_head(viewport_height))
                .map(|(i, s)| (i, s.depth())),
        );
        self.cull_candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        self.cull_indices.clear();
        self.cull_indices
            .extend(self.cull_candidates.iter().take(count).map(|&(i, _)| i));
        // Single compaction pass over the marked indices.
        self.cull_indices.sort_unstable();
        let marked = &self.cull_indices;
        let mut index = 0;
        let mut cursor = 0;
        self.streaks.retain(|_| {
            let culled = marked.get(cursor) == Some(&index);
            if culled {
                cursor += 1;
            }
            index += 1;
            !culled
        });
        debug!(
            target: "rain::population",
            culled = self.cull_indices.len(),
            remaining = self.streaks.len(),
            "culled farthest streaks"
        );
    }

    /// Moves every streak toward the camera, wrapping depth into `[0, MAX_DEPTH)`.
    pub fn apply_zoom(&mut self, dt: f32) {
        if !dt.is_finite() || self.zoom_velocity == 0.0 {
            return;
        }
        let step = self.zoom_velocity * dt;
        for s in self.streaks.iter_mut() {
            s.set_depth(s.depth() - step);
        }
    }

    fn count_active_heads(&self, viewport_height: f32) -> usize {
        self.streaks
            .iter()
            .filter(|s| s.has_active_head(viewport_height))
            .count()
    }

    fn column_x(&mut self, viewport: &Viewport) -> f32 {
        let width = self
            .stage
            .as_ref()
            .map(|s| s.density.character_width())
            .filter(|w| *w > 0.0)
            .unwrap_or(self.streak_config.character_spacing.max(1.0));
        let columns = ((viewport.width / width).floor() as usize).max(1);
        let col = self.rng.random_range(0..columns);
        (col as f32 + 0.5) * width
    }

    fn spawn_with_y(&mut self, viewport: &Viewport, y: f32) -> u64 {
        let x = self.column_x(viewport);
        let z = self.rng.random_range(0.0..MAX_DEPTH);
        self.push_streak(Vec3::new(x, y, z))
    }

    fn push_streak(&mut self, position: Vec3) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let streak = CharacterStreak::spawn(
            id,
            position,
            &self.streak_config,
            speed_factor(self.speed_percent),
            &self.glyphs,
            &mut self.rng,
        );
        self.streaks.push(streak);
        id
    }

    /// Organic replacement: enters within the first row of the view.
    fn spawn_at_top(&mut self, viewport: &Viewport) -> u64 {
        let spacing = self.streak_config.character_spacing;
        let row = if spacing.is_finite() && spacing > 0.0 {
            spacing.min(viewport.height)
        } else {
            viewport.height
        };
        let y = self.rng.random_range(0.0..row);
        self.spawn_with_y(viewport, y)
    }

    fn spawn_in_view(&mut self, viewport: &Viewport) -> u64 {
        let y = self.rng.random_range(0.0..viewport.height);
        self.spawn_with_y(viewport, y)
    }

    /// Places a streak at an explicit head position. No-op before `initialize`.
    pub fn spawn_streak_at(&mut self, position: Vec3) -> Option<u64> {
        self.stage.as_ref()?;
        Some(self.push_streak(Vec3::new(position.x, position.y, wrap_depth(position.z))))
    }

    /// Proportionally moves every streak from the old extent into the new one.
    pub fn rescale_streaks_for_viewport(
        &mut self,
        old_width: f32,
        old_height: f32,
        new_width: f32,
        new_height: f32,
    ) {
        let dims = [old_width, old_height, new_width, new_height];
        if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return;
        }
        let scale_x = new_width / old_width;
        let scale_y = new_height / old_height;
        let jitter_width = (scale_x - 1.0).abs() > f32::EPSILON;
        for s in self.streaks.iter_mut() {
            let jitter = if jitter_width {
                self.rng.random_range(-MAX_X_JITTER..=MAX_X_JITTER)
            } else {
                0.0
            };
            s.rescale_positions(scale_x, scale_y, jitter);
        }
        info!(
            target: "rain::viewport",
            scale_x,
            scale_y,
            streaks = self.streaks.len(),
            "rescaled streaks"
        );
    }

    /// Resizes the bound viewport and rescales the live population to match.
    pub fn resize(&mut self, width: f32, height: f32) {
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        let old = stage.viewport;
        stage.viewport.resize(width, height);
        self.rescale_streaks_for_viewport(old.width, old.height, width, height);
    }

    pub fn clear_all_streaks(&mut self) {
        self.streaks.clear();
    }

    /// Applies to live streaks immediately, from each streak's base interval.
    pub fn set_animation_speed(&mut self, percent: f32) {
        if !percent.is_finite() {
            return;
        }
        self.speed_percent = percent.max(1.0);
        let factor = speed_factor(self.speed_percent);
        for s in self.streaks.iter_mut() {
            s.set_speed_factor(factor);
        }
    }

    pub fn animation_speed(&self) -> f32 {
        self.speed_percent
    }

    pub fn set_zoom_velocity(&mut self, velocity: f32) {
        if velocity.is_finite() {
            self.zoom_velocity = velocity;
        }
    }

    pub fn zoom_velocity(&self) -> f32 {
        self.zoom_velocity
    }

    pub fn set_density_percentage(&mut self, percentage: f32) {
        if let Some(stage) = self.stage.as_mut() {
            stage.density.set_percentage(percentage);
        }
    }

    pub fn increase_density(&mut self) {
        if let Some(stage) = self.stage.as_mut() {
            stage.density.increase_level();
        }
    }

    pub fn decrease_density(&mut self) {
        if let Some(stage) = self.stage.as_mut() {
            stage.density.decrease_level();
        }
    }

    pub fn streaks(&self) -> &[CharacterStreak] {
        &self.streaks
    }

    pub fn glyphs(&self) -> &Arc<GlyphSet> {
        &self.glyphs
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.stage.as_ref().map(|s| &s.viewport)
    }

    pub fn density(&self) -> Option<&DensityController> {
        self.stage.as_ref().map(|s| &s.density)
    }

    pub fn active_streak_count(&self) -> usize {
        self.streaks.len()
    }

    pub fn active_head_count(&self) -> usize {
        match self.viewport() {
            Some(vp) => self.count_active_heads(vp.height),
            None => 0,
        }
    }

    pub fn target_streak_count(&self) -> usize {
        self.stage
            .as_ref()
            .map(|s| s.density.target_streak_count(&s.viewport))
            .unwrap_or(0)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            frame: self.frame,
            streaks: self.streaks.len(),
            active_heads: self.active_head_count(),
            target: self.target_streak_count(),
            characters: self.streaks.iter().map(|s| s.characters().len()).sum(),
        }
    }

    /// Fills `out` with streak indices ordered far to near.
    pub fn draw_order(&self, out: &mut Vec<usize>) {
        out.clear();
        out.extend(0..self.streaks.len());
        out.sort_by(|&a, &b| self.streaks[b].depth().total_cmp(&self.streaks[a].depth()));
    }
}
