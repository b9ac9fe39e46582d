use glam::Vec4;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::rain::glyphs::Palette;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "ViewportConfig::default_width")]
    pub width: f32,
    #[serde(default = "ViewportConfig::default_height")]
    pub height: f32,
}

impl ViewportConfig {
    fn default_width() -> f32 {
        1920.0
    }
    fn default_height() -> f32 {
        1080.0
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DensityConfig {
    #[serde(default = "DensityConfig::default_percentage")]
    pub percentage: f32,
    #[serde(default = "DensityConfig::default_character_width")]
    pub character_width: f32,
}

impl DensityConfig {
    fn default_percentage() -> f32 {
        80.0
    }
    fn default_character_width() -> f32 {
        32.0
    }
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            percentage: Self::default_percentage(),
            character_width: Self::default_character_width(),
        }
    }
}

/// Per-streak tuning shared by every spawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default = "StreakConfig::default_min_length")]
    pub min_length: usize,
    #[serde(default = "StreakConfig::default_max_length")]
    pub max_length: usize,
    /// Seconds a trailing character takes to dim from full to dark.
    #[serde(default = "StreakConfig::default_fade_time")]
    pub fade_time: f32,
    /// Vertical distance between consecutive characters, in pixels.
    #[serde(default = "StreakConfig::default_character_spacing")]
    pub character_spacing: f32,
    /// Seconds per one-cell drop for a streak at depth zero.
    #[serde(default = "StreakConfig::default_base_drop_interval")]
    pub base_drop_interval: f32,
    /// Extra speed multiplier reached at maximum depth.
    #[serde(default = "StreakConfig::default_depth_speed_gain")]
    pub depth_speed_gain: f32,
    /// Mutations per second per trailing character.
    #[serde(default = "StreakConfig::default_mutation_probability")]
    pub mutation_probability: f32,
    #[serde(default = "StreakConfig::default_head_color")]
    pub head_color: [f32; 4],
    #[serde(default = "StreakConfig::default_trail_color")]
    pub trail_color: [f32; 4],
}

impl StreakConfig {
    fn default_min_length() -> usize {
        5
    }
    fn default_max_length() -> usize {
        30
    }
    fn default_fade_time() -> f32 {
        3.0
    }
    fn default_character_spacing() -> f32 {
        32.0
    }
    fn default_base_drop_interval() -> f32 {
        0.12
    }
    fn default_depth_speed_gain() -> f32 {
        2.0
    }
    fn default_mutation_probability() -> f32 {
        0.4
    }
    fn default_head_color() -> [f32; 4] {
        Palette::default().head.to_array()
    }
    fn default_trail_color() -> [f32; 4] {
        Palette::default().trail.to_array()
    }

    pub fn palette(&self) -> Palette {
        Palette {
            head: Vec4::from_array(self.head_color),
            trail: Vec4::from_array(self.trail_color),
        }
    }

    /// Length bounds ordered and at least one.
    pub fn length_range(&self) -> (usize, usize) {
        let lo = self.min_length.max(1);
        (lo, self.max_length.max(lo))
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            min_length: Self::default_min_length(),
            max_length: Self::default_max_length(),
            fade_time: Self::default_fade_time(),
            character_spacing: Self::default_character_spacing(),
            base_drop_interval: Self::default_base_drop_interval(),
            depth_speed_gain: Self::default_depth_speed_gain(),
            mutation_probability: Self::default_mutation_probability(),
            head_color: Self::default_head_color(),
            trail_color: Self::default_trail_color(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "AnimationConfig::default_speed_percent")]
    pub speed_percent: f32,
    /// Depth units per second the camera moves forward.
    #[serde(default = "AnimationConfig::default_zoom_velocity")]
    pub zoom_velocity: f32,
    /// Fixed RNG seed; unset draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl AnimationConfig {
    fn default_speed_percent() -> f32 {
        100.0
    }
    fn default_zoom_velocity() -> f32 {
        5.0
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            speed_percent: Self::default_speed_percent(),
            zoom_velocity: Self::default_zoom_velocity(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "RuntimeConfig::default_fps")]
    pub fps: f32,
    /// Stop after this many frames; unset runs until interrupted.
    #[serde(default)]
    pub frames: Option<u64>,
    #[serde(default = "RuntimeConfig::default_stats_every")]
    pub stats_every: u64,
}

impl RuntimeConfig {
    fn default_fps() -> f32 {
        60.0
    }
    fn default_stats_every() -> u64 {
        60
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fps: Self::default_fps(),
            frames: None,
            stats_every: Self::default_stats_every(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub density: DensityConfig,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config: {err}"),
            ConfigError::Parse(err) => write!(f, "failed to parse config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl AppConfig {
    fn round_f32(x: f32) -> f32 {
        (x * 1_000_000.0).round() / 1_000_000.0
    }

    fn format_f32_compact(x: f32) -> String {
        let mut s = format!("{:.6}", x);
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        if s.is_empty() { "0".to_string() } else { s }
    }

    fn rounded(mut self) -> Self {
        self.streak.fade_time = Self::round_f32(self.streak.fade_time);
        self.streak.base_drop_interval = Self::round_f32(self.streak.base_drop_interval);
        self.streak.mutation_probability = Self::round_f32(self.streak.mutation_probability);
        for c in self
            .streak
            .head_color
            .iter_mut()
            .chain(self.streak.trail_color.iter_mut())
        {
            *c = Self::round_f32(*c);
        }
        self
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Reads `path`, or writes a fully commented default file when it is missing.
    /// Read and parse failures fall back to defaults.
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            return match Self::load(path_obj) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("{path}: {err}. Using defaults.");
                    Self::default()
                }
            };
        }

        let default_cfg = Self::default().rounded();
        match toml::to_string_pretty(&default_cfg) {
            Ok(text) => {
                if let Err(err) = fs::write(path_obj, Self::commented(&text)) {
                    warn!("Failed to write default config to {path}: {err}");
                }
            }
            Err(err) => warn!("Failed to serialize default config: {err}"),
        }
        default_cfg
    }

    /// Comments out every key so the written file documents defaults without
    /// pinning them.
    fn commented(text: &str) -> String {
        let mut out = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                out.push('\n');
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                out.push_str(line);
                out.push('\n');
                continue;
            }
            let mut out_line = line.to_string();
            if let Some((lhs, rhs)) = line.split_once('=') {
                let rhs_trim = rhs.trim();
                let has_decimal = rhs_trim.contains('.');
                if has_decimal
                    && !rhs_trim.contains('"')
                    && !rhs_trim.starts_with('[')
                    && let Ok(val) = rhs_trim.parse::<f32>()
                {
                    let mut formatted = Self::format_f32_compact(val);
                    if !formatted.contains('.') {
                        formatted.push_str(".0");
                    }
                    out_line = format!("{} = {}", lhs.trim(), formatted);
                }
            }
            out.push_str("# ");
            out.push_str(&out_line);
            out.push('\n');
        }
        out
    }
}
