use clap::Parser;

use crate::config::AppConfig;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config TOML
    #[arg(long, default_value = "glyphrain.toml")]
    pub config: String,

    /// Stop after this many frames (overrides config)
    #[arg(long)]
    pub frames: Option<u64>,

    /// Update rate in frames per second (overrides config)
    #[arg(long)]
    pub fps: Option<f32>,

    /// RNG seed for a reproducible run (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Density percentage 0-100 (overrides config)
    #[arg(long)]
    pub density: Option<f32>,

    /// Animation speed percentage (overrides config)
    #[arg(long)]
    pub speed: Option<f32>,

    /// Zoom velocity in depth units per second (overrides config)
    #[arg(long)]
    pub zoom: Option<f32>,

    /// Viewport width in pixels (overrides config)
    #[arg(long)]
    pub width: Option<f32>,

    /// Viewport height in pixels (overrides config)
    #[arg(long)]
    pub height: Option<f32>,
}

impl Args {
    /// Applies every flag that was given on top of `cfg`.
    pub fn apply_overrides(&self, cfg: &mut AppConfig) {
        if let Some(frames) = self.frames {
            cfg.runtime.frames = Some(frames);
        }
        if let Some(fps) = self.fps {
            cfg.runtime.fps = fps;
        }
        if let Some(seed) = self.seed {
            cfg.animation.seed = Some(seed);
        }
        if let Some(density) = self.density {
            cfg.density.percentage = density;
        }
        if let Some(speed) = self.speed {
            cfg.animation.speed_percent = speed;
        }
        if let Some(zoom) = self.zoom {
            cfg.animation.zoom_velocity = zoom;
        }
        if let Some(width) = self.width {
            cfg.viewport.width = width;
        }
        if let Some(height) = self.height {
            cfg.viewport.height = height;
        }
    }
}
