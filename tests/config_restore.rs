use std::fs;
use std::path::PathBuf;

use glyphrain::config::{
    AnimationConfig, AppConfig, DensityConfig, RuntimeConfig, StreakConfig, ViewportConfig,
};

fn unique_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "glyphrain_config_restore_{}_{}",
        name,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    path
}

fn assert_close(a: f32, b: f32, label: &str) {
    let diff = (a - b).abs();
    assert!(diff <= 1e-6, "{label} mismatch: {a} vs {b}");
}

fn assert_config_eq(actual: &AppConfig, expected: &AppConfig) {
    assert_close(actual.viewport.width, expected.viewport.width, "viewport.width");
    assert_close(actual.viewport.height, expected.viewport.height, "viewport.height");
    assert_close(
        actual.density.percentage,
        expected.density.percentage,
        "density.percentage",
    );
    assert_close(
        actual.density.character_width,
        expected.density.character_width,
        "density.character_width",
    );
    assert_eq!(actual.streak.min_length, expected.streak.min_length);
    assert_eq!(actual.streak.max_length, expected.streak.max_length);
    assert_close(actual.streak.fade_time, expected.streak.fade_time, "streak.fade_time");
    assert_close(
        actual.streak.character_spacing,
        expected.streak.character_spacing,
        "streak.character_spacing",
    );
    assert_close(
        actual.streak.base_drop_interval,
        expected.streak.base_drop_interval,
        "streak.base_drop_interval",
    );
    assert_close(
        actual.streak.depth_speed_gain,
        expected.streak.depth_speed_gain,
        "streak.depth_speed_gain",
    );
    assert_close(
        actual.streak.mutation_probability,
        expected.streak.mutation_probability,
        "streak.mutation_probability",
    );
    assert_eq!(actual.streak.head_color, expected.streak.head_color);
    assert_eq!(actual.streak.trail_color, expected.streak.trail_color);
    assert_close(
        actual.animation.speed_percent,
        expected.animation.speed_percent,
        "animation.speed_percent",
    );
    assert_close(
        actual.animation.zoom_velocity,
        expected.animation.zoom_velocity,
        "animation.zoom_velocity",
    );
    assert_eq!(actual.animation.seed, expected.animation.seed);
    assert_close(actual.runtime.fps, expected.runtime.fps, "runtime.fps");
    assert_eq!(actual.runtime.frames, expected.runtime.frames);
    assert_eq!(actual.runtime.stats_every, expected.runtime.stats_every);
}

#[test]
fn config_roundtrip_default_toml() {
    let default_cfg = AppConfig::default();
    let text = toml::to_string_pretty(&default_cfg).expect("serialize default");
    let parsed: AppConfig = toml::from_str(&text).expect("parse default");
    assert_config_eq(&parsed, &default_cfg);
}

#[test]
fn config_load_custom_values() {
    let path = unique_path("custom.toml");
    let path_str = path.to_string_lossy().to_string();
    let custom = AppConfig {
        viewport: ViewportConfig {
            width: 1280.0,
            height: 720.0,
        },
        density: DensityConfig {
            percentage: 45.0,
            character_width: 24.0,
        },
        streak: StreakConfig {
            min_length: 8,
            max_length: 16,
            fade_time: 2.5,
            character_spacing: 24.0,
            base_drop_interval: 0.08,
            depth_speed_gain: 1.5,
            mutation_probability: 0.25,
            head_color: [1.0, 1.0, 1.0, 1.0],
            trail_color: [0.0, 0.5, 0.0, 1.0],
        },
        animation: AnimationConfig {
            speed_percent: 150.0,
            zoom_velocity: 2.0,
            seed: Some(1234),
        },
        runtime: RuntimeConfig {
            fps: 30.0,
            frames: Some(900),
            stats_every: 30,
        },
    };
    let text = toml::to_string_pretty(&custom).expect("serialize custom");
    fs::write(&path, text).expect("write custom config");

    let loaded = AppConfig::load_or_default(&path_str);
    assert_config_eq(&loaded, &custom);

    let _ = fs::remove_file(&path);
}

#[test]
fn config_missing_file_fallback() {
    let path = unique_path("missing.toml");
    let path_str = path.to_string_lossy().to_string();
    let _ = fs::remove_file(&path);

    let loaded = AppConfig::load_or_default(&path_str);
    assert!(path.exists(), "missing config should be created");
    assert_config_eq(&loaded, &AppConfig::default());

    let _ = fs::remove_file(&path);
}
