//! Falling-glyph simulation: characters, streaks, density and the per-frame
//! orchestrator.

pub mod animation;
pub mod character;
pub mod density;
pub mod glyphs;
pub mod streak;
pub mod viewport;

/// Depth space is `[0, MAX_DEPTH)`; zoom wraps around at its ends.
pub const MAX_DEPTH: f32 = 100.0;

/// Wraps a depth into `[0, MAX_DEPTH)`.
#[inline]
pub fn wrap_depth(z: f32) -> f32 {
    if !z.is_finite() {
        return 0.0;
    }
    let w = z.rem_euclid(MAX_DEPTH);
    // rem_euclid can round up to the modulus for tiny negative inputs.
    if w >= MAX_DEPTH { 0.0 } else { w }
}
