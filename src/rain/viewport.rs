/// Screen-space extent the rain is simulated in, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 && self.height.is_finite() {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// True when either dimension cannot host a streak.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_aspect() {
        let mut vp = Viewport::new(800.0, 600.0);
        assert!((vp.aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
        vp.resize(1920.0, 1080.0);
        assert!((vp.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn zero_height_is_degenerate_with_unit_aspect() {
        let vp = Viewport::new(640.0, 0.0);
        assert!(vp.is_degenerate());
        assert_eq!(vp.aspect_ratio(), 1.0);
        assert!(Viewport::new(-1.0, 10.0).is_degenerate());
        assert!(Viewport::new(f32::NAN, 10.0).is_degenerate());
        assert!(!Viewport::default().is_degenerate());
    }
}
