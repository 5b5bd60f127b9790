//! Pinch-zoom ratio, clamped to the device range.

/// Current zoom ratio of a session and the range it is clamped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    ratio: f32,
    min: f32,
    max: f32,
}

impl ZoomState {
    /// Start fully zoomed out. `min` is raised to 1.0 and `max` to `min`.
    pub fn new(min: f32, max: f32) -> Self {
        let min = if min.is_finite() { min.max(1.0) } else { 1.0 };
        let max = if max.is_finite() { max.max(min) } else { min };
        Self {
            ratio: min,
            min,
            max,
        }
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Multiply the ratio by a pinch delta and clamp. Returns the new ratio.
    ///
    /// Non-finite or non-positive deltas leave the ratio unchanged.
    pub fn apply(&mut self, delta: f32) -> f32 {
        if delta.is_finite() && delta > 0.0 {
            self.ratio = (self.ratio * delta).clamp(self.min, self.max);
        }
        self.ratio
    }

    /// Jump to an absolute ratio, clamped. Returns the new ratio.
    ///
    /// Non-finite ratios leave the ratio unchanged.
    pub fn set(&mut self, ratio: f32) -> f32 {
        if ratio.is_finite() {
            self.ratio = ratio.clamp(self.min, self.max);
        }
        self.ratio
    }

    /// Adopt a new device range, keeping the current ratio where possible.
    pub fn set_range(&mut self, min: f32, max: f32) {
        let ratio = self.ratio;
        *self = Self::new(min, max);
        self.ratio = ratio.clamp(self.min, self.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_huge_delta_clamps_to_max() {
        let mut zoom = ZoomState::new(1.0, 8.0);
        assert_eq!(zoom.apply(1000.0), 8.0);
        assert_eq!(zoom.ratio(), 8.0);
    }

    #[test]
    fn test_tiny_delta_clamps_to_min() {
        let mut zoom = ZoomState::new(1.0, 8.0);
        zoom.apply(4.0);
        assert_eq!(zoom.apply(0.0001), 1.0);
    }

    #[test]
    fn test_deltas_compose() {
        let mut zoom = ZoomState::new(1.0, 8.0);
        zoom.apply(2.0);
        assert_eq!(zoom.apply(1.5), 3.0);
        assert_eq!(zoom.apply(0.5), 1.5);
    }

    #[test]
    fn test_invalid_deltas_ignored() {
        let mut zoom = ZoomState::new(1.0, 8.0);
        zoom.apply(2.0);
        assert_eq!(zoom.apply(f32::NAN), 2.0);
        assert_eq!(zoom.apply(f32::INFINITY), 2.0);
        assert_eq!(zoom.apply(-3.0), 2.0);
        assert_eq!(zoom.apply(0.0), 2.0);
    }

    #[test]
    fn test_always_within_range() {
        let mut zoom = ZoomState::new(1.0, 8.0);
        for delta in [0.1, 10.0, 3.3, 1e9, 1e-9, 1.01, 0.99, f32::MAX] {
            let ratio = zoom.apply(delta);
            assert!((1.0..=8.0).contains(&ratio), "ratio {} out of range", ratio);
        }
    }

    #[test]
    fn test_set_is_absolute() {
        let mut zoom = ZoomState::new(2.0, 8.0);
        assert_eq!(zoom.set(2.0), 2.0);
        assert_eq!(zoom.set(3.0), 3.0);
        assert_eq!(zoom.set(1.0), 2.0);
        assert_eq!(zoom.set(f32::NAN), 2.0);
        assert_eq!(zoom.set(100.0), 8.0);
    }

    #[test]
    fn test_set_range_reclamps() {
        let mut zoom = ZoomState::new(1.0, 10.0);
        zoom.apply(9.0);
        zoom.set_range(1.0, 4.0);
        assert_eq!(zoom.ratio(), 4.0);
        assert_eq!(zoom.range(), (1.0, 4.0));
    }

    #[test]
    fn test_new_sanitizes_range() {
        let zoom = ZoomState::new(0.5, 0.2);
        assert_eq!(zoom.range(), (1.0, 1.0));
        assert_eq!(zoom.ratio(), 1.0);
    }
}
