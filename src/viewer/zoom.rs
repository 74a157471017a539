use thiserror::Error;

pub const DEFAULT_ZOOM: u16 = 100;
pub const MIN_ZOOM: u16 = 50;
pub const MAX_ZOOM: u16 = 200;
pub const ZOOM_STEP: u16 = 25;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoomPolicyError {
    #[error("min zoom {min}% must be between 1% and 100%")]
    InvalidMin { min: u16 },
    #[error("max zoom {max}% must be at least 100%")]
    InvalidMax { max: u16 },
    #[error("zoom step must be positive")]
    ZeroStep,
}

/// Bounds and step for the zoom controller. These are policy, not physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomPolicy {
    min: u16,
    max: u16,
    step: u16,
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self {
            min: MIN_ZOOM,
            max: MAX_ZOOM,
            step: ZOOM_STEP,
        }
    }
}

impl ZoomPolicy {
    pub fn new(min: u16, max: u16, step: u16) -> Result<Self, ZoomPolicyError> {
        if min == 0 || min > DEFAULT_ZOOM {
            return Err(ZoomPolicyError::InvalidMin { min });
        }
        if max < DEFAULT_ZOOM {
            return Err(ZoomPolicyError::InvalidMax { max });
        }
        if step == 0 {
            return Err(ZoomPolicyError::ZeroStep);
        }
        Ok(Self { min, max, step })
    }

    pub fn min(&self) -> u16 {
        self.min
    }

    pub fn max(&self) -> u16 {
        self.max
    }

    pub fn step(&self) -> u16 {
        self.step
    }

    fn clamp(&self, level: u16) -> u16 {
        level.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoomController {
    level: u16,
    policy: ZoomPolicy,
    // Offset of the page relative to its centered position, in px.
    pan_x: f32,
    pan_y: f32,
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new(ZoomPolicy::default())
    }
}

impl ZoomController {
    pub fn new(policy: ZoomPolicy) -> Self {
        Self {
            level: DEFAULT_ZOOM,
            policy,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }

    pub fn level(&self) -> u16 {
        self.level
    }

    pub fn policy(&self) -> ZoomPolicy {
        self.policy
    }

    /// Swipe and arrow navigation only apply at the default level.
    pub fn is_default(&self) -> bool {
        self.level == DEFAULT_ZOOM
    }

    pub fn factor(&self) -> f32 {
        f32::from(self.level) / f32::from(DEFAULT_ZOOM)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_level(self.level.saturating_add(self.policy.step))
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_level(self.level.saturating_sub(self.policy.step))
    }

    pub fn reset(&mut self) -> bool {
        let changed = self.level != DEFAULT_ZOOM || self.pan() != (0.0, 0.0);
        self.level = DEFAULT_ZOOM;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        changed
    }

    /// `round(base * scale)` clamped to the policy. A scale that is not a
    /// finite positive number leaves the level untouched.
    pub fn set_from_pinch(&mut self, scale: f32, base: u16) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            return false;
        }
        let raw = (f32::from(base) * scale).round();
        let level = if raw >= f32::from(u16::MAX) {
            u16::MAX
        } else {
            raw as u16
        };
        self.set_level(level)
    }

    /// Moves zoomed content. The offset is bounded by how far the scaled page
    /// overflows a viewport of the given size.
    pub fn pan_by(&mut self, dx: f32, dy: f32, viewport: (f32, f32)) -> bool {
        if self.level <= DEFAULT_ZOOM || !dx.is_finite() || !dy.is_finite() {
            return false;
        }
        let (limit_x, limit_y) = self.pan_limits(viewport);
        let before = self.pan();
        self.pan_x = (self.pan_x + dx).clamp(-limit_x, limit_x);
        self.pan_y = (self.pan_y + dy).clamp(-limit_y, limit_y);
        self.pan() != before
    }

    /// Recentres the content, keeping the zoom level.
    pub fn clear_pan(&mut self) {
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    pub fn pan(&self) -> (f32, f32) {
        (self.pan_x, self.pan_y)
    }

    fn pan_limits(&self, (width, height): (f32, f32)) -> (f32, f32) {
        let overflow = (self.factor() - 1.0).max(0.0) / 2.0;
        (width.max(0.0) * overflow, height.max(0.0) * overflow)
    }

    fn set_level(&mut self, level: u16) -> bool {
        let level = self.policy.clamp(level);
        if level == self.level {
            return false;
        }
        self.level = level;
        if level <= DEFAULT_ZOOM {
            self.pan_x = 0.0;
            self.pan_y = 0.0;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn steps_and_clamps() {
        let mut zoom = ZoomController::default();
        for _ in 0..10 {
            zoom.zoom_in();
        }
        assert_eq!(zoom.level(), MAX_ZOOM);
        assert!(!zoom.zoom_in());

        for _ in 0..10 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.level(), MIN_ZOOM);

        assert!(zoom.reset());
        assert_eq!(zoom.level(), 100);
        assert!(!zoom.reset());
    }

    #[test]
    fn pinch_rounds_and_clamps() {
        let mut zoom = ZoomController::default();
        assert!(zoom.set_from_pinch(1.333, 100));
        assert_eq!(zoom.level(), 133);

        zoom.set_from_pinch(5.0, 100);
        assert_eq!(zoom.level(), MAX_ZOOM);

        zoom.set_from_pinch(0.1, 100);
        assert_eq!(zoom.level(), MIN_ZOOM);
    }

    #[test]
    fn degenerate_pinch_is_ignored() {
        let mut zoom = ZoomController::default();
        assert!(!zoom.set_from_pinch(f32::NAN, 100));
        assert!(!zoom.set_from_pinch(f32::INFINITY, 100));
        assert!(!zoom.set_from_pinch(0.0, 100));
        assert_eq!(zoom.level(), 100);
    }

    #[test]
    fn policy_rejects_bad_bounds() {
        assert_eq!(
            ZoomPolicy::new(120, 200, 25),
            Err(ZoomPolicyError::InvalidMin { min: 120 })
        );
        assert_eq!(
            ZoomPolicy::new(50, 90, 25),
            Err(ZoomPolicyError::InvalidMax { max: 90 })
        );
        assert_eq!(ZoomPolicy::new(50, 200, 0), Err(ZoomPolicyError::ZeroStep));
    }

    #[test]
    fn pan_only_when_zoomed_and_bounded() {
        let mut zoom = ZoomController::default();
        assert!(!zoom.pan_by(10.0, 0.0, (800.0, 600.0)));

        zoom.set_from_pinch(1.5, 100);
        assert!(zoom.pan_by(1000.0, -1000.0, (800.0, 600.0)));
        assert_eq!(zoom.pan(), (200.0, -150.0));

        zoom.reset();
        assert_eq!(zoom.pan(), (0.0, 0.0));
    }

    #[derive(Debug, Clone)]
    enum Op {
        In,
        Out,
        Reset,
        Pinch(f32, u16),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::In),
            Just(Op::Out),
            Just(Op::Reset),
            (any::<f32>(), any::<u16>()).prop_map(|(s, b)| Op::Pinch(s, b)),
        ]
    }

    proptest! {
        #[test]
        fn prop_level_stays_within_policy(ops in prop::collection::vec(op(), 0..64)) {
            let mut zoom = ZoomController::default();
            for op in ops {
                match op {
                    Op::In => { zoom.zoom_in(); }
                    Op::Out => { zoom.zoom_out(); }
                    Op::Reset => { zoom.reset(); }
                    Op::Pinch(scale, base) => { zoom.set_from_pinch(scale, base); }
                }
                prop_assert!(zoom.level() >= MIN_ZOOM && zoom.level() <= MAX_ZOOM);
            }
        }
    }
}
