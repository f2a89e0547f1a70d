use winit::dpi::{LogicalPosition, LogicalSize};

/// Turns pointer positions into a binary hover target.
///
/// Positions are mapped into the orb's own space, where the shorter side of
/// the container spans `[-1, 1]`; anything inside `radius` counts as hover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTracker {
    target: f32,
    radius: f32,
}

impl PointerTracker {
    pub fn new(radius: f32) -> Self {
        Self {
            target: 0.0,
            radius,
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// `position` is relative to the container's top-left corner.
    pub fn moved(&mut self, position: LogicalPosition<f64>, container: LogicalSize<f64>) -> f32 {
        let shortest = container.width.min(container.height);
        if shortest.is_nan() || shortest <= 0.0 {
            self.target = 0.0;
            return self.target;
        }
        let u = (position.x - container.width / 2.0) / shortest * 2.0;
        let v = (position.y - container.height / 2.0) / shortest * 2.0;
        let distance = (u * u + v * v).sqrt();
        self.target = if distance < f64::from(self.radius) {
            1.0
        } else {
            0.0
        };
        self.target
    }

    pub fn left(&mut self) {
        self.target = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_hovers_and_corner_does_not() {
        let size = LogicalSize::new(200.0, 100.0);
        let mut tracker = PointerTracker::new(0.8);
        assert_eq!(tracker.moved(LogicalPosition::new(100.0, 50.0), size), 1.0);
        // 30px right of center on a 100px short side is 0.6 in orb units.
        assert_eq!(tracker.moved(LogicalPosition::new(130.0, 50.0), size), 1.0);
        // 45px is 0.9: outside.
        assert_eq!(tracker.moved(LogicalPosition::new(145.0, 50.0), size), 0.0);
        assert_eq!(tracker.moved(LogicalPosition::new(0.0, 0.0), size), 0.0);
    }

    #[test]
    fn leaving_resets_target() {
        let mut tracker = PointerTracker::new(0.8);
        tracker.moved(LogicalPosition::new(5.0, 5.0), LogicalSize::new(10.0, 10.0));
        assert_eq!(tracker.target(), 1.0);
        tracker.left();
        assert_eq!(tracker.target(), 0.0);
    }

    #[test]
    fn empty_container_never_hovers() {
        let mut tracker = PointerTracker::new(0.8);
        assert_eq!(tracker.moved(LogicalPosition::new(0.0, 0.0), LogicalSize::new(0.0, 0.0)), 0.0);
    }
}
