/// Exponential follower: each step closes `factor` of the remaining gap.
///
/// With `factor` in `(0, 1]` the value approaches its target monotonically and
/// never overshoots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialFollower {
    value: f32,
    factor: f32,
}

impl ExponentialFollower {
    pub fn new(initial: f32, factor: f32) -> Self {
        Self {
            value: initial,
            factor: factor.clamp(f32::EPSILON, 1.0),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn follow(&mut self, target: f32) -> f32 {
        self.value += (target - self.value) * self.factor;
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_without_overshoot() {
        let mut follower = ExponentialFollower::new(0.0, 0.1);
        let mut previous = follower.value();
        for _ in 0..60 {
            let next = follower.follow(1.0);
            assert!(next > previous);
            assert!(next <= 1.0);
            previous = next;
        }
        assert!(previous > 0.99);
    }

    #[test]
    fn first_step_moves_ten_percent() {
        let mut follower = ExponentialFollower::new(0.0, 0.1);
        assert!((follower.follow(1.0) - 0.1).abs() < 1e-6);
        assert!((follower.follow(1.0) - 0.19).abs() < 1e-6);
    }

    #[test]
    fn factor_is_clamped() {
        let follower = ExponentialFollower::new(0.0, 4.0);
        assert_eq!(follower.factor(), 1.0);
    }
}
