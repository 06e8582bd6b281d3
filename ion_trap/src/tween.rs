//! Minimal property tweening for popup animations

/// Easing curve applied to tween progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    QuadOut,
    CubicInOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
        }
    }
}

/// Animate a scalar from `from` to `to` over `duration` seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub easing: Easing,
    elapsed: f32,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
            elapsed: 0.0,
        }
    }

    pub fn step(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt).min(self.duration.max(0.0));
    }

    /// Linear progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn value(&self) -> f32 {
        self.from + (self.to - self.from) * self.easing.apply(self.progress())
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::QuadOut, Easing::CubicInOut] {
            assert!(easing.apply(0.0).abs() < 1e-6);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
        }
        assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_tween_reaches_target() {
        let mut tween = Tween::new(2.0, 4.0, 1.0, Easing::Linear);
        tween.step(0.5);
        assert!((tween.value() - 3.0).abs() < 1e-6);
        assert!(!tween.is_finished());
        tween.step(0.75);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), 4.0);
    }

    #[test]
    fn test_zero_duration_is_immediately_done() {
        let tween = Tween::new(0.0, 1.0, 0.0, Easing::QuadOut);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), 1.0);
    }
}
