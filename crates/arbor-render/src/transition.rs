use arbor_core::Point;
use serde::{Deserialize, Serialize};

/// Easing curve applied to normalized transition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ease {
    #[default]
    CubicInOut,
    Linear,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Ease::Linear => t,
            Ease::CubicInOut => {
                let t2 = t * t;
                let t3 = t2 * t;
                4.0 * if t < 0.5 { t3 } else { 3.0 * (t - t2) + t3 - 0.75 }
            }
        }
    }
}

pub trait Interpolate: Copy {
    fn interpolate(self, to: Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Interpolate for Point {
    fn interpolate(self, to: Self, t: f64) -> Self {
        self.lerp(to, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub duration: f64,
    pub ease: Ease,
}

impl Timing {
    pub const INSTANT: Timing = Timing {
        duration: 0.0,
        ease: Ease::Linear,
    };
}

/// One animated attribute.
///
/// Retargeting interrupts a running tween: the new one starts from the value sampled at the
/// moment of the retarget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T> {
    from: T,
    to: T,
    start: f64,
    duration: f64,
    ease: Ease,
}

impl<T: Interpolate> Tween<T> {
    pub fn fixed(value: T) -> Self {
        Self {
            from: value,
            to: value,
            start: 0.0,
            duration: 0.0,
            ease: Ease::Linear,
        }
    }

    pub fn value_at(&self, now: f64) -> T {
        if self.duration <= 0.0 || now >= self.end() {
            return self.to;
        }
        if now <= self.start {
            return self.from;
        }
        let t = (now - self.start) / self.duration;
        self.from.interpolate(self.to, self.ease.apply(t))
    }

    pub fn retarget(&mut self, now: f64, to: T, timing: Timing) {
        self.from = self.value_at(now);
        self.to = to;
        self.start = now;
        self.duration = timing.duration.max(0.0);
        self.ease = timing.ease;
    }

    pub fn target(&self) -> T {
        self.to
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn is_running(&self, now: f64) -> bool {
        now < self.end()
    }
}
