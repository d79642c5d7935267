use crate::core::camera::CameraPose;

/// Interpolation trait for values that can be smoothly transitioned
pub trait Interpolatable {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

/// Linear interpolation; `t` is not clamped
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

/// Quintic smoothstep between `start` and `end`, `t` clamped to [0, 1]
pub fn smootherstep(start: f64, end: f64, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let t = t * t * t * (t * (t * 6.0 - 15.0) + 10.0);
    start + (end - start) * t
}

/// Standard cubic ease-out
pub fn cubic_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) - 1.0;
    t * t * t + 1.0
}

impl Interpolatable for CameraPose {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        CameraPose::new(
            lerp(self.elevation, other.elevation, t),
            lerp(self.bearing, other.bearing, t),
            lerp(self.pitch, other.pitch, t),
        )
    }
}
