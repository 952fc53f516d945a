use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// World-space point or direction. `y` is up; agents move in the x/z plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Vec3) -> f64 {
        (other - self).length()
    }

    /// Unit vector, or zero when the input has no length.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 {
            self * (1.0 / len)
        } else {
            Vec3::origin()
        }
    }

    /// Unit vector pointing from `self` towards `target`.
    pub fn direction_to(self, target: Vec3) -> Vec3 {
        (target - self).normalized()
    }

    pub fn midpoint(self, other: Vec3) -> Vec3 {
        (self + other) * 0.5
    }

    pub fn rounded(self) -> Vec3 {
        Vec3::new(self.x.round(), self.y.round(), self.z.round())
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Clamp both horizontal coordinates into `[-bound, bound]`.
    pub fn clamp_horizontal(self, bound: f64) -> Vec3 {
        Vec3 {
            x: self.x.clamp(-bound, bound),
            y: self.y,
            z: self.z.clamp(-bound, bound),
        }
    }

    /// Heading of a horizontal velocity, in radians around the y axis.
    pub fn yaw(self) -> f64 {
        self.x.atan2(self.z)
    }

    /// Horizontal unit vector for an angle in radians.
    pub fn from_heading(angle: f64) -> Vec3 {
        Vec3::new(angle.sin(), 0.0, angle.cos())
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Vec3::new(-2.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn normalizing_zero_stays_zero() {
        assert_eq!(Vec3::origin().normalized(), Vec3::origin());
        let unit = Vec3::new(3.0, 0.0, 4.0).normalized();
        assert!((unit.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn horizontal_clamp_leaves_height() {
        let p = Vec3::new(70.0, 3.0, -51.0).clamp_horizontal(50.0);
        assert_eq!(p, Vec3::new(50.0, 3.0, -50.0));
    }

    #[test]
    fn heading_round_trips_through_yaw() {
        let v = Vec3::from_heading(1.2);
        assert!((v.yaw() - 1.2).abs() < 1e-12);
    }
}
