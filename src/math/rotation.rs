//! Rigid placement of subunit points in model space.
//!
//! A subunit is generated in its own axis-aligned, origin-centred frame and then:
//!
//! 1. rotated about a pivot by Euler angles (roll `α` about x, pitch `β` about y,
//!    yaw `γ` about z, composed as `Rz(γ)·Ry(β)·Rx(α)`)
//! 2. translated by its centre-of-mass vector
//!
//! The reverse mapping used for overlap tests translates back first and then
//! rotates about the same pivot with the *negated* angles applied in the same
//! sequence. That is the exact inverse only for rotations about a single axis;
//! overlap exclusion relies on this behaviour as-is.

use nalgebra::{Point3, Rotation3, Vector3};

/// Rotation matrix for Euler angles given in degrees.
pub fn euler_rotation(angles_deg: [f64; 3]) -> Rotation3<f64> {
    let [alpha, beta, gamma] = angles_deg.map(f64::to_radians);
    Rotation3::from_euler_angles(alpha, beta, gamma)
}

/// Placement of one subunit: rotation about a pivot followed by a translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    forward: Rotation3<f64>,
    backward: Rotation3<f64>,
    rotated: bool,
    pivot: Point3<f64>,
    com: Vector3<f64>,
}

impl Placement {
    pub fn new(rotation_deg: [f64; 3], pivot: [f64; 3], com: [f64; 3]) -> Self {
        Self {
            forward: euler_rotation(rotation_deg),
            backward: euler_rotation(rotation_deg.map(|a| -a)),
            rotated: rotation_deg.iter().any(|&a| a != 0.0),
            pivot: Point3::from(pivot),
            com: Vector3::from(com),
        }
    }

    /// Local subunit frame -> model frame.
    pub fn to_model(&self, p: &Point3<f64>) -> Point3<f64> {
        if self.rotated {
            self.pivot + self.forward * (p - self.pivot) + self.com
        } else {
            p + self.com
        }
    }

    /// Model frame -> local subunit frame (negated-angle convention).
    pub fn to_local(&self, p: &Point3<f64>) -> Point3<f64> {
        let shifted = p - self.com;
        if self.rotated {
            self.pivot + self.backward * (shifted - self.pivot)
        } else {
            shifted
        }
    }
}
