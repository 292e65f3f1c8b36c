//! Small vector helpers on top of `glam` with the zero-vector policy used
//! throughout the solver: a direction with no length is the zero vector.

use glam::{Quat, Vec3};

/// Unit vector pointing from `from` to `to`, or zero when they coincide.
#[inline]
pub fn direction(from: Vec3, to: Vec3) -> Vec3 {
    (to - from).normalize_or_zero()
}

/// The smallest rotation taking direction `from` onto direction `to`.
///
/// Inputs need not be normalized. Identity when either input has no length.
pub fn rotation_between(from: Vec3, to: Vec3) -> Quat {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    if from == Vec3::ZERO || to == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(from, to)
}
