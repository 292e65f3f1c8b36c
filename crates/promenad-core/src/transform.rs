use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World placement of an actor: position plus a yaw around +y.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub position: Vec3,
    pub orientation_y: f32,
}

impl Location {
    pub fn new(position: Vec3, orientation_y: f32) -> Self {
        Self {
            position,
            orientation_y,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.orientation_y)
    }

    pub fn to_world(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_rotation_y(self.orientation_y)
    }

    pub fn to_object(&self) -> Mat4 {
        Mat4::from_rotation_y(-self.orientation_y) * Mat4::from_translation(-self.position)
    }

    /// Object-space +x in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub velocity: Vec3,
    pub rotation_y: f32,
}

impl Movement {
    pub fn new(velocity: Vec3, rotation_y: f32) -> Self {
        Self {
            velocity,
            rotation_y,
        }
    }
}

/// Integrate every location by its movement over `dt`.
pub fn move_locations(dt: f32, movements: &[Movement], locations: &mut [Location]) {
    debug_assert_eq!(movements.len(), locations.len());
    for (movement, location) in movements.iter().zip(locations.iter_mut()) {
        location.position += movement.velocity * dt;
        location.orientation_y += dt * movement.rotation_y;
    }
}
