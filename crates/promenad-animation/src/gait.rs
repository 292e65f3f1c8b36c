//! Walking: legs of a moving actor take turns stepping forward.

use glam::Vec3;
use promenad_core::Result;
use promenad_terrain::Terrain;
use serde::{Deserialize, Serialize};

use crate::actor::ActorTable;
use crate::attachment::LimbAttachmentTable;
use crate::goal::LimbGoalTable;
use crate::skeleton::LimbTable;

/// Step shape and timing, scaled by the owner's forward speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitConfig {
    pub acceleration_factor: f32,
    pub forward_speed_factor: f32,
    /// How far ahead of the leg root the foot is lifted, in object space.
    pub lift_x: f32,
    pub step_height: f32,
    /// How far ahead of the leg root the foot comes down.
    pub contact_x: f32,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            acceleration_factor: 30.0,
            forward_speed_factor: 1.75,
            lift_x: 0.75,
            step_height: 0.5,
            contact_x: 1.5,
        }
    }
}

/// Start a step for every leg that has fallen behind its walking owner,
/// one leg of each pair at a time.
pub fn animate_walking_actor_legs(
    config: &GaitConfig,
    legs: &LimbAttachmentTable,
    actors: &ActorTable,
    terrain: &Terrain,
    goals: &mut LimbGoalTable,
    limbs: &mut LimbTable,
) -> Result<()> {
    for (actor, limb) in legs.iter() {
        let vel_x = actors.get_actor_velocity_in_object_space(actor).x;
        if vel_x <= 0.0 {
            continue;
        }
        if goals.has_limb_goal(limb) {
            continue;
        }

        let other = limbs.paired_with(limb);
        if other != limb && goals.has_limb_goal(other) {
            continue;
        }

        let to_object = actors.get_actor_to_object_transform(actor);
        let this_foot = to_object.transform_point3(limbs.tip_position(limb));

        // The foot furthest behind goes first
        if other != limb {
            let other_foot = to_object.transform_point3(limbs.tip_position(other));
            if other_foot.x < this_foot.x {
                continue;
            }
        }
        if this_foot.x >= 0.0 {
            continue;
        }

        // Start from where the foot actually is
        let tip = limbs.tip_position(limb);
        limbs.set_end_effector(limb, tip);

        let to_world = actors.get_actor_to_world_transform(actor);
        let root = to_object.transform_point3(limbs.position(limb));
        let speed = vel_x * config.forward_speed_factor;
        let acceleration = vel_x * config.acceleration_factor;
        log::info!("limb {limb} steps forward at {speed:.2}");

        let mut lift = to_world.transform_point3(root + Vec3::new(config.lift_x, 0.0, 0.0));
        lift.y = terrain.height_at(lift.x, lift.z) + config.step_height;
        goals.put_limb_goal(limb, lift, speed, acceleration)?;

        let mut contact = to_world.transform_point3(root + Vec3::new(config.contact_x, 0.0, 0.0));
        contact.y = terrain.height_at(contact.x, contact.z);
        goals.push_limb_goal(limb, contact, speed, acceleration)?;
    }
    Ok(())
}
