use promenad_animation::{
    animate_walking_actor_legs, ActorTable, LimbAttachmentTable, LimbGoalTable, LimbLinkTable,
    LimbSwingTable, LimbTable,
};
use promenad_core::{impl_reusing_clone, LimbId, Result};
use promenad_terrain::Terrain;

use crate::config::SimConfig;

/// Everything that changes during a step: one simulation instant.
#[derive(Debug)]
pub struct Population {
    pub actors: ActorTable,
    pub limbs: LimbTable,
    pub arms: LimbAttachmentTable,
    pub legs: LimbAttachmentTable,
    pub limb_goals: LimbGoalTable,
    pub limb_swings: LimbSwingTable,
    pub limb_links: LimbLinkTable,
}

impl_reusing_clone!(Population {
    actors,
    limbs,
    arms,
    legs,
    limb_goals,
    limb_swings,
    limb_links,
});

impl Default for Population {
    fn default() -> Self {
        Self::new()
    }
}

impl Population {
    pub fn new() -> Self {
        Self {
            actors: ActorTable::new(),
            limbs: LimbTable::new(),
            arms: LimbAttachmentTable::new("arm"),
            legs: LimbAttachmentTable::new("leg"),
            limb_goals: LimbGoalTable::new(),
            limb_swings: LimbSwingTable::new(),
            limb_links: LimbLinkTable::new(),
        }
    }

    /// Remove a limb and every row that refers to it. Returns `false` when
    /// the limb does not exist.
    pub fn delete_limb(&mut self, limb: LimbId) -> bool {
        if !self.limbs.delete_limb(limb) {
            return false;
        }
        self.limb_goals.delete_limb_goal(limb);
        self.limb_swings.delete_limb_swing(limb);
        self.limb_links.unlink_limb(limb);
        self.limb_links.unlink_partners_of(limb);
        self.arms.detach_limb(limb);
        self.legs.detach_limb(limb);
        log::debug!("deleted limb {limb}");
        true
    }

    /// Advance by one fixed step of `dt` seconds.
    pub fn update(&mut self, dt: f32, config: &SimConfig, terrain: &Terrain) -> Result<()> {
        // Actors
        self.actors.move_actors(dt);
        self.actors
            .keep_actors_above_ground(config.actor_hover_height, terrain);
        self.actors.calculate_actor_transforms();

        // Limb roots follow their owners
        self.arms.reposition_attached_limbs(&self.actors, &mut self.limbs);
        self.legs.reposition_attached_limbs(&self.actors, &mut self.limbs);

        // End effectors
        animate_walking_actor_legs(
            &config.gait,
            &self.legs,
            &self.actors,
            terrain,
            &mut self.limb_goals,
            &mut self.limbs,
        )?;
        self.limb_goals.move_limbs_toward_goals(dt, &mut self.limbs);
        self.limb_swings.perpetuate_limb_momentums(&mut self.limbs);
        self.limb_swings
            .apply_gravity_to_limbs(dt, config.gravity, &mut self.limbs);
        self.limb_links
            .move_limb_tips_to_their_linked_partners(&mut self.limbs);

        // Bones
        self.limbs.move_limbs_directly_to_end_effectors();

        self.limb_goals.delete_accomplished_limb_goals(&self.limbs);
        Ok(())
    }
}
