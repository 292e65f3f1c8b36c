use glam::{Quat, Vec3};
use promenad_core::{impl_reusing_clone, ActorId, LimbId, PromenadError, Result};

use crate::actor::ActorTable;
use crate::skeleton::LimbTable;

pub const MAX_ATTACHMENT_ROWS: usize = 128;

/// Limbs carried by actors. Plain rows, not keyed by any id.
#[derive(Debug)]
pub struct LimbAttachmentTable {
    name: &'static str,
    max_rows: usize,

    owner: Vec<ActorId>,
    limb: Vec<LimbId>,
    /// Limb root in the owner's object space, captured on attach.
    relative_position: Vec<Vec3>,
    /// Limb orientation with the owner's yaw taken out.
    relative_orientation: Vec<Quat>,
}

impl_reusing_clone!(LimbAttachmentTable {
    name,
    max_rows,
    owner,
    limb,
    relative_position,
    relative_orientation,
});

impl LimbAttachmentTable {
    pub fn new(name: &'static str) -> Self {
        Self::with_capacity(name, MAX_ATTACHMENT_ROWS)
    }

    pub fn with_capacity(name: &'static str, max_rows: usize) -> Self {
        Self {
            name,
            max_rows,
            owner: Vec::with_capacity(max_rows),
            limb: Vec::with_capacity(max_rows),
            relative_position: Vec::with_capacity(max_rows),
            relative_orientation: Vec::with_capacity(max_rows),
        }
    }

    pub fn len(&self) -> usize {
        self.owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_empty()
    }

    /// `(owner, limb)` pairs in attach order.
    pub fn iter(&self) -> impl Iterator<Item = (ActorId, LimbId)> + '_ {
        self.owner.iter().copied().zip(self.limb.iter().copied())
    }

    /// Remember where the limb currently sits relative to `owner`.
    pub fn attach_limb_to_actor(
        &mut self,
        limb: LimbId,
        owner: ActorId,
        actors: &ActorTable,
        limbs: &LimbTable,
    ) -> Result<()> {
        if self.owner.len() >= self.max_rows {
            return Err(PromenadError::CapacityExceeded {
                table: self.name,
                capacity: self.max_rows,
            });
        }

        let to_object = actors.get_actor_to_object_transform(owner);
        let yaw = actors.location(owner).rotation();

        self.owner.push(owner);
        self.limb.push(limb);
        self.relative_position
            .push(to_object.transform_point3(limbs.position(limb)));
        self.relative_orientation
            .push(yaw.inverse() * limbs.orientation(limb));
        Ok(())
    }

    /// Drop every row carrying `limb`. Returns how many there were.
    pub fn detach_limb(&mut self, limb: LimbId) -> usize {
        let mut removed = 0;
        let mut i = 0;
        while i < self.limb.len() {
            if self.limb[i] == limb {
                self.owner.swap_remove(i);
                self.limb.swap_remove(i);
                self.relative_position.swap_remove(i);
                self.relative_orientation.swap_remove(i);
                removed += 1;
            } else {
                i += 1;
            }
        }
        removed
    }

    /// Put every attached limb root back on its owner.
    pub fn reposition_attached_limbs(&self, actors: &ActorTable, limbs: &mut LimbTable) {
        for i in 0..self.owner.len() {
            let owner = self.owner[i];
            let to_world = actors.get_actor_to_world_transform(owner);
            let yaw = actors.location(owner).rotation();
            limbs.set_root(
                self.limb[i],
                to_world.transform_point3(self.relative_position[i]),
                yaw * self.relative_orientation[i],
            );
        }
    }
}
