//! Free-swinging limbs: tips keep their momentum between steps and fall
//! under gravity.

use glam::Vec3;
use promenad_core::{impl_reusing_clone, LimbId, Result, SparseIndex};

use crate::skeleton::{LimbTable, LIMB_ID_RANGE, MAX_LIMB_ROWS};

#[derive(Debug)]
pub struct LimbSwingTable {
    index: SparseIndex<LimbId>,
    prev_position: Vec<Vec3>,
}

impl_reusing_clone!(LimbSwingTable { index, prev_position });

impl Default for LimbSwingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LimbSwingTable {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LIMB_ROWS, LIMB_ID_RANGE)
    }

    pub fn with_capacity(max_rows: usize, id_range: usize) -> Self {
        Self {
            index: SparseIndex::new("limb swing", max_rows, id_range),
            prev_position: Vec::with_capacity(max_rows),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn has_limb_swing(&self, limb: LimbId) -> bool {
        self.index.has(limb)
    }

    /// Start swinging from where the tip is now, at rest.
    pub fn create_limb_swing(&mut self, limb: LimbId, limbs: &LimbTable) -> Result<()> {
        self.index.insert(limb)?;
        self.prev_position.push(limbs.tip_position(limb));
        Ok(())
    }

    pub fn delete_limb_swing(&mut self, limb: LimbId) -> bool {
        match self.index.delete(limb) {
            Some(removal) => {
                self.prev_position.swap_remove(removal.index);
                true
            }
            None => false,
        }
    }

    /// Aim each swinging end effector one more step along the tip's last
    /// displacement. Assumes a fixed step.
    pub fn perpetuate_limb_momentums(&mut self, limbs: &mut LimbTable) {
        for (i, &limb) in self.index.ids().iter().enumerate() {
            let prev = self.prev_position[i];
            let tip = limbs.tip_position(limb);
            limbs.set_end_effector(limb, tip + (tip - prev));
            self.prev_position[i] = tip;
        }
    }

    pub fn apply_gravity_to_limbs(&self, dt: f32, gravity: Vec3, limbs: &mut LimbTable) {
        let gravity_step = gravity * (dt * dt / 2.0);
        for &limb in self.index.ids() {
            *limbs.end_effector_mut(limb) += gravity_step;
        }
    }
}
