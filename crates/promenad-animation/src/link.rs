use promenad_core::{impl_reusing_clone, LimbId, Result, SparseIndex};

use crate::skeleton::{LimbTable, LIMB_ID_RANGE, MAX_LIMB_ROWS};

/// Limbs holding on to another limb's tip ("hand holding"), keyed by the
/// holding limb.
#[derive(Debug)]
pub struct LimbLinkTable {
    index: SparseIndex<LimbId>,
    other_limb: Vec<LimbId>,
}

impl_reusing_clone!(LimbLinkTable { index, other_limb });

impl Default for LimbLinkTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LimbLinkTable {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LIMB_ROWS, LIMB_ID_RANGE)
    }

    pub fn with_capacity(max_rows: usize, id_range: usize) -> Self {
        Self {
            index: SparseIndex::new("limb link", max_rows, id_range),
            other_limb: Vec::with_capacity(max_rows),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn linked_to(&self, limb: LimbId) -> Option<LimbId> {
        self.index.try_index_of(limb).map(|i| self.other_limb[i])
    }

    /// Make `limb` reach for `other`'s tip every step.
    pub fn link_limbs(&mut self, limb: LimbId, other: LimbId) -> Result<()> {
        self.index.insert(limb)?;
        self.other_limb.push(other);
        Ok(())
    }

    pub fn unlink_limb(&mut self, limb: LimbId) -> bool {
        match self.index.delete(limb) {
            Some(removal) => {
                self.other_limb.swap_remove(removal.index);
                true
            }
            None => false,
        }
    }

    /// Unlink every limb holding on to `other`.
    pub fn unlink_partners_of(&mut self, other: LimbId) -> usize {
        let mut removed = 0;
        let mut i = 0;
        while i < self.other_limb.len() {
            if self.other_limb[i] == other {
                let removal = self.index.delete_at(i);
                self.other_limb.swap_remove(removal.index);
                removed += 1;
            } else {
                i += 1;
            }
        }
        removed
    }

    /// Move each linked end effector halfway to its partner's tip.
    pub fn move_limb_tips_to_their_linked_partners(&self, limbs: &mut LimbTable) {
        for (i, &limb) in self.index.ids().iter().enumerate() {
            let partner_tip = limbs.tip_position(self.other_limb[i]);
            let ee = limbs.end_effector(limb);
            limbs.set_end_effector(limb, ee.lerp(partner_tip, 0.5));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::{Quat, Vec3};

    #[test]
    fn linked_end_effector_meets_partner_halfway() {
        let mut limbs = LimbTable::new();
        let left = limbs.create_limb(Vec3::ZERO, Quat::IDENTITY).unwrap();
        limbs.add_bone_to_limb(left, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let right = limbs.create_limb(Vec3::new(4.0, 0.0, 0.0), Quat::IDENTITY).unwrap();
        limbs.add_bone_to_limb(right, Vec3::new(3.0, 0.0, 0.0)).unwrap();

        let mut links = LimbLinkTable::new();
        links.link_limbs(left, right).unwrap();
        assert_eq!(links.linked_to(left), Some(right));
        assert_eq!(links.linked_to(right), None);

        links.move_limb_tips_to_their_linked_partners(&mut limbs);
        assert_abs_diff_eq!(limbs.end_effector(left), Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-6);
        assert_abs_diff_eq!(limbs.end_effector(right), Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-6);

        assert!(links.unlink_limb(left));
        assert!(links.is_empty());
    }

    #[test]
    fn partners_can_be_unlinked_by_the_limb_they_hold() {
        let mut links = LimbLinkTable::new();
        links.link_limbs(LimbId(1), LimbId(3)).unwrap();
        links.link_limbs(LimbId(2), LimbId(4)).unwrap();
        links.link_limbs(LimbId(5), LimbId(3)).unwrap();

        assert_eq!(links.unlink_partners_of(LimbId(3)), 2);
        assert_eq!(links.len(), 1);
        assert_eq!(links.linked_to(LimbId(2)), Some(LimbId(4)));
        assert_eq!(links.linked_to(LimbId(1)), None);
        assert_eq!(links.linked_to(LimbId(5)), None);
    }
}
