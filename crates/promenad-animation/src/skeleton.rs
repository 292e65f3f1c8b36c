use glam::{Quat, Vec3};
use promenad_core::{
    impl_reusing_clone, rotation_between, CyclicPool, LimbId, Result, Ring, SparseIndex,
    SENTINEL,
};

pub const MAX_LIMB_ROWS: usize = 128;
pub const LIMB_ID_RANGE: usize = 1024;
/// Bone nodes shared by every limb, sentinel included.
pub const MAX_LIMB_BONES: usize = MAX_LIMB_ROWS * 8;
/// Longest chain the solver works on.
pub const MAX_CHAIN_BONES: usize = 32;

/// How a bone may turn relative to its neighbour in the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum BoneConstraint {
    /// Length only.
    #[default]
    None,
    /// Forward axis locked to the neighbour's forward axis.
    Pole,
    /// Swing around the neighbour's local +z, within `[min_ang, max_ang]`.
    Hinge { min_ang: f32, max_ang: f32 },
}

/// One rigid segment. Local +x runs along the bone, +y is up and +z is the
/// hinge axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bone {
    pub joint_pos: Vec3,
    pub orientation: Quat,
    pub distance: f32,
    pub constraint: BoneConstraint,
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            joint_pos: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            distance: 0.0,
            constraint: BoneConstraint::None,
        }
    }
}

impl Bone {
    /// A bone from `root` to `tip`, rotated as little as possible from +x.
    pub fn from_root_tip(root: Vec3, tip: Vec3) -> Self {
        Self {
            joint_pos: root,
            orientation: rotation_between(Vec3::X, tip - root),
            distance: root.distance(tip),
            constraint: BoneConstraint::None,
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    /// Derived from joint, orientation and length; never stored.
    #[inline]
    pub fn tip(&self) -> Vec3 {
        self.joint_pos + self.forward() * self.distance
    }
}

/// Limbs and the pool their bone chains are threaded through.
#[derive(Debug)]
pub struct LimbTable {
    index: SparseIndex<LimbId>,

    end_effector: Vec<Vec3>,
    position: Vec<Vec3>,
    orientation: Vec<Quat>,
    root_bone: Vec<u16>,
    paired_with: Vec<LimbId>,

    bone_nodes: CyclicPool,
    bones: Vec<Bone>,
}

impl_reusing_clone!(LimbTable {
    index,
    end_effector,
    position,
    orientation,
    root_bone,
    paired_with,
    bone_nodes,
    bones,
});

impl Default for LimbTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LimbTable {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LIMB_ROWS, LIMB_ID_RANGE, MAX_LIMB_BONES)
    }

    pub fn with_capacity(max_rows: usize, id_range: usize, bone_nodes: usize) -> Self {
        Self {
            index: SparseIndex::new("limb", max_rows, id_range),
            end_effector: Vec::with_capacity(max_rows),
            position: Vec::with_capacity(max_rows),
            orientation: Vec::with_capacity(max_rows),
            root_bone: Vec::with_capacity(max_rows),
            paired_with: Vec::with_capacity(max_rows),
            bone_nodes: CyclicPool::new(bone_nodes),
            bones: vec![Bone::default(); bone_nodes],
        }
    }

    // Rows

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn ids(&self) -> &[LimbId] {
        self.index.ids()
    }

    pub fn has(&self, limb: LimbId) -> bool {
        self.index.has(limb)
    }

    pub fn index_of(&self, limb: LimbId) -> usize {
        self.index.index_of(limb)
    }

    pub fn id_at(&self, index: usize) -> LimbId {
        self.index.id_at(index)
    }

    pub fn id_range(&self) -> usize {
        self.index.id_range()
    }

    /// A limb rooted at `position` with no bones. Its end effector starts at
    /// the root and it is paired with itself.
    pub fn create_limb(&mut self, position: Vec3, orientation: Quat) -> Result<LimbId> {
        let (limb, _) = self.index.create()?;
        self.end_effector.push(position);
        self.position.push(position);
        self.orientation.push(orientation);
        self.root_bone.push(SENTINEL);
        self.paired_with.push(limb);
        log::debug!("created limb {limb} at {position}");
        Ok(limb)
    }

    /// Remove a limb, returning its bones to the pool. Limbs paired with it
    /// fall back to being paired with themselves.
    pub fn delete_limb(&mut self, limb: LimbId) -> bool {
        let Some(index) = self.index.try_index_of(limb) else {
            return false;
        };

        let root = self.root_bone[index];
        if root != SENTINEL {
            let nodes: Vec<u16> = self.bone_nodes.ring(root).collect();
            for node in nodes {
                self.bones[node as usize] = Bone::default();
                self.bone_nodes.release(node);
            }
        }

        let removal = self.index.delete_at(index);
        self.end_effector.swap_remove(removal.index);
        self.position.swap_remove(removal.index);
        self.orientation.swap_remove(removal.index);
        self.root_bone.swap_remove(removal.index);
        self.paired_with.swap_remove(removal.index);

        for i in 0..self.paired_with.len() {
            if self.paired_with[i] == limb {
                self.paired_with[i] = self.index.id_at(i);
            }
        }
        true
    }

    // Columns

    pub fn position(&self, limb: LimbId) -> Vec3 {
        self.position[self.index_of(limb)]
    }

    pub fn orientation(&self, limb: LimbId) -> Quat {
        self.orientation[self.index_of(limb)]
    }

    /// Move the chain's anchor. Bones follow on the next solve.
    pub fn set_root(&mut self, limb: LimbId, position: Vec3, orientation: Quat) {
        let index = self.index_of(limb);
        self.position[index] = position;
        self.orientation[index] = orientation;
    }

    pub fn end_effector(&self, limb: LimbId) -> Vec3 {
        self.end_effector[self.index_of(limb)]
    }

    pub fn set_end_effector(&mut self, limb: LimbId, position: Vec3) {
        let index = self.index_of(limb);
        self.end_effector[index] = position;
    }

    pub fn end_effector_mut(&mut self, limb: LimbId) -> &mut Vec3 {
        let index = self.index_of(limb);
        &mut self.end_effector[index]
    }

    pub fn root_bone(&self, limb: LimbId) -> u16 {
        self.root_bone[self.index_of(limb)]
    }

    pub fn paired_with(&self, limb: LimbId) -> LimbId {
        self.paired_with[self.index_of(limb)]
    }

    pub fn pair_limbs(&mut self, a: LimbId, b: LimbId) {
        let ai = self.index_of(a);
        let bi = self.index_of(b);
        self.paired_with[ai] = b;
        self.paired_with[bi] = a;
    }

    // Bones

    /// Grow the chain by one bone from the current tip to `tip`. The end
    /// effector moves to the new tip.
    pub fn add_bone_to_limb(&mut self, limb: LimbId, tip: Vec3) -> Result<u16> {
        let index = self.index_of(limb);
        let joint = self.tip_position(limb);
        let node = self.bone_nodes.take_free()?;
        self.bones[node as usize] = Bone::from_root_tip(joint, tip);

        let root = self.root_bone[index];
        if root == SENTINEL {
            self.root_bone[index] = node;
        } else {
            let last = self.bone_nodes.prev(root);
            self.bone_nodes.append_after(last, node);
        }
        self.end_effector[index] = tip;
        Ok(node)
    }

    pub fn apply_pole_constraint(&mut self, bone: u16) {
        self.bones[bone as usize].constraint = BoneConstraint::Pole;
    }

    pub fn apply_hinge_constraint(&mut self, bone: u16, min_ang: f32, max_ang: f32) {
        debug_assert!(min_ang <= max_ang, "hinge range is reversed");
        self.bones[bone as usize].constraint = BoneConstraint::Hinge { min_ang, max_ang };
    }

    pub fn bone(&self, bone: u16) -> &Bone {
        &self.bones[bone as usize]
    }

    pub fn bone_joint_position(&self, bone: u16) -> Vec3 {
        self.bones[bone as usize].joint_pos
    }

    pub fn bone_tip_position(&self, bone: u16) -> Vec3 {
        self.bones[bone as usize].tip()
    }

    /// Pool indices of the limb's bones, root to tip.
    pub fn bone_indices(&self, limb: LimbId) -> impl Iterator<Item = u16> + '_ {
        let root = self.root_bone(limb);
        let ring: Option<Ring<'_>> = (root != SENTINEL).then(|| self.bone_nodes.ring(root));
        ring.into_iter().flatten()
    }

    pub fn bones_of(&self, limb: LimbId) -> impl Iterator<Item = &Bone> + '_ {
        self.bone_indices(limb).map(|b| &self.bones[b as usize])
    }

    pub fn bone_count(&self, limb: LimbId) -> usize {
        self.bone_indices(limb).count()
    }

    /// Tip of the last bone, or the root for a limb without bones.
    pub fn tip_position(&self, limb: LimbId) -> Vec3 {
        let index = self.index_of(limb);
        match self.root_bone[index] {
            SENTINEL => self.position[index],
            root => self.bones[self.bone_nodes.prev(root) as usize].tip(),
        }
    }

    /// Copy the chain into `out`, root first. Stops at `out.len()` or
    /// [`MAX_CHAIN_BONES`], whichever is smaller. Returns the count.
    pub fn collect_bones(&self, limb: LimbId, out: &mut [Bone]) -> usize {
        let max = out.len().min(MAX_CHAIN_BONES);
        let mut count = 0;
        for (slot, bone) in out[..max].iter_mut().zip(self.bones_of(limb)) {
            *slot = *bone;
            count += 1;
        }
        count
    }

    /// Overwrite joints and orientations of the chain from `solved`, root
    /// first. Lengths and constraints stay as stored.
    pub(crate) fn write_back(&mut self, limb: LimbId, solved: &[Bone]) {
        let root = self.root_bone(limb);
        if root == SENTINEL {
            return;
        }
        let mut node = root;
        for bone in solved {
            let stored = &mut self.bones[node as usize];
            stored.joint_pos = bone.joint_pos;
            stored.orientation = bone.orientation;
            node = self.bone_nodes.next(node);
            if node == root {
                break;
            }
        }
    }

    pub(crate) fn bone_mut(&mut self, bone: u16) -> &mut Bone {
        &mut self.bones[bone as usize]
    }

    pub fn bone_pool(&self) -> &CyclicPool {
        &self.bone_nodes
    }
}
