//! FABRIK (Forward And Backward Reaching Inverse Kinematics) over bone
//! chains with hinge and pole joints.
//!
//! The solver works on a copied-out slice of bones, never on the limb table,
//! so the same chain can be solved speculatively (previews, tests) without
//! touching simulation state. Every re-orientation is the minimal rotation
//! from the bone's current forward axis onto the new direction, followed by
//! the joint constraint.

use glam::{Quat, Vec3};
use promenad_core::{direction, rotation_between, LimbId};

use crate::skeleton::{Bone, BoneConstraint, LimbTable, MAX_CHAIN_BONES};

/// Passes per solve. Constrained chains settle noticeably better with more
/// than one.
pub const FABRIK_PASSES: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FabrikSolver {
    pub passes: u32,
}

impl FabrikSolver {
    pub fn new(passes: u32) -> Self {
        Self { passes }
    }

    /// Solve `bones` toward `target` with the chain anchored at `root_pos`
    /// and oriented by `root_ori`.
    pub fn solve(&self, root_pos: Vec3, root_ori: Quat, target: Vec3, bones: &mut [Bone]) {
        for _ in 0..self.passes {
            reposition_bones_with_fabrik(root_pos, root_ori, target, bones);
        }
    }
}

impl Default for FabrikSolver {
    fn default() -> Self {
        Self::new(FABRIK_PASSES)
    }
}

/// One forward and one backward reaching pass.
pub fn reposition_bones_with_fabrik(root_pos: Vec3, root_ori: Quat, target: Vec3, bones: &mut [Bone]) {
    if bones.is_empty() {
        return;
    }
    apply_forward_pass(target, bones);
    apply_backward_pass(root_pos, root_ori, target, bones);
}

fn apply_forward_pass(target: Vec3, bones: &mut [Bone]) {
    // The target acts as a zero-length, unconstrained bone after the tip.
    let mut next_bone = Bone {
        joint_pos: target,
        ..Bone::default()
    };

    for bone in bones.iter_mut().rev() {
        let to_next = next_bone.joint_pos - bone.joint_pos;
        let n = to_next.normalize_or_zero();

        // Slide along n until the bone has its length again
        let change = to_next.length() - bone.distance;
        bone.joint_pos += n * change;

        bone.orientation = rotation_between(bone.forward(), n) * bone.orientation;

        constrain_to_next_bone(&next_bone, bone);

        next_bone = *bone;
    }
}

fn apply_backward_pass(root_pos: Vec3, root_ori: Quat, target: Vec3, bones: &mut [Bone]) {
    // The root acts as a zero-length bone before the first one.
    let mut prev_bone = Bone {
        joint_pos: root_pos,
        orientation: root_ori,
        ..Bone::default()
    };

    for i in 0..bones.len() {
        let joint = prev_bone.tip();
        let next_pos = bones.get(i + 1).map_or(target, |b| b.joint_pos);

        let bone = &mut bones[i];
        bone.joint_pos = joint;
        bone.orientation =
            rotation_between(bone.forward(), direction(joint, next_pos)) * bone.orientation;

        constrain_to_prev_bone(&prev_bone, bone);

        prev_bone = *bone;
    }
}

/// Swing angle of `forward` in the plane spanned by a frame's forward and up
/// axes, measured from forward toward up.
fn hinge_angle(forward: Vec3, frame_forward: Vec3, frame_up: Vec3) -> f32 {
    forward.dot(frame_up).atan2(forward.dot(frame_forward))
}

/// Constrain `this_bone` by the joint it shares with `next_bone` (the bone
/// toward the tip, or the target stand-in). The joint's constraint belongs to
/// `next_bone`; the bone is turned back into range and slid so its tip meets
/// the next joint.
pub fn constrain_to_next_bone(next_bone: &Bone, this_bone: &mut Bone) {
    match next_bone.constraint {
        BoneConstraint::None => {}
        BoneConstraint::Pole => {
            this_bone.orientation =
                rotation_between(this_bone.forward(), next_bone.forward()) * this_bone.orientation;
            this_bone.joint_pos += next_bone.joint_pos - this_bone.tip();
        }
        BoneConstraint::Hinge { min_ang, max_ang } => {
            let next_forward = next_bone.forward();
            let next_up = next_bone.up();
            let next_side = next_bone.right();

            // Share the hinge axis with the next bone
            this_bone.orientation =
                rotation_between(this_bone.right(), next_side) * this_bone.orientation;

            // The hinge range limits the next bone relative to this one, so
            // this bone relative to the next is limited by the negated range.
            let angle = hinge_angle(this_bone.forward(), next_forward, next_up);
            let clamped = angle.clamp(-max_ang, -min_ang);
            log::trace!(
                "forward hinge: {:.1}° clamped to {:.1}°",
                angle.to_degrees(),
                clamped.to_degrees()
            );

            this_bone.orientation = Quat::from_axis_angle(next_side, clamped) * next_bone.orientation;
            this_bone.joint_pos += next_bone.joint_pos - this_bone.tip();
        }
    }
}

/// Constrain `this_bone` relative to `prev_bone` (the bone toward the root,
/// or the root stand-in) using this bone's own constraint.
pub fn constrain_to_prev_bone(prev_bone: &Bone, this_bone: &mut Bone) {
    match this_bone.constraint {
        BoneConstraint::None => {}
        BoneConstraint::Pole => {
            let this_dir = this_bone.forward();
            let prev_dir = prev_bone.forward();
            if prev_dir.dot(this_dir) < 1.0 {
                this_bone.orientation = rotation_between(this_dir, prev_dir) * this_bone.orientation;
            }
        }
        BoneConstraint::Hinge { min_ang, max_ang } => {
            let local_forward = prev_bone.forward();
            let local_up = prev_bone.up();
            let local_side = prev_bone.right();

            // Share the hinge axis with the previous bone
            this_bone.orientation =
                rotation_between(this_bone.right(), local_side) * this_bone.orientation;

            let angle = hinge_angle(this_bone.forward(), local_forward, local_up);
            let clamped = angle.clamp(min_ang, max_ang);
            log::trace!(
                "backward hinge: {:.1}° clamped to {:.1}°",
                angle.to_degrees(),
                clamped.to_degrees()
            );

            this_bone.orientation = Quat::from_axis_angle(local_side, clamped) * prev_bone.orientation;
        }
    }
}

impl LimbTable {
    /// Solve the limb toward `target` and store the result immediately.
    pub fn move_limb_directly_to(&mut self, limb: LimbId, target: Vec3) {
        let mut bones = [Bone::default(); MAX_CHAIN_BONES];
        let count = self.collect_bones(limb, &mut bones);
        FabrikSolver::default().solve(
            self.position(limb),
            self.orientation(limb),
            target,
            &mut bones[..count],
        );
        self.write_back(limb, &bones[..count]);
    }

    /// Solve the limb toward `target`, then ease the stored bones toward the
    /// solution so that they would arrive one time unit from now.
    pub fn move_limb_gradually_to(&mut self, limb: LimbId, target: Vec3, dt: f32) {
        let mut bones = [Bone::default(); MAX_CHAIN_BONES];
        let count = self.collect_bones(limb, &mut bones);
        FabrikSolver::default().solve(
            self.position(limb),
            self.orientation(limb),
            target,
            &mut bones[..count],
        );

        let t = dt.clamp(0.0, 1.0);
        let nodes: [u16; MAX_CHAIN_BONES] = {
            let mut nodes = [0; MAX_CHAIN_BONES];
            for (slot, node) in nodes.iter_mut().zip(self.bone_indices(limb)) {
                *slot = node;
            }
            nodes
        };
        for (node, solved) in nodes[..count].iter().zip(&bones[..count]) {
            let stored = self.bone_mut(*node);
            stored.joint_pos = stored.joint_pos.lerp(solved.joint_pos, t);
            stored.orientation = stored.orientation.slerp(solved.orientation, t);
        }
    }

    /// Per-step IK: every limb reaches for its own end effector.
    pub fn move_limbs_directly_to_end_effectors(&mut self) {
        for index in 0..self.len() {
            let limb = self.id_at(index);
            let target = self.end_effector(limb);
            self.move_limb_directly_to(limb, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_4;

    /// Straight chain along +x from the origin.
    fn straight_chain(lengths: &[f32]) -> Vec<Bone> {
        let mut joint = Vec3::ZERO;
        lengths
            .iter()
            .map(|&length| {
                let bone = Bone::from_root_tip(joint, joint + Vec3::X * length);
                joint += Vec3::X * length;
                bone
            })
            .collect()
    }

    fn solve(bones: &mut [Bone], target: Vec3, repeats: u32) {
        let solver = FabrikSolver::default();
        for _ in 0..repeats {
            solver.solve(Vec3::ZERO, Quat::IDENTITY, target, bones);
        }
    }

    fn assert_lengths_kept(bones: &[Bone]) {
        for pair in bones.windows(2) {
            assert_abs_diff_eq!(pair[0].tip(), pair[1].joint_pos, epsilon = 1e-4);
        }
    }

    #[test]
    fn empty_chain_is_a_no_op() {
        let mut bones: [Bone; 0] = [];
        reposition_bones_with_fabrik(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE, &mut bones);
    }

    #[test]
    fn two_bones_reach_straight_up_toward_far_target() {
        let mut bones = straight_chain(&[2.0, 2.0]);
        solve(&mut bones, Vec3::new(0.0, 10.0, 0.0), 1);

        assert_abs_diff_eq!(bones[0].joint_pos, Vec3::ZERO, epsilon = 1e-6);
        assert_abs_diff_eq!(bones[1].joint_pos, Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-2);
    }

    #[test]
    fn reachable_targets_are_reached() {
        let targets = [
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 2.0, 1.0),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(0.0, -2.0, 0.0),
        ];
        for target in targets {
            let mut bones = straight_chain(&[1.0, 1.0, 1.0]);
            solve(&mut bones, target, 10);
            let tip = bones.last().unwrap().tip();
            assert!(
                tip.distance(target) < 1e-2,
                "tip {tip} missed reachable target {target}"
            );
            assert_abs_diff_eq!(bones[0].joint_pos, Vec3::ZERO, epsilon = 1e-6);
            assert_lengths_kept(&bones);
        }
    }

    #[test]
    fn unreachable_targets_fully_extend_the_chain() {
        let targets = [
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::new(5.0, 5.0, 0.0),
            Vec3::new(-10.0, 1.0, 0.0),
        ];
        for target in targets {
            let mut bones = straight_chain(&[1.0, 1.0, 1.0]);
            solve(&mut bones, target, 1);
            let tip = bones.last().unwrap().tip();
            assert_abs_diff_eq!(tip.length(), 3.0, epsilon = 1e-3);
            assert_abs_diff_eq!(tip.normalize(), target.normalize(), epsilon = 1e-2);
            assert_lengths_kept(&bones);
        }
    }

    fn relative_hinge_angle(prev: &Bone, this: &Bone) -> f32 {
        hinge_angle(this.forward(), prev.forward(), prev.up())
    }

    #[test]
    fn hinge_stops_at_its_upper_limit() {
        let mut bones = straight_chain(&[1.0, 1.0]);
        bones[1].constraint = BoneConstraint::Hinge { min_ang: 0.0, max_ang: FRAC_PI_4 };

        // Reaching this needs a bend of roughly 110 degrees.
        solve(&mut bones, Vec3::new(0.5, 1.0, 0.0), 1);

        assert_abs_diff_eq!(relative_hinge_angle(&bones[0], &bones[1]), FRAC_PI_4, epsilon = 1e-4);
        assert_lengths_kept(&bones);
    }

    #[test]
    fn hinge_stops_at_its_lower_limit() {
        let mut bones = straight_chain(&[1.0, 1.0]);
        bones[1].constraint = BoneConstraint::Hinge { min_ang: 0.0, max_ang: FRAC_PI_4 };

        // Bending downward would be negative, so the joint stays straight.
        solve(&mut bones, Vec3::new(0.5, -1.0, 0.0), 1);

        assert_abs_diff_eq!(relative_hinge_angle(&bones[0], &bones[1]), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn pole_keeps_bone_in_line_with_its_parent() {
        let mut bones = straight_chain(&[1.0, 1.0]);
        bones[0].constraint = BoneConstraint::Pole;

        solve(&mut bones, Vec3::new(0.5, 1.5, 0.0), 1);

        // The root stand-in points along +x, so the first bone must too.
        assert_abs_diff_eq!(bones[0].forward(), Vec3::X, epsilon = 1e-5);
        assert_abs_diff_eq!(bones[1].joint_pos, Vec3::X, epsilon = 1e-5);
    }

    #[test]
    fn forward_hinge_pulls_bone_back_into_range() {
        let next = Bone {
            joint_pos: Vec3::new(1.0, 0.0, 0.0),
            constraint: BoneConstraint::Hinge { min_ang: 0.0, max_ang: FRAC_PI_4 },
            ..Bone::default()
        };
        // Pointing 90 degrees below the next bone's forward axis; the allowed
        // range for this bone is [-45, 0] degrees.
        let mut this = Bone::from_root_tip(Vec3::new(1.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        constrain_to_next_bone(&next, &mut this);

        assert_abs_diff_eq!(
            hinge_angle(this.forward(), next.forward(), next.up()),
            -FRAC_PI_4,
            epsilon = 1e-5
        );
        assert_abs_diff_eq!(this.tip(), next.joint_pos, epsilon = 1e-5);
    }

    #[test]
    fn forward_hinge_uses_the_negated_asymmetric_range() {
        use std::f32::consts::FRAC_PI_8;

        let next = Bone {
            joint_pos: Vec3::new(1.0, 0.0, 0.0),
            constraint: BoneConstraint::Hinge { min_ang: FRAC_PI_8, max_ang: FRAC_PI_4 },
            ..Bone::default()
        };

        // In line with the next bone: pushed to -22.5 degrees
        let mut straight = Bone::from_root_tip(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        constrain_to_next_bone(&next, &mut straight);
        assert_abs_diff_eq!(
            hinge_angle(straight.forward(), next.forward(), next.up()),
            -FRAC_PI_8,
            epsilon = 1e-5
        );
        assert_abs_diff_eq!(straight.tip(), next.joint_pos, epsilon = 1e-5);

        // Already inside [-45, -22.5] degrees: left alone
        let angle = -3.0 * FRAC_PI_8 / 2.0;
        let dir = Vec3::new(angle.cos(), angle.sin(), 0.0);
        let mut inside = Bone::from_root_tip(next.joint_pos - dir, next.joint_pos);
        constrain_to_next_bone(&next, &mut inside);
        assert_abs_diff_eq!(
            hinge_angle(inside.forward(), next.forward(), next.up()),
            angle,
            epsilon = 1e-5
        );

        // Bent upward relative to the next bone: pulled down to -22.5 degrees
        let up = Vec3::new(FRAC_PI_8.cos(), FRAC_PI_8.sin(), 0.0);
        let mut above = Bone::from_root_tip(next.joint_pos - up, next.joint_pos);
        constrain_to_next_bone(&next, &mut above);
        assert_abs_diff_eq!(
            hinge_angle(above.forward(), next.forward(), next.up()),
            -FRAC_PI_8,
            epsilon = 1e-5
        );
    }

    #[test]
    fn forward_pass_keeps_the_joint_within_its_asymmetric_range() {
        use std::f32::consts::FRAC_PI_8;

        let mut bones = straight_chain(&[1.0, 1.0]);
        bones[1].constraint = BoneConstraint::Hinge { min_ang: FRAC_PI_8, max_ang: FRAC_PI_4 };

        // The chain already touches the target, but its straight joint is
        // below the minimum bend
        apply_forward_pass(Vec3::new(2.0, 0.0, 0.0), &mut bones);

        assert_abs_diff_eq!(bones[1].forward(), Vec3::X, epsilon = 1e-5);
        assert_abs_diff_eq!(relative_hinge_angle(&bones[0], &bones[1]), FRAC_PI_8, epsilon = 1e-4);
        assert_lengths_kept(&bones);
    }

    #[test]
    fn limb_table_moves_directly_and_gradually() {
        let mut table = LimbTable::new();
        let limb = table.create_limb(Vec3::ZERO, Quat::IDENTITY).unwrap();
        table.add_bone_to_limb(limb, Vec3::new(2.0, 0.0, 0.0)).unwrap();
        table.add_bone_to_limb(limb, Vec3::new(4.0, 0.0, 0.0)).unwrap();

        let mut preview = table.clone();
        preview.move_limb_gradually_to(limb, Vec3::new(0.0, 10.0, 0.0), 0.5);
        let halfway = preview.bone_indices(limb).nth(1).unwrap();
        let eased = preview.bone_joint_position(halfway);
        assert!(eased.x > 0.5 && eased.x < 2.0, "eased joint at {eased}");

        table.move_limb_directly_to(limb, Vec3::new(0.0, 10.0, 0.0));
        let second = table.bone_indices(limb).nth(1).unwrap();
        assert_abs_diff_eq!(
            table.bone_joint_position(second),
            Vec3::new(0.0, 2.0, 0.0),
            epsilon = 1e-2
        );
        // Lengths are never written back
        assert_abs_diff_eq!(table.bone(second).distance, 2.0);
    }
}
