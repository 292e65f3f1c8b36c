//! Entity tables for actors and their limbs, the FABRIK solver that poses
//! bone chains, and the motion controller that moves end effectors.

pub mod actor;
pub mod attachment;
pub mod gait;
pub mod goal;
pub mod ik;
pub mod link;
pub mod motion;
pub mod skeleton;
pub mod swing;

pub use actor::{ActorTable, ACTOR_ID_RANGE, MAX_ACTOR_ROWS};
pub use attachment::{LimbAttachmentTable, MAX_ATTACHMENT_ROWS};
pub use gait::{animate_walking_actor_legs, GaitConfig};
pub use goal::{LimbGoalTable, GOAL_THRESHOLD, MAX_CURVE_POINTS};
pub use ik::{
    constrain_to_next_bone, constrain_to_prev_bone, reposition_bones_with_fabrik, FabrikSolver,
    FABRIK_PASSES,
};
pub use link::LimbLinkTable;
pub use motion::accelerate_toward_goal_velocity;
pub use skeleton::{
    Bone, BoneConstraint, LimbTable, LIMB_ID_RANGE, MAX_CHAIN_BONES, MAX_LIMB_BONES,
    MAX_LIMB_ROWS,
};
pub use swing::LimbSwingTable;
