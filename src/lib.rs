//! Promenad - a limb animation sandbox
//!
//! Bone chains posed with FABRIK, legs and arms driven by goal-seeking end
//! effectors, and a fixed-step simulation that keeps every step around for
//! pausing and rewinding.

pub use promenad_animation as animation;
pub use promenad_core as core;
pub use promenad_sim as sim;
pub use promenad_terrain as terrain;

pub mod prelude {
    pub use crate::animation::{
        ActorTable, Bone, BoneConstraint, FabrikSolver, GaitConfig, LimbAttachmentTable,
        LimbGoalTable, LimbLinkTable, LimbSwingTable, LimbTable,
    };
    pub use crate::core::{ActorId, LimbId, Location, Movement, PromenadError, Result};
    pub use crate::sim::{App, Population, Scenario, SimConfig};
    pub use crate::terrain::{Heightmap, Terrain};
    pub use glam;
}
