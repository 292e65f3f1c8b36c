//! Foundation shared by the Promenad crates: yaw-only locations and their
//! transforms, the zero-vector policy for directions, sparse-set row
//! bookkeeping, and the cyclic node pool bone chains live in.

pub mod cyclic_list;
pub mod error;
pub mod math;
pub mod table;
pub mod transform;

pub use cyclic_list::{CyclicNode, CyclicPool, Ring, SENTINEL};
pub use error::{PromenadError, Result};
pub use math::{direction, rotation_between};
pub use table::{ActorId, LimbId, Removal, SparseIndex, TableId};
pub use transform::{move_locations, Location, Movement};

pub use glam;
