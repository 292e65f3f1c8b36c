//! Ground height queries used to plant feet and keep actors above ground.

mod heightmap;

pub use heightmap::Heightmap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Terrain {
    Flat { height: f32 },
    Heightmap(Heightmap),
}

impl Terrain {
    pub fn flat(height: f32) -> Self {
        Terrain::Flat { height }
    }

    /// Ground height under world (x, z).
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        match self {
            Terrain::Flat { height } => *height,
            Terrain::Heightmap(map) => map.height_at(x, z),
        }
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Terrain::flat(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn flat_terrain_is_constant() {
        let t = Terrain::flat(-0.5);
        assert_eq!(t.height_at(3.0, 4.0), -0.5);
        assert_eq!(Terrain::default().height_at(0.0, 0.0), 0.0);
    }

    #[test]
    fn heightmap_terrain_delegates() {
        let t = Terrain::Heightmap(Heightmap::from_fn(2, 2, Vec2::ZERO, 1.0, |_, z| z));
        assert_eq!(t.height_at(0.0, 1.0), 1.0);
    }
}
