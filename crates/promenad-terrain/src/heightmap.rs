use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Regular grid of ground heights over the XZ plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Heightmap {
    /// Samples along world x.
    pub width: u32,
    /// Samples along world z.
    pub depth: u32,
    pub heights: Vec<f32>,
    /// World (x, z) of sample (0, 0).
    pub origin: Vec2,
    pub cell_size: f32,
}

impl Heightmap {
    pub fn new(width: u32, depth: u32, origin: Vec2, cell_size: f32) -> Self {
        assert!(width >= 1 && depth >= 1, "heightmap needs at least one sample");
        assert!(cell_size > 0.0, "cell size must be positive");
        Self {
            width,
            depth,
            heights: vec![0.0; (width * depth) as usize],
            origin,
            cell_size,
        }
    }

    /// Fill every sample from a function of its world (x, z).
    pub fn from_fn(
        width: u32,
        depth: u32,
        origin: Vec2,
        cell_size: f32,
        f: impl Fn(f32, f32) -> f32,
    ) -> Self {
        let mut map = Self::new(width, depth, origin, cell_size);
        let cells = (0..depth).flat_map(|z| (0..width).map(move |x| (x, z)));
        for ((x, z), h) in cells.zip(map.heights.iter_mut()) {
            *h = f(
                origin.x + x as f32 * cell_size,
                origin.y + z as f32 * cell_size,
            );
        }
        map
    }

    /// Height of grid sample (x, z). Samples outside the grid read as 0.
    pub fn sample(&self, x: u32, z: u32) -> f32 {
        if x >= self.width || z >= self.depth {
            return 0.0;
        }
        self.heights
            .get((z * self.width + x) as usize)
            .copied()
            .unwrap_or(0.0)
    }

    /// Out-of-grid writes are ignored.
    pub fn set_height(&mut self, x: u32, z: u32, height: f32) {
        if x >= self.width || z >= self.depth {
            return;
        }
        if let Some(h) = self.heights.get_mut((z * self.width + x) as usize) {
            *h = height;
        }
    }

    /// Height under world (x, z), interpolated across the enclosing cell.
    /// Positions off the grid take the border height.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let last = Vec2::new((self.width - 1) as f32, (self.depth - 1) as f32);
        let grid = ((Vec2::new(x, z) - self.origin) / self.cell_size).clamp(Vec2::ZERO, last);

        // The far border belongs to the last cell
        let corner = grid.floor().min(last - Vec2::ONE).max(Vec2::ZERO);
        let t = grid - corner;

        let (x0, z0) = (corner.x as u32, corner.y as u32);
        let x1 = (x0 + 1).min(self.width - 1);
        let z1 = (z0 + 1).min(self.depth - 1);

        let near = lerp(self.sample(x0, z0), self.sample(x1, z0), t.x);
        let far = lerp(self.sample(x0, z1), self.sample(x1, z1), t.x);
        lerp(near, far, t.y)
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn samples_hit_grid_points_exactly() {
        let map = Heightmap::from_fn(3, 3, Vec2::new(-1.0, -1.0), 1.0, |x, z| x + 10.0 * z);
        assert_relative_eq!(map.height_at(-1.0, -1.0), -11.0);
        assert_relative_eq!(map.height_at(0.0, 1.0), 10.0);
        assert_relative_eq!(map.height_at(1.0, 1.0), 11.0);
    }

    #[test]
    fn interpolates_between_samples() {
        let mut map = Heightmap::new(2, 2, Vec2::ZERO, 2.0);
        map.set_height(1, 0, 4.0);
        map.set_height(1, 1, 4.0);
        assert_relative_eq!(map.height_at(1.0, 1.0), 2.0);
        assert_relative_eq!(map.height_at(0.5, 0.0), 1.0);
    }

    #[test]
    fn clamps_outside_the_grid() {
        let map = Heightmap::from_fn(2, 2, Vec2::ZERO, 1.0, |x, _| x * 3.0);
        assert_relative_eq!(map.height_at(-5.0, 0.5), 0.0);
        assert_relative_eq!(map.height_at(9.0, 0.5), 3.0);
    }

    #[test]
    fn samples_outside_the_grid_read_as_zero() {
        let mut map = Heightmap::from_fn(2, 3, Vec2::ZERO, 1.0, |_, _| 2.0);
        map.set_height(5, 0, 9.0);
        assert_eq!(map.sample(1, 2), 2.0);
        assert_eq!(map.sample(2, 0), 0.0);
        assert!(map.heights.iter().all(|&h| h == 2.0));
    }

    #[test]
    fn single_sample_map_is_flat() {
        let mut map = Heightmap::new(1, 1, Vec2::ZERO, 1.0);
        map.set_height(0, 0, 0.75);
        assert_relative_eq!(map.height_at(100.0, -3.0), 0.75);
    }
}
