use glam::Vec3;
use promenad_core::{impl_reusing_clone, LimbId, PromenadError, Result, SparseIndex};

use crate::skeleton::{LIMB_ID_RANGE, MAX_LIMB_ROWS};

pub const MAX_CURVE_POINTS: usize = 4;
/// Tip distance at which a curve point counts as reached.
pub const GOAL_THRESHOLD: f32 = 0.1;

/// Where limbs are heading, keyed by limb id. A goal is a short curve of
/// points visited in order; the row disappears after the last one.
#[derive(Debug)]
pub struct LimbGoalTable {
    index: SparseIndex<LimbId>,

    curve_points: Vec<[Vec3; MAX_CURVE_POINTS]>,
    curve_length: Vec<u8>,
    curve_index: Vec<u8>,
    velocity: Vec<Vec3>,
    max_speed: Vec<f32>,
    max_acceleration: Vec<f32>,
    threshold: Vec<f32>,
}

impl_reusing_clone!(LimbGoalTable {
    index,
    curve_points,
    curve_length,
    curve_index,
    velocity,
    max_speed,
    max_acceleration,
    threshold,
});

impl Default for LimbGoalTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LimbGoalTable {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LIMB_ROWS, LIMB_ID_RANGE)
    }

    pub fn with_capacity(max_rows: usize, id_range: usize) -> Self {
        Self {
            index: SparseIndex::new("limb goal", max_rows, id_range),
            curve_points: Vec::with_capacity(max_rows),
            curve_length: Vec::with_capacity(max_rows),
            curve_index: Vec::with_capacity(max_rows),
            velocity: Vec::with_capacity(max_rows),
            max_speed: Vec::with_capacity(max_rows),
            max_acceleration: Vec::with_capacity(max_rows),
            threshold: Vec::with_capacity(max_rows),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn has_limb_goal(&self, limb: LimbId) -> bool {
        self.index.has(limb)
    }

    /// Aim the limb at a single point. An existing goal keeps its velocity.
    pub fn put_limb_goal(
        &mut self,
        limb: LimbId,
        position: Vec3,
        max_speed: f32,
        max_acceleration: f32,
    ) -> Result<()> {
        let index = match self.index.try_index_of(limb) {
            Some(index) => index,
            None => self.insert_row(limb)?,
        };
        self.curve_points[index][0] = position;
        self.curve_length[index] = 1;
        self.curve_index[index] = 0;
        self.max_speed[index] = max_speed;
        self.max_acceleration[index] = max_acceleration;
        Ok(())
    }

    /// Append a point to the limb's curve, or start a new one.
    pub fn push_limb_goal(
        &mut self,
        limb: LimbId,
        position: Vec3,
        max_speed: f32,
        max_acceleration: f32,
    ) -> Result<()> {
        let Some(index) = self.index.try_index_of(limb) else {
            return self.put_limb_goal(limb, position, max_speed, max_acceleration);
        };

        let length = self.curve_length[index] as usize;
        if length >= MAX_CURVE_POINTS {
            return Err(PromenadError::CapacityExceeded {
                table: "limb goal curve",
                capacity: MAX_CURVE_POINTS,
            });
        }
        self.curve_points[index][length] = position;
        self.curve_length[index] += 1;
        self.max_speed[index] = max_speed;
        self.max_acceleration[index] = max_acceleration;
        Ok(())
    }

    pub fn delete_limb_goal(&mut self, limb: LimbId) -> bool {
        match self.index.try_index_of(limb) {
            Some(index) => {
                self.delete_row(index);
                true
            }
            None => false,
        }
    }

    /// Point the limb is currently heading for.
    pub fn current_goal(&self, limb: LimbId) -> Option<Vec3> {
        self.index.try_index_of(limb).map(|i| self.current_point(i))
    }

    pub fn goal_velocity(&self, limb: LimbId) -> Option<Vec3> {
        self.index.try_index_of(limb).map(|i| self.velocity[i])
    }

    /// Points of the limb's curve, in visiting order.
    pub fn curve(&self, limb: LimbId) -> &[Vec3] {
        match self.index.try_index_of(limb) {
            Some(i) => &self.curve_points[i][..self.curve_length[i] as usize],
            None => &[],
        }
    }

    pub fn set_threshold(&mut self, limb: LimbId, threshold: f32) {
        let index = self.index.index_of(limb);
        self.threshold[index] = threshold;
    }

    // Row access for the motion controller. Indices are only valid until the
    // next delete.

    pub(crate) fn limb_at(&self, index: usize) -> LimbId {
        self.index.id_at(index)
    }

    pub(crate) fn current_point(&self, index: usize) -> Vec3 {
        self.curve_points[index][self.curve_index[index] as usize]
    }

    pub(crate) fn speed_limits(&self, index: usize) -> (f32, f32) {
        (self.max_speed[index], self.max_acceleration[index])
    }

    pub(crate) fn velocity_mut(&mut self, index: usize) -> &mut Vec3 {
        &mut self.velocity[index]
    }

    pub(crate) fn threshold(&self, index: usize) -> f32 {
        self.threshold[index]
    }

    /// Move on to the next curve point. Returns false when there is none.
    pub(crate) fn advance(&mut self, index: usize) -> bool {
        let next = self.curve_index[index] + 1;
        if next < self.curve_length[index] {
            self.curve_index[index] = next;
            true
        } else {
            false
        }
    }

    pub(crate) fn delete_row(&mut self, index: usize) {
        let removal = self.index.delete_at(index);
        self.curve_points.swap_remove(removal.index);
        self.curve_length.swap_remove(removal.index);
        self.curve_index.swap_remove(removal.index);
        self.velocity.swap_remove(removal.index);
        self.max_speed.swap_remove(removal.index);
        self.max_acceleration.swap_remove(removal.index);
        self.threshold.swap_remove(removal.index);
    }

    fn insert_row(&mut self, limb: LimbId) -> Result<usize> {
        let index = self.index.insert(limb)?;
        self.curve_points.push([Vec3::ZERO; MAX_CURVE_POINTS]);
        self.curve_length.push(0);
        self.curve_index.push(0);
        self.velocity.push(Vec3::ZERO);
        self.max_speed.push(0.0);
        self.max_acceleration.push(0.0);
        self.threshold.push(GOAL_THRESHOLD);
        Ok(index)
    }
}
