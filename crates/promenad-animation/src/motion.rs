//! Goal seeking: end effectors accelerate toward their goal's current curve
//! point, and goals are retired once the end effector gets there.

use glam::Vec3;
use promenad_core::direction;

use crate::goal::LimbGoalTable;
use crate::skeleton::LimbTable;

/// Change `current` toward `target`, by at most `max_speed_change`.
pub fn accelerate_toward_goal_velocity(target: Vec3, max_speed_change: f32, current: &mut Vec3) {
    let diff = target - *current;
    let diff_speed = diff.length();
    if diff_speed <= max_speed_change {
        *current = target;
    } else {
        *current += diff * (max_speed_change / diff_speed);
    }
}

impl LimbGoalTable {
    pub fn move_limbs_toward_goals(&mut self, dt: f32, limbs: &mut LimbTable) {
        for i in 0..self.len() {
            let limb = self.limb_at(i);
            if !limbs.has(limb) {
                continue;
            }
            let ee = limbs.end_effector(limb);
            let goal = self.current_point(i);
            let (max_speed, max_acceleration) = self.speed_limits(i);

            let target_velocity = direction(ee, goal) * max_speed;
            let velocity = self.velocity_mut(i);
            accelerate_toward_goal_velocity(target_velocity, max_acceleration * dt, velocity);
            let step = *velocity * dt;

            *limbs.end_effector_mut(limb) += step;
        }
    }

    /// Advance goals whose end effector is within the threshold of the
    /// current point, and drop those past their last point. Goals of deleted
    /// limbs are dropped too.
    pub fn delete_accomplished_limb_goals(&mut self, limbs: &LimbTable) {
        let mut i = 0;
        while i < self.len() {
            let limb = self.limb_at(i);
            if !limbs.has(limb) {
                self.delete_row(i);
                continue;
            }

            let ee = limbs.end_effector(limb);
            if ee.distance(self.current_point(i)) <= self.threshold(i) && !self.advance(i) {
                log::trace!("limb {limb} reached its goal");
                // The last row moved into slot i, look at it next
                self.delete_row(i);
                continue;
            }
            i += 1;
        }
    }
}
