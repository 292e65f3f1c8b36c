use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use glam::{Quat, Vec3};
use promenad_core::{ActorId, LimbId, PromenadError, Result};
use promenad_terrain::Terrain;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::population::Population;

/// Starting populations to play with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// A grid of upright limbs that all reach for the world cursor.
    #[default]
    LimbForest,
    /// One actor walking forward on two legs, arms swinging.
    SingleActor,
    /// A constrained four-bone arm on a fixed base, reaching for the cursor.
    RobotArm,
}

const FOREST_SIZE: usize = 10;
const FOREST_SPACING: f32 = 1.0;
const FOREST_BONE_LENGTH: f32 = 0.5;

/// Bone chains start out pointing up: the root frame's +x is world +y.
fn upright() -> Quat {
    Quat::from_rotation_z(FRAC_PI_2)
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::LimbForest, Scenario::SingleActor, Scenario::RobotArm];

    /// Whether the scenario's limbs get goals from the world cursor.
    pub fn follows_cursor(self) -> bool {
        matches!(self, Scenario::LimbForest | Scenario::RobotArm)
    }

    pub fn build(self, config: &SimConfig, terrain: &Terrain) -> Result<Population> {
        let mut population = Population::new();
        match self {
            Scenario::LimbForest => build_limb_forest(&mut population, terrain)?,
            Scenario::SingleActor => {
                build_walker(&mut population, config, terrain, Vec3::ZERO)?;
            }
            Scenario::RobotArm => build_robot_arm(&mut population, terrain)?,
        }
        log::debug!(
            "built {self} with {} actors and {} limbs",
            population.actors.len(),
            population.limbs.len()
        );
        Ok(population)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scenario::LimbForest => "limb_forest",
            Scenario::SingleActor => "single_actor",
            Scenario::RobotArm => "robot_arm",
        };
        f.write_str(name)
    }
}

impl FromStr for Scenario {
    type Err = PromenadError;

    fn from_str(s: &str) -> Result<Self> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.to_string() == s)
            .ok_or_else(|| PromenadError::InvalidConfiguration(format!("unknown scenario '{s}'")))
    }
}

fn build_limb_forest(population: &mut Population, terrain: &Terrain) -> Result<()> {
    let half = (FOREST_SIZE - 1) as f32 * FOREST_SPACING / 2.0;
    for i in 0..FOREST_SIZE {
        for j in 0..FOREST_SIZE {
            let x = i as f32 * FOREST_SPACING - half;
            let z = j as f32 * FOREST_SPACING - half;
            let root = Vec3::new(x, terrain.height_at(x, z), z);

            let limb = population.limbs.create_limb(root, upright())?;
            for k in 1..=3 {
                let tip = root + Vec3::Y * (k as f32 * FOREST_BONE_LENGTH);
                population.limbs.add_bone_to_limb(limb, tip)?;
            }
        }
    }
    Ok(())
}

/// An actor with two paired legs and two swinging arms, walking forward.
pub fn build_walker(
    population: &mut Population,
    config: &SimConfig,
    terrain: &Terrain,
    position: Vec3,
) -> Result<ActorId> {
    let ground = terrain.height_at(position.x, position.z);
    let hip_height = ground + config.actor_hover_height;
    let origin = Vec3::new(position.x, hip_height, position.z);
    let actor = population.actors.create_actor(origin, 0.0)?;

    // Legs: hip, knee ahead of the foot, foot on the ground
    let mut leg = |z: f32, foot_x: f32| -> Result<LimbId> {
        let hip = origin + Vec3::new(0.0, 0.0, z);
        let foot = Vec3::new(origin.x + foot_x, ground, origin.z + z);
        let knee = foot + Vec3::new(0.8, 0.5 * config.actor_hover_height, 0.0);

        let limbs = &mut population.limbs;
        let limb = limbs.create_limb(hip, Quat::IDENTITY)?;
        limbs.add_bone_to_limb(limb, knee)?;
        limbs.add_bone_to_limb(limb, foot)?;
        population
            .legs
            .attach_limb_to_actor(limb, actor, &population.actors, limbs)?;
        Ok(limb)
    };
    let left_leg = leg(0.25, 0.1)?;
    let right_leg = leg(-0.25, -0.1)?;
    population.limbs.pair_limbs(left_leg, right_leg);

    // Arms hang from the shoulders
    for z in [0.4, -0.4] {
        let shoulder = origin + Vec3::new(0.0, 0.3, z);
        let limbs = &mut population.limbs;
        let arm = limbs.create_limb(shoulder, Quat::IDENTITY)?;
        limbs.add_bone_to_limb(arm, shoulder - Vec3::Y * 0.5)?;
        limbs.add_bone_to_limb(arm, shoulder - Vec3::Y * 1.0)?;
        population
            .arms
            .attach_limb_to_actor(arm, actor, &population.actors, limbs)?;
        population.limb_swings.create_limb_swing(arm, limbs)?;
    }

    population
        .actors
        .walk_actor(actor, config.actor_walking_speed);
    Ok(actor)
}

fn build_robot_arm(population: &mut Population, terrain: &Terrain) -> Result<()> {
    let base = Vec3::new(0.0, terrain.height_at(0.0, 0.0), 0.0);
    let limbs = &mut population.limbs;
    let arm = limbs.create_limb(base, upright())?;

    let first = limbs.add_bone_to_limb(arm, base + Vec3::Y)?;
    limbs.apply_pole_constraint(first);
    for k in 2..=4 {
        let bone = limbs.add_bone_to_limb(arm, base + Vec3::Y * k as f32)?;
        limbs.apply_hinge_constraint(bone, -FRAC_PI_2, FRAC_PI_2);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use promenad_animation::BoneConstraint;

    #[test]
    fn scenario_names_parse_back() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.to_string().parse::<Scenario>().unwrap(), scenario);
        }
        assert!("moonwalk".parse::<Scenario>().is_err());
    }

    #[test]
    fn forest_is_a_grid_of_three_bone_limbs() {
        let population = Scenario::LimbForest
            .build(&SimConfig::default(), &Terrain::default())
            .unwrap();
        assert_eq!(population.limbs.len(), FOREST_SIZE * FOREST_SIZE);
        for &limb in population.limbs.ids() {
            assert_eq!(population.limbs.bone_count(limb), 3);
            let tip = population.limbs.tip_position(limb);
            assert!((tip.y - 1.5).abs() < 1e-5);
        }
        assert!(population.actors.is_empty());
    }

    #[test]
    fn walker_has_paired_legs_and_swinging_arms() {
        let population = Scenario::SingleActor
            .build(&SimConfig::default(), &Terrain::flat(0.25))
            .unwrap();
        assert_eq!(population.actors.len(), 1);
        assert_eq!(population.legs.len(), 2);
        assert_eq!(population.arms.len(), 2);
        assert_eq!(population.limb_swings.len(), 2);

        let legs: Vec<LimbId> = population.legs.iter().map(|(_, limb)| limb).collect();
        assert_eq!(population.limbs.paired_with(legs[0]), legs[1]);
        for &leg in &legs {
            assert!((population.limbs.tip_position(leg).y - 0.25).abs() < 1e-5);
        }

        let actor = population.actors.ids()[0];
        assert!(population.actors.get_actor_velocity_in_object_space(actor).x > 0.0);
    }

    #[test]
    fn robot_arm_constraints() {
        let population = Scenario::RobotArm
            .build(&SimConfig::default(), &Terrain::default())
            .unwrap();
        let arm = population.limbs.ids()[0];
        let constraints: Vec<BoneConstraint> = population
            .limbs
            .bones_of(arm)
            .map(|bone| bone.constraint)
            .collect();
        assert_eq!(constraints[0], BoneConstraint::Pole);
        for constraint in &constraints[1..] {
            assert_eq!(
                *constraint,
                BoneConstraint::Hinge { min_ang: -FRAC_PI_2, max_ang: FRAC_PI_2 }
            );
        }
        assert_eq!(constraints.len(), 4);
    }
}
