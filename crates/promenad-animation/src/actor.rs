use glam::{Mat4, Vec3};
use promenad_core::{
    impl_reusing_clone, move_locations, ActorId, Location, Movement, Result, SparseIndex,
};
use promenad_terrain::Terrain;

pub const MAX_ACTOR_ROWS: usize = 128;
pub const ACTOR_ID_RANGE: usize = 1024;

/// Characters that carry limbs. Actors are never deleted at runtime.
#[derive(Debug)]
pub struct ActorTable {
    index: SparseIndex<ActorId>,

    location: Vec<Location>,
    movement: Vec<Movement>,

    // Derived from `location` once per step
    to_world: Vec<Mat4>,
    to_object: Vec<Mat4>,
}

impl_reusing_clone!(ActorTable {
    index,
    location,
    movement,
    to_world,
    to_object,
});

impl Default for ActorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorTable {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ACTOR_ROWS, ACTOR_ID_RANGE)
    }

    pub fn with_capacity(max_rows: usize, id_range: usize) -> Self {
        Self {
            index: SparseIndex::new("actor", max_rows, id_range),
            location: Vec::with_capacity(max_rows),
            movement: Vec::with_capacity(max_rows),
            to_world: Vec::with_capacity(max_rows),
            to_object: Vec::with_capacity(max_rows),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn ids(&self) -> &[ActorId] {
        self.index.ids()
    }

    pub fn has(&self, actor: ActorId) -> bool {
        self.index.has(actor)
    }

    pub fn index_of(&self, actor: ActorId) -> usize {
        self.index.index_of(actor)
    }

    /// A standing actor. Its transforms are valid immediately.
    pub fn create_actor(&mut self, position: Vec3, orientation_y: f32) -> Result<ActorId> {
        let (actor, _) = self.index.create()?;
        let location = Location::new(position, orientation_y);
        self.location.push(location);
        self.movement.push(Movement::default());
        self.to_world.push(location.to_world());
        self.to_object.push(location.to_object());
        log::debug!("created actor {actor} at {position}");
        Ok(actor)
    }

    pub fn location(&self, actor: ActorId) -> Location {
        self.location[self.index_of(actor)]
    }

    /// Teleport or rotate. Transforms catch up on the next step.
    pub fn location_mut(&mut self, actor: ActorId) -> &mut Location {
        let index = self.index_of(actor);
        &mut self.location[index]
    }

    pub fn set_actor_location(&mut self, actor: ActorId, location: Location) {
        *self.location_mut(actor) = location;
    }

    pub fn movement(&self, actor: ActorId) -> Movement {
        self.movement[self.index_of(actor)]
    }

    pub fn set_actor_velocity(&mut self, actor: ActorId, velocity: Vec3) {
        let index = self.index_of(actor);
        self.movement[index].velocity = velocity;
    }

    pub fn set_actor_rotation_speed(&mut self, actor: ActorId, rotation_y: f32) {
        let index = self.index_of(actor);
        self.movement[index].rotation_y = rotation_y;
    }

    /// Tank controls: walk along the actor's own +x at `speed`.
    pub fn walk_actor(&mut self, actor: ActorId, speed: f32) {
        let forward = self.get_actor_forward_dir(actor);
        self.set_actor_velocity(actor, forward * speed);
    }

    /// Tank controls: yaw at `rotation_y` radians per second.
    pub fn turn_actor(&mut self, actor: ActorId, rotation_y: f32) {
        self.set_actor_rotation_speed(actor, rotation_y);
    }

    pub fn get_actor_forward_dir(&self, actor: ActorId) -> Vec3 {
        self.location(actor).forward()
    }

    pub fn get_actor_to_world_transform(&self, actor: ActorId) -> Mat4 {
        self.to_world[self.index_of(actor)]
    }

    pub fn get_actor_to_object_transform(&self, actor: ActorId) -> Mat4 {
        self.to_object[self.index_of(actor)]
    }

    pub fn get_actor_velocity_in_object_space(&self, actor: ActorId) -> Vec3 {
        let index = self.index_of(actor);
        self.to_object[index].transform_vector3(self.movement[index].velocity)
    }

    pub fn move_actors(&mut self, dt: f32) {
        move_locations(dt, &self.movement, &mut self.location);
    }

    /// Pin every actor `height` above the ground under it.
    pub fn keep_actors_above_ground(&mut self, height: f32, terrain: &Terrain) {
        for location in &mut self.location {
            let p = &mut location.position;
            p.y = terrain.height_at(p.x, p.z) + height;
        }
    }

    pub fn calculate_actor_transforms(&mut self) {
        for (i, location) in self.location.iter().enumerate() {
            self.to_world[i] = location.to_world();
            self.to_object[i] = location.to_object();
        }
    }
}
