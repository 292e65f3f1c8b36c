//! Ring buffer of population snapshots, one per simulated step.
//!
//! Frame `n` lives in slot `n % capacity`. The ring grows lazily up to its
//! capacity; after that every step overwrites the oldest frame with
//! `clone_from`, so a running simulation does not allocate.

use crate::population::Population;

#[derive(Debug)]
pub struct History {
    frames: Vec<Population>,
    capacity: usize,
    /// Frame shown and simulated from.
    current: u64,
    /// Latest frame ever simulated on this timeline.
    newest: u64,
    /// Oldest frame whose slot has not been overwritten since.
    oldest: u64,
}

impl History {
    /// # Panics
    ///
    /// If `capacity` is below 2.
    pub fn new(initial: Population, capacity: usize) -> Self {
        assert!(capacity >= 2, "history needs room for two frames");
        let mut frames = Vec::with_capacity(capacity);
        frames.push(initial);
        Self {
            frames,
            capacity,
            current: 0,
            newest: 0,
            oldest: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn frame_count(&self) -> u64 {
        self.current
    }

    pub fn newest_frame(&self) -> u64 {
        self.newest
    }

    /// Oldest frame the ring still holds.
    pub fn oldest_frame(&self) -> u64 {
        self.oldest
    }

    pub fn current(&self) -> &Population {
        &self.frames[self.slot(self.current)]
    }

    pub fn current_mut(&mut self) -> &mut Population {
        let slot = self.slot(self.current);
        &mut self.frames[slot]
    }

    /// Copy the current frame into the next slot and make it current. Frames
    /// after the current one are forgotten. Returns the new frame to simulate.
    pub fn commit_step(&mut self) -> &mut Population {
        let from = self.slot(self.current);
        let to = self.slot(self.current + 1);

        if to == self.frames.len() {
            let copy = self.frames[from].clone();
            self.frames.push(copy);
        } else if from < to {
            let (head, tail) = self.frames.split_at_mut(to);
            tail[0].clone_from(&head[from]);
        } else {
            let (head, tail) = self.frames.split_at_mut(from);
            head[to].clone_from(&tail[0]);
        }

        self.current += 1;
        self.newest = self.current;
        // Slot `to` held frame `current - capacity`; truncating the future
        // never brings older frames back.
        self.oldest = self
            .oldest
            .max(self.current.saturating_sub(self.capacity as u64 - 1));
        &mut self.frames[to]
    }

    /// Undo the last [`History::commit_step`] after the step failed half way.
    /// The frame it overwrote stays lost, so only `current` goes back.
    pub fn abandon_step(&mut self) {
        if self.current > self.oldest {
            self.current -= 1;
            self.newest = self.current;
        }
    }

    /// Move back up to `frames`, stopping at the oldest frame held. Returns
    /// how far it actually moved.
    pub fn rewind(&mut self, frames: u64) -> u64 {
        let target = self.current.saturating_sub(frames).max(self.oldest_frame());
        let moved = self.current - target;
        self.current = target;
        moved
    }

    /// Move forward through already simulated frames, at most up to the
    /// newest. Returns how far it actually moved.
    pub fn replay(&mut self, frames: u64) -> u64 {
        let target = self.current.saturating_add(frames).min(self.newest);
        let moved = target - self.current;
        self.current = target;
        moved
    }

    fn slot(&self, frame: u64) -> usize {
        (frame % self.capacity as u64) as usize
    }
}
