//! Sparse-set row bookkeeping shared by every entity table.
//!
//! A [`SparseIndex`] owns only the metadata: which id lives in which dense
//! slot. Tables keep their columns as parallel `Vec`s next to it and mirror
//! every structural change:
//!
//! - after [`SparseIndex::create`] or [`SparseIndex::insert`], push one value
//!   onto every column;
//! - after [`SparseIndex::delete`], call `swap_remove(removal.index)` on every
//!   column.
//!
//! Dense indices move whenever another row is deleted. Resolve ids to indices
//! when you need them, never hold on to an index across a step.

use std::fmt;

use crate::error::{PromenadError, Result};

/// A `u16` handle issued by one table family.
pub trait TableId: Copy + Eq + fmt::Debug {
    fn from_raw(raw: u16) -> Self;
    fn raw(self) -> u16;
}

macro_rules! table_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u16);

        impl TableId for $name {
            #[inline]
            fn from_raw(raw: u16) -> Self {
                Self(raw)
            }

            #[inline]
            fn raw(self) -> u16 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

table_id!(
    /// Handle of a row in the actor table.
    ActorId
);
table_id!(
    /// Handle of a limb. Goal, swing and link rows are keyed by it too.
    LimbId
);

/// Implements `Clone` field by field with a `clone_from` that reuses the
/// destination's allocations. Tables are copied once per simulation step into
/// the history ring, so this keeps the steady state allocation free.
#[macro_export]
macro_rules! impl_reusing_clone {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl Clone for $ty {
            fn clone(&self) -> Self {
                Self {
                    $($field: self.$field.clone(),)+
                }
            }

            fn clone_from(&mut self, source: &Self) {
                $(self.$field.clone_from(&source.$field);)+
            }
        }
    };
}

/// Which dense slot a delete vacated, and which row got moved into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Removal<I> {
    pub index: usize,
    pub moved: Option<I>,
}

#[derive(Debug)]
pub struct SparseIndex<I> {
    name: &'static str,
    sparse: Vec<u16>,
    dense: Vec<I>,
    max_rows: usize,
    next_id: u16,
}

impl<I: Clone> Clone for SparseIndex<I> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            sparse: self.sparse.clone(),
            dense: self.dense.clone(),
            max_rows: self.max_rows,
            next_id: self.next_id,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.name = source.name;
        self.sparse.clone_from(&source.sparse);
        self.dense.clone_from(&source.dense);
        self.max_rows = source.max_rows;
        self.next_id = source.next_id;
    }
}

impl<I: TableId> SparseIndex<I> {
    /// # Panics
    ///
    /// If `max_rows` exceeds `id_range`, or `id_range` does not fit `u16` ids.
    pub fn new(name: &'static str, max_rows: usize, id_range: usize) -> Self {
        assert!(max_rows <= id_range, "{name}: more rows than ids");
        assert!(id_range <= u16::MAX as usize + 1, "{name}: id range exceeds u16");
        Self {
            name,
            sparse: vec![0; id_range],
            dense: Vec::with_capacity(max_rows),
            max_rows,
            next_id: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_rows
    }

    pub fn id_range(&self) -> usize {
        self.sparse.len()
    }

    /// Live ids in dense order.
    pub fn ids(&self) -> &[I] {
        &self.dense
    }

    pub fn has(&self, id: I) -> bool {
        self.try_index_of(id).is_some()
    }

    pub fn try_index_of(&self, id: I) -> Option<usize> {
        let index = *self.sparse.get(id.raw() as usize)? as usize;
        (index < self.dense.len() && self.dense[index] == id).then_some(index)
    }

    /// Dense index of a live id.
    ///
    /// # Panics
    ///
    /// If `id` has no row. Passing a dead handle is a programming error; use
    /// [`SparseIndex::has`] first when liveness is not already guaranteed.
    pub fn index_of(&self, id: I) -> usize {
        match self.try_index_of(id) {
            Some(index) => index,
            None => panic!("{}: invalid handle {:?}", self.name, id),
        }
    }

    /// # Panics
    ///
    /// If `index` is not below [`SparseIndex::len`].
    pub fn id_at(&self, index: usize) -> I {
        self.dense[index]
    }

    /// Issue a fresh id and register it in the next dense slot.
    pub fn create(&mut self) -> Result<(I, usize)> {
        self.ensure_room()?;
        let id = self.issue_id();
        Ok((id, self.push(id)))
    }

    /// Register a row for an id issued elsewhere (goal rows use limb ids).
    ///
    /// # Panics
    ///
    /// If the id lies outside this table's id range.
    pub fn insert(&mut self, id: I) -> Result<usize> {
        assert!(
            (id.raw() as usize) < self.sparse.len(),
            "{}: id {:?} outside id range {}",
            self.name,
            id,
            self.sparse.len()
        );
        if self.has(id) {
            return Err(PromenadError::DuplicateRow {
                table: self.name,
                id: id.raw(),
            });
        }
        self.ensure_room()?;
        Ok(self.push(id))
    }

    /// Swap-delete the row of `id`. `None` when the id has no row.
    pub fn delete(&mut self, id: I) -> Option<Removal<I>> {
        let index = self.try_index_of(id)?;
        Some(self.delete_at(index))
    }

    /// # Panics
    ///
    /// If `index` is not below [`SparseIndex::len`].
    pub fn delete_at(&mut self, index: usize) -> Removal<I> {
        self.dense.swap_remove(index);
        let moved = self.dense.get(index).copied();
        if let Some(moved_id) = moved {
            self.sparse[moved_id.raw() as usize] = index as u16;
        }
        Removal { index, moved }
    }

    fn ensure_room(&self) -> Result<()> {
        if self.dense.len() >= self.max_rows {
            log::debug!("{} table full at {} rows", self.name, self.max_rows);
            return Err(PromenadError::CapacityExceeded {
                table: self.name,
                capacity: self.max_rows,
            });
        }
        Ok(())
    }

    // Wraps at the id range and skips ids that are still alive. Terminates
    // because there are always fewer rows than ids.
    fn issue_id(&mut self) -> I {
        let range = self.sparse.len();
        loop {
            let candidate = I::from_raw(self.next_id);
            self.next_id = ((self.next_id as usize + 1) % range) as u16;
            if !self.has(candidate) {
                return candidate;
            }
        }
    }

    fn push(&mut self, id: I) -> usize {
        let index = self.dense.len();
        self.sparse[id.raw() as usize] = index as u16;
        self.dense.push(id);
        index
    }
}
