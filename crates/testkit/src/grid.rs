//! A sparse voxel grid that answers neighbour queries for connectable
//! families.

use glam::IVec3;
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};
use terablock_core::Side;
use terablock_world::ConnectionCondition;

/// Set of occupied positions. A position connects towards a side when the
/// neighbour on that side is occupied.
///
/// The set sits behind a lock so a family sealed over an `Arc<GridWorld>`
/// sees later edits.
#[derive(Debug, Default)]
pub struct GridWorld {
    occupied: RwLock<HashSet<IVec3>>,
}

impl GridWorld {
    /// Empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid with `positions` occupied.
    pub fn with_blocks<I: IntoIterator<Item = IVec3>>(positions: I) -> Self {
        Self {
            occupied: RwLock::new(positions.into_iter().collect()),
        }
    }

    /// Occupy `position`. Returns `false` if it already was.
    pub fn set(&self, position: IVec3) -> bool {
        self.occupied
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(position)
    }

    /// Clear `position`. Returns `false` if it was empty.
    pub fn remove(&self, position: IVec3) -> bool {
        self.occupied
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&position)
    }

    /// Whether `position` is occupied.
    pub fn is_occupied(&self, position: IVec3) -> bool {
        self.occupied
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&position)
    }

    /// Number of occupied positions.
    pub fn len(&self) -> usize {
        self.occupied.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConnectionCondition for GridWorld {
    fn connects(&self, location: IVec3, side: Side) -> bool {
        self.is_occupied(location + side.direction())
    }
}
