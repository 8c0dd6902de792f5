//! Connectivity masks and the exact-match variant table.
//!
//! A connectable block computes one [`SideFlags`] mask from its neighbours
//! and looks the mask up in a [`ConnectivityTable`]. Lookups are exact: an
//! unregistered bit pattern resolves to nothing.

use crate::block::Block;
use crate::family::FamilyError;
use glam::IVec3;
use std::collections::BTreeMap;
use terablock_core::{BlockUri, Rotation, Side, SideFlags};
use tracing::debug;

/// Bitmask of connected sides.
pub type ConnectionMask = SideFlags;

/// Decides whether the block at a location connects towards a side.
///
/// Implementations close over whatever world state they need; the resolver
/// itself never touches the world.
pub trait ConnectionCondition: Send + Sync {
    /// Whether the block at `location` connects through `side`.
    fn connects(&self, location: IVec3, side: Side) -> bool;
}

impl<F> ConnectionCondition for F
where
    F: Fn(IVec3, Side) -> bool + Send + Sync,
{
    fn connects(&self, location: IVec3, side: Side) -> bool {
        self(location, side)
    }
}

/// Condition that never connects; every lookup resolves the empty mask.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverConnects;

impl ConnectionCondition for NeverConnects {
    fn connects(&self, _location: IVec3, _side: Side) -> bool {
        false
    }
}

/// Mask of the `sides` for which `condition` holds at `location`.
///
/// Bits are OR-ed in iteration order, so the result does not depend on it.
pub fn compute_mask<I>(
    location: IVec3,
    sides: I,
    condition: &dyn ConnectionCondition,
) -> ConnectionMask
where
    I: IntoIterator<Item = Side>,
{
    sides
        .into_iter()
        .filter(|side| condition.connects(location, *side))
        .fold(ConnectionMask::empty(), |mask, side| mask | side.flag())
}

/// Exact-match mapping from connection mask to block.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityTable {
    variants: BTreeMap<ConnectionMask, Block>,
    collisions: usize,
}

impl ConnectivityTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `block` under `mask`.
    ///
    /// An existing entry is replaced (last write wins) and returned; the
    /// collision is logged and counted.
    pub fn register_variant(&mut self, mask: ConnectionMask, block: Block) -> Option<Block> {
        let uri = block.uri().clone();
        let previous = self.variants.insert(mask, block);
        if let Some(old) = &previous {
            self.collisions += 1;
            debug!(
                mask = mask.bits(),
                replaced = %old.uri(),
                with = %uri,
                "connection mask registered twice; keeping the latest block"
            );
        }
        previous
    }

    /// Block registered for exactly `mask`.
    pub fn get(&self, mask: ConnectionMask) -> Option<&Block> {
        self.variants.get(&mask)
    }

    /// Resolve the block for a placement at `location`.
    pub fn resolve_for_placement(
        &self,
        location: IVec3,
        connectable_sides: ConnectionMask,
        condition: &dyn ConnectionCondition,
    ) -> Option<&Block> {
        self.get(compute_mask(location, connectable_sides.sides(), condition))
    }

    /// Resolve the block after a neighbour of `location` changed.
    ///
    /// This recomputes the mask from scratch rather than diffing against
    /// `_old_block`.
    pub fn resolve_for_neighbor_update(
        &self,
        location: IVec3,
        _old_block: &Block,
        connectable_sides: ConnectionMask,
        condition: &dyn ConnectionCondition,
    ) -> Option<&Block> {
        self.resolve_for_placement(location, connectable_sides, condition)
    }

    /// Mask `block` is registered under, empty when it is not registered.
    pub fn connection_mask(&self, block: &Block) -> ConnectionMask {
        self.variants
            .iter()
            .find(|(_, candidate)| candidate.uri() == block.uri())
            .map(|(mask, _)| *mask)
            .unwrap_or_default()
    }

    /// Register one variant per rotation of `base_sides`.
    ///
    /// Each rotation maps every set bit of `base_sides` to its rotated side;
    /// `name` turns the resulting mask into a block URI and `build` creates
    /// the block. Rotations producing the same mask collapse onto one entry
    /// (the last built wins). Returns the distinct masks in the order they
    /// were first produced.
    pub fn register_rotated_variants<R, N, B>(
        &mut self,
        base_sides: ConnectionMask,
        rotations: R,
        mut name: N,
        mut build: B,
    ) -> Result<Vec<ConnectionMask>, FamilyError>
    where
        R: IntoIterator<Item = Rotation>,
        N: FnMut(ConnectionMask) -> Result<BlockUri, FamilyError>,
        B: FnMut(Rotation, BlockUri) -> Result<Block, FamilyError>,
    {
        let mut registered: Vec<ConnectionMask> = Vec::new();
        for rotation in rotations {
            let mask = rotation.rotate_flags(base_sides);
            let uri = name(mask)?;
            let block = build(rotation, uri)?;
            self.register_variant(mask, block);
            if !registered.contains(&mask) {
                registered.push(mask);
            }
        }
        Ok(registered)
    }

    /// Number of overwritten registrations so far.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Number of registered masks.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Registered `(mask, block)` pairs in mask order.
    pub fn iter(&self) -> impl Iterator<Item = (ConnectionMask, &Block)> {
        self.variants.iter().map(|(mask, block)| (*mask, block))
    }

    pub(crate) fn get_mut(&mut self, mask: ConnectionMask) -> Option<&mut Block> {
        self.variants.get_mut(&mask)
    }
}
