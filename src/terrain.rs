//! In-memory voxel terrain.
//!
//! [`VoxelTerrain`] stores explicitly placed blocks in a hash map; every
//! other position reads as air. It backs the command line driver, the ECS
//! plugin and most tests.

use glam::DVec3;
use hashbrown::HashMap;
use serde::Serialize;

use crate::geometry::BlockPos;
use crate::world::{BlockState, CollisionWorld, WorldBorder};

/// Inclusive column range that counts as loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadedColumns {
    /// Lowest loaded X.
    pub min_x: i32,
    /// Lowest loaded Z.
    pub min_z: i32,
    /// Highest loaded X.
    pub max_x: i32,
    /// Highest loaded Z.
    pub max_z: i32,
}

impl LoadedColumns {
    const fn contains(&self, x: i32, z: i32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }
}

/// Sparse block storage implementing [`CollisionWorld`].
///
/// # Examples
/// ```
/// use tumble::geometry::BlockPos;
/// use tumble::terrain::VoxelTerrain;
/// use tumble::world::{BlockState, CollisionWorld};
///
/// let terrain = VoxelTerrain::flat(4, BlockState::solid("stone"));
/// assert_eq!(terrain.block_state(BlockPos::new(0, -1, 0)).name, "stone");
/// assert!(terrain.block_state(BlockPos::new(0, 0, 0)).air);
/// ```
#[derive(Debug, Clone)]
pub struct VoxelTerrain {
    blocks: HashMap<BlockPos, BlockState>,
    air: BlockState,
    border: WorldBorder,
    time: u64,
    bottom_y: i32,
    loaded: Option<LoadedColumns>,
    fast_lava: bool,
}

impl Default for VoxelTerrain {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelTerrain {
    /// An empty world of air.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: HashMap::new(),
            air: BlockState::air(),
            border: WorldBorder::default(),
            time: 0,
            bottom_y: -64,
            loaded: None,
            fast_lava: false,
        }
    }

    /// A single layer of `state` at `y = -1` spanning `-radius..=radius`
    /// on X and Z, so bodies stand at `y = 0`.
    #[must_use]
    pub fn flat(radius: i32, state: BlockState) -> Self {
        let mut terrain = Self::new();
        terrain.fill(
            BlockPos::new(-radius, -1, -radius),
            BlockPos::new(radius, -1, radius),
            &state,
        );
        terrain
    }

    /// Places `state` at `pos`, replacing whatever was there.
    pub fn set(&mut self, pos: BlockPos, state: BlockState) -> &mut Self {
        if state.air {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, state);
        }
        self
    }

    /// Clears the block at `pos`, returning the previous state.
    pub fn remove(&mut self, pos: BlockPos) -> Option<BlockState> {
        self.blocks.remove(&pos)
    }

    /// Fills the inclusive cuboid between `a` and `b` with `state`.
    pub fn fill(&mut self, a: BlockPos, b: BlockPos, state: &BlockState) -> &mut Self {
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                for z in a.z.min(b.z)..=a.z.max(b.z) {
                    self.set(BlockPos::new(x, y, z), state.clone());
                }
            }
        }
        self
    }

    /// Number of non-air blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no block has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Replaces the world border.
    pub fn set_border(&mut self, border: WorldBorder) -> &mut Self {
        self.border = border;
        self
    }

    /// Restricts loaded columns; positions outside read as unloaded.
    pub fn set_loaded(&mut self, columns: Option<LoadedColumns>) -> &mut Self {
        self.loaded = columns;
        self
    }

    /// Sets the lowest buildable Y.
    pub fn set_bottom_y(&mut self, bottom_y: i32) -> &mut Self {
        self.bottom_y = bottom_y;
        self
    }

    /// Switches lava to the fast flow rate.
    pub fn set_fast_lava(&mut self, fast: bool) -> &mut Self {
        self.fast_lava = fast;
        self
    }

    /// Advances the world clock by one tick.
    pub fn advance_time(&mut self) {
        self.time = self.time.wrapping_add(1);
    }

    /// Highest non-air block in the column at `(x, z)` at or below `from_y`.
    #[must_use]
    pub fn surface_below(&self, x: i32, z: i32, from_y: i32) -> Option<BlockPos> {
        (self.bottom_y..=from_y)
            .rev()
            .map(|y| BlockPos::new(x, y, z))
            .find(|pos| self.blocks.contains_key(pos))
    }

    /// Feet position standing on top of the column at `(x, z)`.
    #[must_use]
    pub fn spawn_point(&self, x: i32, z: i32, from_y: i32) -> DVec3 {
        let floor = self
            .surface_below(x, z, from_y)
            .map_or(f64::from(self.bottom_y), |pos| {
                let top = self
                    .block_state(pos)
                    .collision
                    .bounds()
                    .map_or(0.0, |b| b.max.y);
                f64::from(pos.y) + top
            });
        DVec3::new(f64::from(x) + 0.5, floor, f64::from(z) + 0.5)
    }
}

impl CollisionWorld for VoxelTerrain {
    fn block_state(&self, pos: BlockPos) -> &BlockState {
        self.blocks.get(&pos).unwrap_or(&self.air)
    }

    fn is_region_loaded(&self, min_x: i32, min_z: i32, max_x: i32, max_z: i32) -> bool {
        self.loaded.is_none_or(|columns| {
            columns.contains(min_x, min_z) && columns.contains(max_x, max_z)
        })
    }

    fn world_border(&self) -> WorldBorder {
        self.border
    }

    fn time(&self) -> u64 {
        self.time
    }

    fn bottom_y(&self) -> i32 {
        self.bottom_y
    }

    fn fast_lava(&self) -> bool {
        self.fast_lava
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Aabb;
    use rstest::rstest;

    #[rstest]
    fn placing_air_clears_the_block() {
        let mut terrain = VoxelTerrain::new();
        terrain.set(BlockPos::new(1, 1, 1), BlockState::solid("stone"));
        assert_eq!(terrain.len(), 1);
        terrain.set(BlockPos::new(1, 1, 1), BlockState::air());
        assert!(terrain.is_empty());
    }

    #[rstest]
    fn block_collisions_come_from_placed_blocks() {
        let terrain = VoxelTerrain::flat(2, BlockState::solid("stone"));
        let probe = Aabb::from_bottom_center(DVec3::new(0.5, -0.5, 0.5), 0.6, 1.0);
        assert_eq!(terrain.block_collisions(&probe).len(), 1);
        assert!(!terrain.is_space_empty(&probe));
    }

    #[rstest]
    fn loaded_columns_bound_region_queries() {
        let mut terrain = VoxelTerrain::new();
        terrain.set_loaded(Some(LoadedColumns {
            min_x: -4,
            min_z: -4,
            max_x: 4,
            max_z: 4,
        }));
        assert!(terrain.is_region_loaded(-1, -1, 2, 2));
        assert!(!terrain.is_region_loaded(3, 3, 5, 5));
        assert!(!terrain.is_chunk_loaded(BlockPos::new(9, 0, 0)));
    }

    #[rstest]
    fn spawn_point_rests_on_the_surface() {
        let mut terrain = VoxelTerrain::flat(2, BlockState::solid("stone"));
        terrain.set(BlockPos::new(1, 0, 1), BlockState::slab("slab"));
        assert_eq!(terrain.spawn_point(0, 0, 10), DVec3::new(0.5, 0.0, 0.5));
        assert_eq!(terrain.spawn_point(1, 1, 10), DVec3::new(1.5, 0.5, 1.5));
    }
}
