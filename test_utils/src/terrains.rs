//! Terrain layouts.

use tumble::geometry::BlockPos;
use tumble::terrain::VoxelTerrain;
use tumble::world::BlockState;

/// Flat stone floor with its top at `y = 0`.
pub fn flat_stone() -> VoxelTerrain {
    VoxelTerrain::flat(16, BlockState::solid("stone"))
}

/// Flat stone with a one block wall along `x = 3`.
pub fn walled() -> VoxelTerrain {
    let mut terrain = flat_stone();
    terrain.fill(
        BlockPos::new(3, 0, -16),
        BlockPos::new(3, 0, 16),
        &BlockState::solid("stone"),
    );
    terrain
}

/// Flat stone with a water pool two blocks deep spanning `x, z` in `0..=3`.
pub fn pool() -> VoxelTerrain {
    let mut terrain = flat_stone();
    terrain.fill(
        BlockPos::new(0, -2, 0),
        BlockPos::new(3, -3, 3),
        &BlockState::solid("stone"),
    );
    terrain.fill(
        BlockPos::new(0, -1, 0),
        BlockPos::new(3, -2, 3),
        &BlockState::water(),
    );
    terrain
}

/// Flat stone with a single block of `state` placed at `pos`.
pub fn with_block(pos: BlockPos, state: BlockState) -> VoxelTerrain {
    let mut terrain = flat_stone();
    terrain.set(pos, state);
    terrain
}
