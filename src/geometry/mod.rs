//! Spatial primitives shared by the resolver, the touch pipeline and the
//! world interface.

mod aabb;
mod axis;
mod block_pos;
mod shape;

pub use aabb::Aabb;
pub use axis::{collision_order, Axis, YXZ, YZX};
pub use block_pos::{blocks_in, blocks_in_ordered, BlockPos};
pub use shape::{calculate_max_offset, Shape};
