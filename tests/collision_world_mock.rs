//! Checks which world queries the resolver issues, using a mocked world.

use glam::DVec3;
use mockall::mock;
use rstest::rstest;
use tumble::geometry::{Aabb, BlockPos, Shape};
use tumble::sweep::resolve_movement;
use tumble::{Body, BlockState, CollisionWorld, EntityId};

mock! {
    World {}

    impl CollisionWorld for World {
        fn block_state(&self, pos: BlockPos) -> &BlockState;
        fn entity_collisions(&self, area: &Aabb) -> Vec<Shape>;
        fn block_collisions(&self, area: &Aabb) -> Vec<Shape>;
    }
}

fn body() -> Body {
    Body::new(EntityId(9), DVec3::new(0.5, 4.0, 0.5))
}

#[rstest]
fn zero_move_never_queries_the_world() {
    let mut world = MockWorld::new();
    world.expect_block_state().return_const(BlockState::air());
    world.expect_entity_collisions().times(0);
    world.expect_block_collisions().times(0);

    let resolved = resolve_movement(&world, &body(), DVec3::ZERO);

    assert_eq!(resolved, DVec3::ZERO);
}

#[rstest]
fn open_air_move_queries_once_and_passes_through() {
    let mut world = MockWorld::new();
    world.expect_block_state().return_const(BlockState::air());
    world
        .expect_entity_collisions()
        .times(1)
        .returning(|_| Vec::new());
    world
        .expect_block_collisions()
        .times(1)
        .returning(|_| Vec::new());

    let movement = DVec3::new(0.2, -0.5, 0.1);
    let resolved = resolve_movement(&world, &body(), movement);

    assert_eq!(resolved, movement);
}

#[rstest]
fn dynamic_obstacles_stop_the_body() {
    let mut world = MockWorld::new();
    world.expect_block_state().return_const(BlockState::air());
    world
        .expect_entity_collisions()
        .returning(|_| vec![Shape::full_cube().at_block(BlockPos::new(0, 2, 0))]);
    world.expect_block_collisions().returning(|_| Vec::new());

    let resolved = resolve_movement(&world, &body(), DVec3::new(0.0, -3.0, 0.0));

    approx::assert_relative_eq!(resolved.y, -1.0);
}
