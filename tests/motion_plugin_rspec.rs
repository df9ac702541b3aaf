//! Behaviour tests for the Bevy plugin using rust-rspec.
//!
//! A headless app with [`MotionPlugin`] ticks movers against a flat stone
//! terrain, mirrors their positions into `Transform`s and reports failing
//! ticks as events.

#[path = "support/rspec_runner.rs"]
mod rspec_runner;

#[path = "support/thread_safe_app.rs"]
mod thread_safe_app;

use std::sync::{Arc, Mutex};

use bevy::ecs::prelude::On;
use bevy::prelude::*;
use bevy_transform::components::Transform;
use rspec_runner::run_serial;
use thread_safe_app::{lock_app, SharedApp, ThreadSafeApp};
use tumble::events::GameEventKind;
use tumble::geometry::BlockPos;
use tumble::{BlockState, MotionOutbox, MotionPlugin, MotionTickError, Mover, Terrain};

#[derive(Resource, Default)]
struct CapturedErrors(Vec<MotionTickError>);

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value."
)]
fn capture_errors(event: On<MotionTickError>, mut captured: ResMut<CapturedErrors>) {
    captured.0.push(event.event().clone());
}

#[derive(Clone, Debug)]
struct PluginFixture {
    app: SharedApp,
    entity: Entity,
}

impl PluginFixture {
    fn dropped_from(height: f64) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(MotionPlugin);
        app.init_resource::<CapturedErrors>();
        app.add_observer(capture_errors);
        app.insert_resource(Terrain(test_utils::terrains::flat_stone()));
        let body = test_utils::bodies::dropped(1, 0, 0, height);
        let entity = app
            .world_mut()
            .spawn((Mover::new(body), Transform::default()))
            .id();
        Self {
            app: Arc::new(Mutex::new(ThreadSafeApp(app))),
            entity,
        }
    }

    fn tick(&self, times: usize) {
        let mut app = lock_app(&self.app);
        for _ in 0..times {
            app.update();
        }
    }

    fn reject_cobweb_at_origin(&self) {
        let mut app = lock_app(&self.app);
        app.world_mut()
            .resource_mut::<Terrain>()
            .0
            .set(BlockPos::new(0, 0, 0), BlockState::cobweb());
        app.world_mut()
            .resource_mut::<MotionOutbox>()
            .reject_collisions_at(BlockPos::new(0, 0, 0));
    }

    fn height(&self) -> f32 {
        let app = lock_app(&self.app);
        app.world()
            .get::<Transform>(self.entity)
            .map_or(f32::NAN, |transform| transform.translation.y)
    }

    fn body_height(&self) -> f64 {
        let app = lock_app(&self.app);
        app.world()
            .get::<Mover>(self.entity)
            .map_or(f64::NAN, |mover| mover.body.position().y)
    }

    fn hit_ground_events(&self) -> usize {
        let app = lock_app(&self.app);
        app.world()
            .resource::<MotionOutbox>()
            .game_events()
            .filter(|event| event.kind == GameEventKind::HitGround)
            .count()
    }

    fn captured_errors(&self) -> Vec<MotionTickError> {
        let app = lock_app(&self.app);
        app.world().resource::<CapturedErrors>().0.clone()
    }
}

#[test]
fn movers_fall_and_land() {
    run_serial(&rspec::given(
        "a mover three blocks above flat stone",
        PluginFixture::dropped_from(3.0),
        |ctx| {
            ctx.when("the app updates once", |ctx| {
                ctx.before_all(|fixture| fixture.tick(1));
                ctx.then("the transform follows the body down", |fixture| {
                    let height = fixture.height();
                    assert!(height < 3.0, "expected a descent, got {height}");
                    #[expect(
                        clippy::cast_possible_truncation,
                        reason = "Transforms store single precision."
                    )]
                    let body = fixture.body_height() as f32;
                    assert!((height - body).abs() < 1e-5);
                });
            });
            ctx.when("the app updates until the body settles", |ctx| {
                ctx.before_all(|fixture| fixture.tick(40));
                ctx.then("the body rests on the floor", |fixture| {
                    assert!(fixture.body_height().abs() < 1e-9);
                });
                ctx.then("exactly one landing is reported", |fixture| {
                    assert_eq!(fixture.hit_ground_events(), 1);
                });
            });
        },
    ));
}

#[test]
fn failing_ticks_raise_events() {
    run_serial(&rspec::given(
        "a mover standing in a cobweb whose collision callback fails",
        PluginFixture::dropped_from(0.0),
        |ctx| {
            ctx.before_all(|fixture| fixture.reject_cobweb_at_origin());
            ctx.when("the app updates", |ctx| {
                ctx.before_all(|fixture| fixture.tick(1));
                ctx.then("a tick error names the body", |fixture| {
                    let errors = fixture.captured_errors();
                    assert_eq!(errors.len(), 1);
                    let error = errors.first().map(|e| (e.entity, e.body.into_inner()));
                    assert_eq!(error, Some((fixture.entity, 1)));
                });
            });
        },
    ));
}
