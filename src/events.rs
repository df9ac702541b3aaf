//! Payloads passed to [`MotionHooks`](crate::world::MotionHooks) and a
//! recording sink.

use glam::DVec3;
use serde::Serialize;

use crate::body::EntityId;
use crate::error::HookError;
use crate::geometry::BlockPos;
use crate::world::{BlockState, FluidState, MotionHooks};

/// Discrete occurrences the motion core decides to announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GameEventKind {
    /// A falling body reached the ground.
    HitGround,
    /// A body entered water.
    Splash,
    /// A walking or climbing body took a step.
    Step,
    /// A body moved through water.
    Swim,
    /// An airborne flapping body beat its wings.
    Flap,
}

/// A game event with its emitter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameEvent {
    /// What happened.
    pub kind: GameEventKind,
    /// Where it happened.
    pub position: DVec3,
    /// The body that caused it.
    pub entity: EntityId,
    /// Block the emitter was standing on or touching, if relevant.
    pub block: Option<&'static str>,
}

/// Source of movement damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DamageCause {
    /// Landing after a fall.
    Fall,
    /// Gliding into a wall.
    FlyIntoWall,
}

/// Damage dealt to a body by its own movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Damage {
    /// Receiving body.
    pub entity: EntityId,
    /// Why.
    pub cause: DamageCause,
    /// Amount in health points.
    pub amount: f32,
}

/// Classification of a block visited by the touch pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IntersectionKind {
    /// Nothing to touch.
    InAir,
    /// The inside shape was touched.
    InBlock,
    /// The fluid volume was touched.
    InFluid,
}

/// A body touching a block's inside shape.
#[derive(Debug, Clone, Copy)]
pub struct BlockTouch<'a> {
    /// Touching body.
    pub entity: EntityId,
    /// Block position.
    pub pos: BlockPos,
    /// Block state at `pos`.
    pub state: &'a BlockState,
    /// Whether the body moved far or ended fully inside the block.
    pub entered: bool,
}

/// A body touching a block's fluid volume.
#[derive(Debug, Clone, Copy)]
pub struct FluidTouch {
    /// Touching body.
    pub entity: EntityId,
    /// Block position.
    pub pos: BlockPos,
    /// Fluid at `pos`.
    pub fluid: FluidState,
}

/// A body standing on, or landing on, a block.
#[derive(Debug, Clone, Copy)]
pub struct Landing<'a> {
    /// The body.
    pub entity: EntityId,
    /// The block beneath.
    pub pos: BlockPos,
    /// Its state.
    pub state: &'a BlockState,
    /// Body velocity at the time of the notification.
    pub velocity: DVec3,
}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Recorded {
    /// [`MotionHooks::on_block_collision`].
    BlockCollision {
        /// Touching body.
        entity: EntityId,
        /// Block position.
        pos: BlockPos,
        /// Block name.
        block: &'static str,
        /// Entered flag.
        entered: bool,
    },
    /// [`MotionHooks::on_fluid_collision`].
    FluidCollision {
        /// Touching body.
        entity: EntityId,
        /// Block position.
        pos: BlockPos,
    },
    /// [`MotionHooks::on_stepped_on`].
    SteppedOn {
        /// Standing body.
        entity: EntityId,
        /// Block position.
        pos: BlockPos,
    },
    /// [`MotionHooks::on_entity_land`].
    EntityLand {
        /// Landing body.
        entity: EntityId,
        /// Block position.
        pos: BlockPos,
    },
    /// [`MotionHooks::on_landed_upon`].
    LandedUpon {
        /// Landing body.
        entity: EntityId,
        /// Block position.
        pos: BlockPos,
        /// Accumulated fall distance.
        fall_distance: f64,
    },
    /// [`MotionHooks::emit_game_event`].
    Event(GameEvent),
    /// [`MotionHooks::apply_damage`].
    Damage(Damage),
    /// [`MotionHooks::on_intersection`].
    Intersection {
        /// Visited position.
        pos: BlockPos,
        /// Classification.
        kind: IntersectionKind,
    },
}

/// Hook sink that records every notification in order.
///
/// Positions listed in `failing_blocks` make the block collision callback
/// fail, which is how callers exercise the error path.
#[derive(Debug, Default, Clone, Serialize)]
pub struct EventLog {
    /// Notifications in arrival order.
    pub entries: Vec<Recorded>,
    /// Block positions whose collision callback fails.
    #[serde(skip)]
    pub failing_blocks: Vec<BlockPos>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Game events of `kind`.
    pub fn events(&self, kind: GameEventKind) -> impl Iterator<Item = &GameEvent> {
        self.entries.iter().filter_map(move |entry| match entry {
            Recorded::Event(event) if event.kind == kind => Some(event),
            _ => None,
        })
    }

    /// Recorded damage entries.
    pub fn damage(&self) -> impl Iterator<Item = &Damage> {
        self.entries.iter().filter_map(|entry| match entry {
            Recorded::Damage(damage) => Some(damage),
            _ => None,
        })
    }

    /// Number of block collision callbacks at `pos`.
    #[must_use]
    pub fn block_collisions_at(&self, pos: BlockPos) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Recorded::BlockCollision { pos: p, .. } if *p == pos))
            .count()
    }

    /// Number of fluid collision callbacks at `pos`.
    #[must_use]
    pub fn fluid_collisions_at(&self, pos: BlockPos) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Recorded::FluidCollision { pos: p, .. } if *p == pos))
            .count()
    }

    /// Drops all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl MotionHooks for EventLog {
    fn on_block_collision(&mut self, touch: &BlockTouch<'_>) -> Result<(), HookError> {
        if self.failing_blocks.contains(&touch.pos) {
            return Err(HookError::new(format!(
                "{} rejected the collision",
                touch.state.name
            )));
        }
        self.entries.push(Recorded::BlockCollision {
            entity: touch.entity,
            pos: touch.pos,
            block: touch.state.name,
            entered: touch.entered,
        });
        Ok(())
    }

    fn on_fluid_collision(&mut self, touch: &FluidTouch) -> Result<(), HookError> {
        self.entries.push(Recorded::FluidCollision {
            entity: touch.entity,
            pos: touch.pos,
        });
        Ok(())
    }

    fn on_stepped_on(&mut self, landing: &Landing<'_>) {
        self.entries.push(Recorded::SteppedOn {
            entity: landing.entity,
            pos: landing.pos,
        });
    }

    fn on_entity_land(&mut self, landing: &Landing<'_>) -> Option<f64> {
        self.entries.push(Recorded::EntityLand {
            entity: landing.entity,
            pos: landing.pos,
        });
        None
    }

    fn on_landed_upon(&mut self, landing: &Landing<'_>, fall_distance: f64) {
        self.entries.push(Recorded::LandedUpon {
            entity: landing.entity,
            pos: landing.pos,
            fall_distance,
        });
    }

    fn emit_game_event(&mut self, event: &GameEvent) {
        self.entries.push(Recorded::Event(event.clone()));
    }

    fn apply_damage(&mut self, damage: &Damage) {
        self.entries.push(Recorded::Damage(*damage));
    }

    fn on_intersection(&mut self, pos: BlockPos, kind: IntersectionKind) {
        self.entries.push(Recorded::Intersection { pos, kind });
    }
}
