//! Buffered motion output awaiting consumption by game systems.

use bevy::prelude::Resource;

use crate::events::{Damage, EventLog, GameEvent, Recorded};
use crate::geometry::BlockPos;
use crate::tick::TickReport;

/// Hook output and tick reports gathered during the last motion pass.
///
/// Every entry stays until drained, so consumers running later in the
/// frame see the whole pass.
#[derive(Resource, Default, Debug)]
pub struct MotionOutbox {
    pub(crate) log: EventLog,
    pub(crate) reports: Vec<TickReport>,
}

impl MotionOutbox {
    /// Notifications recorded so far, in arrival order.
    #[must_use]
    pub fn entries(&self) -> &[Recorded] {
        &self.log.entries
    }

    /// Reports of bodies that ticked successfully.
    #[must_use]
    pub fn reports(&self) -> &[TickReport] {
        &self.reports
    }

    /// Damage dealt during the pass.
    pub fn damage(&self) -> impl Iterator<Item = &Damage> {
        self.log.damage()
    }

    /// Game events emitted during the pass.
    pub fn game_events(&self) -> impl Iterator<Item = &GameEvent> {
        self.log.entries.iter().filter_map(|entry| match entry {
            Recorded::Event(event) => Some(event),
            _ => None,
        })
    }

    /// Removes and returns every buffered notification.
    pub fn drain_entries(&mut self) -> std::vec::Drain<'_, Recorded> {
        self.log.entries.drain(..)
    }

    /// Removes and returns every buffered report.
    pub fn drain_reports(&mut self) -> std::vec::Drain<'_, TickReport> {
        self.reports.drain(..)
    }

    /// Makes block collision callbacks at `pos` fail from now on.
    pub fn reject_collisions_at(&mut self, pos: BlockPos) {
        self.log.failing_blocks.push(pos);
    }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.entries.is_empty() && self.reports.is_empty()
    }
}
