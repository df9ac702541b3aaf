//! Shared fixtures for integration tests.
//!
//! Terrains and bodies here are small, deterministic layouts that several
//! test files build on.

pub mod bodies;
pub mod terrains;

use tumble::error::MotionError;
use tumble::prelude::*;
use tumble::TickReport;

/// Ticks `body` `ticks` times with `input`, collecting every report.
///
/// # Errors
/// Returns the first tick failure.
pub fn run_ticks(
    terrain: &VoxelTerrain,
    hooks: &mut EventLog,
    config: &MotionConfig,
    body: &mut Body,
    input: &MoveInput,
    ticks: usize,
) -> Result<Vec<TickReport>, MotionError> {
    let mut reports = Vec::with_capacity(ticks);
    for _ in 0..ticks {
        let mut ctx = MotionContext::new(terrain, hooks, config);
        reports.push(tick_body(&mut ctx, body, input)?);
    }
    Ok(reports)
}

/// Ticks `body` until it stands on the ground, giving up after `limit`
/// ticks. Returns the number of ticks taken.
///
/// # Errors
/// Returns the first tick failure.
pub fn tick_until_grounded(
    terrain: &VoxelTerrain,
    hooks: &mut EventLog,
    config: &MotionConfig,
    body: &mut Body,
    limit: usize,
) -> Result<Option<usize>, MotionError> {
    for tick in 1..=limit {
        let mut ctx = MotionContext::new(terrain, hooks, config);
        tick_body(&mut ctx, body, &MoveInput::default())?;
        if body.on_ground() {
            return Ok(Some(tick));
        }
    }
    Ok(None)
}
