//! Turn orchestration for AI factions
//!
//! Walks the living units of the active faction one at a time: legal
//! actions, snapshot (cached or built on the spot), behavior tree, decision
//! record, then a movement command with a cooperative bounded wait. Unit
//! decisions mutate shared world state, so there is exactly one writer at
//! any instant; the only suspension points are action effects and the
//! movement poll.

use std::time::Duration;

use crate::actions::catalog::ActionCatalog;
use crate::ai::analyzer::SpatialAnalyzer;
use crate::ai::behavior::{default_tree, EffectRuntime, TickResult};
use crate::ai::context::DecisionContext;
use crate::ai::log::DecisionLogSink;
use crate::ai::scheduler::PrecomputeScheduler;
use crate::core::config::AiConfig;
use crate::core::types::{FactionId, UnitId};
use crate::world::hex::HexCoord;
use crate::world::state::WorldState;

/// External movement command surface
pub trait MovementCommander: Send {
    fn issue_move(&mut self, world: &mut WorldState, unit: UnitId, target: HexCoord);

    /// Poll whether the last issued move is still playing out
    fn is_move_in_flight(&mut self, world: &WorldState, unit: UnitId) -> bool;
}

/// Summary of one faction turn
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnReport {
    pub units_processed: usize,
    pub actions_taken: usize,
    pub passes: usize,
    pub moves_issued: usize,
    pub moves_stuck: usize,
    pub cache_hits: usize,
}

pub struct TurnOrchestrator {
    analyzer: SpatialAnalyzer,
    config: AiConfig,
    log: Box<dyn DecisionLogSink>,
}

impl TurnOrchestrator {
    pub fn new(config: AiConfig, log: Box<dyn DecisionLogSink>) -> Self {
        Self {
            analyzer: SpatialAnalyzer::new(config.analyzer.clone()),
            config,
            log,
        }
    }

    /// Decide and act for every living unit of `faction`
    pub async fn run_faction_turn(
        &mut self,
        world: &mut WorldState,
        faction: FactionId,
        scheduler: &mut PrecomputeScheduler,
        catalog: &mut dyn ActionCatalog,
        mover: &mut dyn MovementCommander,
    ) -> TurnReport {
        let mut report = TurnReport::default();
        let faction_name = world
            .faction(faction)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let units = world.living_units_of(faction);
        tracing::info!(
            faction = %faction_name,
            units = units.len(),
            "AI faction turn started"
        );

        for unit in units {
            // An earlier unit's action may have killed this one
            if !world.unit(unit).map(|u| u.alive).unwrap_or(false) {
                continue;
            }
            report.units_processed += 1;

            let legal = catalog.legal_actions(world, unit);
            let snapshot = scheduler.cached(faction, unit).cloned();
            if snapshot.is_some() {
                report.cache_hits += 1;
            }
            let mut ctx =
                DecisionContext::new(&*world, &self.analyzer, faction, unit, legal, snapshot);

            let tree = default_tree();
            let result = {
                let mut fx = EffectRuntime::new(world, catalog);
                tree.tick(&mut ctx, &mut fx).await
            };
            if result != TickResult::Success {
                // The default tree bottoms out in pass, but a caller-supplied
                // tree might not: absorb total failure with an explicit pass
                // so Failure never escapes the orchestrator.
                catalog.pass(world, unit).await;
                ctx.record_pass();
            }
            if ctx.passed() {
                report.passes += 1;
            } else if ctx.chosen().is_some() {
                report.actions_taken += 1;
            }

            let record = ctx.build_log_entry(&*world, &self.analyzer);
            if let Err(err) = self.log.append(&record) {
                tracing::warn!(%err, "decision log append failed");
            }

            self.settle_movement(world, unit, &ctx, mover, &mut report)
                .await;
        }

        tracing::info!(
            faction = %faction_name,
            processed = report.units_processed,
            acted = report.actions_taken,
            passed = report.passes,
            moved = report.moves_issued,
            "AI faction turn complete"
        );
        report
    }

    /// Issue the preferred move, then cooperatively wait for it to land
    async fn settle_movement(
        &self,
        world: &mut WorldState,
        unit: UnitId,
        ctx: &DecisionContext,
        mover: &mut dyn MovementCommander,
        report: &mut TurnReport,
    ) {
        let Some(unit_state) = world.unit(unit) else {
            return;
        };
        if !unit_state.alive || unit_state.movement_left == 0 {
            return;
        }
        let location = unit_state.location;
        let Some(target) = ctx.preferred_movement_target() else {
            return;
        };
        if Some(target) == location {
            return;
        }

        mover.issue_move(world, unit, target);
        report.moves_issued += 1;

        let interval = Duration::from_millis(self.config.movement.poll_interval_ms);
        for _ in 0..self.config.movement.poll_limit {
            if !mover.is_move_in_flight(world, unit) {
                return;
            }
            tokio::time::sleep(interval).await;
        }
        if mover.is_move_in_flight(world, unit) {
            // Bounded retries are the safety valve; never deadlock on a
            // stuck animation.
            report.moves_stuck += 1;
            tracing::warn!(unit = ?unit, "movement never settled, abandoning wait");
        }
    }
}
