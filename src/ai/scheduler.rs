//! Budgeted precompute scheduler for spatial snapshots
//!
//! Owns a FIFO queue of (faction, unit) pairs for every living AI faction
//! and drains it across host ticks, a time-budgeted batch at a time. The
//! budget depends on who holds the turn: a few milliseconds while the human
//! player is interacting, a larger slice during AI turns. Completed builds
//! land in a cache the turn orchestrator consults before falling back to a
//! synchronous build.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ahash::{AHashMap, AHashSet};

use crate::ai::analyzer::{SpatialAnalyzer, SpatialSnapshot};
use crate::core::config::SchedulerConfig;
use crate::core::types::{FactionId, UnitId};
use crate::world::query::WorldView;

/// Who currently holds the turn; decides the tick budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnHolder {
    Player,
    AiFaction,
}

/// One queued precompute job
#[derive(Debug, Clone, Copy)]
pub struct WorkItem {
    pub faction: FactionId,
    pub unit: UnitId,
}

/// Cache key for one (faction, unit) pair
///
/// Both ids are uuids, so two distinct pairs can never alias within a
/// process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub faction: FactionId,
    pub unit: UnitId,
}

impl CacheKey {
    pub fn new(faction: FactionId, unit: UnitId) -> Self {
        Self { faction, unit }
    }
}

/// Counters for one planning phase
#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulerStats {
    pub items_built: usize,
    pub items_skipped: usize,
    pub elapsed: Duration,
}

pub struct PrecomputeScheduler {
    analyzer: SpatialAnalyzer,
    config: SchedulerConfig,
    queue: VecDeque<WorkItem>,
    cache: AHashMap<CacheKey, SpatialSnapshot>,
    stats: SchedulerStats,
    drain_reported: bool,
}

impl PrecomputeScheduler {
    pub fn new(analyzer: SpatialAnalyzer, config: SchedulerConfig) -> Self {
        Self {
            analyzer,
            config,
            queue: VecDeque::new(),
            cache: AHashMap::new(),
            stats: SchedulerStats::default(),
            drain_reported: false,
        }
    }

    /// Reset for a new planning phase
    ///
    /// Clears the cache (stale snapshots from a previous turn must never be
    /// reused) and rebuilds the queue from every living unit of every living
    /// AI faction.
    pub fn begin_planning_phase(&mut self, world: &dyn WorldView) {
        self.cache.clear();
        self.queue.clear();
        self.stats = SchedulerStats::default();
        self.drain_reported = false;

        let mut seen: AHashSet<CacheKey> = AHashSet::new();
        for faction_id in world.faction_ids() {
            let Some(faction) = world.faction(faction_id) else {
                continue;
            };
            if !faction.ai_controlled || !faction.alive {
                continue;
            }
            for unit in world.living_units_of(faction_id) {
                if seen.insert(CacheKey::new(faction_id, unit)) {
                    self.queue.push_back(WorkItem {
                        faction: faction_id,
                        unit,
                    });
                }
            }
        }

        tracing::debug!(queued = self.queue.len(), "precompute planning phase reset");
    }

    pub fn cached(&self, faction: FactionId, unit: UnitId) -> Option<&SpatialSnapshot> {
        self.cache.get(&CacheKey::new(faction, unit))
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Drain a budget-bounded batch of work items
    ///
    /// Processes at least `min_items_per_tick` items (forward progress under
    /// budget pressure), then keeps going until the queue empties or the
    /// cumulative elapsed time for this tick meets the holder's budget.
    /// Items whose faction or unit died between enqueue and dequeue are
    /// skipped, not errors.
    pub fn tick(&mut self, world: &dyn WorldView, holder: TurnHolder) {
        if self.queue.is_empty() {
            return;
        }

        let budget = Duration::from_millis(match holder {
            TurnHolder::Player => self.config.player_turn_budget_ms,
            TurnHolder::AiFaction => self.config.ai_turn_budget_ms,
        });
        let start = Instant::now();
        let mut processed = 0usize;

        while let Some(item) = self.queue.pop_front() {
            if processed >= self.config.min_items_per_tick && start.elapsed() >= budget {
                self.queue.push_front(item);
                break;
            }
            processed += 1;

            let alive = world
                .faction(item.faction)
                .map(|f| f.alive)
                .unwrap_or(false)
                && world.unit(item.unit).map(|u| u.alive).unwrap_or(false);
            if !alive {
                self.stats.items_skipped += 1;
                continue;
            }

            let slice = Duration::from_millis(self.config.per_item_slice_ms);
            let snapshot = self
                .analyzer
                .build(world, item.faction, item.unit, Some(slice));
            self.cache
                .insert(CacheKey::new(item.faction, item.unit), snapshot);
            self.stats.items_built += 1;
        }

        self.stats.elapsed += start.elapsed();

        if self.queue.is_empty() && !self.drain_reported {
            self.drain_reported = true;
            tracing::info!(
                built = self.stats.items_built,
                skipped = self.stats.items_skipped,
                elapsed_ms = self.stats.elapsed.as_millis() as u64,
                "precompute queue drained"
            );
        }
    }
}
