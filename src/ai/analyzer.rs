//! Spatial analysis - the expensive per-unit world scan
//!
//! One call produces one immutable `SpatialSnapshot` for a (faction, unit)
//! pair: nearest hostile target, nearest non-neutral hostile, nearest
//! unrevealed neutral settlement, nearest hostile unit, and scored
//! artifact-transfer candidates. Builds can be time-boxed; when the budget
//! runs out mid-scan the snapshot is returned as built so far. Partial
//! snapshots are an expected outcome, not an error.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::config::AnalyzerConfig;
use crate::core::types::{FactionId, ItemId, UnitId};
use crate::world::hex::HexCoord;
use crate::world::query::WorldView;
use crate::world::state::{Artifact, UnitState};

/// Spell utility multiplier when the recipient has no arcana training
const SPELL_UTILITY_NOVICE_MULT: f32 = 3.0;
/// Skill level at which a stat bonus stops being worth anything
const STAT_LACK_CEILING: f32 = 5.0;
/// Skill level past which a stat bonus is actively wasted
const STAT_SATURATION_THRESHOLD: f32 = 3.0;
const STAT_SATURATION_PENALTY: f32 = 2.0;
const DISTANCE_PENALTY_PER_HEX: f32 = 0.25;
/// Flat penalty when the recipient has no known location
const MISSING_LOCATION_PENALTY: f32 = 6.0;
/// Divisor applied to the best raw transfer score
const TRANSFER_SCORE_DIVISOR: f32 = 3.0;

/// A hostile occupant considered as a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetCandidate {
    pub location: HexCoord,
    pub distance: u32,
    pub is_neutral: bool,
    pub strength: f32,
}

impl TargetCandidate {
    /// Effective distance; lower is better. Neutral targets pay the penalty.
    pub fn priority_score(&self, neutral_penalty: u32) -> u32 {
        self.distance + if self.is_neutral { neutral_penalty } else { 0 }
    }
}

/// A point of interest tracked by raw distance only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityTarget {
    pub distance: u32,
    pub location: HexCoord,
}

/// One (artifact, recipient) pairing with its transfer score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactTransferCandidate {
    pub item: ItemId,
    pub item_name: String,
    pub target_unit: UnitId,
    pub score: f32,
    /// None when the recipient has no known location
    pub distance: Option<u32>,
}

/// Immutable result of one spatial scan
///
/// Absent fields keep their "not found" sentinel; a time-boxed build that
/// aborted early simply leaves later fields unfilled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialSnapshot {
    pub closest_hostile: Option<TargetCandidate>,
    pub closest_non_neutral_hostile: Option<TargetCandidate>,
    pub nearest_unrevealed_settlement: Option<ProximityTarget>,
    pub nearest_hostile_unit: Option<ProximityTarget>,
    pub needs_indirect_approach: bool,
    pub gold_per_turn: i32,
    pub gold_buffer: i32,
    /// Fraction of the faction's artifacts carried by this unit
    pub artifact_share_of_nation: f32,
    pub artifact_transfer_candidates: Vec<ArtifactTransferCandidate>,
    pub best_artifact_transfer_score: f32,
}

/// Elapsed-time stopwatch; the only cancellation mechanism for a scan
struct BudgetClock {
    start: Instant,
    limit: Option<Duration>,
}

impl BudgetClock {
    fn new(limit: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    fn expired(&self) -> bool {
        self.limit.map_or(false, |l| self.start.elapsed() >= l)
    }
}

/// Builds spatial snapshots from the injected world view
#[derive(Debug, Clone)]
pub struct SpatialAnalyzer {
    config: AnalyzerConfig,
}

impl SpatialAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Scan the world for one (faction, unit) pair
    ///
    /// Never fails: missing unit, faction, or location yields an all-default
    /// snapshot, and an exhausted budget yields whatever was built so far.
    pub fn build(
        &self,
        world: &dyn WorldView,
        faction: FactionId,
        unit: UnitId,
        budget: Option<Duration>,
    ) -> SpatialSnapshot {
        let clock = BudgetClock::new(budget);
        let mut snapshot = SpatialSnapshot::default();

        if clock.expired() {
            return snapshot;
        }

        let Some(unit_state) = world.unit(unit) else {
            return snapshot;
        };
        let Some(origin) = unit_state.location else {
            return snapshot;
        };
        let Some(faction_state) = world.faction(faction) else {
            return snapshot;
        };
        let our_alignment = faction_state.alignment;

        snapshot.gold_per_turn = faction_state.gold_per_turn;
        snapshot.gold_buffer = faction_state.gold_buffer;
        snapshot.artifact_share_of_nation =
            artifact_share(world, faction, unit, unit_state.artifacts.len());

        // Single pass over the grid. The budget is checked per cell so an
        // expensive map aborts between cells, not after the whole sweep.
        let (width, height) = world.hex_bounds();
        for r in 0..height {
            for q in 0..width {
                if clock.expired() {
                    return snapshot;
                }
                let hex = HexCoord::new(q, r);
                let distance = origin.distance(&hex);

                if let Some(occupant_id) = world.unit_at(hex) {
                    if occupant_id != unit {
                        if let Some(occupant) = world.unit(occupant_id) {
                            let hostile = world
                                .faction(occupant.faction)
                                .map(|f| our_alignment.hostile_to(f.alignment))
                                .unwrap_or(false);
                            if hostile {
                                let is_neutral = world
                                    .faction(occupant.faction)
                                    .map(|f| f.alignment == crate::core::types::Alignment::Neutral)
                                    .unwrap_or(false);
                                let candidate = TargetCandidate {
                                    location: hex,
                                    distance,
                                    is_neutral,
                                    strength: occupant.defensive_strength,
                                };
                                self.consider_hostile(&mut snapshot, candidate);
                            }
                        }
                    }
                }

                if let Some(settlement) = world.settlement_at(hex) {
                    let unrevealed_nation = settlement.owner != faction
                        && world
                            .faction(settlement.owner)
                            .map(|f| f.is_nation && !world.is_revealed_to(f.id, faction))
                            .unwrap_or(false);
                    if unrevealed_nation {
                        let better = snapshot
                            .nearest_unrevealed_settlement
                            .map_or(true, |best| distance < best.distance);
                        if better {
                            snapshot.nearest_unrevealed_settlement = Some(ProximityTarget {
                                distance,
                                location: hex,
                            });
                        }
                    }
                }
            }
        }

        if let Some(best) = &snapshot.closest_hostile {
            snapshot.needs_indirect_approach = best.strength
                > unit_state.offensive_strength * (1.0 + self.config.indirect_approach_margin);
        }

        if !unit_state.artifacts.is_empty() {
            self.enumerate_transfers(world, faction, unit, unit_state, origin, &clock, &mut snapshot);
        }

        snapshot
    }

    /// Fold one hostile occupant into the tracked minima
    ///
    /// `closest_hostile` uses the penalty-adjusted comparator while
    /// `closest_non_neutral_hostile` and `nearest_hostile_unit` use raw
    /// distance, so a very close neutral can still lose the first slot to a
    /// farther non-neutral.
    fn consider_hostile(&self, snapshot: &mut SpatialSnapshot, candidate: TargetCandidate) {
        let penalty = self.config.neutral_penalty;

        let better_priority = snapshot
            .closest_hostile
            .as_ref()
            .map_or(true, |best| {
                candidate.priority_score(penalty) < best.priority_score(penalty)
            });
        if better_priority {
            snapshot.closest_hostile = Some(candidate.clone());
        }

        if !candidate.is_neutral {
            let better_raw = snapshot
                .closest_non_neutral_hostile
                .as_ref()
                .map_or(true, |best| candidate.distance < best.distance);
            if better_raw {
                snapshot.closest_non_neutral_hostile = Some(candidate.clone());
            }
        }

        let better_unit = snapshot
            .nearest_hostile_unit
            .map_or(true, |best| candidate.distance < best.distance);
        if better_unit {
            snapshot.nearest_hostile_unit = Some(ProximityTarget {
                distance: candidate.distance,
                location: candidate.location,
            });
        }
    }

    /// Score every (artifact, eligible friendly recipient) pair
    fn enumerate_transfers(
        &self,
        world: &dyn WorldView,
        faction: FactionId,
        unit: UnitId,
        unit_state: &UnitState,
        origin: HexCoord,
        clock: &BudgetClock,
        snapshot: &mut SpatialSnapshot,
    ) {
        let mut best_raw = f32::NEG_INFINITY;
        for recipient_id in world.living_units_of(faction) {
            if recipient_id == unit {
                continue;
            }
            let Some(recipient) = world.unit(recipient_id) else {
                continue;
            };
            for artifact in &unit_state.artifacts {
                if clock.expired() {
                    return;
                }
                let (score, distance) = score_transfer(artifact, recipient, origin);
                snapshot.artifact_transfer_candidates.push(ArtifactTransferCandidate {
                    item: artifact.id,
                    item_name: artifact.name.clone(),
                    target_unit: recipient_id,
                    score,
                    distance,
                });
                if score > best_raw {
                    best_raw = score;
                    snapshot.best_artifact_transfer_score =
                        (best_raw / TRANSFER_SCORE_DIVISOR).max(0.0);
                }
            }
        }
    }
}

/// Raw transfer score for one artifact offered to one recipient
///
/// Deterministic for a fixed artifact/recipient state. The returned distance
/// is None when the recipient is off-map (which costs a flat penalty rather
/// than scoring as distance zero).
pub fn score_transfer(
    artifact: &Artifact,
    recipient: &UnitState,
    origin: HexCoord,
) -> (f32, Option<u32>) {
    let mut score = 0.0;

    if artifact.spell_power > 0 {
        let mult = if recipient.skills.arcana == 0 {
            SPELL_UTILITY_NOVICE_MULT
        } else {
            1.0
        };
        score += artifact.spell_power as f32 * mult;
    }

    if let Some((kind, bonus)) = artifact.stat_bonus {
        let level = recipient.skills.level(kind) as f32;
        score += bonus as f32 * (STAT_LACK_CEILING - level).max(0.0);
        if level > STAT_SATURATION_THRESHOLD {
            score -= (level - STAT_SATURATION_THRESHOLD) * STAT_SATURATION_PENALTY;
        }
    }

    if artifact.command_bonus > 0 {
        let mult = if recipient.is_army_commander { 2.0 } else { 1.0 };
        score += artifact.command_bonus as f32 * mult;
        score += (STAT_LACK_CEILING - recipient.skills.command as f32).max(0.0);
    }

    match recipient.location {
        Some(loc) => {
            let d = origin.distance(&loc);
            score -= d as f32 * DISTANCE_PENALTY_PER_HEX;
            (score, Some(d))
        }
        None => (score - MISSING_LOCATION_PENALTY, None),
    }
}

fn artifact_share(
    world: &dyn WorldView,
    faction: FactionId,
    _unit: UnitId,
    carried: usize,
) -> f32 {
    let total: usize = world
        .living_units_of(faction)
        .iter()
        .filter_map(|id| world.unit(*id))
        .map(|u| u.artifacts.len())
        .sum();
    if total == 0 {
        0.0
    } else {
        carried as f32 / total as f32
    }
}
