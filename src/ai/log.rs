//! Structured decision log
//!
//! One append-only record per unit decision: identity, before/after resource
//! and skill values with deltas, nearest-target facts, the chosen action,
//! and the full scored-action trace. This is a diagnostic/analysis sink;
//! nothing in the decision loop depends on it, and a failing sink only
//! produces a warning.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::actions::catalog::ActionDescriptor;
use crate::ai::analyzer::SpatialSnapshot;
use crate::core::types::{Alignment, FactionId, SkillSet, Turn, UnitId};
use crate::world::query::WorldView;

/// Skill and resource values sampled at one point in a decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSample {
    pub skills: SkillSet,
    pub gold_per_turn: i32,
    pub gold_buffer: i32,
    pub offensive_strength: f32,
    pub hostile_distance: Option<u32>,
    pub hostile_strength: Option<f32>,
    pub settlement_distance: Option<u32>,
}

impl LedgerSample {
    /// Sample live unit/faction state plus nearest-target facts
    ///
    /// Dead or missing references degrade to defaults, never error.
    pub fn capture(
        world: &dyn WorldView,
        faction: FactionId,
        unit: UnitId,
        snapshot: &SpatialSnapshot,
    ) -> Self {
        let (gold_per_turn, gold_buffer) = world
            .faction(faction)
            .map(|f| (f.gold_per_turn, f.gold_buffer))
            .unwrap_or((0, 0));
        let (skills, offensive_strength) = world
            .unit(unit)
            .map(|u| (u.skills, u.offensive_strength))
            .unwrap_or((SkillSet::default(), 0.0));

        Self {
            skills,
            gold_per_turn,
            gold_buffer,
            offensive_strength,
            hostile_distance: snapshot.closest_hostile.as_ref().map(|t| t.distance),
            hostile_strength: snapshot.closest_hostile.as_ref().map(|t| t.strength),
            settlement_distance: snapshot.nearest_unrevealed_settlement.map(|t| t.distance),
        }
    }
}

/// Differences between the before and after samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerDelta {
    pub gold_per_turn: i32,
    pub gold_buffer: i32,
    pub offensive_strength: f32,
    /// Present only when both samples saw a hostile
    pub hostile_distance: Option<i64>,
    pub hostile_strength: Option<f32>,
    pub settlement_distance: Option<i64>,
}

impl LedgerDelta {
    pub fn between(before: &LedgerSample, after: &LedgerSample) -> Self {
        Self {
            gold_per_turn: after.gold_per_turn - before.gold_per_turn,
            gold_buffer: after.gold_buffer - before.gold_buffer,
            offensive_strength: after.offensive_strength - before.offensive_strength,
            hostile_distance: match (before.hostile_distance, after.hostile_distance) {
                (Some(b), Some(a)) => Some(a as i64 - b as i64),
                _ => None,
            },
            hostile_strength: match (before.hostile_strength, after.hostile_strength) {
                (Some(b), Some(a)) => Some(a - b),
                _ => None,
            },
            settlement_distance: match (before.settlement_distance, after.settlement_distance) {
                (Some(b), Some(a)) => Some(a as i64 - b as i64),
                _ => None,
            },
        }
    }
}

/// One unit decision, fully accounted for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub turn: Turn,
    pub faction: FactionId,
    pub faction_name: String,
    pub alignment: Alignment,
    pub unit: UnitId,
    pub unit_name: String,
    pub economy: crate::ai::context::EconomyStatus,
    pub before: LedgerSample,
    pub after: LedgerSample,
    pub delta: LedgerDelta,
    /// None when the unit passed
    pub chosen: Option<ActionDescriptor>,
    pub passed: bool,
    /// `actionName|advisor|score|targetDistance` per scored pair
    pub trace: Vec<String>,
    /// `itemId->targetId|score|distance` per transfer candidate
    pub artifact_trace: Vec<String>,
}

/// Where decision records go
pub trait DecisionLogSink: Send {
    fn append(&mut self, record: &DecisionRecord) -> io::Result<()>;
}

/// Append-only JSON-lines file sink
pub struct JsonlDecisionLog {
    writer: BufWriter<File>,
}

impl JsonlDecisionLog {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::options()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl DecisionLogSink for JsonlDecisionLog {
    fn append(&mut self, record: &DecisionRecord) -> io::Result<()> {
        let line = serde_json::to_string(record).map_err(io::Error::other)?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()
    }
}

/// In-memory sink for tests and headless analysis
#[derive(Default)]
pub struct MemoryDecisionLog {
    pub records: Vec<DecisionRecord>,
}

impl DecisionLogSink for MemoryDecisionLog {
    fn append(&mut self, record: &DecisionRecord) -> io::Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Sink that always fails; exercises the warn-and-continue path
#[cfg(test)]
pub struct FailingDecisionLog;

#[cfg(test)]
impl DecisionLogSink for FailingDecisionLog {
    fn append(&mut self, _record: &DecisionRecord) -> io::Result<()> {
        Err(io::Error::other("sink unavailable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::context::EconomyStatus;

    fn sample() -> LedgerSample {
        LedgerSample {
            skills: SkillSet::default(),
            gold_per_turn: 2,
            gold_buffer: 10,
            offensive_strength: 4.0,
            hostile_distance: Some(3),
            hostile_strength: Some(5.0),
            settlement_distance: None,
        }
    }

    fn record() -> DecisionRecord {
        let before = sample();
        let mut after = sample();
        after.gold_buffer = 6;
        after.hostile_distance = Some(2);
        let delta = LedgerDelta::between(&before, &after);
        DecisionRecord {
            turn: 7,
            faction: FactionId::new(),
            faction_name: "Covenant".to_string(),
            alignment: Alignment::Covenant,
            unit: UnitId::new(),
            unit_name: "Captain".to_string(),
            economy: EconomyStatus::Weak,
            before,
            after,
            delta,
            chosen: None,
            passed: true,
            trace: vec!["hold-court|economic|3.20|-".to_string()],
            artifact_trace: vec![],
        }
    }

    #[test]
    fn test_delta_between_samples() {
        let before = sample();
        let mut after = sample();
        after.gold_buffer = 3;
        after.hostile_distance = None;
        let delta = LedgerDelta::between(&before, &after);
        assert_eq!(delta.gold_buffer, -7);
        // Hostile vanished: no distance delta to report
        assert_eq!(delta.hostile_distance, None);
    }

    #[test]
    fn test_jsonl_sink_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("decisions.jsonl");

        let mut sink = JsonlDecisionLog::create(&path).expect("create sink");
        sink.append(&record()).expect("append");
        sink.append(&record()).expect("append");

        let contents = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: DecisionRecord = serde_json::from_str(lines[0]).expect("parse line");
        assert_eq!(parsed.turn, 7);
        assert!(parsed.passed);
    }

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemoryDecisionLog::default();
        sink.append(&record()).expect("append");
        assert_eq!(sink.records.len(), 1);
    }
}
