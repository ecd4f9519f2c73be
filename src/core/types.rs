//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for factions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionId(pub Uuid);

impl FactionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FactionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for units (leaders, heroes, army stacks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub Uuid);

impl UnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for settlements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlementId(pub Uuid);

impl SettlementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Unique identifier for carried items (artifacts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Campaign turn counter
pub type Turn = u64;

/// Faction alignment on the campaign map
///
/// Two factions of the same non-neutral alignment are allied. Neutral
/// factions count as hostile to everyone; target selection deprioritizes
/// them via the neutral penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Dominion,
    Covenant,
    Neutral,
}

impl Alignment {
    /// Whether a faction of this alignment treats `other` as hostile
    pub fn hostile_to(&self, other: Alignment) -> bool {
        other == Alignment::Neutral || *self != other
    }
}

/// Skill domains a unit can be trained in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    Command,
    Arcana,
    Scouting,
    Diplomacy,
    Stewardship,
}

/// Per-unit skill levels (0 = untrained)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSet {
    pub command: u8,
    pub arcana: u8,
    pub scouting: u8,
    pub diplomacy: u8,
    pub stewardship: u8,
}

impl SkillSet {
    pub fn level(&self, kind: SkillKind) -> u8 {
        match kind {
            SkillKind::Command => self.command,
            SkillKind::Arcana => self.arcana,
            SkillKind::Scouting => self.scouting,
            SkillKind::Diplomacy => self.diplomacy,
            SkillKind::Stewardship => self.stewardship,
        }
    }

    pub fn level_mut(&mut self, kind: SkillKind) -> &mut u8 {
        match kind {
            SkillKind::Command => &mut self.command,
            SkillKind::Arcana => &mut self.arcana,
            SkillKind::Scouting => &mut self.scouting,
            SkillKind::Diplomacy => &mut self.diplomacy,
            SkillKind::Stewardship => &mut self.stewardship,
        }
    }
}
