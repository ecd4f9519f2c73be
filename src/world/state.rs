//! Campaign world state - factions, units, settlements, and the hex grid
//!
//! This is the in-memory world model the decision core reads through the
//! `WorldView` trait and that action/movement effects mutate.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::types::{
    Alignment, FactionId, ItemId, SettlementId, SkillKind, SkillSet, Turn, UnitId,
};
use crate::world::hex::HexCoord;

/// A faction on the campaign map
///
/// Neutral "nations" are modelled as factions too: they own settlements,
/// start unrevealed, and are never AI-driven by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionState {
    pub id: FactionId,
    pub name: String,
    pub alignment: Alignment,
    /// Driven by the turn orchestrator (false for the human player and nations)
    pub ai_controlled: bool,
    /// Non-player-controlled nation holding neutral settlements
    pub is_nation: bool,
    pub alive: bool,
    pub gold_per_turn: i32,
    pub gold_buffer: i32,
    /// Factions this nation has revealed itself to
    pub revealed_to: AHashSet<FactionId>,
}

impl FactionState {
    pub fn new(name: impl Into<String>, alignment: Alignment) -> Self {
        Self {
            id: FactionId::new(),
            name: name.into(),
            alignment,
            ai_controlled: false,
            is_nation: false,
            alive: true,
            gold_per_turn: 0,
            gold_buffer: 0,
            revealed_to: AHashSet::new(),
        }
    }
}

/// An artifact a unit can carry and hand to a friendly recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ItemId,
    pub name: String,
    /// Spell utility granted to the bearer (worth more to non-casters)
    pub spell_power: u8,
    /// Flat bonus to one skill
    pub stat_bonus: Option<(SkillKind, u8)>,
    /// Combat bonus, worth extra in the hands of an army commander
    pub command_bonus: u8,
}

impl Artifact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            spell_power: 0,
            stat_bonus: None,
            command_bonus: 0,
        }
    }
}

/// A unit on the campaign map (leader, hero, or army stack)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitState {
    pub id: UnitId,
    pub faction: FactionId,
    pub name: String,
    /// None while off-map (garrisoned, in transit between scenes)
    pub location: Option<HexCoord>,
    pub skills: SkillSet,
    pub offensive_strength: f32,
    pub defensive_strength: f32,
    /// Hexes of movement left this turn
    pub movement_left: u32,
    pub is_army_commander: bool,
    pub artifacts: Vec<Artifact>,
    pub alive: bool,
}

impl UnitState {
    pub fn new(faction: FactionId, name: impl Into<String>) -> Self {
        Self {
            id: UnitId::new(),
            faction,
            name: name.into(),
            location: None,
            skills: SkillSet::default(),
            offensive_strength: 1.0,
            defensive_strength: 1.0,
            movement_left: 0,
            is_army_commander: false,
            artifacts: Vec::new(),
            alive: true,
        }
    }
}

/// A settlement anchored to one hex
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementState {
    pub id: SettlementId,
    pub name: String,
    pub location: HexCoord,
    pub owner: FactionId,
    pub strength: f32,
}

/// The campaign world: rectangular axial grid plus entity registries
pub struct WorldState {
    pub turn: Turn,
    width: i32,
    height: i32,
    factions: AHashMap<FactionId, FactionState>,
    units: AHashMap<UnitId, UnitState>,
    settlements: AHashMap<SettlementId, SettlementState>,
    occupancy: AHashMap<HexCoord, UnitId>,
    settlement_index: AHashMap<HexCoord, SettlementId>,
}

impl WorldState {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            turn: 0,
            width,
            height,
            factions: AHashMap::new(),
            units: AHashMap::new(),
            settlements: AHashMap::new(),
            occupancy: AHashMap::new(),
            settlement_index: AHashMap::new(),
        }
    }

    pub fn bounds(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn add_faction(&mut self, faction: FactionState) -> FactionId {
        let id = faction.id;
        self.factions.insert(id, faction);
        id
    }

    /// Place a unit on the map; replaces any previous location entry
    pub fn add_unit(&mut self, mut unit: UnitState, location: Option<HexCoord>) -> UnitId {
        let id = unit.id;
        unit.location = location;
        if let Some(hex) = location {
            self.occupancy.insert(hex, id);
        }
        self.units.insert(id, unit);
        id
    }

    pub fn add_settlement(&mut self, settlement: SettlementState) -> SettlementId {
        let id = settlement.id;
        self.settlement_index.insert(settlement.location, id);
        self.settlements.insert(id, settlement);
        id
    }

    pub fn faction(&self, id: FactionId) -> Option<&FactionState> {
        self.factions.get(&id)
    }

    pub fn faction_mut(&mut self, id: FactionId) -> Option<&mut FactionState> {
        self.factions.get_mut(&id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitState> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut UnitState> {
        self.units.get_mut(&id)
    }

    pub fn settlement(&self, id: SettlementId) -> Option<&SettlementState> {
        self.settlements.get(&id)
    }

    pub fn faction_ids(&self) -> Vec<FactionId> {
        self.factions.keys().copied().collect()
    }

    pub fn living_units_of(&self, faction: FactionId) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| u.faction == faction && u.alive)
            .map(|u| u.id)
            .collect()
    }

    pub fn unit_at(&self, hex: HexCoord) -> Option<UnitId> {
        self.occupancy.get(&hex).copied()
    }

    pub fn settlement_at(&self, hex: HexCoord) -> Option<&SettlementState> {
        self.settlement_index
            .get(&hex)
            .and_then(|id| self.settlements.get(id))
    }

    /// Move a unit to a new hex, updating the occupancy index
    pub fn move_unit(&mut self, unit: UnitId, to: HexCoord) {
        let Some(state) = self.units.get_mut(&unit) else {
            return;
        };
        if let Some(from) = state.location {
            if self.occupancy.get(&from) == Some(&unit) {
                self.occupancy.remove(&from);
            }
        }
        state.location = Some(to);
        self.occupancy.insert(to, unit);
    }

    /// Mark a unit dead and free its hex
    pub fn kill_unit(&mut self, unit: UnitId) {
        if let Some(state) = self.units.get_mut(&unit) {
            state.alive = false;
            if let Some(hex) = state.location.take() {
                if self.occupancy.get(&hex) == Some(&unit) {
                    self.occupancy.remove(&hex);
                }
            }
        }
    }

    pub fn advance_turn(&mut self) {
        self.turn += 1;
    }
}
