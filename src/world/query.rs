//! Read-only world query surface consumed by the decision core
//!
//! The analyzer, scheduler, and decision context only see the world through
//! this trait; the concrete `WorldState` is injected by the caller, never
//! looked up through ambient globals.

use crate::core::types::{FactionId, Turn, UnitId};
use crate::world::hex::HexCoord;
use crate::world::state::{FactionState, SettlementState, UnitState, WorldState};

pub trait WorldView {
    /// Rectangular axial grid bounds (width, height)
    fn hex_bounds(&self) -> (i32, i32);

    fn turn(&self) -> Turn;

    fn faction(&self, id: FactionId) -> Option<&FactionState>;

    fn unit(&self, id: UnitId) -> Option<&UnitState>;

    fn faction_ids(&self) -> Vec<FactionId>;

    fn living_units_of(&self, faction: FactionId) -> Vec<UnitId>;

    fn unit_at(&self, hex: HexCoord) -> Option<UnitId>;

    fn settlement_at(&self, hex: HexCoord) -> Option<&SettlementState>;

    /// Whether `nation` has revealed itself to `faction`
    fn is_revealed_to(&self, nation: FactionId, faction: FactionId) -> bool;
}

impl WorldView for WorldState {
    fn hex_bounds(&self) -> (i32, i32) {
        self.bounds()
    }

    fn turn(&self) -> Turn {
        self.turn
    }

    fn faction(&self, id: FactionId) -> Option<&FactionState> {
        WorldState::faction(self, id)
    }

    fn unit(&self, id: UnitId) -> Option<&UnitState> {
        WorldState::unit(self, id)
    }

    fn faction_ids(&self) -> Vec<FactionId> {
        WorldState::faction_ids(self)
    }

    fn living_units_of(&self, faction: FactionId) -> Vec<UnitId> {
        WorldState::living_units_of(self, faction)
    }

    fn unit_at(&self, hex: HexCoord) -> Option<UnitId> {
        WorldState::unit_at(self, hex)
    }

    fn settlement_at(&self, hex: HexCoord) -> Option<&SettlementState> {
        WorldState::settlement_at(self, hex)
    }

    fn is_revealed_to(&self, nation: FactionId, faction: FactionId) -> bool {
        WorldState::faction(self, nation)
            .map(|n| n.revealed_to.contains(&faction))
            .unwrap_or(false)
    }
}
