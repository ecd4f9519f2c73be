//! Campaign world model and query surface

pub mod hex;
pub mod query;
pub mod state;

pub use hex::HexCoord;
pub use query::WorldView;
pub use state::{Artifact, FactionState, SettlementState, UnitState, WorldState};
