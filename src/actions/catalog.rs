//! Action descriptors and the legal-action catalogue contract
//!
//! Actions are opaque to the decision core: it only reads the descriptor tag
//! (advisor domain, difficulty, gold cost) and fires the asynchronous
//! effector. The advisor tag is decided when the action is registered in the
//! catalogue, never inferred from the action's runtime type.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::types::UnitId;
use crate::world::state::WorldState;

/// Scoring domain an action belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvisorType {
    None,
    Economic,
    Militaristic,
    Intelligence,
    Magic,
    Diplomatic,
    Movement,
}

impl std::fmt::Display for AdvisorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AdvisorType::None => "none",
            AdvisorType::Economic => "economic",
            AdvisorType::Militaristic => "militaristic",
            AdvisorType::Intelligence => "intelligence",
            AdvisorType::Magic => "magic",
            AdvisorType::Diplomatic => "diplomatic",
            AdvisorType::Movement => "movement",
        };
        write!(f, "{}", label)
    }
}

/// One legal action for one unit, as reported by the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub advisor: AdvisorType,
    /// Execution difficulty (0 = trivial); scored as a clamped penalty
    pub difficulty: u8,
    pub gold_cost: i32,
}

impl ActionDescriptor {
    pub fn new(name: impl Into<String>, advisor: AdvisorType) -> Self {
        Self {
            name: name.into(),
            advisor,
            difficulty: 0,
            gold_cost: 0,
        }
    }

    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_gold_cost(mut self, gold_cost: i32) -> Self {
        self.gold_cost = gold_cost;
        self
    }
}

/// External action-availability and effect surface
///
/// `execute` resolves the action against the world and reports whether it
/// took effect. `pass` is the parameterless fallback that cannot fail.
#[async_trait]
pub trait ActionCatalog: Send {
    fn legal_actions(&self, world: &WorldState, unit: UnitId) -> Vec<ActionDescriptor>;

    async fn execute(
        &mut self,
        world: &mut WorldState,
        unit: UnitId,
        action: &ActionDescriptor,
    ) -> bool;

    async fn pass(&mut self, world: &mut WorldState, unit: UnitId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builder() {
        let action = ActionDescriptor::new("raise-levy", AdvisorType::Militaristic)
            .with_difficulty(2)
            .with_gold_cost(40);
        assert_eq!(action.advisor, AdvisorType::Militaristic);
        assert_eq!(action.difficulty, 2);
        assert_eq!(action.gold_cost, 40);
    }

    #[test]
    fn test_advisor_display_labels() {
        assert_eq!(AdvisorType::Militaristic.to_string(), "militaristic");
        assert_eq!(AdvisorType::None.to_string(), "none");
    }
}
