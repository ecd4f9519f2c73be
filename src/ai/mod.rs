//! Faction decision-making core
//!
//! Five cooperating pieces drive an AI faction's turn:
//! - `analyzer` scans the world once per (faction, unit) pair
//! - `scheduler` amortizes those scans across host ticks under a time budget
//! - `context` scores candidate actions per advisor domain
//! - `behavior` picks one response through a fixed-priority tree
//! - `orchestrator` walks the faction's units and ties it all together
//!
//! `log` carries the structured per-decision records out of the loop.

pub mod analyzer;
pub mod behavior;
pub mod context;
pub mod log;
pub mod orchestrator;
pub mod scheduler;

pub use analyzer::{SpatialAnalyzer, SpatialSnapshot, TargetCandidate};
pub use behavior::{default_tree, BehaviorNode, TickResult};
pub use context::{DecisionContext, EconomyStatus};
pub use log::{DecisionLogSink, DecisionRecord, JsonlDecisionLog, MemoryDecisionLog};
pub use orchestrator::{MovementCommander, TurnOrchestrator, TurnReport};
pub use scheduler::{PrecomputeScheduler, TurnHolder};
