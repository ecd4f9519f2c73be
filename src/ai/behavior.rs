//! Behavior tree evaluated against a decision context
//!
//! A small fixed set of node kinds: Selector, Sequence, Condition, Action.
//! Conditions are synchronous predicates over the context; Action leaves
//! run asynchronous effects through the `EffectRuntime` and map their
//! boolean outcome to Success/Failure. The default tree encodes the faction
//! policy: solvency dominates combat, combat dominates exploration, and the
//! pass leaf at the bottom can never fail.

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::actions::catalog::{ActionCatalog, ActionDescriptor, AdvisorType};
use crate::ai::context::DecisionContext;
use crate::core::types::UnitId;
use crate::world::state::WorldState;

/// Result of ticking one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    Success,
    Failure,
    Running,
}

/// Mutable world/effector pair handed to action leaves
pub struct EffectRuntime<'w> {
    pub world: &'w mut WorldState,
    pub catalog: &'w mut dyn ActionCatalog,
}

impl<'w> EffectRuntime<'w> {
    pub fn new(world: &'w mut WorldState, catalog: &'w mut dyn ActionCatalog) -> Self {
        Self { world, catalog }
    }

    pub async fn execute(&mut self, unit: UnitId, action: &ActionDescriptor) -> bool {
        self.catalog.execute(self.world, unit, action).await
    }

    pub async fn pass(&mut self, unit: UnitId) {
        self.catalog.pass(self.world, unit).await
    }
}

/// An asynchronous action leaf
#[async_trait]
pub trait ActionLeaf: Send + Sync {
    async fn attempt(&self, ctx: &mut DecisionContext, fx: &mut EffectRuntime<'_>) -> bool;
}

pub type ConditionFn = Box<dyn Fn(&DecisionContext) -> bool + Send + Sync>;

/// One behavior tree node
pub enum BehaviorNode {
    Selector(Vec<BehaviorNode>),
    Sequence(Vec<BehaviorNode>),
    Condition(&'static str, ConditionFn),
    Action(&'static str, Box<dyn ActionLeaf>),
}

impl BehaviorNode {
    /// Evaluate this node against the context
    ///
    /// Selector returns the first non-Failure child result; Sequence the
    /// first non-Success child result.
    pub fn tick<'a, 'w>(
        &'a self,
        ctx: &'a mut DecisionContext,
        fx: &'a mut EffectRuntime<'w>,
    ) -> BoxFuture<'a, TickResult>
    where
        'w: 'a,
    {
        Box::pin(async move {
            match self {
                BehaviorNode::Selector(children) => {
                    for child in children {
                        match child.tick(&mut *ctx, &mut *fx).await {
                            TickResult::Failure => continue,
                            other => return other,
                        }
                    }
                    TickResult::Failure
                }
                BehaviorNode::Sequence(children) => {
                    for child in children {
                        match child.tick(&mut *ctx, &mut *fx).await {
                            TickResult::Success => continue,
                            other => return other,
                        }
                    }
                    TickResult::Success
                }
                BehaviorNode::Condition(label, predicate) => {
                    let holds = predicate(ctx);
                    tracing::trace!(node = *label, holds, "condition evaluated");
                    if holds {
                        TickResult::Success
                    } else {
                        TickResult::Failure
                    }
                }
                BehaviorNode::Action(label, leaf) => {
                    let ok = leaf.attempt(ctx, fx).await;
                    tracing::debug!(node = *label, ok, "action leaf finished");
                    if ok {
                        TickResult::Success
                    } else {
                        TickResult::Failure
                    }
                }
            }
        })
    }
}

/// Leaf: attempt the best-scoring legal action for one advisor domain
pub struct AdvisorAction(pub AdvisorType);

#[async_trait]
impl ActionLeaf for AdvisorAction {
    async fn attempt(&self, ctx: &mut DecisionContext, fx: &mut EffectRuntime<'_>) -> bool {
        let Some(action) = ctx.pick_best_action_for(self.0) else {
            return false;
        };
        let unit = ctx.unit_id();
        let ok = fx.execute(unit, &action).await;
        if ok {
            ctx.record_chosen(action);
        }
        ok
    }
}

/// Leaf: attempt the single best-scoring action among all legal actions
pub struct AnyLegalAction;

#[async_trait]
impl ActionLeaf for AnyLegalAction {
    async fn attempt(&self, ctx: &mut DecisionContext, fx: &mut EffectRuntime<'_>) -> bool {
        let Some(action) = ctx.pick_best_overall() else {
            return false;
        };
        let unit = ctx.unit_id();
        let ok = fx.execute(unit, &action).await;
        if ok {
            ctx.record_chosen(action);
        }
        ok
    }
}

/// Leaf: the parameterless pass; the only action that cannot fail
pub struct PassAction;

#[async_trait]
impl ActionLeaf for PassAction {
    async fn attempt(&self, ctx: &mut DecisionContext, fx: &mut EffectRuntime<'_>) -> bool {
        let unit = ctx.unit_id();
        fx.pass(unit).await;
        ctx.record_pass();
        true
    }
}

/// The fixed default policy tree
///
/// Priority order: solvency, combat opportunity (militaristic, then
/// intelligence, magic, diplomatic), exploration/movement, any legal
/// action, pass.
pub fn default_tree() -> BehaviorNode {
    BehaviorNode::Selector(vec![
        BehaviorNode::Sequence(vec![
            BehaviorNode::Condition(
                "needs-economic-help",
                Box::new(|ctx| ctx.needs_economic_help()),
            ),
            BehaviorNode::Action("economic", Box::new(AdvisorAction(AdvisorType::Economic))),
        ]),
        BehaviorNode::Sequence(vec![
            BehaviorNode::Condition(
                "has-hostile-target",
                Box::new(|ctx| ctx.has_hostile_target()),
            ),
            BehaviorNode::Selector(vec![
                BehaviorNode::Action(
                    "militaristic",
                    Box::new(AdvisorAction(AdvisorType::Militaristic)),
                ),
                BehaviorNode::Action(
                    "intelligence",
                    Box::new(AdvisorAction(AdvisorType::Intelligence)),
                ),
                BehaviorNode::Action("magic", Box::new(AdvisorAction(AdvisorType::Magic))),
                BehaviorNode::Action(
                    "diplomatic",
                    Box::new(AdvisorAction(AdvisorType::Diplomatic)),
                ),
            ]),
        ]),
        BehaviorNode::Sequence(vec![
            BehaviorNode::Condition(
                "prioritize-movement",
                Box::new(|ctx| ctx.should_prioritize_movement()),
            ),
            BehaviorNode::Action("movement", Box::new(AdvisorAction(AdvisorType::Movement))),
        ]),
        BehaviorNode::Action("any-legal", Box::new(AnyLegalAction)),
        BehaviorNode::Action("pass", Box::new(PassAction)),
    ])
}
