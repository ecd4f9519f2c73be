//! End-to-end AI faction turn tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use iron_regent::actions::catalog::{ActionCatalog, ActionDescriptor, AdvisorType};
use iron_regent::ai::analyzer::SpatialAnalyzer;
use iron_regent::ai::context::EconomyStatus;
use iron_regent::ai::log::{DecisionLogSink, DecisionRecord};
use iron_regent::ai::orchestrator::{MovementCommander, TurnOrchestrator};
use iron_regent::ai::scheduler::{PrecomputeScheduler, TurnHolder};
use iron_regent::core::config::AiConfig;
use iron_regent::core::types::{Alignment, FactionId, UnitId};
use iron_regent::world::hex::HexCoord;
use iron_regent::world::state::{FactionState, UnitState, WorldState};

/// Log sink that keeps records inspectable after the orchestrator owns it
#[derive(Clone, Default)]
struct SharedLog(Arc<Mutex<Vec<DecisionRecord>>>);

impl SharedLog {
    fn records(&self) -> Vec<DecisionRecord> {
        self.0.lock().unwrap().clone()
    }
}

impl DecisionLogSink for SharedLog {
    fn append(&mut self, record: &DecisionRecord) -> std::io::Result<()> {
        self.0.lock().unwrap().push(record.clone());
        Ok(())
    }
}

struct TestCatalog {
    roster: Vec<ActionDescriptor>,
}

#[async_trait]
impl ActionCatalog for TestCatalog {
    fn legal_actions(&self, _world: &WorldState, _unit: UnitId) -> Vec<ActionDescriptor> {
        self.roster.clone()
    }

    async fn execute(
        &mut self,
        world: &mut WorldState,
        unit: UnitId,
        action: &ActionDescriptor,
    ) -> bool {
        if action.name == "collect-tithes" {
            let faction = world.unit(unit).map(|u| u.faction);
            if let Some(f) = faction.and_then(|id| world.faction_mut(id)) {
                f.gold_buffer += 8;
            }
        }
        true
    }

    async fn pass(&mut self, _world: &mut WorldState, _unit: UnitId) {}
}

struct TeleportMover;

impl MovementCommander for TeleportMover {
    fn issue_move(&mut self, world: &mut WorldState, unit: UnitId, target: HexCoord) {
        // Step one hex short of the target so units never stack
        let from = world.unit(unit).and_then(|u| u.location);
        if let Some(from) = from {
            if from.distance(&target) > 1 {
                let mut here = from;
                while here.distance(&target) > 1 {
                    here = here.step_toward(&target);
                }
                world.move_unit(unit, here);
            }
        }
    }

    fn is_move_in_flight(&mut self, _world: &WorldState, _unit: UnitId) -> bool {
        false
    }
}

fn ai_faction(world: &mut WorldState, gold_per_turn: i32, gold_buffer: i32) -> FactionId {
    let mut faction = FactionState::new("Ashen Covenant", Alignment::Covenant);
    faction.ai_controlled = true;
    faction.gold_per_turn = gold_per_turn;
    faction.gold_buffer = gold_buffer;
    world.add_faction(faction)
}

fn spawn_hostile(world: &mut WorldState, at: HexCoord, strength: f32) {
    let enemy = world.add_faction(FactionState::new("Silver March", Alignment::Dominion));
    let mut grunt = UnitState::new(enemy, "March Grunt");
    grunt.defensive_strength = strength;
    world.add_unit(grunt, Some(at));
}

fn standard_roster() -> Vec<ActionDescriptor> {
    vec![
        ActionDescriptor::new("collect-tithes", AdvisorType::Economic).with_difficulty(1),
        ActionDescriptor::new("strike-camp", AdvisorType::Militaristic).with_difficulty(1),
    ]
}

fn harness(config: &AiConfig) -> (TurnOrchestrator, PrecomputeScheduler, SharedLog) {
    let log = SharedLog::default();
    let orchestrator = TurnOrchestrator::new(config.clone(), Box::new(log.clone()));
    let scheduler = PrecomputeScheduler::new(
        SpatialAnalyzer::new(config.analyzer.clone()),
        config.scheduler.clone(),
    );
    (orchestrator, scheduler, log)
}

#[tokio::test]
async fn test_critical_economy_wins_over_adjacent_hostile() {
    let mut world = WorldState::new(12, 12);
    let faction = ai_faction(&mut world, -1, 3);
    let mut marshal = UnitState::new(faction, "Marshal");
    marshal.offensive_strength = 6.0;
    marshal.is_army_commander = true;
    world.add_unit(marshal, Some(HexCoord::new(4, 4)));
    spawn_hostile(&mut world, HexCoord::new(5, 4), 1.0);

    let config = AiConfig::default();
    let (mut orchestrator, mut scheduler, log) = harness(&config);
    let mut catalog = TestCatalog {
        roster: standard_roster(),
    };
    let mut mover = TeleportMover;

    let report = orchestrator
        .run_faction_turn(&mut world, faction, &mut scheduler, &mut catalog, &mut mover)
        .await;

    assert_eq!(report.units_processed, 1);
    let records = log.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.economy, EconomyStatus::Critical);
    // Solvency dominates: the economic action wins despite a hostile one hex away
    assert_eq!(record.chosen.as_ref().unwrap().name, "collect-tithes");
    assert!(!record.passed);
    // The effect landed before the "after" sample was taken
    assert_eq!(record.delta.gold_buffer, 8);
}

#[tokio::test]
async fn test_full_turn_uses_cache_and_moves_toward_hostiles() {
    let mut world = WorldState::new(12, 12);
    let faction = ai_faction(&mut world, 6, 50);
    let mut first = UnitState::new(faction, "First Band");
    first.offensive_strength = 6.0;
    first.movement_left = 3;
    let first = world.add_unit(first, Some(HexCoord::new(1, 1)));
    let mut second = UnitState::new(faction, "Second Band");
    second.offensive_strength = 6.0;
    second.movement_left = 3;
    world.add_unit(second, Some(HexCoord::new(2, 1)));
    spawn_hostile(&mut world, HexCoord::new(8, 1), 1.0);

    let config = AiConfig::default();
    let (mut orchestrator, mut scheduler, log) = harness(&config);
    scheduler.begin_planning_phase(&world);
    while !scheduler.is_idle() {
        scheduler.tick(&world, TurnHolder::AiFaction);
    }

    let mut catalog = TestCatalog {
        roster: standard_roster(),
    };
    let mut mover = TeleportMover;

    let report = orchestrator
        .run_faction_turn(&mut world, faction, &mut scheduler, &mut catalog, &mut mover)
        .await;

    assert_eq!(report.units_processed, 2);
    assert_eq!(report.cache_hits, 2);
    assert_eq!(report.moves_issued, 2);

    // Surplus economy plus a hostile target: combat branch picks militaristic
    let records = log.records();
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record.economy, EconomyStatus::Surplus);
        assert_eq!(record.chosen.as_ref().unwrap().name, "strike-camp");
        assert!(!record.trace.is_empty());
    }

    // First band closed in on the hostile camp
    let after = world.unit(first).unwrap().location.unwrap();
    assert!(after.distance(&HexCoord::new(8, 1)) < HexCoord::new(1, 1).distance(&HexCoord::new(8, 1)));
}

#[tokio::test]
async fn test_empty_roster_passes_every_unit() {
    let mut world = WorldState::new(10, 10);
    let faction = ai_faction(&mut world, 6, 50);
    for i in 0..3 {
        world.add_unit(
            UnitState::new(faction, format!("Band {}", i)),
            Some(HexCoord::new(i, 0)),
        );
    }

    let config = AiConfig::default();
    let (mut orchestrator, mut scheduler, log) = harness(&config);
    let mut catalog = TestCatalog { roster: vec![] };
    let mut mover = TeleportMover;

    let report = orchestrator
        .run_faction_turn(&mut world, faction, &mut scheduler, &mut catalog, &mut mover)
        .await;

    assert_eq!(report.units_processed, 3);
    assert_eq!(report.passes, 3);
    for record in log.records() {
        assert!(record.passed);
        assert!(record.chosen.is_none());
        assert!(record.trace.is_empty());
    }
}
