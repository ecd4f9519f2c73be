//! Iron Regent - Entry Point
//!
//! Headless campaign driver: builds a small demo world, then runs the
//! precompute scheduler and the AI turn orchestrator for a number of turns,
//! writing decision records to a JSONL log.

use ahash::AHashMap;
use async_trait::async_trait;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::runtime::Runtime;

use iron_regent::actions::catalog::{ActionCatalog, ActionDescriptor, AdvisorType};
use iron_regent::ai::analyzer::SpatialAnalyzer;
use iron_regent::ai::log::JsonlDecisionLog;
use iron_regent::ai::orchestrator::{MovementCommander, TurnOrchestrator};
use iron_regent::ai::scheduler::{PrecomputeScheduler, TurnHolder};
use iron_regent::core::config::AiConfig;
use iron_regent::core::error::Result;
use iron_regent::core::types::{Alignment, FactionId, SettlementId, UnitId};
use iron_regent::world::hex::HexCoord;
use iron_regent::world::state::{
    Artifact, FactionState, SettlementState, UnitState, WorldState,
};

/// Run a demo campaign with AI-driven factions
#[derive(Parser, Debug)]
#[command(name = "iron-regent")]
#[command(about = "Run a hex campaign with AI faction decision-making")]
struct Args {
    /// Random seed for reproducible world generation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of campaign turns to simulate
    #[arg(long, default_value_t = 10)]
    turns: u64,

    /// Decision log output path
    #[arg(long, default_value = "decisions.jsonl")]
    log_path: String,

    /// Optional TOML config overriding the default AI tuning
    #[arg(long)]
    config: Option<String>,

    /// Chatty per-decision logging
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        "iron_regent=debug"
    } else {
        "iron_regent=info"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Iron Regent starting...");

    let rt = Runtime::new()?;
    rt.block_on(run_campaign(args))
}

async fn run_campaign(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AiConfig::load(path)?,
        None => AiConfig::default(),
    };
    // The demo has no real animations to wait for; poll briskly
    config.movement.poll_interval_ms = 50;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let (mut world, ai_factions) = build_demo_world(&mut rng);

    let log = JsonlDecisionLog::create(&args.log_path)?;
    let mut orchestrator = TurnOrchestrator::new(config.clone(), Box::new(log));
    let mut scheduler = PrecomputeScheduler::new(
        SpatialAnalyzer::new(config.analyzer.clone()),
        config.scheduler.clone(),
    );
    let mut catalog = CampaignCatalog;
    let mut mover = CampaignMover::default();

    println!("=== IRON REGENT ===");
    println!(
        "Simulating {} turns, {} AI factions, decision log at {}",
        args.turns,
        ai_factions.len(),
        args.log_path
    );

    for _ in 0..args.turns {
        world.advance_turn();
        upkeep(&mut world);

        scheduler.begin_planning_phase(&world);
        // A few responsiveness-bounded ticks while the "player" acts
        for _ in 0..3 {
            scheduler.tick(&world, TurnHolder::Player);
        }

        for &faction in &ai_factions {
            if !world.faction(faction).map(|f| f.alive).unwrap_or(false) {
                continue;
            }
            scheduler.tick(&world, TurnHolder::AiFaction);
            let report = orchestrator
                .run_faction_turn(&mut world, faction, &mut scheduler, &mut catalog, &mut mover)
                .await;
            let name = world
                .faction(faction)
                .map(|f| f.name.clone())
                .unwrap_or_default();
            println!(
                "turn {:>3}  {:<12} units={} acted={} passed={} moved={} cache-hits={}",
                world.turn,
                name,
                report.units_processed,
                report.actions_taken,
                report.passes,
                report.moves_issued,
                report.cache_hits
            );
        }
    }

    let stats = scheduler.stats();
    println!(
        "Done. Last phase precompute: {} built, {} skipped.",
        stats.items_built, stats.items_skipped
    );
    Ok(())
}

/// Per-turn upkeep: income and movement refresh
fn upkeep(world: &mut WorldState) {
    for faction_id in world.faction_ids() {
        let Some(faction) = world.faction_mut(faction_id) else {
            continue;
        };
        let income = faction.gold_per_turn;
        faction.gold_buffer += income;
        for unit in world.living_units_of(faction_id) {
            if let Some(u) = world.unit_mut(unit) {
                u.movement_left = 3;
            }
        }
    }
}

fn build_demo_world(rng: &mut StdRng) -> (WorldState, Vec<FactionId>) {
    let mut world = WorldState::new(14, 14);

    let mut player = FactionState::new("Silver March", Alignment::Dominion);
    player.gold_per_turn = 5;
    player.gold_buffer = 60;
    let player = world.add_faction(player);
    spawn_warband(&mut world, rng, player, "March", HexCoord::new(2, 2), 2);

    let mut ai_factions = Vec::new();
    for (name, corner) in [
        ("Ashen Covenant", HexCoord::new(11, 2)),
        ("Thorn Covenant", HexCoord::new(2, 11)),
    ] {
        let mut faction = FactionState::new(name, Alignment::Covenant);
        faction.ai_controlled = true;
        faction.gold_per_turn = rng.gen_range(-1..6);
        faction.gold_buffer = rng.gen_range(3..40);
        let id = world.add_faction(faction);
        spawn_warband(&mut world, rng, id, name, corner, 3);
        ai_factions.push(id);
    }

    for (name, at, revealed) in [
        ("Freeholds", HexCoord::new(7, 3), false),
        ("River Clans", HexCoord::new(6, 10), true),
    ] {
        let mut nation = FactionState::new(name, Alignment::Neutral);
        nation.is_nation = true;
        if revealed {
            for &f in &ai_factions {
                nation.revealed_to.insert(f);
            }
            nation.revealed_to.insert(player);
        }
        let nation = world.add_faction(nation);
        world.add_settlement(SettlementState {
            id: SettlementId::new(),
            name: format!("{} Seat", name),
            location: at,
            owner: nation,
            strength: rng.gen_range(3.0..8.0),
        });
        let mut warden = UnitState::new(nation, format!("{} Warden", name));
        warden.defensive_strength = rng.gen_range(2.0..6.0);
        world.add_unit(warden, Some(HexCoord::new(at.q + 1, at.r)));
    }

    (world, ai_factions)
}

fn spawn_warband(
    world: &mut WorldState,
    rng: &mut StdRng,
    faction: FactionId,
    stem: &str,
    around: HexCoord,
    count: usize,
) {
    for i in 0..count {
        let mut unit = UnitState::new(faction, format!("{} Band {}", stem, i + 1));
        unit.skills.command = rng.gen_range(0..4);
        unit.skills.arcana = rng.gen_range(0..3);
        unit.skills.scouting = rng.gen_range(0..4);
        unit.skills.diplomacy = rng.gen_range(0..3);
        unit.skills.stewardship = rng.gen_range(0..3);
        unit.offensive_strength = rng.gen_range(2.0..7.0);
        unit.defensive_strength = rng.gen_range(2.0..7.0);
        unit.is_army_commander = i == 0;
        unit.movement_left = 3;
        if i == 0 {
            let mut banner = Artifact::new("War Banner");
            banner.command_bonus = rng.gen_range(1..3);
            unit.artifacts.push(banner);
        }
        let at = HexCoord::new(around.q + i as i32, around.r);
        world.add_unit(unit, Some(at));
    }
}

/// Demo action catalogue with a fixed roster and simple world effects
struct CampaignCatalog;

#[async_trait]
impl ActionCatalog for CampaignCatalog {
    fn legal_actions(&self, world: &WorldState, unit: UnitId) -> Vec<ActionDescriptor> {
        let Some(state) = world.unit(unit) else {
            return Vec::new();
        };
        let mut roster = vec![
            ActionDescriptor::new("collect-tithes", AdvisorType::Economic).with_difficulty(1),
            ActionDescriptor::new("survey-borders", AdvisorType::Intelligence).with_difficulty(1),
            ActionDescriptor::new("forced-march", AdvisorType::Movement),
        ];
        if state.is_army_commander {
            roster.push(
                ActionDescriptor::new("raise-levy", AdvisorType::Militaristic)
                    .with_difficulty(2)
                    .with_gold_cost(30),
            );
        }
        if state.skills.arcana > 0 {
            roster.push(
                ActionDescriptor::new("channel-wards", AdvisorType::Magic)
                    .with_difficulty(2)
                    .with_gold_cost(10),
            );
        }
        roster.push(
            ActionDescriptor::new("send-envoy", AdvisorType::Diplomatic).with_gold_cost(5),
        );
        roster
    }

    async fn execute(
        &mut self,
        world: &mut WorldState,
        unit: UnitId,
        action: &ActionDescriptor,
    ) -> bool {
        let Some(faction_id) = world.unit(unit).map(|u| u.faction) else {
            return false;
        };
        // Costed actions fail rather than overdraw the treasury
        if action.gold_cost > 0 {
            let Some(faction) = world.faction_mut(faction_id) else {
                return false;
            };
            if faction.gold_buffer < action.gold_cost {
                return false;
            }
            faction.gold_buffer -= action.gold_cost;
        }

        match action.name.as_str() {
            "collect-tithes" => {
                if let Some(faction) = world.faction_mut(faction_id) {
                    faction.gold_buffer += 8;
                }
            }
            "raise-levy" => {
                if let Some(u) = world.unit_mut(unit) {
                    u.offensive_strength += 1.0;
                }
            }
            "channel-wards" => {
                if let Some(u) = world.unit_mut(unit) {
                    u.defensive_strength += 0.5;
                }
            }
            "forced-march" => {
                if let Some(u) = world.unit_mut(unit) {
                    u.movement_left += 1;
                }
            }
            "send-envoy" => {
                // Reveal the nearest still-hidden nation to the actor
                let hidden: Vec<FactionId> = world
                    .faction_ids()
                    .into_iter()
                    .filter(|&id| {
                        world
                            .faction(id)
                            .map(|f| f.is_nation && !f.revealed_to.contains(&faction_id))
                            .unwrap_or(false)
                    })
                    .collect();
                match hidden.first() {
                    Some(&nation) => {
                        if let Some(n) = world.faction_mut(nation) {
                            n.revealed_to.insert(faction_id);
                        }
                    }
                    None => return false,
                }
            }
            _ => {}
        }
        true
    }

    async fn pass(&mut self, _world: &mut WorldState, _unit: UnitId) {}
}

/// Demo movement: applies the whole move up front, then reports a short
/// animation as in flight for a couple of polls
#[derive(Default)]
struct CampaignMover {
    animations: AHashMap<UnitId, u8>,
}

impl MovementCommander for CampaignMover {
    fn issue_move(&mut self, world: &mut WorldState, unit: UnitId, target: HexCoord) {
        let Some(state) = world.unit(unit) else {
            return;
        };
        let Some(mut here) = state.location else {
            return;
        };
        let steps = state.movement_left.min(here.distance(&target));
        let mut taken = 0;
        for _ in 0..steps {
            let next = here.step_toward(&target);
            // Stop short of an occupied hex instead of stacking
            if world.unit_at(next).is_some() {
                break;
            }
            here = next;
            taken += 1;
        }
        world.move_unit(unit, here);
        if let Some(u) = world.unit_mut(unit) {
            u.movement_left = u.movement_left.saturating_sub(taken);
        }
        self.animations.insert(unit, 2);
    }

    fn is_move_in_flight(&mut self, _world: &WorldState, unit: UnitId) -> bool {
        match self.animations.get_mut(&unit) {
            Some(frames) if *frames > 0 => {
                *frames -= 1;
                true
            }
            _ => false,
        }
    }
}
