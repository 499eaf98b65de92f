use lanebreaker_core::{
    BuildPlan, BuildStep, CellCoord, EventKind, GameEngine, MatchEvent, ResourcePools, Side,
    TransportError, UnitKind,
};
use lanebreaker_system_build_plan::{PlanProgress, StepOutcome};
use lanebreaker_system_turn_driver::{OffenseOutcome, Strategy, StrategyConfig};
use lanebreaker_world::{query, World};

const LEFT_CORRIDOR: CellCoord = CellCoord::new(5, 13);
const RIGHT_CORRIDOR: CellCoord = CellCoord::new(22, 13);
const CORNER_TURRET: CellCoord = CellCoord::new(1, 12);

fn strategy(seed: u64) -> Strategy {
    Strategy::new(StrategyConfig {
        seed,
        ..StrategyConfig::default()
    })
    .expect("default config is valid")
}

/// World whose enemy guards the left half, so the lane always resolves right.
fn right_leaning_world() -> World {
    let mut world = World::default();
    world
        .seed_structure(Side::Enemy, UnitKind::Turret, CellCoord::new(3, 16), false)
        .expect("seed enemy turret");
    world
}

#[test]
fn first_turn_on_empty_board() {
    let mut world = World::default();
    let mut strategy = strategy(17);

    let report = strategy.on_turn(&mut world).expect("transport open");

    assert!(report.rebuilds.is_empty(), "nothing was queued before turn one");
    assert!(report.recycled.is_empty(), "nothing was damaged yet");
    assert!(strategy.rebuild_queue().is_empty());

    assert!(report.lane.triggered, "no previous opponent health recorded");
    assert!(report.lane.tie_broken, "empty halves tie");

    let PlanProgress::HaltedBeforeGate { index } = report.progress else {
        panic!("starting resources cannot pay for every tier: {:?}", report.progress);
    };
    for record in &report.steps {
        if let BuildStep::Place(placement) = record.step {
            assert!(
                matches!(record.outcome, StepOutcome::Placed(1) | StepOutcome::Disabled)
                    || record.index == index,
                "step {} for {:?} was not placed: {:?}",
                record.index,
                placement.cell,
                record.outcome
            );
        }
    }
    let disabled: Vec<usize> = report
        .steps
        .iter()
        .filter(|record| record.outcome == StepOutcome::Disabled)
        .map(|record| record.index)
        .collect();
    assert_eq!(disabled.len(), 1, "only the open corridor wall is skipped");

    assert!(matches!(
        report.offense,
        OffenseOutcome::CorridorClosed | OffenseOutcome::BelowThreshold { .. }
    ));
    assert_eq!(query::submissions(&world).len(), 1);
}

#[test]
fn tie_break_replays_with_the_same_seed() {
    for seed in [1, 2, 3, 99] {
        let first = strategy(seed)
            .on_turn(&mut World::default())
            .expect("transport open");
        let second = strategy(seed)
            .on_turn(&mut World::default())
            .expect("transport open");
        assert_eq!(first.lane, second.lane, "seed {seed} diverged");
    }
}

#[test]
fn match_replays_deterministically() {
    fn play(seed: u64) -> Vec<lanebreaker_world::Submission> {
        let mut world = right_leaning_world();
        let mut strategy = strategy(seed);
        for turn in 0..6 {
            if turn == 3 {
                let _ = world.damage_structure(CORNER_TURRET, 60.0);
            }
            let _ = strategy.on_turn(&mut world).expect("transport open");
        }
        query::submissions(&world).to_vec()
    }

    assert_eq!(play(5), play(5));
}

#[test]
fn corridor_opens_on_the_turn_after_switching() {
    let mut world = right_leaning_world();
    let mut strategy = strategy(0);

    let first = strategy.on_turn(&mut world).expect("transport open");
    assert_eq!(first.lane.lane, lanebreaker_core::Lane::Right);
    assert!(first.lane.switched);
    assert_eq!(first.offense, OffenseOutcome::CorridorClosed);
    assert!(world.board().contains_stationary(LEFT_CORRIDOR));
    assert!(!world.board().contains_stationary(RIGHT_CORRIDOR));

    world.set_resources(Side::Ally, ResourcePools::new(0.0, 20.0));
    let second = strategy.on_turn(&mut world).expect("transport open");

    let OffenseOutcome::Issued { cell, order, receipt } = second.offense else {
        panic!("expected an offense, got {:?}", second.offense);
    };
    assert_eq!(cell, CellCoord::new(11, 2));
    assert_eq!(order.measure, 2, "flush opponent bonus only");
    assert_eq!(receipt.demolishers, 2);
    assert_eq!(receipt.scouts, 14);
    assert!(
        !world.board().contains_stationary(RIGHT_CORRIDOR),
        "disabled corridor wall is not rebuilt by the plan"
    );
}

#[test]
fn opponent_health_loss_triggers_a_scout_rush() {
    let mut world = right_leaning_world();
    let mut strategy = strategy(0);
    let _ = strategy.on_turn(&mut world).expect("transport open");

    world.set_health(Side::Enemy, 24.0);
    world.set_resources(Side::Ally, ResourcePools::new(0.0, 9.0));
    let report = strategy.on_turn(&mut world).expect("transport open");

    assert!(!report.lane.triggered, "a successful push keeps the lane");
    let OffenseOutcome::Issued { order, receipt, .. } = report.offense else {
        panic!("expected a rush, got {:?}", report.offense);
    };
    assert_eq!(order.tier, None);
    assert_eq!(receipt.demolishers, 0);
    assert_eq!(receipt.scouts, 9, "rush ignores the attack threshold");
}

#[test]
fn damaged_turret_is_recycled_rebuilt_and_upgraded() {
    let mut world = right_leaning_world();
    let mut strategy = strategy(0);
    let _ = strategy.on_turn(&mut world).expect("transport open");

    assert!(!world.damage_structure(CORNER_TURRET, 55.0));
    let second = strategy.on_turn(&mut world).expect("transport open");
    assert_eq!(second.recycled, vec![CORNER_TURRET]);
    assert!(strategy.rebuild_queue().contains(CORNER_TURRET));

    world.set_resources(Side::Ally, ResourcePools::new(30.0, 0.0));
    let third = strategy.on_turn(&mut world).expect("transport open");
    assert_eq!(third.rebuilds.len(), 1);
    assert_eq!(third.rebuilds[0].cell, CORNER_TURRET);
    assert!(strategy.rebuild_queue().is_empty());

    let tracked = strategy.registry().get(CORNER_TURRET).copied().expect("tracked");
    assert_eq!(tracked.spawn_attempts, 2);
    let turret = world
        .board()
        .structure_at(CORNER_TURRET)
        .copied()
        .expect("turret rebuilt");
    assert!(turret.upgraded, "rebuilt turrets are upgraded");

    let fourth = strategy.on_turn(&mut world).expect("transport open");
    assert!(fourth.rebuilds.is_empty(), "entries are retried only once");
}

#[test]
fn finishing_upgrades_run_when_the_plan_is_gated() {
    let support = CellCoord::new(13, 12);
    let mut strategy = Strategy::new(StrategyConfig {
        build_plan: BuildPlan::default()
            .gate(50.0)
            .place(UnitKind::Turret, CORNER_TURRET),
        finishing_upgrades: BuildPlan::default().upgrade(support),
        ..StrategyConfig::default()
    })
    .expect("config is valid");
    let mut world = World::default();
    world
        .seed_structure(Side::Ally, UnitKind::Support, support, false)
        .expect("seed support");
    world.set_resources(Side::Ally, ResourcePools::new(10.0, 0.0));

    let report = strategy.on_turn(&mut world).expect("transport open");

    assert!(matches!(report.progress, PlanProgress::Gated { index: 0, .. }));
    assert!(report.steps.is_empty(), "nothing runs before the gate");
    assert_eq!(report.finishing.len(), 1);
    assert_eq!(report.finishing[0].outcome, StepOutcome::Upgraded);
    let upgraded = world
        .board()
        .structure_at(support)
        .is_some_and(|structure| structure.upgraded);
    assert!(upgraded, "support upgraded despite the gate");
    assert!(!world.board().contains_stationary(CORNER_TURRET));
}

#[test]
fn action_frames_feed_the_attack_threshold() {
    let mut world = World::default();
    let mut strategy = strategy(4);
    let spawn = MatchEvent {
        turn: 0,
        frame: 0,
        kind: EventKind::Spawn,
        owner: Side::Enemy,
        unit: UnitKind::Demolisher,
        cell: CellCoord::new(4, 17),
    };

    strategy.on_action_frame(&[spawn, spawn]);
    strategy.on_action_frame(&[]);
    strategy.on_action_frame(&[spawn]);
    let report = strategy.on_turn(&mut world).expect("transport open");

    assert!((report.opponent_spend - 9.0).abs() < f32::EPSILON);
    assert!((strategy.telemetry().average_mobile_spend() - 9.0).abs() < f32::EPSILON);
}

#[test]
fn transport_failure_is_fatal() {
    let mut world = World::default();
    world.close_transport();
    let mut strategy = strategy(0);

    let result = strategy.on_turn(&mut world);

    assert!(matches!(result, Err(TransportError::Closed)));
}

#[test]
fn default_config_survives_toml() {
    let config = StrategyConfig::default();
    let text = toml::to_string(&config).expect("serialize config");
    let restored: StrategyConfig = toml::from_str(&text).expect("parse config");
    assert_eq!(restored, config);
}

#[test]
fn partial_toml_falls_back_to_defaults() {
    let restored: StrategyConfig = toml::from_str(
        r#"
seed = 12

[offense]
attack_threshold = 9.0
"#,
    )
    .expect("parse config");

    assert_eq!(restored.seed, 12);
    assert!((restored.offense.attack_threshold - 9.0).abs() < f32::EPSILON);
    assert_eq!(restored.build_plan, StrategyConfig::default().build_plan);
    assert!(Strategy::new(restored).is_ok());
}
