use lanebreaker_core::{BuildPlan, CellCoord, GameEngine, PlacementError, ResourcePools, Side, UnitKind};
use lanebreaker_system_build_plan::StructureRegistry;
use lanebreaker_system_rebuild::{
    KindThreshold, RebuildOutcome, RebuildPolicy, RebuildQueue, RebuildThresholds,
};
use lanebreaker_world::World;

const TURRET: CellCoord = CellCoord::new(3, 12);

fn damaged_turret_world(structure_resource: f32) -> World {
    let mut world = World::default();
    world.set_resources(Side::Ally, ResourcePools::new(structure_resource, 0.0));
    world
        .seed_structure(Side::Ally, UnitKind::Turret, TURRET, false)
        .expect("seed turret");
    assert!(!world.damage_structure(TURRET, 50.0));
    world
}

fn registry() -> StructureRegistry {
    StructureRegistry::from_plan(&BuildPlan::default().place(UnitKind::Turret, TURRET))
}

#[test]
fn queued_entry_is_attempted_once_then_forgotten_even_on_failure() {
    let policy = RebuildPolicy::default();
    let mut registry = registry();
    let mut queue = RebuildQueue::default();
    let mut world = damaged_turret_world(0.0);
    world.set_income(ResourcePools::default());

    let mut removed = Vec::new();
    policy.sweep(&mut world, &mut queue, &mut removed);
    assert_eq!(removed, vec![TURRET], "turret at a third health is recycled");
    assert!(queue.contains(TURRET));
    world.submit_turn().expect("transport open");

    // Turn T+1: the refund alone cannot pay for a new turret.
    let mut attempts = Vec::new();
    queue.drain(&mut world, &mut registry, &mut attempts);
    assert_eq!(attempts.len(), 1);
    assert_eq!(
        attempts[0].outcome,
        RebuildOutcome::Rejected(PlacementError::InsufficientResources)
    );
    assert!(queue.is_empty(), "entries leave the queue after one attempt");
    world.submit_turn().expect("transport open");

    // Turn T+2: nothing left to retry.
    attempts.clear();
    queue.drain(&mut world, &mut registry, &mut attempts);
    assert!(attempts.is_empty());
}

#[test]
fn drained_structure_is_requested_on_next_turn() {
    let policy = RebuildPolicy::default();
    let mut registry = registry();
    let mut queue = RebuildQueue::default();
    let mut world = damaged_turret_world(10.0);

    let mut removed = Vec::new();
    policy.sweep(&mut world, &mut queue, &mut removed);
    world.submit_turn().expect("transport open");
    assert!(!world.board().contains_stationary(TURRET));

    let mut attempts = Vec::new();
    queue.drain(&mut world, &mut registry, &mut attempts);

    assert_eq!(attempts[0].outcome, RebuildOutcome::Requested);
    assert!(world.board().contains_stationary(TURRET));
    assert_eq!(registry.get(TURRET).map(|entry| entry.spawn_attempts), Some(1));
}

#[test]
fn healthy_and_pending_structures_are_left_alone() {
    let policy = RebuildPolicy::default();
    let mut queue = RebuildQueue::default();
    let mut world = World::default();
    world
        .seed_structure(Side::Ally, UnitKind::Turret, TURRET, false)
        .expect("seed turret");
    assert!(!world.damage_structure(TURRET, 10.0));

    let mut removed = Vec::new();
    policy.sweep(&mut world, &mut queue, &mut removed);
    assert!(removed.is_empty(), "lightly damaged turret stays");

    assert!(!world.damage_structure(TURRET, 50.0));
    world.attempt_remove(TURRET).expect("owned turret");
    policy.sweep(&mut world, &mut queue, &mut removed);
    assert!(removed.is_empty(), "already flagged structures are skipped");
}

#[test]
fn plain_walls_are_never_recycled_by_default() {
    let policy = RebuildPolicy::default();
    let mut queue = RebuildQueue::default();
    let mut world = World::default();
    let plain = CellCoord::new(1, 13);
    let upgraded = CellCoord::new(2, 13);
    world
        .seed_structure(Side::Ally, UnitKind::Wall, plain, false)
        .expect("seed wall");
    world
        .seed_structure(Side::Ally, UnitKind::Wall, upgraded, true)
        .expect("seed wall");
    assert!(!world.damage_structure(plain, 55.0));
    assert!(!world.damage_structure(upgraded, 110.0));

    let mut removed = Vec::new();
    policy.sweep(&mut world, &mut queue, &mut removed);

    assert_eq!(removed, vec![upgraded]);
}

#[test]
fn flush_balance_raises_the_threshold() {
    let thresholds = RebuildThresholds {
        flush_structure_resource: 20.0,
        wall: None,
        support: None,
        turret: Some(KindThreshold::new(0.35, 0.64, false)),
    };
    let policy = RebuildPolicy::new(thresholds);
    let mut queue = RebuildQueue::default();

    let mut constrained = World::default();
    constrained.set_resources(Side::Ally, ResourcePools::new(5.0, 0.0));
    constrained
        .seed_structure(Side::Ally, UnitKind::Turret, TURRET, false)
        .expect("seed turret");
    assert!(!constrained.damage_structure(TURRET, 37.5));

    let mut removed = Vec::new();
    policy.sweep(&mut constrained, &mut queue, &mut removed);
    assert!(removed.is_empty(), "half health survives the constrained tier");

    let mut flush = World::default();
    flush.set_resources(Side::Ally, ResourcePools::new(30.0, 0.0));
    flush
        .seed_structure(Side::Ally, UnitKind::Turret, TURRET, false)
        .expect("seed turret");
    assert!(!flush.damage_structure(TURRET, 37.5));

    policy.sweep(&mut flush, &mut queue, &mut removed);
    assert_eq!(removed, vec![TURRET], "half health is recycled when flush");
}
