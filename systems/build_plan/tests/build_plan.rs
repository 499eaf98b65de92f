use lanebreaker_core::{
    ActionFailure, BuildPlan, BuildStep, CellCoord, GameEngine, PlacementError, ResourcePools,
    Side, UnitKind, UpgradeCondition,
};
use lanebreaker_system_build_plan::{
    BuildPlanExecutor, PlanProgress, StepOutcome, StepRecord, StructureRegistry,
};
use lanebreaker_world::{query, World};

fn world_with_structure_resource(amount: f32) -> World {
    let mut world = World::default();
    world.set_resources(Side::Ally, ResourcePools::new(amount, 0.0));
    world
}

fn run(
    plan: &BuildPlan,
    registry: &mut StructureRegistry,
    world: &mut World,
) -> (PlanProgress, Vec<StepRecord>) {
    let mut records = Vec::new();
    let progress = BuildPlanExecutor::new().handle(plan, registry, world, &mut records);
    (progress, records)
}

#[test]
fn replaying_unchanged_board_requests_nothing_new() {
    let plan = BuildPlan::default()
        .place(UnitKind::Wall, CellCoord::new(0, 13))
        .place(UnitKind::Wall, CellCoord::new(27, 13))
        .place(UnitKind::Turret, CellCoord::new(3, 12))
        .gate(2.0)
        .upgrade(CellCoord::new(3, 12))
        .place(UnitKind::Support, CellCoord::new(13, 2));
    let mut registry = StructureRegistry::from_plan(&plan);
    let mut world = World::default();

    let (first_progress, first) = run(&plan, &mut registry, &mut world);
    assert!(first_progress.is_complete());
    assert_eq!(
        first.iter().filter(|record| record.outcome.is_request()).count(),
        5,
        "first pass should place every structure and the upgrade"
    );

    let queued_after_first = query::queued_actions(&world).len();
    let (second_progress, second) = run(&plan, &mut registry, &mut world);

    assert!(second_progress.is_complete());
    assert!(
        second.iter().all(|record| !record.outcome.is_request()),
        "second pass must not request anything: {second:?}"
    );
    assert_eq!(query::queued_actions(&world).len(), queued_after_first);
}

#[test]
fn failing_gate_stops_later_steps_regardless_of_their_cost() {
    let plan = BuildPlan::default()
        .place(UnitKind::Turret, CellCoord::new(3, 12))
        .gate(10.0)
        .place(UnitKind::Wall, CellCoord::new(5, 13));
    let mut registry = StructureRegistry::from_plan(&plan);
    let mut world = world_with_structure_resource(11.0);

    let (progress, records) = run(&plan, &mut registry, &mut world);

    assert_eq!(
        progress,
        PlanProgress::Gated {
            index: 1,
            required: 10.0,
            available: 9.0,
        }
    );
    assert_eq!(records.len(), 1, "only the first placement is recorded");
    assert!(
        world.board().contains_stationary(CellCoord::new(3, 12)),
        "steps before the gate are not rolled back"
    );
    assert!(!world.board().contains_stationary(CellCoord::new(5, 13)));
}

#[test]
fn shortfall_right_before_gate_halts_the_plan() {
    let plan = BuildPlan::default()
        .place(UnitKind::Turret, CellCoord::new(3, 12))
        .gate(0.0)
        .place(UnitKind::Wall, CellCoord::new(5, 13));
    let mut registry = StructureRegistry::from_plan(&plan);
    let mut world = world_with_structure_resource(1.0);

    let (progress, records) = run(&plan, &mut registry, &mut world);

    assert_eq!(progress, PlanProgress::HaltedBeforeGate { index: 0 });
    assert_eq!(
        records[0].outcome,
        StepOutcome::Rejected(ActionFailure::Placement(
            PlacementError::InsufficientResources
        ))
    );
    assert!(!world.board().contains_stationary(CellCoord::new(5, 13)));
}

#[test]
fn shortfall_without_gate_continues() {
    let plan = BuildPlan::default()
        .place(UnitKind::Turret, CellCoord::new(3, 12))
        .place(UnitKind::Wall, CellCoord::new(5, 13));
    let mut registry = StructureRegistry::from_plan(&plan);
    let mut world = world_with_structure_resource(1.0);

    let (progress, records) = run(&plan, &mut registry, &mut world);

    assert!(progress.is_complete());
    assert_eq!(records[1].outcome, StepOutcome::Placed(1));
    assert!(world.board().contains_stationary(CellCoord::new(5, 13)));
}

#[test]
fn disabled_structures_are_not_placed() {
    let corridor = CellCoord::new(5, 13);
    let plan = BuildPlan::default().place(UnitKind::Wall, corridor);
    let mut registry = StructureRegistry::from_plan(&plan);
    assert!(registry.set_alive(corridor, false));
    let mut world = World::default();

    let (_, records) = run(&plan, &mut registry, &mut world);

    assert_eq!(records[0].outcome, StepOutcome::Disabled);
    assert!(!world.board().contains_stationary(corridor));
    assert_eq!(registry.get(corridor).map(|entry| entry.spawn_attempts), Some(0));
}

#[test]
fn upgrade_of_absent_structure_is_a_no_op() {
    let plan = BuildPlan::new(vec![BuildStep::Upgrade {
        cell: CellCoord::new(3, 12),
        condition: UpgradeCondition::Always,
    }]);
    let mut registry = StructureRegistry::from_plan(&plan);
    let mut world = World::default();

    let (progress, records) = run(&plan, &mut registry, &mut world);

    assert!(progress.is_complete());
    assert_eq!(records[0].outcome, StepOutcome::Skipped);
    assert!(query::queued_actions(&world).is_empty());
}

#[test]
fn after_rebuild_upgrade_waits_for_second_spawn() {
    let cell = CellCoord::new(5, 13);
    let plan = BuildPlan::default()
        .place(UnitKind::Wall, cell)
        .upgrade_when(cell, UpgradeCondition::AfterRebuild);
    let mut registry = StructureRegistry::from_plan(&plan);
    let mut world = World::default();

    let (_, first) = run(&plan, &mut registry, &mut world);
    assert_eq!(first[1].outcome, StepOutcome::Skipped);

    world.submit_turn().expect("transport open");
    assert!(world.damage_structure(cell, 60.0), "wall should be destroyed");

    let (_, second) = run(&plan, &mut registry, &mut world);
    assert_eq!(second[0].outcome, StepOutcome::Placed(1));
    assert_eq!(second[1].outcome, StepOutcome::Upgraded);
    assert_eq!(registry.get(cell).map(|entry| entry.spawn_attempts), Some(2));
}
