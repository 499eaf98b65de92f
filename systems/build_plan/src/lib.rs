#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Build plan executor that replays a prioritised build list every turn.
//!
//! The executor walks the plan from the first step on each call. Steps the
//! board already satisfies are no-ops, so replaying an unchanged plan against
//! an unchanged board requests nothing new. Resource gates split the plan into
//! tiers that only unlock once enough structure-resource has accrued.

mod registry;

pub use registry::{StructureRegistry, TrackedStructure};

use lanebreaker_core::{
    ActionFailure, BuildPlan, BuildStep, CellCoord, GameEngine, Placement, Resource, Side,
    UpgradeCondition, UpgradeError,
};

/// Result of processing a single plan step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// The engine queued the given number of units.
    Placed(u32),
    /// The board already satisfies the step.
    AlreadySatisfied,
    /// The engine queued the upgrade.
    Upgraded,
    /// The tracked structure is disabled and was left alone.
    Disabled,
    /// The step's preconditions do not hold; nothing was requested.
    Skipped,
    /// The resource gate let the plan continue.
    GatePassed,
    /// The engine rejected the request.
    Rejected(ActionFailure),
}

impl StepOutcome {
    /// Reports whether the step queued a new request.
    #[must_use]
    pub const fn is_request(self) -> bool {
        matches!(self, Self::Placed(_) | Self::Upgraded)
    }
}

/// Per-step record appended to the executor's output buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepRecord {
    /// Position of the step within the plan.
    pub index: usize,
    /// Step that was processed.
    pub step: BuildStep,
    /// What happened.
    pub outcome: StepOutcome,
}

/// How far the plan got this turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlanProgress {
    /// Every step was processed.
    Completed,
    /// The gate at `index` found less structure-resource than it requires.
    Gated {
        /// Position of the failing gate.
        index: usize,
        /// Balance the gate requires.
        required: f32,
        /// Balance observed when the gate was reached.
        available: f32,
    },
    /// The request at `index` failed for lack of funds right before a gate.
    HaltedBeforeGate {
        /// Position of the failed request.
        index: usize,
    },
}

impl PlanProgress {
    /// Reports whether every step of the plan was processed.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Pure system that turns a [`BuildPlan`] into engine requests.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildPlanExecutor;

impl BuildPlanExecutor {
    /// Creates a new executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Replays `plan` from its first step against the live engine board.
    ///
    /// One [`StepRecord`] is pushed to `out` per processed step. Steps
    /// processed before a halting gate are never rolled back.
    pub fn handle<E>(
        &self,
        plan: &BuildPlan,
        registry: &mut StructureRegistry,
        engine: &mut E,
        out: &mut Vec<StepRecord>,
    ) -> PlanProgress
    where
        E: GameEngine + ?Sized,
    {
        let steps = plan.steps();

        for (index, step) in steps.iter().copied().enumerate() {
            let outcome = match step {
                BuildStep::Place(placement) => place(placement, registry, engine),
                BuildStep::Upgrade { cell, condition } => {
                    upgrade(cell, condition, registry, engine)
                }
                BuildStep::ResourceGate { minimum } => {
                    let available = engine.board().resource(Side::Ally, Resource::Structure);
                    if available < minimum {
                        tracing::debug!(index, minimum, available, "build plan gated");
                        return PlanProgress::Gated {
                            index,
                            required: minimum,
                            available,
                        };
                    }
                    StepOutcome::GatePassed
                }
            };

            out.push(StepRecord {
                index,
                step,
                outcome,
            });

            if let StepOutcome::Rejected(failure) = outcome {
                let gate_follows = matches!(
                    steps.get(index + 1),
                    Some(BuildStep::ResourceGate { .. })
                );
                if failure.is_resource_shortfall() && gate_follows {
                    tracing::debug!(index, "build plan halted before gate");
                    return PlanProgress::HaltedBeforeGate { index };
                }
            }
        }

        PlanProgress::Completed
    }
}

fn place<E>(placement: Placement, registry: &mut StructureRegistry, engine: &mut E) -> StepOutcome
where
    E: GameEngine + ?Sized,
{
    if placement.kind.is_stationary() {
        if let Some(existing) = engine.board().structure_at(placement.cell) {
            if existing.owner == Side::Ally && existing.kind == placement.kind {
                return StepOutcome::AlreadySatisfied;
            }
        }
        if registry
            .get(placement.cell)
            .is_some_and(|tracked| !tracked.alive)
        {
            return StepOutcome::Disabled;
        }
    }

    match registry.spawn(engine, placement) {
        Ok(count) => StepOutcome::Placed(count),
        Err(error) => StepOutcome::Rejected(error.into()),
    }
}

fn upgrade<E>(
    cell: CellCoord,
    condition: UpgradeCondition,
    registry: &StructureRegistry,
    engine: &mut E,
) -> StepOutcome
where
    E: GameEngine + ?Sized,
{
    let Some(existing) = engine.board().structure_at(cell) else {
        return StepOutcome::Skipped;
    };
    if existing.owner != Side::Ally || existing.pending_removal {
        return StepOutcome::Skipped;
    }
    if existing.upgraded {
        return StepOutcome::AlreadySatisfied;
    }
    if condition == UpgradeCondition::AfterRebuild
        && !registry
            .get(cell)
            .is_some_and(TrackedStructure::has_been_rebuilt)
    {
        return StepOutcome::Skipped;
    }

    match engine.attempt_upgrade(cell) {
        Ok(()) => StepOutcome::Upgraded,
        Err(UpgradeError::AlreadyUpgraded) => StepOutcome::AlreadySatisfied,
        Err(UpgradeError::MissingStructure | UpgradeError::NotOwned) => StepOutcome::Skipped,
        Err(error) => StepOutcome::Rejected(error.into()),
    }
}
