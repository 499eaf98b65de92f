#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn driver sequencing the strategy systems once per turn.
//!
//! A [`Strategy`] owns every piece of cross-turn state: the tracked
//! structures, the rebuild queue, the lane state machine, and the telemetry
//! accumulator. Each call to [`Strategy::on_turn`] runs a single pass:
//!
//! 1. drain the rebuild queue,
//! 2. sweep damaged structures,
//! 3. replay the build plan, then the finishing upgrades,
//! 4. re-evaluate the lane and gate the corridors,
//! 5. size and issue the offense,
//! 6. close the telemetry turn and remember the opponent's health,
//! 7. submit the batch.
//!
//! Rejected requests are recorded in the returned [`TurnReport`] and never
//! stop the pass. Only a failed submission is surfaced as an error.

mod config;

pub use config::{default_build_plan, default_finishing_upgrades, ConfigError, StrategyConfig};

use lanebreaker_core::{
    BuildPlan, CellCoord, GameEngine, Lane, MatchEvent, Resource, Side, TransportError,
};
use lanebreaker_system_build_plan::{
    BuildPlanExecutor, PlanProgress, StepRecord, StructureRegistry,
};
use lanebreaker_system_lane_selection::{LaneDecision, LaneSelector};
use lanebreaker_system_offense::{OffenseOrder, OffenseReceipt, OffenseSizing};
use lanebreaker_system_rebuild::{RebuildAttempt, RebuildPolicy, RebuildQueue};
use lanebreaker_system_spawn_risk::SpawnRiskEstimator;
use lanebreaker_system_telemetry::TelemetryAccumulator;

/// What the offense step did this turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OffenseOutcome {
    /// Units were requested at `cell`.
    Issued {
        /// Deployment cell picked by the risk estimate.
        cell: CellCoord,
        /// Counts that were asked for.
        order: OffenseOrder,
        /// Counts the engine queued.
        receipt: OffenseReceipt,
    },
    /// The active lane's corridor wall still stands this turn.
    CorridorClosed,
    /// No spawn candidate of the active lane can reach the opposing edge.
    Unreachable,
    /// Mobile-resource is below the attack threshold.
    BelowThreshold {
        /// Mobile-resource available.
        available: f32,
        /// Threshold in force.
        threshold: f32,
    },
}

/// Everything the strategy did during one turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnReport {
    /// Turn the report describes.
    pub turn: u32,
    /// Structures re-requested from the rebuild queue.
    pub rebuilds: Vec<RebuildAttempt>,
    /// Structures flagged for recycling.
    pub recycled: Vec<CellCoord>,
    /// Per-step build plan records.
    pub steps: Vec<StepRecord>,
    /// How far the build plan got.
    pub progress: PlanProgress,
    /// Records of the finishing upgrade pass.
    pub finishing: Vec<StepRecord>,
    /// Lane evaluation result.
    pub lane: LaneDecision,
    /// Offense result.
    pub offense: OffenseOutcome,
    /// Opponent mobile spend recorded for the turn.
    pub opponent_spend: f32,
}

/// Per-match strategy state.
#[derive(Debug)]
pub struct Strategy {
    plan: BuildPlan,
    finishing: BuildPlan,
    registry: StructureRegistry,
    executor: BuildPlanExecutor,
    rebuild: RebuildPolicy,
    queue: RebuildQueue,
    lanes: LaneSelector,
    risk: SpawnRiskEstimator,
    offense: OffenseSizing,
    telemetry: TelemetryAccumulator,
}

impl Strategy {
    /// Validates the configuration and sets up the per-match state.
    pub fn new(config: StrategyConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let StrategyConfig {
            seed,
            catalog,
            build_plan,
            finishing_upgrades,
            rebuild,
            lanes,
            risk,
            offense,
            telemetry,
        } = config;

        let mut registry = StructureRegistry::from_plan(&build_plan);
        let lanes = LaneSelector::new(lanes, seed);
        lanes.prime(&mut registry);

        tracing::info!(
            seed,
            steps = build_plan.len(),
            tracked = registry.len(),
            lane = ?lanes.lane(),
            "strategy configured"
        );

        Ok(Self {
            plan: build_plan,
            finishing: finishing_upgrades,
            registry,
            executor: BuildPlanExecutor::new(),
            rebuild: RebuildPolicy::new(rebuild),
            queue: RebuildQueue::default(),
            lanes,
            risk: SpawnRiskEstimator::new(risk, &catalog),
            offense: OffenseSizing::new(offense, &catalog),
            telemetry: TelemetryAccumulator::new(telemetry, catalog),
        })
    }

    /// Feeds a batch of mid-turn events to the telemetry accumulator.
    ///
    /// May be called any number of times between two turns.
    pub fn on_action_frame(&mut self, events: &[MatchEvent]) {
        self.telemetry.observe(events);
    }

    /// Computes and submits one turn.
    pub fn on_turn<E>(&mut self, engine: &mut E) -> Result<TurnReport, TransportError>
    where
        E: GameEngine + ?Sized,
    {
        let turn = engine.board().turn();
        let _span = tracing::info_span!("turn", turn).entered();

        let mut rebuilds = Vec::new();
        self.queue.drain(engine, &mut self.registry, &mut rebuilds);

        let mut recycled = Vec::new();
        self.rebuild.sweep(engine, &mut self.queue, &mut recycled);

        let mut steps = Vec::new();
        let progress = self
            .executor
            .handle(&self.plan, &mut self.registry, engine, &mut steps);
        let mut finishing = Vec::new();
        let _ = self
            .executor
            .handle(&self.finishing, &mut self.registry, engine, &mut finishing);

        let opponent_health = engine.board().player(Side::Enemy).health;
        let momentum = self.lanes.opponent_health_decreased(opponent_health);
        let lane = self.lanes.handle(engine, &mut self.registry);

        let offense = self.attack(engine, lane, momentum);

        let opponent_spend = self.telemetry.close_turn();
        self.lanes.record_opponent_health(opponent_health);

        tracing::info!(
            rebuilds = rebuilds.len(),
            recycled = recycled.len(),
            requests = steps
                .iter()
                .chain(&finishing)
                .filter(|record| record.outcome.is_request())
                .count(),
            ?progress,
            lane = ?lane.lane,
            ?offense,
            "turn assembled"
        );

        if let Err(error) = engine.submit_turn() {
            tracing::error!(%error, "turn submission failed");
            return Err(error);
        }

        Ok(TurnReport {
            turn,
            rebuilds,
            recycled,
            steps,
            progress,
            finishing,
            lane,
            offense,
            opponent_spend,
        })
    }

    fn attack<E>(&self, engine: &mut E, lane: LaneDecision, momentum: bool) -> OffenseOutcome
    where
        E: GameEngine + ?Sized,
    {
        if !lane.corridor_open {
            return OffenseOutcome::CorridorClosed;
        }

        let layout = self.lanes.config().layout(lane.lane);
        let Some(cell) = self
            .risk
            .select_least_risky(&layout.spawn_candidates, &*engine)
        else {
            tracing::warn!(lane = ?lane.lane, "no reachable spawn candidate");
            return OffenseOutcome::Unreachable;
        };

        let order = if momentum {
            OffenseOrder::rush()
        } else {
            let available = engine.board().resource(Side::Ally, Resource::Mobile);
            let threshold = self
                .offense
                .attack_threshold(self.telemetry.average_mobile_spend());
            if available < threshold {
                return OffenseOutcome::BelowThreshold {
                    available,
                    threshold,
                };
            }
            let measure = self
                .offense
                .defensive_measure(engine.board(), &layout.front_zone);
            self.offense.size(measure, available)
        };

        let receipt = self.offense.issue(order, cell, engine);
        OffenseOutcome::Issued {
            cell,
            order,
            receipt,
        }
    }

    /// Lane currently committed to.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lanes.lane()
    }

    /// Structures the strategy keeps track of.
    #[must_use]
    pub const fn registry(&self) -> &StructureRegistry {
        &self.registry
    }

    /// Structures scheduled for reconstruction next turn.
    #[must_use]
    pub const fn rebuild_queue(&self) -> &RebuildQueue {
        &self.queue
    }

    /// Running statistics from the event stream.
    #[must_use]
    pub const fn telemetry(&self) -> &TelemetryAccumulator {
        &self.telemetry
    }
}
