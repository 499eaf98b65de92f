//! Aggregated strategy configuration and its validation.

use lanebreaker_core::{
    BuildPlan, BuildStep, CellCoord, Lane, UnitCatalog, UnitKind, UpgradeCondition,
};
use lanebreaker_system_lane_selection::LaneConfig;
use lanebreaker_system_offense::OffenseConfig;
use lanebreaker_system_rebuild::RebuildThresholds;
use lanebreaker_system_spawn_risk::RiskConfig;
use lanebreaker_system_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};

const FRONT_ROW: u32 = 13;
const TURRETS: [(u32, u32); 6] = [(1, 12), (26, 12), (2, 12), (25, 12), (2, 11), (25, 11)];
const SUPPORTS: [(u32, u32); 4] = [(13, 12), (14, 12), (12, 12), (15, 12)];

/// Every tunable knob of the strategy, resolved once per match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Seed of the lane tie-break.
    pub seed: u64,
    /// Unit statistics and shorthand codes.
    pub catalog: UnitCatalog,
    /// Defensive build list in priority order.
    pub build_plan: BuildPlan,
    /// Upgrades replayed after the build list every turn, even when it
    /// stops at a gate. Only upgrade steps are allowed.
    pub finishing_upgrades: BuildPlan,
    /// Recycling thresholds.
    pub rebuild: RebuildThresholds,
    /// Lane geometry and counting weights.
    pub lanes: LaneConfig,
    /// Risk estimate parameters.
    pub risk: RiskConfig,
    /// Offense sizing table and thresholds.
    pub offense: OffenseConfig,
    /// Telemetry window.
    pub telemetry: TelemetryConfig,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            catalog: UnitCatalog::default(),
            build_plan: default_build_plan(),
            finishing_upgrades: default_finishing_upgrades(),
            rebuild: RebuildThresholds::default(),
            lanes: LaneConfig::default(),
            risk: RiskConfig::default(),
            offense: OffenseConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Reasons a configuration is refused at construction time.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    /// A lane offers nowhere to deploy mobile units.
    #[error("lane {lane:?} has no spawn candidates")]
    EmptySpawnCandidates {
        /// Lane missing candidates.
        lane: Lane,
    },
    /// The offense sizing table has no rows.
    #[error("offense tier table is empty")]
    EmptyOffenseTiers,
    /// The offense sizing table is not sorted by `min_measure`.
    #[error("offense tier {index} is not sorted by min_measure")]
    UnsortedOffenseTiers {
        /// First out-of-order row.
        index: usize,
    },
    /// A mobile unit is free or has a negative price.
    #[error("{kind:?} must have a positive cost, found {cost}")]
    NonPositiveCost {
        /// Offending kind.
        kind: UnitKind,
        /// Configured price.
        cost: f32,
    },
    /// A rebuild threshold is not a health fraction.
    #[error("{kind:?} rebuild threshold {value} lies outside [0, 1]")]
    ThresholdOutOfRange {
        /// Kind the threshold belongs to.
        kind: UnitKind,
        /// Offending value.
        value: f32,
    },
    /// The finishing pass holds something other than an upgrade.
    #[error("finishing step {index} is not an upgrade")]
    FinishingStepNotUpgrade {
        /// First offending step.
        index: usize,
    },
    /// The telemetry window cannot hold a single turn.
    #[error("telemetry window must cover at least one turn")]
    EmptyTelemetryWindow,
}

impl StrategyConfig {
    /// Checks the invariants the systems rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for lane in Lane::ALL {
            if self.lanes.layout(lane).spawn_candidates.is_empty() {
                return Err(ConfigError::EmptySpawnCandidates { lane });
            }
        }

        let tiers = &self.offense.tiers;
        if tiers.is_empty() {
            return Err(ConfigError::EmptyOffenseTiers);
        }
        if let Some(index) = tiers
            .windows(2)
            .position(|pair| pair[1].min_measure < pair[0].min_measure)
        {
            return Err(ConfigError::UnsortedOffenseTiers { index: index + 1 });
        }

        for kind in [UnitKind::Scout, UnitKind::Demolisher, UnitKind::Interceptor] {
            let cost = self.catalog.cost(kind);
            if cost <= 0.0 || cost.is_nan() {
                return Err(ConfigError::NonPositiveCost { kind, cost });
            }
        }

        for (kind, threshold) in self.rebuild.iter() {
            for value in [threshold.constrained, threshold.flush] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::ThresholdOutOfRange { kind, value });
                }
            }
        }

        if let Some(index) = self
            .finishing_upgrades
            .steps()
            .iter()
            .position(|step| !matches!(step, BuildStep::Upgrade { .. }))
        {
            return Err(ConfigError::FinishingStepNotUpgrade { index });
        }

        if self.telemetry.window == 0 {
            return Err(ConfigError::EmptyTelemetryWindow);
        }
        Ok(())
    }
}

/// Front wall, turrets, and supports in interleaved priority tiers.
///
/// The wall line is built from both ends towards the middle. Each later tier
/// sits behind a resource gate. The conditional upgrade block opens the plan
/// and is repeated by [`default_finishing_upgrades`] once the plan stops.
#[must_use]
pub fn default_build_plan() -> BuildPlan {
    let mut plan = upgrade_block(BuildPlan::default());

    for (left, right) in (0..14).zip((14..28).rev()) {
        plan = plan
            .place(UnitKind::Wall, CellCoord::new(left, FRONT_ROW))
            .place(UnitKind::Wall, CellCoord::new(right, FRONT_ROW));
    }

    let turret = |index: usize| CellCoord::new(TURRETS[index].0, TURRETS[index].1);
    let support = |index: usize| CellCoord::new(SUPPORTS[index].0, SUPPORTS[index].1);

    plan = plan.gate(2.0);
    for index in 0..4 {
        plan = plan.place(UnitKind::Turret, turret(index));
    }
    plan = plan.gate(4.0);
    for index in 0..2 {
        plan = plan.place(UnitKind::Support, support(index));
    }
    plan = plan.gate(2.0);
    for index in 4..6 {
        plan = plan.place(UnitKind::Turret, turret(index));
    }
    plan = plan.gate(4.0);
    for index in 2..4 {
        plan = plan.place(UnitKind::Support, support(index));
    }
    plan
}

/// Support upgrades, then wall and turret upgrades for rebuilt structures.
#[must_use]
pub fn default_finishing_upgrades() -> BuildPlan {
    upgrade_block(BuildPlan::default())
}

fn upgrade_block(mut plan: BuildPlan) -> BuildPlan {
    for (column, row) in SUPPORTS {
        plan = plan.upgrade(CellCoord::new(column, row));
    }
    let rebuilt = UpgradeCondition::AfterRebuild;
    for column in 0..28 {
        plan = plan.upgrade_when(CellCoord::new(column, FRONT_ROW), rebuilt);
    }
    for (column, row) in TURRETS {
        plan = plan.upgrade_when(CellCoord::new(column, row), rebuilt);
    }
    plan
}
