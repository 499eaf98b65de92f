#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tiered sizing of mobile-unit offenses.
//!
//! Enemy defences in front of the chosen lane are reduced to a single integer
//! measure. The measure selects a row of a small lookup table naming how many
//! demolishers escort the push; whatever mobile-resource the escort leaves
//! over is spent on scouts.

use lanebreaker_core::{
    BoardSnapshot, CellCoord, CellRect, GameEngine, Placement, Resource, Side, UnitCatalog,
    UnitKind, SPAWN_ALL,
};
use serde::{Deserialize, Serialize};

/// One row of the sizing table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffenseTier {
    /// Smallest defensive measure the tier applies to.
    pub min_measure: u32,
    /// Demolishers sent with the push.
    pub demolishers: u32,
}

impl OffenseTier {
    /// Creates a tier row.
    #[must_use]
    pub const fn new(min_measure: u32, demolishers: u32) -> Self {
        Self {
            min_measure,
            demolishers,
        }
    }
}

/// Tunable parameters of the offense.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffenseConfig {
    /// Sizing table sorted by `min_measure`.
    pub tiers: Vec<OffenseTier>,
    /// Measure added while the opponent holds plenty of structure-resource.
    pub flush_bonus: u32,
    /// Opponent structure-resource at or above which the bonus applies.
    pub opponent_flush_structure_resource: f32,
    /// Mobile-resource required before a sized offense is issued.
    pub attack_threshold: f32,
    /// Upper bound of the threshold after telemetry scaling.
    pub attack_threshold_cap: f32,
    /// Threshold increase per unit of average opponent mobile spend.
    pub telemetry_scale: f32,
}

impl Default for OffenseConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                OffenseTier::new(0, 0),
                OffenseTier::new(1, 2),
                OffenseTier::new(3, 4),
                OffenseTier::new(5, 6),
                OffenseTier::new(8, 8),
            ],
            flush_bonus: 2,
            opponent_flush_structure_resource: 20.0,
            attack_threshold: 16.0,
            attack_threshold_cap: 32.0,
            telemetry_scale: 0.5,
        }
    }
}

/// Unit counts of one offense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffenseOrder {
    /// Defensive measure the order was sized for.
    pub measure: u32,
    /// Index of the table row used; `None` for a rush.
    pub tier: Option<usize>,
    /// Demolishers to deploy.
    pub demolishers: u32,
    /// Scouts to deploy.
    pub scouts: u32,
}

impl OffenseOrder {
    /// Order spending the whole mobile-resource pool on scouts.
    #[must_use]
    pub const fn rush() -> Self {
        Self {
            measure: 0,
            tier: None,
            demolishers: 0,
            scouts: SPAWN_ALL,
        }
    }

    /// Reports whether the order deploys nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.demolishers == 0 && self.scouts == 0
    }
}

/// Units the engine actually queued for an order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OffenseReceipt {
    /// Demolishers queued.
    pub demolishers: u32,
    /// Scouts queued.
    pub scouts: u32,
}

/// Pure system sizing and issuing offenses.
#[derive(Clone, Debug)]
pub struct OffenseSizing {
    config: OffenseConfig,
    scout_cost: f32,
    demolisher_cost: f32,
}

impl OffenseSizing {
    /// Creates the sizing system, reading unit prices from the catalog.
    #[must_use]
    pub fn new(config: OffenseConfig, catalog: &UnitCatalog) -> Self {
        Self {
            config,
            scout_cost: catalog.cost(UnitKind::Scout),
            demolisher_cost: catalog.cost(UnitKind::Demolisher),
        }
    }

    /// Configuration the system was built with.
    #[must_use]
    pub const fn config(&self) -> &OffenseConfig {
        &self.config
    }

    /// Counts enemy turrets and upgraded walls inside `zone`.
    ///
    /// The flush bonus is added when the opponent's structure-resource
    /// reaches the configured level.
    #[must_use]
    pub fn defensive_measure(&self, board: &BoardSnapshot, zone: &CellRect) -> u32 {
        let defenders = board
            .owned_by(Side::Enemy)
            .filter(|structure| zone.contains(structure.cell))
            .filter(|structure| match structure.kind {
                UnitKind::Turret => true,
                UnitKind::Wall => structure.upgraded,
                _ => false,
            })
            .count();
        let mut measure = u32::try_from(defenders).unwrap_or(u32::MAX);
        if board.resource(Side::Enemy, Resource::Structure)
            >= self.config.opponent_flush_structure_resource
        {
            measure = measure.saturating_add(self.config.flush_bonus);
        }
        measure
    }

    /// Mobile-resource needed before a sized offense is issued.
    #[must_use]
    pub fn attack_threshold(&self, average_opponent_spend: f32) -> f32 {
        let scaled = self.config.attack_threshold
            + self.config.telemetry_scale * average_opponent_spend.max(0.0);
        scaled.min(self.config.attack_threshold_cap.max(self.config.attack_threshold))
    }

    /// Sizes an offense for `measure` with `available` mobile-resource.
    ///
    /// The scout budget is `max(available - tier cost, 0)`, so counts never
    /// go negative; demolishers are trimmed to what the pool can pay for.
    #[must_use]
    pub fn size(&self, measure: u32, available: f32) -> OffenseOrder {
        let tier = self
            .config
            .tiers
            .iter()
            .rposition(|tier| tier.min_measure <= measure);
        let wanted = tier.map_or(0, |index| self.config.tiers[index].demolishers);

        let tier_cost = wanted as f32 * self.demolisher_cost;
        let demolishers = wanted.min(affordable(available, self.demolisher_cost));
        let budget = (available - tier_cost).max(0.0);
        let scouts = affordable(budget, self.scout_cost);

        OffenseOrder {
            measure,
            tier,
            demolishers,
            scouts,
        }
    }

    /// Requests the order's units at `cell`, demolishers first.
    pub fn issue<E>(&self, order: OffenseOrder, cell: CellCoord, engine: &mut E) -> OffenseReceipt
    where
        E: GameEngine + ?Sized,
    {
        let mut receipt = OffenseReceipt::default();
        if order.demolishers > 0 {
            let placement = Placement::new(UnitKind::Demolisher, cell, order.demolishers);
            match engine.attempt_spawn(placement) {
                Ok(queued) => receipt.demolishers = queued,
                Err(error) => tracing::debug!(?cell, ?error, "demolishers rejected"),
            }
        }
        if order.scouts > 0 {
            match engine.attempt_spawn(Placement::new(UnitKind::Scout, cell, order.scouts)) {
                Ok(queued) => receipt.scouts = queued,
                Err(error) => tracing::debug!(?cell, ?error, "scouts rejected"),
            }
        }
        tracing::info!(
            ?cell,
            measure = order.measure,
            demolishers = receipt.demolishers,
            scouts = receipt.scouts,
            "offense issued"
        );
        receipt
    }
}

fn affordable(budget: f32, cost: f32) -> u32 {
    if cost <= 0.0 || budget <= 0.0 {
        return 0;
    }
    (budget / cost).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizing() -> OffenseSizing {
        OffenseSizing::new(OffenseConfig::default(), &UnitCatalog::default())
    }

    #[test]
    fn undefended_front_is_a_pure_scout_rush() {
        let order = sizing().size(0, 12.0);
        assert_eq!(order.demolishers, 0);
        assert_eq!(order.scouts, 12);
        assert_eq!(order.tier, Some(0));
    }

    #[test]
    fn light_defence_gets_a_small_escort() {
        let order = sizing().size(2, 12.0);
        assert_eq!(order.demolishers, 2);
        assert_eq!(order.scouts, 6);
    }

    #[test]
    fn heavy_defence_uses_the_last_tier() {
        let order = sizing().size(40, 30.0);
        assert_eq!(order.tier, Some(4));
        assert_eq!(order.demolishers, 8);
        assert_eq!(order.scouts, 6);
    }

    #[test]
    fn scout_budget_never_goes_negative() {
        let sizing = sizing();
        for measure in 0..12 {
            for available in [0.0, 1.0, 2.5, 5.0, 11.0, 17.0] {
                let order = sizing.size(measure, available);
                let spent = order.demolishers as f32 * 3.0 + order.scouts as f32;
                assert!(
                    spent <= available + 1e-4,
                    "measure {measure} with {available} overspends: {order:?}"
                );
            }
        }
    }

    #[test]
    fn threshold_grows_with_telemetry_up_to_cap() {
        let sizing = sizing();
        assert!((sizing.attack_threshold(0.0) - 16.0).abs() < f32::EPSILON);
        assert!((sizing.attack_threshold(8.0) - 20.0).abs() < f32::EPSILON);
        assert!((sizing.attack_threshold(1_000.0) - 32.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rush_requests_every_affordable_scout() {
        let rush = OffenseOrder::rush();
        assert_eq!(rush.scouts, SPAWN_ALL);
        assert!(!rush.is_empty());
    }
}
