#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Expected-damage ranking of mobile-unit deployment cells.

use lanebreaker_core::{CellCoord, GameEngine, Side, UnitCatalog, UnitKind};
use serde::{Deserialize, Serialize};

/// Tunable parameters of the risk estimate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Damage assumed for every attack an enemy attacker lands on a route
    /// cell. Falls back to the catalog's base turret damage when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_per_attack: Option<f32>,
}

/// Risk estimate for one deployment cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteRisk {
    /// Deployment cell that was assessed.
    pub candidate: CellCoord,
    /// Number of cells on the projected route, the start included.
    pub route_len: usize,
    /// Expected damage along the route; `None` when no route exists.
    pub expected_damage: Option<f32>,
}

impl RouteRisk {
    /// Reports whether units deployed at the candidate can move at all.
    #[must_use]
    pub const fn is_reachable(&self) -> bool {
        self.expected_damage.is_some()
    }
}

/// Pure system ranking deployment cells by expected incoming damage.
#[derive(Clone, Copy, Debug)]
pub struct SpawnRiskEstimator {
    damage_per_attack: f32,
}

impl SpawnRiskEstimator {
    /// Creates an estimator, resolving the reference damage against `catalog`.
    #[must_use]
    pub fn new(config: RiskConfig, catalog: &UnitCatalog) -> Self {
        let damage_per_attack = config
            .damage_per_attack
            .unwrap_or_else(|| catalog.stats(UnitKind::Turret).damage);
        Self { damage_per_attack }
    }

    /// Damage counted for each attack landing on a route cell.
    #[must_use]
    pub const fn damage_per_attack(&self) -> f32 {
        self.damage_per_attack
    }

    /// Sums the expected damage along the route from `candidate`.
    ///
    /// Every route cell contributes the number of enemy attackers able to
    /// reach it times the reference damage per attack.
    pub fn assess<E>(&self, candidate: CellCoord, engine: &E) -> RouteRisk
    where
        E: GameEngine + ?Sized,
    {
        let route = engine.find_path_to_edge(candidate);
        let expected_damage = if route.is_empty() {
            None
        } else {
            let attacks: usize = route
                .iter()
                .map(|&cell| engine.attackers(cell, Side::Enemy).len())
                .sum();
            Some(attacks as f32 * self.damage_per_attack)
        };

        RouteRisk {
            candidate,
            route_len: route.len(),
            expected_damage,
        }
    }

    /// Picks the reachable candidate with the lowest expected damage.
    ///
    /// Ties go to the candidate listed first. Returns `None` when no
    /// candidate can reach the opposing edge.
    pub fn select_least_risky<E>(&self, candidates: &[CellCoord], engine: &E) -> Option<CellCoord>
    where
        E: GameEngine + ?Sized,
    {
        let mut best: Option<(CellCoord, f32)> = None;
        for &candidate in candidates {
            let risk = self.assess(candidate, engine);
            tracing::debug!(
                ?candidate,
                route_len = risk.route_len,
                expected_damage = ?risk.expected_damage,
                "assessed spawn candidate"
            );
            let Some(damage) = risk.expected_damage else {
                continue;
            };
            if best.map_or(true, |(_, lowest)| damage < lowest) {
                best = Some((candidate, damage));
            }
        }
        best.map(|(cell, _)| cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_risk_reports_itself() {
        let risk = RouteRisk {
            candidate: CellCoord::new(16, 2),
            route_len: 0,
            expected_damage: None,
        };
        assert!(!risk.is_reachable());
    }

    #[test]
    fn reference_damage_follows_the_catalog() {
        let mut catalog = UnitCatalog::default();
        catalog.turret.damage = 7.0;

        let derived = SpawnRiskEstimator::new(RiskConfig::default(), &catalog);
        assert!((derived.damage_per_attack() - 7.0).abs() < f32::EPSILON);

        let pinned = RiskConfig {
            damage_per_attack: Some(2.0),
        };
        let pinned = SpawnRiskEstimator::new(pinned, &catalog);
        assert!((pinned.damage_per_attack() - 2.0).abs() < f32::EPSILON);
    }
}
