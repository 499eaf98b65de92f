//! Unit statistics resolved once per match.

use serde::{Deserialize, Serialize};

use crate::UnitKind;

/// Statistics of a single unit kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Shorthand code the match runner uses for the kind.
    pub shorthand: String,
    /// Price of one replica.
    pub cost: f32,
    /// Price of upgrading a placed structure; zero for mobile kinds.
    #[serde(default)]
    pub upgrade_cost: f32,
    /// Health of a fresh replica.
    pub health: f32,
    /// Health after an upgrade.
    #[serde(default)]
    pub upgraded_health: f32,
    /// Damage dealt per attack.
    #[serde(default)]
    pub damage: f32,
    /// Damage dealt per attack after an upgrade.
    #[serde(default)]
    pub upgraded_damage: f32,
    /// Attack range in cells.
    #[serde(default)]
    pub range: f32,
    /// Attack range in cells after an upgrade.
    #[serde(default)]
    pub upgraded_range: f32,
}

impl UnitStats {
    fn new(shorthand: &str, cost: f32, upgrade_cost: f32) -> Self {
        Self {
            shorthand: shorthand.to_owned(),
            cost,
            upgrade_cost,
            health: 0.0,
            upgraded_health: 0.0,
            damage: 0.0,
            upgraded_damage: 0.0,
            range: 0.0,
            upgraded_range: 0.0,
        }
    }

    fn with_health(mut self, health: f32, upgraded_health: f32) -> Self {
        self.health = health;
        self.upgraded_health = upgraded_health;
        self
    }

    fn with_attack(mut self, damage: f32, upgraded_damage: f32, range: f32, upgraded_range: f32) -> Self {
        self.damage = damage;
        self.upgraded_damage = upgraded_damage;
        self.range = range;
        self.upgraded_range = upgraded_range;
        self
    }

    /// Maximum health for the given upgrade state.
    #[must_use]
    pub fn max_health(&self, upgraded: bool) -> f32 {
        if upgraded && self.upgraded_health > 0.0 {
            self.upgraded_health
        } else {
            self.health
        }
    }

    /// Damage per attack for the given upgrade state.
    #[must_use]
    pub fn damage_for(&self, upgraded: bool) -> f32 {
        if upgraded && self.upgraded_damage > 0.0 {
            self.upgraded_damage
        } else {
            self.damage
        }
    }

    /// Attack range for the given upgrade state.
    #[must_use]
    pub fn range_for(&self, upgraded: bool) -> f32 {
        if upgraded && self.upgraded_range > 0.0 {
            self.upgraded_range
        } else {
            self.range
        }
    }
}

/// Immutable table of unit statistics keyed by [`UnitKind`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitCatalog {
    /// Wall statistics.
    pub wall: UnitStats,
    /// Support statistics.
    pub support: UnitStats,
    /// Turret statistics.
    pub turret: UnitStats,
    /// Scout statistics.
    pub scout: UnitStats,
    /// Demolisher statistics.
    pub demolisher: UnitStats,
    /// Interceptor statistics.
    pub interceptor: UnitStats,
}

impl Default for UnitCatalog {
    fn default() -> Self {
        Self {
            wall: UnitStats::new("FF", 1.0, 1.0).with_health(60.0, 120.0),
            support: UnitStats::new("EF", 4.0, 4.0)
                .with_health(30.0, 30.0)
                .with_attack(0.0, 0.0, 3.5, 7.0),
            turret: UnitStats::new("DF", 2.0, 4.0)
                .with_health(75.0, 75.0)
                .with_attack(5.0, 15.0, 2.5, 3.5),
            scout: UnitStats::new("PI", 1.0, 0.0)
                .with_health(15.0, 15.0)
                .with_attack(2.0, 2.0, 3.5, 3.5),
            demolisher: UnitStats::new("EI", 3.0, 0.0)
                .with_health(5.0, 5.0)
                .with_attack(8.0, 8.0, 4.5, 4.5),
            interceptor: UnitStats::new("SI", 1.0, 0.0)
                .with_health(40.0, 40.0)
                .with_attack(20.0, 20.0, 4.5, 4.5),
        }
    }
}

impl UnitCatalog {
    /// Statistics of the requested kind.
    #[must_use]
    pub fn stats(&self, kind: UnitKind) -> &UnitStats {
        match kind {
            UnitKind::Wall => &self.wall,
            UnitKind::Support => &self.support,
            UnitKind::Turret => &self.turret,
            UnitKind::Scout => &self.scout,
            UnitKind::Demolisher => &self.demolisher,
            UnitKind::Interceptor => &self.interceptor,
        }
    }

    /// Price of one replica of the requested kind.
    #[must_use]
    pub fn cost(&self, kind: UnitKind) -> f32 {
        self.stats(kind).cost
    }

    /// Shorthand code of the requested kind.
    #[must_use]
    pub fn shorthand(&self, kind: UnitKind) -> &str {
        &self.stats(kind).shorthand
    }

    /// Resolves a shorthand code back to its kind.
    #[must_use]
    pub fn kind_for_shorthand(&self, shorthand: &str) -> Option<UnitKind> {
        UnitKind::ALL
            .into_iter()
            .find(|&kind| self.stats(kind).shorthand == shorthand)
    }
}
