#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Attack-lane state machine with corridor gating.
//!
//! The selector remembers which of the two lanes the offense commits to and
//! re-evaluates that choice only on turns where the previous push failed to
//! hurt the opponent. Re-evaluation counts enemy turrets in each half of the
//! board and attacks the weaker half; equal counts fall back to a seeded coin
//! flip so matches replay exactly.
//!
//! Each lane owns a corridor wall. The wall of the active lane is kept open
//! (removed and disabled in the [`StructureRegistry`]) while the other lane's
//! wall is re-enabled and placed, so mobile units are funnelled into the
//! chosen corridor.

use lanebreaker_core::{
    BoardSnapshot, CellCoord, CellRect, CellRectSize, GameEngine, Lane, Placement, Side, UnitKind,
};
use lanebreaker_system_build_plan::StructureRegistry;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Static geometry attached to one lane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneLayout {
    /// Friendly wall that closes the lane's corridor when standing.
    pub corridor_wall: CellCoord,
    /// Deployment cells for mobile units attacking through this lane.
    pub spawn_candidates: Vec<CellCoord>,
    /// Enemy cells whose defenders the offense has to push through.
    pub front_zone: CellRect,
}

/// Tunable parameters of the lane selector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    /// Lane committed to before the first evaluation.
    pub initial_lane: Lane,
    /// Weight of an upgraded turret when counting defenders.
    pub upgraded_turret_weight: u32,
    /// Geometry of the left lane.
    pub left: LaneLayout,
    /// Geometry of the right lane.
    pub right: LaneLayout,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            initial_lane: Lane::Left,
            upgraded_turret_weight: 1,
            left: LaneLayout {
                corridor_wall: CellCoord::new(5, 13),
                spawn_candidates: vec![CellCoord::new(16, 2)],
                front_zone: CellRect::from_origin_and_size(
                    CellCoord::new(0, 14),
                    CellRectSize::new(10, 4),
                ),
            },
            right: LaneLayout {
                corridor_wall: CellCoord::new(22, 13),
                spawn_candidates: vec![CellCoord::new(11, 2)],
                front_zone: CellRect::from_origin_and_size(
                    CellCoord::new(18, 14),
                    CellRectSize::new(10, 4),
                ),
            },
        }
    }
}

impl LaneConfig {
    /// Geometry of the requested lane.
    #[must_use]
    pub const fn layout(&self, lane: Lane) -> &LaneLayout {
        match lane {
            Lane::Left => &self.left,
            Lane::Right => &self.right,
        }
    }
}

/// Weighted enemy turret counts per board half.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DefenderCount {
    /// Defenders in the half with the lower column indices.
    pub left: u32,
    /// Defenders in the half with the higher column indices.
    pub right: u32,
}

impl DefenderCount {
    /// Count for the half nearer the requested lane.
    #[must_use]
    pub const fn get(&self, lane: Lane) -> u32 {
        match lane {
            Lane::Left => self.left,
            Lane::Right => self.right,
        }
    }
}

/// Counts enemy turrets on each half of the board.
///
/// Upgraded turrets count `upgraded_turret_weight` times.
#[must_use]
pub fn count_defenders(board: &BoardSnapshot, upgraded_turret_weight: u32) -> DefenderCount {
    let mut count = DefenderCount::default();
    for structure in board.owned_by(Side::Enemy) {
        if structure.kind != UnitKind::Turret {
            continue;
        }
        let weight = if structure.upgraded {
            upgraded_turret_weight
        } else {
            1
        };
        match board.lane_of(structure.cell) {
            Lane::Left => count.left += weight,
            Lane::Right => count.right += weight,
        }
    }
    count
}

/// Outcome of one lane evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneDecision {
    /// Lane the offense commits to this turn.
    pub lane: Lane,
    /// The lane differs from the previous turn's.
    pub switched: bool,
    /// The opponent's health did not drop, so the lane was re-evaluated.
    pub triggered: bool,
    /// Equal counts were resolved by the seeded draw.
    pub tie_broken: bool,
    /// Defender counts observed during re-evaluation.
    pub defenders: Option<DefenderCount>,
    /// No friendly structure blocks the active lane's corridor.
    pub corridor_open: bool,
}

/// Lane state machine.
#[derive(Clone, Debug)]
pub struct LaneSelector {
    config: LaneConfig,
    lane: Lane,
    previous_opponent_health: Option<f32>,
    rng: ChaCha8Rng,
}

impl LaneSelector {
    /// Creates a selector committed to the configured initial lane.
    #[must_use]
    pub fn new(config: LaneConfig, seed: u64) -> Self {
        Self {
            lane: config.initial_lane,
            config,
            previous_opponent_health: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Lane currently committed to.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lane
    }

    /// Configuration the selector was built with.
    #[must_use]
    pub const fn config(&self) -> &LaneConfig {
        &self.config
    }

    /// Opponent health recorded at the end of the previous turn.
    #[must_use]
    pub const fn previous_opponent_health(&self) -> Option<f32> {
        self.previous_opponent_health
    }

    /// Reports whether the opponent lost health since the recorded value.
    #[must_use]
    pub fn opponent_health_decreased(&self, health: f32) -> bool {
        self.previous_opponent_health
            .is_some_and(|previous| health < previous)
    }

    /// Stores the opponent health the next trigger check compares against.
    pub fn record_opponent_health(&mut self, health: f32) {
        self.previous_opponent_health = Some(health);
    }

    /// Disables the active lane's corridor wall so the plan never builds it.
    pub fn prime(&self, registry: &mut StructureRegistry) {
        let _ = registry.set_alive(self.config.layout(self.lane).corridor_wall, false);
    }

    /// Re-evaluates the lane when triggered and applies corridor gating.
    pub fn handle<E>(&mut self, engine: &mut E, registry: &mut StructureRegistry) -> LaneDecision
    where
        E: GameEngine + ?Sized,
    {
        let health = engine.board().player(Side::Enemy).health;
        let triggered = !self.opponent_health_decreased(health);
        let previous = self.lane;

        let mut defenders = None;
        let mut tie_broken = false;
        if triggered {
            let count = count_defenders(engine.board(), self.config.upgraded_turret_weight);
            self.lane = if count.right > count.left {
                Lane::Left
            } else if count.left > count.right {
                Lane::Right
            } else {
                tie_broken = true;
                if self.rng.gen_bool(0.5) {
                    Lane::Left
                } else {
                    Lane::Right
                }
            };
            defenders = Some(count);
        }

        let switched = self.lane != previous;
        if switched {
            tracing::info!(from = ?previous, to = ?self.lane, ?defenders, "switching attack lane");
        }

        let corridor_open = self.gate_corridors(engine, registry);

        LaneDecision {
            lane: self.lane,
            switched,
            triggered,
            tie_broken,
            defenders,
            corridor_open,
        }
    }

    fn gate_corridors<E>(&self, engine: &mut E, registry: &mut StructureRegistry) -> bool
    where
        E: GameEngine + ?Sized,
    {
        let closed = self.config.layout(self.lane.opposite()).corridor_wall;
        let _ = registry.set_alive(closed, true);
        if !engine.board().contains_stationary(closed) {
            if let Err(error) = registry.spawn(engine, Placement::single(UnitKind::Wall, closed)) {
                tracing::debug!(cell = ?closed, ?error, "corridor wall not placed");
            }
        }

        let open = self.config.layout(self.lane).corridor_wall;
        let _ = registry.set_alive(open, false);
        let Some(wall) = engine.board().structure_at(open).copied() else {
            return true;
        };
        if wall.owner == Side::Ally && !wall.pending_removal {
            if let Err(error) = engine.attempt_remove(open) {
                tracing::warn!(cell = ?open, ?error, "corridor wall removal rejected");
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanebreaker_core::{PlayerStatus, StructureSnapshot};

    fn turret(column: u32, upgraded: bool) -> StructureSnapshot {
        StructureSnapshot {
            kind: UnitKind::Turret,
            cell: CellCoord::new(column, 15),
            owner: Side::Enemy,
            health: 75.0,
            max_health: 75.0,
            upgraded,
            pending_removal: false,
        }
    }

    #[test]
    fn defenders_split_at_midpoint_and_weight_upgrades() {
        let mut board =
            BoardSnapshot::new(0, 28, 28, PlayerStatus::default(), PlayerStatus::default());
        let _ = board.insert_structure(turret(3, false));
        let _ = board.insert_structure(turret(13, true));
        let _ = board.insert_structure(turret(14, false));

        assert_eq!(count_defenders(&board, 1), DefenderCount { left: 2, right: 1 });
        assert_eq!(count_defenders(&board, 3), DefenderCount { left: 4, right: 1 });
    }

    #[test]
    fn health_drop_is_measured_against_recorded_value() {
        let mut selector = LaneSelector::new(LaneConfig::default(), 7);
        assert!(!selector.opponent_health_decreased(30.0));

        selector.record_opponent_health(30.0);
        assert!(selector.opponent_health_decreased(28.0));
        assert!(!selector.opponent_health_decreased(30.0));
    }
}
