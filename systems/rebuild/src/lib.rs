#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Damage-driven recycling of friendly structures.
//!
//! A sweep removes badly damaged structures so the engine refunds part of
//! their price, and remembers them in a [`RebuildQueue`]. The queue is drained
//! on the following turn, once the removal has been resolved, by requesting
//! each structure again exactly once.

use std::collections::BTreeMap;

use lanebreaker_core::{
    CellCoord, GameEngine, Placement, PlacementError, Resource, Side, UnitKind,
};
use lanebreaker_system_build_plan::StructureRegistry;
use serde::{Deserialize, Serialize};

/// Health-fraction thresholds for one structure kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KindThreshold {
    /// Threshold applied while structure-resource is scarce.
    pub constrained: f32,
    /// Threshold applied while structure-resource is plentiful.
    pub flush: f32,
    /// Only upgraded structures of this kind are recycled.
    #[serde(default)]
    pub upgraded_only: bool,
}

impl KindThreshold {
    /// Creates a threshold pair.
    #[must_use]
    pub const fn new(constrained: f32, flush: f32, upgraded_only: bool) -> Self {
        Self {
            constrained,
            flush,
            upgraded_only,
        }
    }

    /// Threshold for the given resource tier.
    #[must_use]
    pub const fn for_tier(&self, flush: bool) -> f32 {
        if flush {
            self.flush
        } else {
            self.constrained
        }
    }
}

/// Per-kind recycling thresholds and the balance that switches tiers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebuildThresholds {
    /// Structure-resource balance at or above which the flush tier applies.
    pub flush_structure_resource: f32,
    /// Wall thresholds; walls are never recycled when absent.
    pub wall: Option<KindThreshold>,
    /// Support thresholds; supports are never recycled when absent.
    pub support: Option<KindThreshold>,
    /// Turret thresholds; turrets are never recycled when absent.
    pub turret: Option<KindThreshold>,
}

impl Default for RebuildThresholds {
    fn default() -> Self {
        Self {
            flush_structure_resource: 20.0,
            wall: Some(KindThreshold::new(0.6, 0.8, true)),
            support: None,
            turret: Some(KindThreshold::new(0.35, 0.64, false)),
        }
    }
}

impl RebuildThresholds {
    /// Thresholds configured for `kind`, if it is recycled at all.
    #[must_use]
    pub const fn for_kind(&self, kind: UnitKind) -> Option<KindThreshold> {
        match kind {
            UnitKind::Wall => self.wall,
            UnitKind::Support => self.support,
            UnitKind::Turret => self.turret,
            UnitKind::Scout | UnitKind::Demolisher | UnitKind::Interceptor => None,
        }
    }

    /// Iterator over the configured thresholds.
    pub fn iter(&self) -> impl Iterator<Item = (UnitKind, KindThreshold)> + '_ {
        [UnitKind::Wall, UnitKind::Support, UnitKind::Turret]
            .into_iter()
            .filter_map(|kind| self.for_kind(kind).map(|threshold| (kind, threshold)))
    }
}

/// Structures removed this turn and scheduled for reconstruction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RebuildQueue {
    entries: BTreeMap<CellCoord, UnitKind>,
}

/// Result of re-requesting one queued structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// The engine queued the structure.
    Requested,
    /// The engine rejected the request; the entry is dropped anyway.
    Rejected(PlacementError),
    /// The structure is disabled and was not requested.
    Disabled,
}

/// Record of one drained queue entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebuildAttempt {
    /// Kind of the structure.
    pub kind: UnitKind,
    /// Cell of the structure.
    pub cell: CellCoord,
    /// What happened.
    pub outcome: RebuildOutcome,
}

impl RebuildQueue {
    /// Schedules `kind` at `cell` for reconstruction.
    pub fn push(&mut self, kind: UnitKind, cell: CellCoord) {
        let _ = self.entries.insert(cell, kind);
    }

    /// Reports whether a structure is scheduled at `cell`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.entries.contains_key(&cell)
    }

    /// Number of scheduled structures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Requests every scheduled structure once, then empties the queue.
    pub fn drain<E>(
        &mut self,
        engine: &mut E,
        registry: &mut StructureRegistry,
        out: &mut Vec<RebuildAttempt>,
    ) where
        E: GameEngine + ?Sized,
    {
        for (cell, kind) in std::mem::take(&mut self.entries) {
            let outcome = if registry.get(cell).is_some_and(|tracked| !tracked.alive) {
                RebuildOutcome::Disabled
            } else {
                match registry.spawn(engine, Placement::single(kind, cell)) {
                    Ok(_) => RebuildOutcome::Requested,
                    Err(error) => RebuildOutcome::Rejected(error),
                }
            };
            tracing::debug!(?kind, ?cell, ?outcome, "rebuild attempted");
            out.push(RebuildAttempt {
                kind,
                cell,
                outcome,
            });
        }
    }
}

/// Pure system that recycles damaged friendly structures.
#[derive(Clone, Copy, Debug, Default)]
pub struct RebuildPolicy {
    thresholds: RebuildThresholds,
}

impl RebuildPolicy {
    /// Creates a policy using the provided thresholds.
    #[must_use]
    pub const fn new(thresholds: RebuildThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds the policy applies.
    #[must_use]
    pub const fn thresholds(&self) -> &RebuildThresholds {
        &self.thresholds
    }

    /// Removes friendly structures below their threshold and schedules them.
    ///
    /// The tier is chosen once from the structure-resource balance at the
    /// start of the sweep. Every removed cell is pushed to `out_removed`.
    pub fn sweep<E>(
        &self,
        engine: &mut E,
        queue: &mut RebuildQueue,
        out_removed: &mut Vec<CellCoord>,
    ) where
        E: GameEngine + ?Sized,
    {
        let balance = engine.board().resource(Side::Ally, Resource::Structure);
        let flush = balance >= self.thresholds.flush_structure_resource;

        let candidates: Vec<(UnitKind, CellCoord)> = engine
            .board()
            .owned_by(Side::Ally)
            .filter(|structure| !structure.pending_removal)
            .filter(|structure| {
                let Some(threshold) = self.thresholds.for_kind(structure.kind) else {
                    return false;
                };
                if threshold.upgraded_only && !structure.upgraded {
                    return false;
                }
                structure.health < threshold.for_tier(flush) * structure.max_health
            })
            .map(|structure| (structure.kind, structure.cell))
            .collect();

        for (kind, cell) in candidates {
            match engine.attempt_remove(cell) {
                Ok(()) => {
                    tracing::debug!(?kind, ?cell, flush, "recycling damaged structure");
                    queue.push(kind, cell);
                    out_removed.push(cell);
                }
                Err(error) => {
                    tracing::warn!(?kind, ?cell, ?error, "removal rejected");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_recycle_upgraded_walls_and_turrets() {
        let thresholds = RebuildThresholds::default();
        let kinds: Vec<UnitKind> = thresholds.iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, vec![UnitKind::Wall, UnitKind::Turret]);
        assert!(thresholds.wall.is_some_and(|wall| wall.upgraded_only));
    }

    #[test]
    fn flush_tier_rebuilds_sooner() {
        for (kind, threshold) in RebuildThresholds::default().iter() {
            assert!(
                threshold.for_tier(true) > threshold.for_tier(false),
                "{kind:?} flush threshold should exceed the constrained one"
            );
        }
    }

    #[test]
    fn queue_keeps_one_entry_per_cell() {
        let mut queue = RebuildQueue::default();
        queue.push(UnitKind::Wall, CellCoord::new(4, 13));
        queue.push(UnitKind::Wall, CellCoord::new(4, 13));
        assert_eq!(queue.len(), 1);
        assert!(queue.contains(CellCoord::new(4, 13)));
    }
}
