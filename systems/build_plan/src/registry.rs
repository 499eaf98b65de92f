//! Strategy-side memory of the structures a plan intends to keep standing.

use std::collections::BTreeMap;

use lanebreaker_core::{
    BuildPlan, BuildStep, CellCoord, GameEngine, Placement, PlacementError, UnitKind,
};

/// Structure the strategy wants to exist, whether or not it currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackedStructure {
    /// Kind of structure expected at the cell.
    pub kind: UnitKind,
    /// Cell the structure belongs on.
    pub cell: CellCoord,
    /// Replica count requested whenever the structure is (re)spawned.
    pub desired_count: u32,
    /// Disabled structures are neither placed nor rebuilt.
    pub alive: bool,
    /// Number of turns on which a (re)spawn was requested.
    pub spawn_attempts: u32,
    last_attempt_turn: Option<u32>,
}

impl TrackedStructure {
    /// Creates an enabled structure with no spawn history.
    #[must_use]
    pub const fn new(kind: UnitKind, cell: CellCoord, desired_count: u32) -> Self {
        Self {
            kind,
            cell,
            desired_count,
            alive: true,
            spawn_attempts: 0,
            last_attempt_turn: None,
        }
    }

    /// Reports whether the structure was spawned again after its first request.
    #[must_use]
    pub const fn has_been_rebuilt(&self) -> bool {
        self.spawn_attempts > 1
    }
}

/// Tracked structures keyed by cell.
///
/// Entries are created once from the static layout and never removed; the
/// `alive` flag is toggled instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructureRegistry {
    entries: BTreeMap<CellCoord, TrackedStructure>,
}

impl StructureRegistry {
    /// Tracks every stationary placement named by the plan.
    ///
    /// When several steps place at the same cell the first one wins.
    #[must_use]
    pub fn from_plan(plan: &BuildPlan) -> Self {
        let mut registry = Self::default();
        for step in plan.steps() {
            if let BuildStep::Place(placement) = step {
                if placement.kind.is_stationary() {
                    registry.track(*placement);
                }
            }
        }
        registry
    }

    /// Starts tracking a placement unless its cell is already tracked.
    pub fn track(&mut self, placement: Placement) {
        let _ = self.entries.entry(placement.cell).or_insert_with(|| {
            TrackedStructure::new(placement.kind, placement.cell, placement.count)
        });
    }

    /// Tracked structure at the provided cell.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<&TrackedStructure> {
        self.entries.get(&cell)
    }

    /// Enables or disables the structure at `cell`.
    ///
    /// Returns `false` when the cell is not tracked.
    pub fn set_alive(&mut self, cell: CellCoord, alive: bool) -> bool {
        match self.entries.get_mut(&cell) {
            Some(entry) => {
                entry.alive = alive;
                true
            }
            None => false,
        }
    }

    /// Records a (re)spawn request for `cell` on `turn`.
    ///
    /// Repeated requests within one turn count once.
    pub fn note_attempt(&mut self, cell: CellCoord, turn: u32) {
        if let Some(entry) = self.entries.get_mut(&cell) {
            if entry.last_attempt_turn != Some(turn) {
                entry.spawn_attempts = entry.spawn_attempts.saturating_add(1);
                entry.last_attempt_turn = Some(turn);
            }
        }
    }

    /// Requests a spawn through the engine and records the attempt when tracked.
    pub fn spawn<E>(&mut self, engine: &mut E, placement: Placement) -> Result<u32, PlacementError>
    where
        E: GameEngine + ?Sized,
    {
        self.note_attempt(placement.cell, engine.board().turn());
        engine.attempt_spawn(placement)
    }

    /// Iterator over tracked structures in cell order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedStructure> {
        self.entries.values()
    }

    /// Number of tracked structures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
