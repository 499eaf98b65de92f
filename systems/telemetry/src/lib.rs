#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Running statistics distilled from the mid-turn event stream.
//!
//! Events may arrive in any number of batches between two turns, including
//! none at all. The accumulator only ever appends: it sums what the opponent
//! spent on mobile units during the current turn and remembers where those
//! units entered the board. Closing a turn folds the pending spend into a
//! fixed-size moving window.

use std::collections::{BTreeMap, VecDeque};

use lanebreaker_core::{CellCoord, EventKind, MatchEvent, Side, UnitCatalog, UnitKind};
use serde::{Deserialize, Serialize};

/// Tunable parameters of the accumulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Number of closed turns averaged over.
    pub window: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { window: 5 }
    }
}

/// Breaches observed since the match started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BreachTally {
    /// Friendly units that reached the enemy edge.
    pub scored: u32,
    /// Enemy units that reached the friendly edge.
    pub conceded: u32,
}

/// Moving average of opponent mobile spend plus spawn-location history.
#[derive(Clone, Debug)]
pub struct TelemetryAccumulator {
    window: usize,
    catalog: UnitCatalog,
    pending_spend: f32,
    closed: VecDeque<f32>,
    spawn_history: BTreeMap<CellCoord, u32>,
    breaches: BreachTally,
}

impl TelemetryAccumulator {
    /// Creates an empty accumulator pricing events with `catalog`.
    #[must_use]
    pub fn new(config: TelemetryConfig, catalog: UnitCatalog) -> Self {
        let window = config.window.max(1);
        Self {
            window,
            catalog,
            pending_spend: 0.0,
            closed: VecDeque::with_capacity(window),
            spawn_history: BTreeMap::new(),
            breaches: BreachTally::default(),
        }
    }

    /// Folds a batch of events into the running statistics.
    pub fn observe(&mut self, events: &[MatchEvent]) {
        for event in events {
            match event.kind {
                EventKind::Spawn if event.owner == Side::Enemy && is_mobile(event.unit) => {
                    self.pending_spend += self.catalog.cost(event.unit);
                    *self.spawn_history.entry(event.cell).or_insert(0) += 1;
                }
                EventKind::Breach => match event.owner {
                    Side::Ally => self.breaches.scored += 1,
                    Side::Enemy => self.breaches.conceded += 1,
                },
                EventKind::Spawn | EventKind::SelfDestruct | EventKind::Death => {}
            }
        }
    }

    /// Moves the pending spend into the averaging window.
    ///
    /// Returns the spend recorded for the closed turn.
    pub fn close_turn(&mut self) -> f32 {
        let spend = std::mem::take(&mut self.pending_spend);
        if self.closed.len() == self.window {
            let _ = self.closed.pop_front();
        }
        self.closed.push_back(spend);
        tracing::debug!(
            spend,
            average = self.average_mobile_spend(),
            "telemetry turn closed"
        );
        spend
    }

    /// Average opponent mobile spend over the closed turns in the window.
    #[must_use]
    pub fn average_mobile_spend(&self) -> f32 {
        if self.closed.is_empty() {
            return 0.0;
        }
        self.closed.iter().sum::<f32>() / self.closed.len() as f32
    }

    /// Spend observed since the last closed turn.
    #[must_use]
    pub const fn pending_spend(&self) -> f32 {
        self.pending_spend
    }

    /// Number of enemy mobile units seen entering at each cell.
    #[must_use]
    pub const fn spawn_history(&self) -> &BTreeMap<CellCoord, u32> {
        &self.spawn_history
    }

    /// Cell the opponent deployed mobile units from most often.
    ///
    /// Ties go to the lowest cell.
    #[must_use]
    pub fn favourite_enemy_spawn(&self) -> Option<CellCoord> {
        self.spawn_history
            .iter()
            .fold(None, |best: Option<(CellCoord, u32)>, (&cell, &count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((cell, count)),
            })
            .map(|(cell, _)| cell)
    }

    /// Breaches observed so far.
    #[must_use]
    pub const fn breaches(&self) -> BreachTally {
        self.breaches
    }
}

const fn is_mobile(kind: UnitKind) -> bool {
    !kind.is_stationary()
}
