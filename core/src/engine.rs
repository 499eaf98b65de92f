//! Interface consumed from the game engine.

use serde::{Deserialize, Serialize};

use crate::{BoardSnapshot, CellCoord, Placement, Side, UnitKind};

/// Reasons a spawn request may be rejected by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The pool paying for the unit cannot afford a single replica.
    InsufficientResources,
    /// A stationary unit already occupies the cell.
    Occupied,
    /// The cell lies outside the playable board.
    OutOfBounds,
    /// The cell is playable but not a legal deployment site for the unit.
    InvalidDeployment,
}

/// Reasons an upgrade request may be rejected by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// The structure-resource pool cannot afford the upgrade.
    InsufficientResources,
    /// No stationary unit stands at the cell.
    MissingStructure,
    /// The structure has already been upgraded.
    AlreadyUpgraded,
    /// The structure belongs to the opponent.
    NotOwned,
}

/// Reasons a removal request may be rejected by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// No stationary unit stands at the cell.
    MissingStructure,
    /// The structure belongs to the opponent.
    NotOwned,
}

/// Any rejected best-effort request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionFailure {
    /// A spawn was rejected.
    Placement(PlacementError),
    /// An upgrade was rejected.
    Upgrade(UpgradeError),
    /// A removal was rejected.
    Removal(RemovalError),
}

impl ActionFailure {
    /// Reports whether the request failed only for lack of funds.
    #[must_use]
    pub const fn is_resource_shortfall(self) -> bool {
        matches!(
            self,
            Self::Placement(PlacementError::InsufficientResources)
                | Self::Upgrade(UpgradeError::InsufficientResources)
        )
    }
}

impl From<PlacementError> for ActionFailure {
    fn from(error: PlacementError) -> Self {
        Self::Placement(error)
    }
}

impl From<UpgradeError> for ActionFailure {
    fn from(error: UpgradeError) -> Self {
        Self::Upgrade(error)
    }
}

impl From<RemovalError> for ActionFailure {
    fn from(error: RemovalError) -> Self {
        Self::Removal(error)
    }
}

/// Failure of the turn submission boundary. Always fatal for the match.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The match runner stopped accepting submissions.
    #[error("transport closed by the match runner")]
    Closed,
    /// The match runner refused the submitted batch.
    #[error("turn submission rejected: {0}")]
    Rejected(String),
}

/// Stationary unit able to attack a queried cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackerSnapshot {
    /// Kind of attacking unit.
    pub kind: UnitKind,
    /// Cell the attacker stands on.
    pub cell: CellCoord,
    /// Owner of the attacker.
    pub owner: Side,
    /// Damage dealt per attack.
    pub damage: f32,
}

/// Game engine the strategy plays against.
///
/// Every request is best effort: rejections come back as `Err` values and
/// leave the engine unchanged. Accepted requests are reflected in
/// [`GameEngine::board`] immediately and delivered to the match runner by
/// [`GameEngine::submit_turn`].
pub trait GameEngine {
    /// Live view of the board for the turn being assembled.
    fn board(&self) -> &BoardSnapshot;

    /// Queues deployment of up to `placement.count` units.
    ///
    /// Returns how many replicas were queued; stationary kinds queue at
    /// most one.
    fn attempt_spawn(&mut self, placement: Placement) -> Result<u32, PlacementError>;

    /// Queues the same deployment at several cells, one result per cell.
    fn attempt_spawn_many(
        &mut self,
        kind: UnitKind,
        cells: &[CellCoord],
        count: u32,
    ) -> Vec<Result<u32, PlacementError>> {
        cells
            .iter()
            .map(|&cell| self.attempt_spawn(Placement::new(kind, cell, count)))
            .collect()
    }

    /// Queues an upgrade of the friendly structure at `cell`.
    fn attempt_upgrade(&mut self, cell: CellCoord) -> Result<(), UpgradeError>;

    /// Flags the friendly structure at `cell` for removal at end of turn.
    fn attempt_remove(&mut self, cell: CellCoord) -> Result<(), RemovalError>;

    /// Route a mobile unit deployed at `start` would take to the opposing edge.
    ///
    /// The route is computed against the live board and includes `start`.
    /// An empty route means the unit cannot move from `start` at all.
    fn find_path_to_edge(&self, start: CellCoord) -> Vec<CellCoord>;

    /// Stationary attackers owned by `side` that can strike `cell`.
    fn attackers(&self, cell: CellCoord, side: Side) -> Vec<AttackerSnapshot>;

    /// Sends the queued requests to the match runner.
    fn submit_turn(&mut self) -> Result<(), TransportError>;
}
