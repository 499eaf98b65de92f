#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reference game engine used to exercise strategies offline.
//!
//! The [`World`] implements [`GameEngine`] on a diamond [`Arena`]: it checks
//! deployment legality, charges resources, keeps the live board in sync with
//! queued requests, routes mobile units with a breadth-first navigation
//! field, answers turret threat queries, and resolves removals into refunds
//! when a turn is submitted. It does not simulate the action phase; mid-turn
//! events are supplied by whoever drives the match.

mod arena;
mod navigation;

pub use arena::{Arena, Edge};

use lanebreaker_core::{
    Action, AttackerSnapshot, BoardSnapshot, CellCoord, GameEngine, Placement, PlacementError,
    PlayerStatus, RemovalError, Resource, ResourcePools, Side, StructureSnapshot, TransportError,
    UnitCatalog, UnitKind, UpgradeError,
};

use navigation::NavigationField;

const STARTING_HEALTH: f32 = 30.0;
const STARTING_STRUCTURE: f32 = 40.0;
const STARTING_MOBILE: f32 = 5.0;
const DEFAULT_INCOME: ResourcePools = ResourcePools::new(5.0, 5.0);
const DEFAULT_REFUND_RATIO: f32 = 0.75;

/// Batch of requests delivered to the match runner for one turn.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    /// Turn the batch was assembled for.
    pub turn: u32,
    /// Accepted requests in the order they were made.
    pub actions: Vec<Action>,
}

/// Represents the authoritative reference engine state.
#[derive(Debug)]
pub struct World {
    arena: Arena,
    catalog: UnitCatalog,
    board: BoardSnapshot,
    queued: Vec<Action>,
    submissions: Vec<Submission>,
    income: ResourcePools,
    refund_ratio: f32,
    transport_open: bool,
}

impl Default for World {
    fn default() -> Self {
        Self::new(UnitCatalog::default())
    }
}

impl World {
    /// Creates a fresh match on the default arena at turn zero.
    #[must_use]
    pub fn new(catalog: UnitCatalog) -> Self {
        Self::with_arena(Arena::default(), catalog)
    }

    /// Creates a fresh match on the provided arena at turn zero.
    #[must_use]
    pub fn with_arena(arena: Arena, catalog: UnitCatalog) -> Self {
        let status = PlayerStatus::new(
            STARTING_HEALTH,
            ResourcePools::new(STARTING_STRUCTURE, STARTING_MOBILE),
        );
        Self {
            arena,
            catalog,
            board: BoardSnapshot::new(0, arena.size(), arena.size(), status, status),
            queued: Vec::new(),
            submissions: Vec::new(),
            income: DEFAULT_INCOME,
            refund_ratio: DEFAULT_REFUND_RATIO,
            transport_open: true,
        }
    }

    /// Overwrites one player's balances.
    pub fn set_resources(&mut self, side: Side, resources: ResourcePools) {
        self.board.player_mut(side).resources = resources;
    }

    /// Overwrites one player's health.
    pub fn set_health(&mut self, side: Side, health: f32) {
        self.board.player_mut(side).health = health;
    }

    /// Sets the balances both players gain when a turn is submitted.
    pub fn set_income(&mut self, income: ResourcePools) {
        self.income = income;
    }

    /// Places a structure free of charge, bypassing deployment rules.
    ///
    /// Used to lay out the opponent's defences and to stage scenarios.
    pub fn seed_structure(
        &mut self,
        side: Side,
        kind: UnitKind,
        cell: CellCoord,
        upgraded: bool,
    ) -> Result<(), PlacementError> {
        if !kind.is_stationary() {
            return Err(PlacementError::InvalidDeployment);
        }
        if !self.arena.contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if self.board.contains_stationary(cell) {
            return Err(PlacementError::Occupied);
        }
        let max_health = self.catalog.stats(kind).max_health(upgraded);
        let _ = self.board.insert_structure(StructureSnapshot {
            kind,
            cell,
            owner: side,
            health: max_health,
            max_health,
            upgraded,
            pending_removal: false,
        });
        Ok(())
    }

    /// Applies damage to the structure at `cell`, destroying it at zero health.
    ///
    /// Returns `true` when the structure was destroyed.
    pub fn damage_structure(&mut self, cell: CellCoord, amount: f32) -> bool {
        let Some(structure) = self.board.structure_mut(cell) else {
            return false;
        };
        structure.health = (structure.health - amount).max(0.0);
        if structure.health > 0.0 {
            return false;
        }
        let _ = self.board.remove_structure(cell);
        true
    }

    /// Makes every further submission fail as if the runner hung up.
    pub fn close_transport(&mut self) {
        self.transport_open = false;
    }

    fn resolve_removals(&mut self) {
        let flagged: Vec<StructureSnapshot> = self
            .board
            .structures()
            .filter(|structure| structure.pending_removal)
            .copied()
            .collect();

        for structure in flagged {
            let stats = self.catalog.stats(structure.kind);
            let mut paid = stats.cost;
            if structure.upgraded {
                paid += stats.upgrade_cost;
            }
            let refund = self.refund_ratio * paid * structure.health_fraction();
            self.board
                .player_mut(structure.owner)
                .resources
                .credit(Resource::Structure, refund);
            let _ = self.board.remove_structure(structure.cell);
        }
    }

    fn spawn_structure(&mut self, placement: Placement) -> Result<u32, PlacementError> {
        if !self.arena.is_friendly_territory(placement.cell) {
            return Err(PlacementError::InvalidDeployment);
        }
        if self.board.contains_stationary(placement.cell) {
            return Err(PlacementError::Occupied);
        }

        let stats = self.catalog.stats(placement.kind);
        let max_health = stats.max_health(false);
        let cost = stats.cost;
        if !self
            .board
            .player_mut(Side::Ally)
            .resources
            .spend(Resource::Structure, cost)
        {
            return Err(PlacementError::InsufficientResources);
        }

        let _ = self.board.insert_structure(StructureSnapshot {
            kind: placement.kind,
            cell: placement.cell,
            owner: Side::Ally,
            health: max_health,
            max_health,
            upgraded: false,
            pending_removal: false,
        });
        self.queued
            .push(Action::Spawn(Placement::single(placement.kind, placement.cell)));
        Ok(1)
    }

    fn spawn_mobile(&mut self, placement: Placement) -> Result<u32, PlacementError> {
        if !self.arena.is_deploy_site(placement.cell) {
            return Err(PlacementError::InvalidDeployment);
        }
        if self.board.contains_stationary(placement.cell) {
            return Err(PlacementError::Occupied);
        }

        let cost = self.catalog.cost(placement.kind);
        let pools = &mut self.board.player_mut(Side::Ally).resources;
        let affordable = if cost > 0.0 {
            (pools.mobile / cost).floor() as u32
        } else {
            placement.count
        };
        let queued = placement.count.min(affordable);
        if queued == 0 {
            return Err(PlacementError::InsufficientResources);
        }
        if !pools.spend(Resource::Mobile, cost * queued as f32) {
            return Err(PlacementError::InsufficientResources);
        }

        self.queued.push(Action::Spawn(Placement::new(
            placement.kind,
            placement.cell,
            queued,
        )));
        Ok(queued)
    }
}

impl GameEngine for World {
    fn board(&self) -> &BoardSnapshot {
        &self.board
    }

    fn attempt_spawn(&mut self, placement: Placement) -> Result<u32, PlacementError> {
        if !self.arena.contains(placement.cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if placement.count == 0 {
            return Ok(0);
        }
        if placement.kind.is_stationary() {
            self.spawn_structure(placement)
        } else {
            self.spawn_mobile(placement)
        }
    }

    fn attempt_upgrade(&mut self, cell: CellCoord) -> Result<(), UpgradeError> {
        let Some(structure) = self.board.structure_at(cell).copied() else {
            return Err(UpgradeError::MissingStructure);
        };
        if structure.owner != Side::Ally {
            return Err(UpgradeError::NotOwned);
        }
        if structure.upgraded {
            return Err(UpgradeError::AlreadyUpgraded);
        }

        let stats = self.catalog.stats(structure.kind);
        let upgraded_max = stats.max_health(true);
        let cost = stats.upgrade_cost;
        if !self
            .board
            .player_mut(Side::Ally)
            .resources
            .spend(Resource::Structure, cost)
        {
            return Err(UpgradeError::InsufficientResources);
        }

        if let Some(target) = self.board.structure_mut(cell) {
            target.upgraded = true;
            target.health += upgraded_max - target.max_health;
            target.max_health = upgraded_max;
        }
        self.queued.push(Action::Upgrade { cell });
        Ok(())
    }

    fn attempt_remove(&mut self, cell: CellCoord) -> Result<(), RemovalError> {
        let Some(structure) = self.board.structure_mut(cell) else {
            return Err(RemovalError::MissingStructure);
        };
        if structure.owner != Side::Ally {
            return Err(RemovalError::NotOwned);
        }
        if structure.pending_removal {
            return Ok(());
        }
        structure.pending_removal = true;
        self.queued.push(Action::Remove { cell });
        Ok(())
    }

    fn find_path_to_edge(&self, start: CellCoord) -> Vec<CellCoord> {
        let Some(edge) = self.arena.edge_of(start) else {
            return Vec::new();
        };
        let exits = self.arena.edge_cells(edge.opposite());
        let arena = self.arena;
        let board = &self.board;

        NavigationField::towards(arena.size(), arena.size(), &exits, |cell| {
            !arena.contains(cell) || board.contains_stationary(cell)
        })
        .route_from(start)
    }

    fn attackers(&self, cell: CellCoord, side: Side) -> Vec<AttackerSnapshot> {
        self.board
            .owned_by(side)
            .filter_map(|structure| {
                let stats = self.catalog.stats(structure.kind);
                let damage = stats.damage_for(structure.upgraded);
                let range = stats.range_for(structure.upgraded);
                if damage <= 0.0 || range <= 0.0 {
                    return None;
                }
                let reach = f64::from(range) * f64::from(range);
                if structure.cell.distance_squared(cell) as f64 > reach {
                    return None;
                }
                Some(AttackerSnapshot {
                    kind: structure.kind,
                    cell: structure.cell,
                    owner: structure.owner,
                    damage,
                })
            })
            .collect()
    }

    fn submit_turn(&mut self) -> Result<(), TransportError> {
        if !self.transport_open {
            return Err(TransportError::Closed);
        }

        self.resolve_removals();
        let turn = self.board.turn();
        tracing::debug!(turn, actions = self.queued.len(), "turn submitted");
        self.submissions.push(Submission {
            turn,
            actions: std::mem::take(&mut self.queued),
        });

        self.board.set_turn(turn.saturating_add(1));
        for side in [Side::Ally, Side::Enemy] {
            let pools = &mut self.board.player_mut(side).resources;
            pools.credit(Resource::Structure, self.income.structure);
            pools.credit(Resource::Mobile, self.income.mobile);
        }
        Ok(())
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Arena, Submission, World};
    use lanebreaker_core::{Action, UnitCatalog};

    /// Geometry of the arena the world plays on.
    #[must_use]
    pub fn arena(world: &World) -> Arena {
        world.arena
    }

    /// Unit statistics the world charges and scores with.
    #[must_use]
    pub fn catalog(world: &World) -> &UnitCatalog {
        &world.catalog
    }

    /// Requests accepted so far for the turn being assembled.
    #[must_use]
    pub fn queued_actions(world: &World) -> &[Action] {
        &world.queued
    }

    /// Every batch delivered to the runner, oldest first.
    #[must_use]
    pub fn submissions(world: &World) -> &[Submission] {
        &world.submissions
    }
}
