#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lanebreaker strategy.
//!
//! This crate defines the vocabulary that connects the strategy systems with
//! the game engine they play against. The engine exposes a live
//! [`BoardSnapshot`] and accepts best-effort requests through the
//! [`GameEngine`] trait; systems read the snapshot, decide, and answer with
//! [`Placement`] values, upgrades, and removals. Nothing in here mutates the
//! engine directly: every mutation is a request that may be rejected.

mod catalog;
mod engine;

pub use catalog::{UnitCatalog, UnitStats};
pub use engine::{
    ActionFailure, AttackerSnapshot, GameEngine, PlacementError, RemovalError, TransportError,
    UpgradeError,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Requested replica count meaning "spawn as many as the pool affords".
pub const SPAWN_ALL: u32 = 1_000;

/// Closed set of units that can be deployed onto the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Cheap stationary blocker used to shape enemy paths.
    Wall,
    /// Stationary booster that shields friendly mobile units.
    Support,
    /// Stationary attacker that damages passing enemy units.
    Turret,
    /// Fast, fragile, low-cost mobile unit.
    Scout,
    /// Slow mobile unit that outranges turrets and razes structures.
    Demolisher,
    /// Mobile unit that hunts other mobile units.
    Interceptor,
}

impl UnitKind {
    /// Every unit kind in catalog order.
    pub const ALL: [UnitKind; 6] = [
        Self::Wall,
        Self::Support,
        Self::Turret,
        Self::Scout,
        Self::Demolisher,
        Self::Interceptor,
    ];

    /// Reports whether the unit is a stationary structure.
    #[must_use]
    pub const fn is_stationary(self) -> bool {
        matches!(self, Self::Wall | Self::Support | Self::Turret)
    }

    /// Resource pool the unit is paid from.
    #[must_use]
    pub const fn resource(self) -> Resource {
        if self.is_stationary() {
            Resource::Structure
        } else {
            Resource::Mobile
        }
    }
}

/// Identifies one of the two players in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The side this strategy plays.
    Ally,
    /// The opposing side.
    Enemy,
}

impl Side {
    /// Returns the other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Ally => Self::Enemy,
            Self::Enemy => Self::Ally,
        }
    }
}

/// The two independent resource pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Pays for walls, supports, turrets, and their upgrades.
    Structure,
    /// Pays for scouts, demolishers, and interceptors.
    Mobile,
}

/// One of the two symmetric attack corridors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    /// Corridor through the half with the lower column indices.
    Left,
    /// Corridor through the half with the higher column indices.
    Right,
}

impl Lane {
    /// Both lanes, left first.
    pub const ALL: [Lane; 2] = [Self::Left, Self::Right];

    /// Returns the mirrored lane.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Location of a single board cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new board cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Squared Euclidean distance between two cell coordinates.
    #[must_use]
    pub fn distance_squared(self, other: CellCoord) -> u64 {
        let dx = u64::from(self.column().abs_diff(other.column()));
        let dy = u64::from(self.row().abs_diff(other.row()));
        dx * dx + dy * dy
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = cell.column();
        let row = cell.row();
        column >= self.origin.column()
            && row >= self.origin.row()
            && column - self.origin.column() < self.size.width()
            && row - self.origin.row() < self.size.height()
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Balances of the two resource pools held by one player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcePools {
    /// Structure-resource balance.
    pub structure: f32,
    /// Mobile-resource balance.
    pub mobile: f32,
}

impl ResourcePools {
    /// Creates a new pair of balances.
    #[must_use]
    pub const fn new(structure: f32, mobile: f32) -> Self {
        Self { structure, mobile }
    }

    /// Balance of the requested pool.
    #[must_use]
    pub const fn get(&self, resource: Resource) -> f32 {
        match resource {
            Resource::Structure => self.structure,
            Resource::Mobile => self.mobile,
        }
    }

    /// Adds `amount` to the requested pool.
    pub fn credit(&mut self, resource: Resource, amount: f32) {
        match resource {
            Resource::Structure => self.structure += amount,
            Resource::Mobile => self.mobile += amount,
        }
    }

    /// Deducts `amount` from the requested pool when the balance covers it.
    ///
    /// Returns `false` and leaves the balance untouched otherwise.
    #[must_use]
    pub fn spend(&mut self, resource: Resource, amount: f32) -> bool {
        if amount > self.get(resource) {
            return false;
        }
        match resource {
            Resource::Structure => self.structure -= amount,
            Resource::Mobile => self.mobile -= amount,
        }
        true
    }
}

/// Health and resources of one player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatus {
    /// Remaining player health.
    pub health: f32,
    /// Current resource balances.
    pub resources: ResourcePools,
}

impl PlayerStatus {
    /// Creates a new player status.
    #[must_use]
    pub const fn new(health: f32, resources: ResourcePools) -> Self {
        Self { health, resources }
    }
}

/// Immutable representation of a single stationary unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructureSnapshot {
    /// Kind of structure occupying the cell.
    pub kind: UnitKind,
    /// Cell occupied by the structure.
    pub cell: CellCoord,
    /// Player that owns the structure.
    pub owner: Side,
    /// Remaining health.
    pub health: f32,
    /// Health of the structure when undamaged.
    pub max_health: f32,
    /// Indicates whether the structure has been upgraded.
    pub upgraded: bool,
    /// Indicates that the owner flagged the structure for removal this turn.
    #[serde(default)]
    pub pending_removal: bool,
}

impl StructureSnapshot {
    /// Remaining health as a fraction of the maximum, in `[0, 1]`.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// Read-only view of the board for one turn.
///
/// Engines keep this view live while a turn is being assembled: queued
/// placements appear immediately and balances reflect every deduction, so a
/// system that re-reads the board after another system acted observes the
/// combined intent of the turn so far.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardSnapshot {
    turn: u32,
    columns: u32,
    rows: u32,
    ally: PlayerStatus,
    enemy: PlayerStatus,
    structures: BTreeMap<CellCoord, StructureSnapshot>,
}

impl BoardSnapshot {
    /// Creates an empty board of the provided dimensions.
    #[must_use]
    pub fn new(turn: u32, columns: u32, rows: u32, ally: PlayerStatus, enemy: PlayerStatus) -> Self {
        Self {
            turn,
            columns,
            rows,
            ally,
            enemy,
            structures: BTreeMap::new(),
        }
    }

    /// Turn number the snapshot describes.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Number of columns spanned by the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows spanned by the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Column at which the board splits into its left and right halves.
    #[must_use]
    pub const fn midpoint_column(&self) -> u32 {
        self.columns / 2
    }

    /// Lane whose half contains the provided cell.
    #[must_use]
    pub const fn lane_of(&self, cell: CellCoord) -> Lane {
        if cell.column() < self.midpoint_column() {
            Lane::Left
        } else {
            Lane::Right
        }
    }

    /// Status of the requested player.
    #[must_use]
    pub const fn player(&self, side: Side) -> &PlayerStatus {
        match side {
            Side::Ally => &self.ally,
            Side::Enemy => &self.enemy,
        }
    }

    /// Balance of one pool held by one player.
    #[must_use]
    pub const fn resource(&self, side: Side, resource: Resource) -> f32 {
        self.player(side).resources.get(resource)
    }

    /// Stationary unit occupying the provided cell, if any.
    #[must_use]
    pub fn structure_at(&self, cell: CellCoord) -> Option<&StructureSnapshot> {
        self.structures.get(&cell)
    }

    /// Reports whether a stationary unit occupies the provided cell.
    #[must_use]
    pub fn contains_stationary(&self, cell: CellCoord) -> bool {
        self.structures.contains_key(&cell)
    }

    /// Iterator over every stationary unit in cell order.
    pub fn structures(&self) -> impl Iterator<Item = &StructureSnapshot> {
        self.structures.values()
    }

    /// Iterator over the stationary units owned by one player in cell order.
    pub fn owned_by(&self, side: Side) -> impl Iterator<Item = &StructureSnapshot> {
        self.structures
            .values()
            .filter(move |structure| structure.owner == side)
    }

    /// Advances the turn counter.
    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    /// Mutable status of the requested player.
    pub fn player_mut(&mut self, side: Side) -> &mut PlayerStatus {
        match side {
            Side::Ally => &mut self.ally,
            Side::Enemy => &mut self.enemy,
        }
    }

    /// Inserts a structure, returning the one it replaced.
    pub fn insert_structure(&mut self, structure: StructureSnapshot) -> Option<StructureSnapshot> {
        self.structures.insert(structure.cell, structure)
    }

    /// Removes the structure at the provided cell.
    pub fn remove_structure(&mut self, cell: CellCoord) -> Option<StructureSnapshot> {
        self.structures.remove(&cell)
    }

    /// Mutable access to the structure at the provided cell.
    pub fn structure_mut(&mut self, cell: CellCoord) -> Option<&mut StructureSnapshot> {
        self.structures.get_mut(&cell)
    }
}

/// Intent to deploy one kind of unit at one cell for the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Kind of unit to deploy.
    pub kind: UnitKind,
    /// Cell the unit is deployed on.
    pub cell: CellCoord,
    /// Requested replica count; [`SPAWN_ALL`] requests every affordable unit.
    #[serde(default = "single_count")]
    pub count: u32,
}

impl Placement {
    /// Creates a placement with an explicit count.
    #[must_use]
    pub const fn new(kind: UnitKind, cell: CellCoord, count: u32) -> Self {
        Self { kind, cell, count }
    }

    /// Creates a placement of exactly one unit.
    #[must_use]
    pub const fn single(kind: UnitKind, cell: CellCoord) -> Self {
        Self::new(kind, cell, 1)
    }

    /// Creates a placement requesting every affordable unit.
    #[must_use]
    pub const fn saturating(kind: UnitKind, cell: CellCoord) -> Self {
        Self::new(kind, cell, SPAWN_ALL)
    }
}

const fn single_count() -> u32 {
    1
}

/// Precondition attached to an upgrade step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeCondition {
    /// Upgrade whenever the structure stands.
    #[default]
    Always,
    /// Upgrade only once the structure has been rebuilt at least once.
    AfterRebuild,
}

/// Single entry of a [`BuildPlan`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum BuildStep {
    /// Ensure a unit stands at the placement's cell.
    Place(Placement),
    /// Upgrade the structure standing at `cell`.
    Upgrade {
        /// Cell of the structure to upgrade.
        cell: CellCoord,
        /// Precondition that must hold before the upgrade is requested.
        #[serde(default)]
        condition: UpgradeCondition,
    },
    /// Stop the plan for this turn when structure-resource is below `minimum`.
    ResourceGate {
        /// Structure-resource required to continue past the gate.
        minimum: f32,
    },
}

/// Ordered list of build steps; earlier steps have higher priority.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildPlan {
    steps: Vec<BuildStep>,
}

impl BuildPlan {
    /// Creates a plan from an explicit step list.
    #[must_use]
    pub fn new(steps: Vec<BuildStep>) -> Self {
        Self { steps }
    }

    /// Appends a single-unit placement.
    #[must_use]
    pub fn place(mut self, kind: UnitKind, cell: CellCoord) -> Self {
        self.steps.push(BuildStep::Place(Placement::single(kind, cell)));
        self
    }

    /// Appends an unconditional upgrade.
    #[must_use]
    pub fn upgrade(self, cell: CellCoord) -> Self {
        self.upgrade_when(cell, UpgradeCondition::Always)
    }

    /// Appends an upgrade guarded by `condition`.
    #[must_use]
    pub fn upgrade_when(mut self, cell: CellCoord, condition: UpgradeCondition) -> Self {
        self.steps.push(BuildStep::Upgrade { cell, condition });
        self
    }

    /// Appends a resource gate.
    #[must_use]
    pub fn gate(mut self, minimum: f32) -> Self {
        self.steps.push(BuildStep::ResourceGate { minimum });
        self
    }

    /// Steps in priority order.
    #[must_use]
    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    /// Number of steps in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Reports whether the plan has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Request recorded in a submitted turn batch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Deploy units.
    Spawn(Placement),
    /// Upgrade the structure at `cell`.
    Upgrade {
        /// Cell of the upgraded structure.
        cell: CellCoord,
    },
    /// Remove the structure at `cell` at the end of the turn.
    Remove {
        /// Cell of the removed structure.
        cell: CellCoord,
    },
}

/// Kinds of records carried by the mid-turn event stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A unit entered the board.
    Spawn,
    /// A mobile unit detonated after running out of path.
    SelfDestruct,
    /// A mobile unit reached the opposing edge.
    Breach,
    /// A unit was destroyed.
    Death,
}

/// Structured record observed while a turn plays out.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    /// Turn the event belongs to.
    pub turn: u32,
    /// Frame within the turn's action phase.
    pub frame: u32,
    /// What happened.
    pub kind: EventKind,
    /// Owner of the unit involved.
    pub owner: Side,
    /// Kind of unit involved.
    pub unit: UnitKind,
    /// Cell at which the event took place.
    pub cell: CellCoord,
}
