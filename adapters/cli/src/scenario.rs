//! JSON scenario files and the line format submitted turns are printed in.

use anyhow::{anyhow, Context, Result};
use lanebreaker_core::{
    Action, CellCoord, MatchEvent, PlayerStatus, ResourcePools, Side, UnitCatalog,
};
use lanebreaker_world::{Submission, World};
use serde::{Deserialize, Serialize};

/// Starting state of a match the strategy is played against.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct Scenario {
    /// Friendly health and balances; starting values when absent.
    pub(crate) ally: Option<PlayerState>,
    /// Opponent health and balances; starting values when absent.
    pub(crate) enemy: Option<PlayerState>,
    /// Balances both players gain per submitted turn.
    pub(crate) income: Option<ResourcePools>,
    /// Structures present before the first turn.
    pub(crate) structures: Vec<ScenarioStructure>,
    /// Mid-turn events fed to the strategy before the turn they belong to.
    pub(crate) events: Vec<MatchEvent>,
}

/// Health and balances of one player.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub(crate) struct PlayerState {
    pub(crate) health: f32,
    pub(crate) structure: f32,
    pub(crate) mobile: f32,
}

/// A structure seeded onto the board, keyed by unit shorthand.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct ScenarioStructure {
    pub(crate) owner: Side,
    pub(crate) unit: String,
    pub(crate) x: u32,
    pub(crate) y: u32,
    #[serde(default)]
    pub(crate) upgraded: bool,
}

impl Scenario {
    /// Parses a scenario from its JSON text.
    pub(crate) fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("scenario is not valid JSON")
    }

    /// Builds the engine the strategy plays against.
    pub(crate) fn build_world(&self, catalog: &UnitCatalog) -> Result<World> {
        let mut world = World::new(catalog.clone());
        for (side, state) in [(Side::Ally, self.ally), (Side::Enemy, self.enemy)] {
            if let Some(state) = state {
                let status = PlayerStatus::from(state);
                world.set_health(side, status.health);
                world.set_resources(side, status.resources);
            }
        }
        if let Some(income) = self.income {
            world.set_income(income);
        }

        for structure in &self.structures {
            let kind = catalog
                .kind_for_shorthand(&structure.unit)
                .ok_or_else(|| anyhow!("unknown unit shorthand {:?}", structure.unit))?;
            let cell = CellCoord::new(structure.x, structure.y);
            world
                .seed_structure(structure.owner, kind, cell, structure.upgraded)
                .map_err(|error| {
                    anyhow!("cannot seed {} at {cell:?}: {error:?}", structure.unit)
                })?;
        }
        Ok(world)
    }

    /// Events recorded for `turn`, in file order.
    pub(crate) fn events_for(&self, turn: u32) -> Vec<MatchEvent> {
        self.events
            .iter()
            .filter(|event| event.turn == turn)
            .copied()
            .collect()
    }
}

impl From<PlayerState> for PlayerStatus {
    fn from(state: PlayerState) -> Self {
        Self::new(state.health, ResourcePools::new(state.structure, state.mobile))
    }
}

/// One submitted turn as printed on stdout.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct TurnLine<'a> {
    pub(crate) turn: u32,
    pub(crate) actions: Vec<ActionLine<'a>>,
}

/// One request of a submitted turn, with the unit given by shorthand.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub(crate) enum ActionLine<'a> {
    Spawn {
        unit: &'a str,
        x: u32,
        y: u32,
        count: u32,
    },
    Upgrade {
        x: u32,
        y: u32,
    },
    Remove {
        x: u32,
        y: u32,
    },
}

impl<'a> TurnLine<'a> {
    pub(crate) fn new(submission: &Submission, catalog: &'a UnitCatalog) -> Self {
        let actions = submission
            .actions
            .iter()
            .map(|action| match *action {
                Action::Spawn(placement) => ActionLine::Spawn {
                    unit: catalog.shorthand(placement.kind),
                    x: placement.cell.column(),
                    y: placement.cell.row(),
                    count: placement.count,
                },
                Action::Upgrade { cell } => ActionLine::Upgrade {
                    x: cell.column(),
                    y: cell.row(),
                },
                Action::Remove { cell } => ActionLine::Remove {
                    x: cell.column(),
                    y: cell.row(),
                },
            })
            .collect();
        Self {
            turn: submission.turn,
            actions,
        }
    }
}
