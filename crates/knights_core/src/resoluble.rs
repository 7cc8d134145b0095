//! Server-confirmed actions.
//!
//! A [`Resoluble`] is one unit of work the server resolved during a tick.
//! A [`Turn`] is the ordered batch of resolubles for one tick, in the order
//! the server emitted them. That order is not grouped by kind; replay
//! filters by [`ResolubleKind`] and applies [`ResolubleKind::PHASE_ORDER`].
//!
//! # Wire format
//!
//! ```json
//! {"type": "Face", "source": 3, "facing": {"x": 1, "y": -1}}
//! {"type": "Move", "source": 3}
//! {"type": "Attack", "source": 3, "targeted_positions": [{"x": 4, "y": 2}]}
//! {"type": "Death", "source": 3, "target": 5}
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::EntityId;
use crate::vector::Vector;

/// Kind tag of a resoluble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResolubleKind {
    /// Facing change.
    Face,
    /// One-cell move along the current facing.
    Move,
    /// Attack on a set of cells.
    Attack,
    /// A unit died.
    Death,
}

impl ResolubleKind {
    /// Order in which replay applies the kinds within one turn.
    pub const PHASE_ORDER: [Self; 4] = [Self::Face, Self::Move, Self::Attack, Self::Death];

    /// Wire name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Face => "Face",
            Self::Move => "Move",
            Self::Attack => "Attack",
            Self::Death => "Death",
        }
    }
}

impl fmt::Display for ResolubleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown resoluble kind name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resoluble type '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for ResolubleKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Face" => Ok(Self::Face),
            "Move" => Ok(Self::Move),
            "Attack" => Ok(Self::Attack),
            "Death" => Ok(Self::Death),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// One server-confirmed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Resoluble {
    /// The source now faces `facing`.
    Face {
        /// Acting entity.
        source: EntityId,
        /// New facing.
        facing: Vector,
    },
    /// The source moves one cell along its facing at replay time.
    Move {
        /// Acting entity.
        source: EntityId,
    },
    /// The source attacked the listed cells.
    Attack {
        /// Acting entity.
        source: EntityId,
        /// Cells hit, decided by the server.
        #[serde(default)]
        targeted_positions: Vec<Vector>,
    },
    /// `target` died.
    Death {
        /// Entity credited with the kill.
        source: EntityId,
        /// Entity that died.
        target: EntityId,
    },
}

impl Resoluble {
    /// Kind tag.
    #[must_use]
    pub const fn kind(&self) -> ResolubleKind {
        match self {
            Self::Face { .. } => ResolubleKind::Face,
            Self::Move { .. } => ResolubleKind::Move,
            Self::Attack { .. } => ResolubleKind::Attack,
            Self::Death { .. } => ResolubleKind::Death,
        }
    }

    /// Acting entity.
    #[must_use]
    pub const fn source(&self) -> EntityId {
        match self {
            Self::Face { source, .. }
            | Self::Move { source }
            | Self::Attack { source, .. }
            | Self::Death { source, .. } => *source,
        }
    }

    /// Entity whose state this resoluble changes on replay.
    #[must_use]
    pub const fn subject(&self) -> EntityId {
        match self {
            Self::Death { target, .. } => *target,
            other => other.source(),
        }
    }
}

/// The resolubles the server resolved in one tick, in emission order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Turn {
    /// Simulation tick this turn resolved.
    #[serde(default)]
    pub tick: u64,
    /// Resolubles in server emission order.
    pub resolubles: Vec<Resoluble>,
}

impl Turn {
    /// Create a turn.
    #[must_use]
    pub fn new(tick: u64, resolubles: Vec<Resoluble>) -> Self {
        Self { tick, resolubles }
    }

    /// Resolubles of one kind, keeping their relative order.
    pub fn of_kind(&self, kind: ResolubleKind) -> impl Iterator<Item = &Resoluble> + '_ {
        self.resolubles.iter().filter(move |r| r.kind() == kind)
    }

    /// Number of resolubles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolubles.len()
    }

    /// Whether the turn carries no resolubles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolubles.is_empty()
    }
}
