//! Wire messages.
//!
//! Every message is a JSON object naming its event and carrying a payload:
//!
//! ```json
//! {"event": "resoluble", "payload": {"resoluble": {"type": "Move", "source": 3}}}
//! {"event": "deployment-ready"}
//! {"event": "post-tick", "payload": {"turn": {"tick": 4, "resolubles": []}, "interval": 2.0}}
//! ```
//!
//! Stage snapshots travel inside `deployment-started` and `battle-started`
//! either as a nested object or as a JSON string.

use knights_core::entity::{EntityId, Team};
use knights_core::error::CoreError;
use knights_core::resoluble::{Resoluble, Turn};
use knights_core::stage::Stage;
use knights_core::vector::Vector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::SessionEvent;

/// Errors raised while encoding or decoding wire messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Malformed JSON or a message of unknown shape.
    #[error("Invalid message: {0}")]
    Json(#[from] serde_json::Error),

    /// A resoluble type the client cannot originate.
    #[error("Unknown resoluble type: {0}")]
    UnknownResoluble(String),

    /// A `Face` resoluble was requested without a facing.
    #[error("Resoluble '{0}' requires a facing")]
    MissingFacing(String),

    /// An embedded stage snapshot was rejected.
    #[error("Invalid stage: {0}")]
    Stage(#[from] CoreError),
}

/// Messages the client sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum OutboundMessage {
    /// A locally originated intent.
    Resoluble {
        /// The intent.
        resoluble: Resoluble,
    },
    /// Ready for deployment to open.
    DeploymentReady,
    /// Deployment confirmed, with every placed unit.
    BattleReady {
        /// `(class_key, position)` per placed unit.
        entities: Vec<(String, Vector)>,
    },
}

impl OutboundMessage {
    /// Event name on the wire.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resoluble { .. } => "resoluble",
            Self::DeploymentReady => "deployment-ready",
            Self::BattleReady { .. } => "battle-ready",
        }
    }
}

/// A turn as sent by the server: a full turn object or a bare list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnPayload {
    /// `{"tick": .., "resolubles": [..]}`.
    Turn(Turn),
    /// `[..]`.
    Resolubles(Vec<Resoluble>),
}

impl From<TurnPayload> for Turn {
    fn from(payload: TurnPayload) -> Self {
        match payload {
            TurnPayload::Turn(turn) => turn,
            TurnPayload::Resolubles(resolubles) => Turn::new(0, resolubles),
        }
    }
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum InboundMessage {
    /// Deployment opened.
    DeploymentStarted {
        /// Units each player may place.
        deployment_max: usize,
        /// Legal tiles for this player.
        deployment_tiles: Vec<Vector>,
        /// Room size.
        players_max: u32,
        /// Deployment stage, when the server provides one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stage: Option<serde_json::Value>,
    },
    /// Readiness count changed.
    PlayerReadied {
        /// Players ready so far.
        players_ready: u32,
    },
    /// Battle started.
    BattleStarted {
        /// Battle stage snapshot.
        stage: serde_json::Value,
        /// Seconds until the first tick.
        #[serde(default)]
        interval: f64,
    },
    /// A tick resolved.
    PostTick {
        /// Resolved turn.
        turn: TurnPayload,
        /// Seconds until the next tick.
        #[serde(default)]
        interval: f64,
    },
    /// Battle over.
    BattleCompleted {
        /// Winner.
        winning_team: Team,
    },
    /// Transport dropped.
    Disconnect,
    /// Room closed by the server.
    RoomClosed,
}

impl InboundMessage {
    /// Event name on the wire.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::DeploymentStarted { .. } => "deployment-started",
            Self::PlayerReadied { .. } => "player-readied",
            Self::BattleStarted { .. } => "battle-started",
            Self::PostTick { .. } => "post-tick",
            Self::BattleCompleted { .. } => "battle-completed",
            Self::Disconnect => "disconnect",
            Self::RoomClosed => "room-closed",
        }
    }

    /// Phase-guard event this message maps to.
    #[must_use]
    pub fn session_event(&self) -> SessionEvent {
        match self {
            Self::DeploymentStarted { .. } => SessionEvent::DeploymentStarted,
            Self::PlayerReadied { .. } => SessionEvent::PlayerReadied,
            Self::BattleStarted { .. } => SessionEvent::BattleStarted,
            Self::PostTick { .. } => SessionEvent::PostTick,
            Self::BattleCompleted { .. } => SessionEvent::BattleCompleted,
            Self::Disconnect | Self::RoomClosed => SessionEvent::Disconnect,
        }
    }
}

/// Build an outbound resoluble from its type name.
///
/// # Errors
///
/// Returns [`ProtocolError::UnknownResoluble`] for anything but `Face` and
/// `Move`, and [`ProtocolError::MissingFacing`] for a `Face` without one.
pub fn serialize_resoluble(type_name: &str, source: EntityId, facing: Option<Vector>) -> Result<Resoluble, ProtocolError> {
    match type_name {
        "Face" => {
            let facing = facing.ok_or_else(|| ProtocolError::MissingFacing(type_name.to_string()))?;
            Ok(Resoluble::Face { source, facing })
        }
        "Move" => Ok(Resoluble::Move { source }),
        other => Err(ProtocolError::UnknownResoluble(other.to_string())),
    }
}

/// Encode an outbound message as one JSON line.
///
/// # Errors
///
/// Returns [`ProtocolError::Json`] if encoding fails.
pub fn encode(message: &OutboundMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}

/// Decode an inbound message.
///
/// # Errors
///
/// Returns [`ProtocolError::Json`] on malformed or unknown messages.
pub fn decode_inbound(line: &str) -> Result<InboundMessage, ProtocolError> {
    Ok(serde_json::from_str(line)?)
}

/// Build a stage from an embedded snapshot, object or string.
///
/// # Errors
///
/// Returns [`ProtocolError::Stage`] if the snapshot is rejected.
pub fn decode_stage(value: serde_json::Value) -> Result<Stage, ProtocolError> {
    let stage = match value {
        serde_json::Value::String(json) => Stage::from_json(&json)?,
        other => Stage::from_value(other)?,
    };
    Ok(stage)
}
