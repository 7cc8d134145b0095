//! JSON-lines protocol for driving the client without a renderer.
//!
//! **Input:** one [`Command`] per line, either on stdin or in a transcript
//! file. Server events are wrapped verbatim in an `event` command.
//!
//! **Output (stdout):** one [`Response`] per line: every packet the client
//! sends, acknowledgments and state dumps.
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0"}
//! -> {"cmd":"advance","dt":0.016}
//! <- {"type":"outbound","message":{"event":"deployment-ready"}}
//! -> {"cmd":"event","message":{"event":"deployment-started","payload":{"deployment_max":1,"deployment_tiles":[{"x":0,"y":1}],"players_max":2}}}
//! <- {"type":"ack","cmd":"event","accepted":true}
//! -> {"cmd":"arm","class_key":"sword_unit"}
//! <- {"type":"ack","cmd":"arm","accepted":true}
//! -> {"cmd":"place","x":0,"y":1}
//! <- {"type":"ack","cmd":"place","accepted":true}
//! -> {"cmd":"query"}
//! <- {"type":"state","phase":"deployment-started",...}
//! ```

use knights_client::{InboundMessage, OutboundMessage};
use knights_core::entity::{Entity, EntityId, Team};
use serde::{Deserialize, Serialize};

/// Protocol version announced on start.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (driver -> client)
// ============================================================================

/// Commands accepted by the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Deliver a server event.
    Event {
        /// The event, in wire form.
        message: InboundMessage,
    },

    /// Pointer pressed at a screen point.
    PointerDown { x: f64, y: f64 },

    /// Pointer moved to a screen point.
    PointerMove { x: f64, y: f64 },

    /// Pointer released at a screen point.
    PointerUp { x: f64, y: f64 },

    /// Drag an entity's sprite by `(dx, dy)` pixels.
    Drag { entity_id: EntityId, dx: f64, dy: f64 },

    /// Arm a unit class for placement.
    Arm { class_key: String },

    /// Hover then release over a grid cell while deploying.
    Place { x: f64, y: f64 },

    /// Confirm deployment.
    Ready,

    /// Tap a UI control. No class means the ready button.
    Tap {
        #[serde(default)]
        class_key: Option<String>,
        #[serde(default)]
        drift: f64,
        #[serde(default)]
        elapsed_ms: f64,
    },

    /// Advance `frames` frames of `dt` seconds each.
    Advance {
        dt: f64,
        #[serde(default = "default_frames")]
        frames: u32,
    },

    /// Dump the client state.
    Query,

    /// Leave the match.
    Teardown,

    /// Stop reading commands.
    Quit,
}

fn default_frames() -> u32 {
    1
}

// ============================================================================
// Output Responses (client -> driver)
// ============================================================================

/// Lines written by the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready for commands.
    Ready { version: String },

    /// A packet the client sent to the server.
    Outbound { message: OutboundMessage },

    /// Whether a command was honored.
    Ack { cmd: String, accepted: bool },

    /// A command could not be read or applied.
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        cmd: Option<String>,
    },

    /// Client state.
    State(ClientState),

    /// Goodbye before shutdown.
    Bye { summary: RunSummary },
}

/// Snapshot of what the client currently holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientState {
    /// Session phase, kebab-case.
    pub phase: String,
    /// Last replayed tick.
    pub tick: u64,
    /// Seconds until the next tick, as displayed.
    pub countdown: String,
    /// Every entity on the stage.
    pub entities: Vec<EntityState>,
    /// Deployment progress while deploying.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<DeploymentState>,
    /// Winner once the battle is over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_team: Option<Team>,
}

/// State of a single entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub id: EntityId,
    pub class_key: String,
    pub team: Team,
    pub x: f64,
    pub y: f64,
    pub facing_x: f64,
    pub facing_y: f64,
    pub alive: bool,
}

impl From<&Entity> for EntityState {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            class_key: entity.class_key().to_string(),
            team: entity.team(),
            x: entity.spatial.position.x,
            y: entity.spatial.position.y,
            facing_x: entity.spatial.facing.x,
            facing_y: entity.spatial.facing.y,
            alive: entity.is_alive(),
        }
    }
}

/// Deployment progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentState {
    pub count: usize,
    pub max: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armed: Option<String>,
}

/// Totals reported when a run ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Commands executed.
    pub commands: usize,
    /// Commands that could not be parsed.
    pub rejected_lines: usize,
    /// Packets the client sent.
    pub packets_sent: usize,
    /// Turns replayed.
    pub turns_replayed: usize,
    /// Phase at the end of the run.
    pub final_phase: String,
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready() -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str, accepted: bool) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
            accepted,
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to a JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Command name for acknowledgments.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Event { .. } => "event",
            Self::PointerDown { .. } => "pointer_down",
            Self::PointerMove { .. } => "pointer_move",
            Self::PointerUp { .. } => "pointer_up",
            Self::Drag { .. } => "drag",
            Self::Arm { .. } => "arm",
            Self::Place { .. } => "place",
            Self::Ready => "ready",
            Self::Tap { .. } => "tap",
            Self::Advance { .. } => "advance",
            Self::Query => "query",
            Self::Teardown => "teardown",
            Self::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wrapped_server_event() {
        let json = r#"{"cmd":"event","message":{"event":"battle-completed","payload":{"winning_team":1}}}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(
            cmd,
            Command::Event {
                message: InboundMessage::BattleCompleted { winning_team: 1 }
            }
        );
    }

    #[test]
    fn advance_defaults_to_one_frame() {
        let cmd = Command::from_json(r#"{"cmd":"advance","dt":0.5}"#).unwrap();
        assert!(matches!(cmd, Command::Advance { frames: 1, .. }));
    }

    #[test]
    fn tap_without_class_is_the_ready_button() {
        let cmd = Command::from_json(r#"{"cmd":"tap"}"#).unwrap();
        assert!(matches!(
            cmd,
            Command::Tap {
                class_key: None,
                ..
            }
        ));
    }

    #[test]
    fn outbound_lines_nest_the_wire_packet() {
        let line = Response::Outbound {
            message: OutboundMessage::DeploymentReady,
        }
        .to_json_line();
        assert_eq!(
            line,
            "{\"type\":\"outbound\",\"message\":{\"event\":\"deployment-ready\"}}\n"
        );
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Command::from_json(r#"{"cmd":"spawn"}"#).is_err());
    }
}
