//! Headless runner implementation.

use std::io::{BufRead, Write};

use knights_client::client::UiAction;
use knights_client::render::Renderer;
use knights_client::{ClientConfig, CombatClient, LogRenderer};
use knights_core::entity::EntityId;
use knights_core::vector::Vector;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::protocol::{ClientState, Command, DeploymentState, EntityState, Response, RunSummary};

/// Errors that stop a run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Reading commands or writing responses failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A command line was malformed and the runner is strict.
    #[error("Malformed command on line {line}: {source}")]
    Parse {
        /// 1-based input line.
        line: usize,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Runner behaviour.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Dump state after every command.
    pub auto_state: bool,
    /// Abort on the first malformed line instead of reporting it.
    pub strict: bool,
}

/// Drives a [`CombatClient`] from JSON-lines commands.
#[derive(Debug)]
pub struct HeadlessRunner<R: Renderer = LogRenderer> {
    client: CombatClient<R>,
    config: HeadlessConfig,
    summary: RunSummary,
}

impl HeadlessRunner<LogRenderer> {
    /// Create a runner logging render calls through `tracing`.
    pub fn new(client_config: ClientConfig, config: HeadlessConfig) -> Self {
        Self::with_renderer(client_config, LogRenderer::new(), config)
    }
}

impl<R: Renderer> HeadlessRunner<R> {
    /// Create a runner over any renderer.
    pub fn with_renderer(client_config: ClientConfig, renderer: R, config: HeadlessConfig) -> Self {
        Self {
            client: CombatClient::new(client_config, renderer),
            config,
            summary: RunSummary::default(),
        }
    }

    /// The driven client.
    pub fn client(&self) -> &CombatClient<R> {
        &self.client
    }

    /// Totals so far.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Read commands until `quit` or end of input, writing every response
    /// to `output`.
    pub fn run<I: BufRead, W: Write>(&mut self, input: I, mut output: W) -> Result<RunSummary, RunnerError> {
        output.write_all(Response::ready().to_json_line().as_bytes())?;

        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            let command = match Command::from_json(line) {
                Ok(command) => command,
                Err(e) if self.config.strict => {
                    return Err(RunnerError::Parse {
                        line: index + 1,
                        source: e,
                    });
                }
                Err(e) => {
                    warn!(line = index + 1, error = %e, "Skipping malformed command");
                    self.summary.rejected_lines += 1;
                    let error = Response::error(format!("Parse error: {e}"), None);
                    output.write_all(error.to_json_line().as_bytes())?;
                    continue;
                }
            };

            let quit = matches!(command, Command::Quit);
            for response in self.execute(command) {
                output.write_all(response.to_json_line().as_bytes())?;
            }
            if quit {
                break;
            }
        }

        let summary = self.finish();
        output.write_all(Response::Bye { summary: summary.clone() }.to_json_line().as_bytes())?;
        output.flush()?;
        info!(
            commands = summary.commands,
            packets = summary.packets_sent,
            turns = summary.turns_replayed,
            phase = %summary.final_phase,
            "Run finished"
        );
        Ok(summary)
    }

    /// Apply one command and return the lines it produced.
    pub fn execute(&mut self, command: Command) -> Vec<Response> {
        self.summary.commands += 1;
        let name = command.name();
        debug!(cmd = name, "Executing command");

        let mut responses = Vec::new();
        let accepted = match command {
            Command::Event { message } => {
                let is_turn = matches!(message, knights_client::InboundMessage::PostTick { .. });
                let accepted = self.client.handle_event(message);
                if accepted && is_turn {
                    self.summary.turns_replayed += 1;
                }
                Some(accepted)
            }
            Command::PointerDown { x, y } => Some(self.client.pointer_down(Vector::new(x, y))),
            Command::PointerMove { x, y } => Some(self.client.pointer_move(Vector::new(x, y)).is_some()),
            Command::PointerUp { x, y } => Some(self.client.pointer_up(Vector::new(x, y))),
            Command::Drag { entity_id, dx, dy } => Some(self.drag(entity_id, dx, dy)),
            Command::Arm { class_key } => Some(self.client.arm_class(&class_key)),
            Command::Place { x, y } => Some(self.place(Vector::new(x, y))),
            Command::Ready => Some(self.client.confirm_ready()),
            Command::Tap {
                class_key,
                drift,
                elapsed_ms,
            } => {
                let action = class_key.map_or(UiAction::Ready, UiAction::Arm);
                let down = Vector::ZERO;
                Some(self.client.ui_tap(&action, down, down.offset(drift, drift), elapsed_ms))
            }
            Command::Advance { dt, frames } => {
                for _ in 0..frames {
                    self.client.update(dt);
                }
                None
            }
            Command::Query => {
                responses.push(Response::State(self.state()));
                None
            }
            Command::Teardown => {
                self.client.teardown();
                Some(true)
            }
            Command::Quit => None,
        };

        if let Some(accepted) = accepted {
            responses.push(Response::ack(name, accepted));
        }
        for message in self.client.drain_outbound() {
            self.summary.packets_sent += 1;
            responses.push(Response::Outbound { message });
        }
        if self.config.auto_state && name != "query" {
            responses.push(Response::State(self.state()));
        }
        responses
    }

    /// Press on an entity's sprite and release `(dx, dy)` away.
    fn drag(&mut self, entity_id: EntityId, dx: f64, dy: f64) -> bool {
        let Some(down) = self
            .client
            .view()
            .and_then(|view| view.presentation().handle(entity_id))
            .map(|handle| handle.position().offset(0.0, -1.0))
        else {
            return false;
        };
        self.client.pointer_down(down) && self.client.pointer_up(down.offset(dx, dy))
    }

    /// Hover over `cell`'s tile and release there.
    fn place(&mut self, cell: Vector) -> bool {
        let Some(world) = self
            .client
            .view()
            .map(|view| view.transform().local_to_world(cell))
        else {
            return false;
        };
        self.client.pointer_move(world).is_some() && self.client.pointer_up(world)
    }

    /// Current client state.
    pub fn state(&self) -> ClientState {
        let session = self.client.session();
        ClientState {
            phase: self.client.phase().to_string(),
            tick: self
                .client
                .stage()
                .and_then(|stage| stage.battle())
                .map_or(0, |battle| battle.tick()),
            countdown: session.countdown().label(),
            entities: self
                .client
                .stage()
                .map(|stage| stage.entities().iter().map(EntityState::from).collect())
                .unwrap_or_default(),
            deployment: self.client.deployment().map(|d| DeploymentState {
                count: d.count(),
                max: d.max(),
                armed: d.armed().map(String::from),
            }),
            winning_team: session.winning_team(),
        }
    }

    fn finish(&mut self) -> RunSummary {
        self.summary.final_phase = self.client.phase().to_string();
        self.summary.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_lines(lines: &[&str], config: HeadlessConfig) -> (Result<RunSummary, RunnerError>, String) {
        let input = lines.join("\n");
        let mut output = Vec::new();
        let mut runner = HeadlessRunner::new(ClientConfig::default(), config);
        let result = runner.run(input.as_bytes(), &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn first_frame_announces_deployment_readiness() {
        let (result, output) = run_lines(&[r#"{"cmd":"advance","dt":0.016}"#], HeadlessConfig::default());
        let summary = result.unwrap();

        assert_eq!(summary.packets_sent, 1);
        assert!(output.starts_with("{\"type\":\"ready\""));
        assert!(output.contains("\"event\":\"deployment-ready\""));
        assert!(output.contains("\"type\":\"bye\""));
    }

    #[test]
    fn malformed_lines_are_reported_and_skipped() {
        let (result, output) = run_lines(&["not json", r#"{"cmd":"query"}"#], HeadlessConfig::default());
        let summary = result.unwrap();

        assert_eq!(summary.rejected_lines, 1);
        assert_eq!(summary.commands, 1);
        assert!(output.contains("\"type\":\"error\""));
        assert!(output.contains("\"phase\":\"created\""));
    }

    #[test]
    fn strict_mode_stops_on_malformed_lines() {
        let config = HeadlessConfig {
            strict: true,
            ..HeadlessConfig::default()
        };
        let (result, _) = run_lines(&[r#"{"cmd":"query"}"#, "{"], config);
        assert!(matches!(result, Err(RunnerError::Parse { line: 2, .. })));
    }

    #[test]
    fn quit_stops_reading() {
        let (result, _) = run_lines(
            &[r#"{"cmd":"quit"}"#, r#"{"cmd":"advance","dt":1.0}"#],
            HeadlessConfig::default(),
        );
        let summary = result.unwrap();
        assert_eq!(summary.commands, 1);
        assert_eq!(summary.packets_sent, 0);
    }

    #[test]
    fn out_of_phase_commands_are_acked_as_refused() {
        let mut runner = HeadlessRunner::new(ClientConfig::default(), HeadlessConfig::default());
        let responses = runner.execute(Command::Ready);
        assert_eq!(responses, vec![Response::ack("ready", false)]);
    }
}
