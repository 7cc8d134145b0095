//! Match session phases.
//!
//! ```text
//! Created -> DeploymentStarted -> DeploymentComplete -> BattleStarted -> BattleComplete
//!    \______________\___________________\___________________\_______________\-> Lobby
//! ```
//!
//! Every transition is driven by a named event. An event arriving in the
//! wrong phase is ignored, which makes duplicated or reordered delivery
//! harmless. Readiness packets are re-sent on a fixed interval until the
//! phase moves on; the server is assumed to treat duplicates as no-ops.

use std::fmt;

use knights_core::entity::Team;
use tracing::{debug, info};

/// Client-side match phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    /// Joined a room, waiting for deployment to open.
    #[default]
    Created,
    /// Placing units.
    DeploymentStarted,
    /// Local player confirmed deployment, waiting for the battle.
    DeploymentComplete,
    /// Battle running; turns arrive every tick.
    BattleStarted,
    /// Battle over.
    BattleComplete,
    /// Session torn down; nothing is honored any more.
    Lobby,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::DeploymentStarted => "deployment-started",
            Self::DeploymentComplete => "deployment-complete",
            Self::BattleStarted => "battle-started",
            Self::BattleComplete => "battle-complete",
            Self::Lobby => "lobby",
        };
        f.write_str(name)
    }
}

/// Inputs the phase guard understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    /// Server opened deployment.
    DeploymentStarted,
    /// Server reported readiness counts.
    PlayerReadied,
    /// Local player confirmed their deployment.
    LocalReady,
    /// Server started the battle.
    BattleStarted,
    /// Server resolved a tick.
    PostTick,
    /// Server ended the battle.
    BattleCompleted,
    /// Transport dropped or the room closed.
    Disconnect,
}

impl SessionEvent {
    /// Whether the event is honored in `phase`.
    #[must_use]
    pub fn allowed_in(self, phase: SessionPhase) -> bool {
        use SessionPhase as P;
        match self {
            Self::DeploymentStarted => phase == P::Created,
            Self::PlayerReadied => matches!(phase, P::DeploymentStarted | P::DeploymentComplete),
            Self::LocalReady => phase == P::DeploymentStarted,
            Self::BattleStarted => phase == P::DeploymentComplete,
            Self::PostTick => phase == P::BattleStarted,
            Self::BattleCompleted => phase == P::BattleStarted,
            Self::Disconnect => phase != P::Lobby,
        }
    }

    /// Phase reached after the event, if it moves the session.
    #[must_use]
    pub fn next_phase(self) -> Option<SessionPhase> {
        match self {
            Self::DeploymentStarted => Some(SessionPhase::DeploymentStarted),
            Self::LocalReady => Some(SessionPhase::DeploymentComplete),
            Self::BattleStarted => Some(SessionPhase::BattleStarted),
            Self::BattleCompleted => Some(SessionPhase::BattleComplete),
            Self::Disconnect => Some(SessionPhase::Lobby),
            Self::PlayerReadied | Self::PostTick => None,
        }
    }
}

/// Readiness packet due for sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// `deployment-ready`.
    Deployment,
    /// `battle-ready`.
    Battle,
}

/// Fires once when started, then every `interval` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct ResendTimer {
    interval: f64,
    elapsed: f64,
    due: bool,
}

impl ResendTimer {
    /// Create a timer that fires on its first tick.
    #[must_use]
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            elapsed: 0.0,
            due: true,
        }
    }

    /// Advance by `dt` seconds. Returns whether a send is due. At most one
    /// send fires per tick however long the frame was.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.due {
            self.due = false;
            self.elapsed = 0.0;
            return true;
        }
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed %= self.interval;
            return true;
        }
        false
    }

    /// Make the next tick fire.
    pub fn restart(&mut self) {
        self.due = true;
        self.elapsed = 0.0;
    }
}

/// Seconds until the next server tick, for display.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Countdown {
    remaining: f64,
}

impl Countdown {
    /// Start counting down from `interval`.
    pub fn reset(&mut self, interval: f64) {
        self.remaining = interval.max(0.0);
    }

    /// Advance by `dt`, stopping at zero.
    pub fn tick(&mut self, dt: f64) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    /// Seconds left.
    #[must_use]
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Text shown by the timer, two decimals.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{:.2}", self.remaining)
    }
}

/// Phase guard plus readiness heartbeat.
#[derive(Debug, Clone)]
pub struct Session {
    phase: SessionPhase,
    resend: ResendTimer,
    countdown: Countdown,
    players_ready: u32,
    players_max: u32,
    winning_team: Option<Team>,
}

impl Session {
    /// Start a session in [`SessionPhase::Created`], announcing deployment
    /// readiness every `resend_interval` seconds.
    #[must_use]
    pub fn new(resend_interval: f64) -> Self {
        Self {
            phase: SessionPhase::Created,
            resend: ResendTimer::new(resend_interval),
            countdown: Countdown::default(),
            players_ready: 0,
            players_max: 0,
            winning_team: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether the session still acts on events.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.phase != SessionPhase::Lobby
    }

    /// Apply `event` if the phase guard allows it. Returns whether it was
    /// honored.
    pub fn handle(&mut self, event: SessionEvent) -> bool {
        if !event.allowed_in(self.phase) {
            debug!(?event, phase = %self.phase, "Ignoring out-of-phase event");
            return false;
        }

        if let Some(next) = event.next_phase() {
            info!(from = %self.phase, to = %next, "Session phase changed");
            self.phase = next;
            if self.readiness().is_some() {
                self.resend.restart();
            }
        }
        true
    }

    /// Readiness packet this phase keeps announcing.
    #[must_use]
    pub fn readiness(&self) -> Option<Readiness> {
        match self.phase {
            SessionPhase::Created => Some(Readiness::Deployment),
            SessionPhase::DeploymentComplete => Some(Readiness::Battle),
            _ => None,
        }
    }

    /// Advance timers by `dt` seconds. Returns the readiness packet due
    /// this frame, if any.
    pub fn update(&mut self, dt: f64) -> Option<Readiness> {
        self.countdown.tick(dt);
        let readiness = self.readiness()?;
        self.resend.tick(dt).then_some(readiness)
    }

    /// Tick countdown.
    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Restart the tick countdown.
    pub fn reset_countdown(&mut self, interval: f64) {
        self.countdown.reset(interval);
    }

    /// Players ready, as last reported.
    #[must_use]
    pub fn players_ready(&self) -> u32 {
        self.players_ready
    }

    /// Record a readiness count.
    pub fn set_players_ready(&mut self, players_ready: u32) {
        self.players_ready = players_ready;
    }

    /// Room size, as announced when deployment opened.
    #[must_use]
    pub fn players_max(&self) -> u32 {
        self.players_max
    }

    /// Record the room size.
    pub fn set_players_max(&mut self, players_max: u32) {
        self.players_max = players_max;
    }

    /// Winner, once the battle completed.
    #[must_use]
    pub fn winning_team(&self) -> Option<Team> {
        self.winning_team
    }

    /// Record the winner.
    pub fn set_winning_team(&mut self, team: Team) {
        self.winning_team = Some(team);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_walks_every_phase() {
        let mut session = Session::new(1.0);
        for (event, phase) in [
            (SessionEvent::DeploymentStarted, SessionPhase::DeploymentStarted),
            (SessionEvent::LocalReady, SessionPhase::DeploymentComplete),
            (SessionEvent::BattleStarted, SessionPhase::BattleStarted),
            (SessionEvent::BattleCompleted, SessionPhase::BattleComplete),
        ] {
            assert!(session.handle(event));
            assert_eq!(session.phase(), phase);
        }
    }

    #[test]
    fn out_of_phase_events_are_ignored() {
        let mut session = Session::new(1.0);
        assert!(!session.handle(SessionEvent::PostTick));
        assert!(!session.handle(SessionEvent::BattleStarted));
        assert!(session.handle(SessionEvent::DeploymentStarted));
        assert!(!session.handle(SessionEvent::DeploymentStarted));
        assert_eq!(session.phase(), SessionPhase::DeploymentStarted);
    }

    #[test]
    fn disconnect_from_anywhere_lands_in_lobby_for_good() {
        let mut session = Session::new(1.0);
        session.handle(SessionEvent::DeploymentStarted);
        assert!(session.handle(SessionEvent::Disconnect));
        assert_eq!(session.phase(), SessionPhase::Lobby);
        assert!(!session.is_listening());
        assert!(!session.handle(SessionEvent::Disconnect));
        assert!(!session.handle(SessionEvent::DeploymentStarted));
    }

    #[test]
    fn readiness_resends_on_interval_until_phase_moves() {
        let mut session = Session::new(1.0);
        assert_eq!(session.update(0.016), Some(Readiness::Deployment));
        assert_eq!(session.update(0.5), None);
        assert_eq!(session.update(0.5), Some(Readiness::Deployment));

        session.handle(SessionEvent::DeploymentStarted);
        assert_eq!(session.update(5.0), None);

        session.handle(SessionEvent::LocalReady);
        assert_eq!(session.update(0.016), Some(Readiness::Battle));
        assert_eq!(session.update(0.9), None);
        assert_eq!(session.update(0.2), Some(Readiness::Battle));

        session.handle(SessionEvent::BattleStarted);
        assert_eq!(session.update(2.0), None);
    }

    #[test]
    fn countdown_clamps_at_zero() {
        let mut session = Session::new(1.0);
        session.reset_countdown(2.0);
        session.update(0.5);
        assert_eq!(session.countdown().label(), "1.50");
        session.update(3.0);
        assert_eq!(session.countdown().remaining(), 0.0);
    }

    #[test]
    fn resend_timer_fires_once_per_long_frame() {
        let mut timer = ResendTimer::new(1.0);
        assert!(timer.tick(0.0));
        assert!(timer.tick(3.5));
        assert!(!timer.tick(0.4));
        assert!(timer.tick(0.2));
    }
}
