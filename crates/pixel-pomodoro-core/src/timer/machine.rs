//! Session state machine.
//!
//! The machine is tick-driven and owns no thread: the caller (normally a
//! [`TimerDriver`](crate::driver::TimerDriver)) calls `on_tick()` once per
//! second while the session is running. Every command returns the events it
//! produced, in the order the display layer should apply them.
//!
//! ## State Transitions
//!
//! ```text
//! Work --(expires)--> ShortBreak | LongBreak (every Nth work session)
//! ShortBreak | LongBreak --(expires)--> Work
//! ```
//!
//! Each expiry stops the countdown; the next phase waits for `start()` unless
//! the config asks for auto-resume.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Phase, SessionConfig};
use crate::events::Event;

/// The mutable part of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    pub remaining_secs: u64,
    pub completed_work_sessions: u64,
    pub running: bool,
}

impl SessionState {
    fn initial(config: &SessionConfig) -> Self {
        Self {
            phase: Phase::Work,
            remaining_secs: config.work_secs(),
            completed_work_sessions: 0,
            running: false,
        }
    }
}

/// Everything a presenter needs to draw the session in one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub label: String,
    pub remaining_secs: u64,
    pub display: String,
    pub completed_work_sessions: u64,
    pub running: bool,
    /// 0.0 .. 1.0 progress within the current phase.
    pub progress: f64,
}

#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    config: SessionConfig,
    state: SessionState,
}

impl SessionStateMachine {
    /// Starts in `Work` with the full work duration, not running.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            state: SessionState::initial(&config),
            config,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn display(&self) -> String {
        format_clock(self.state.remaining_secs)
    }

    pub fn progress(&self) -> f64 {
        let total = self.config.duration_of(self.state.phase);
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.state.remaining_secs as f64 / total as f64)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.state.phase,
            label: self.state.phase.label().to_string(),
            remaining_secs: self.state.remaining_secs,
            display: self.display(),
            completed_work_sessions: self.state.completed_work_sessions,
            running: self.state.running,
            progress: self.progress(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm the countdown. Returns no events if it is already running.
    pub fn start(&mut self) -> Vec<Event> {
        if self.state.running {
            debug!("start ignored: session already running");
            return Vec::new();
        }
        self.state.running = true;
        debug!(
            phase = ?self.state.phase,
            remaining_secs = self.state.remaining_secs,
            "session started"
        );
        let at = Utc::now();
        vec![
            Event::NotificationSilenced { at },
            Event::Started {
                phase: self.state.phase,
                remaining_secs: self.state.remaining_secs,
                at,
            },
        ]
    }

    /// Back to `Work`, full duration, zero sessions, stopped.
    pub fn reset(&mut self) -> Vec<Event> {
        self.state = SessionState::initial(&self.config);
        debug!("session reset");
        let at = Utc::now();
        vec![
            Event::NotificationSilenced { at },
            Event::Reset { at },
            Event::PhaseChanged {
                phase: self.state.phase,
                label: self.state.phase.label().to_string(),
                at,
            },
            Event::SessionCountChanged {
                count: self.state.completed_work_sessions,
                at,
            },
            Event::DisplayUpdated {
                remaining_secs: self.state.remaining_secs,
                display: self.display(),
                at,
            },
        ]
    }

    /// Halt the countdown where it is. The host has stopped ticking.
    pub(crate) fn stop(&mut self) {
        if self.state.running {
            debug!(remaining_secs = self.state.remaining_secs, "session stopped");
        }
        self.state.running = false;
    }

    /// Advance the countdown by one second. Ignored while stopped.
    pub fn on_tick(&mut self) -> Vec<Event> {
        if !self.state.running || self.state.remaining_secs == 0 {
            return Vec::new();
        }
        let at = Utc::now();
        self.state.remaining_secs -= 1;
        let mut events = vec![Event::DisplayUpdated {
            remaining_secs: self.state.remaining_secs,
            display: self.display(),
            at,
        }];
        if self.state.remaining_secs == 0 {
            self.state.running = false;
            self.advance_phase(&mut events);
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance_phase(&mut self, events: &mut Vec<Event>) {
        let at = Utc::now();
        let from = self.state.phase;
        if from == Phase::Work {
            self.state.completed_work_sessions += 1;
        }
        let next = self
            .config
            .next_phase(from, self.state.completed_work_sessions);
        self.state.phase = next;
        self.state.remaining_secs = self.config.duration_of(next);

        info!(
            from = ?from,
            to = ?next,
            completed_work_sessions = self.state.completed_work_sessions,
            "phase boundary"
        );

        events.push(Event::PhaseChanged {
            phase: next,
            label: next.label().to_string(),
            at,
        });
        events.push(Event::SessionCountChanged {
            count: self.state.completed_work_sessions,
            at,
        });
        events.push(Event::DisplayUpdated {
            remaining_secs: self.state.remaining_secs,
            display: self.display(),
            at,
        });
        events.push(Event::PhaseBoundary { from, to: next, at });

        if self.config.auto_resume() {
            self.state.running = true;
            events.push(Event::Started {
                phase: next,
                remaining_secs: self.state.remaining_secs,
                at,
            });
        }
    }
}

/// `mm:ss`, both parts zero-padded to two digits. Minutes are not capped.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
