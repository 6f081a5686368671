use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every state change in the session produces one or more Events.
/// The display layer drains them from a channel; nothing in the core touches
/// the display directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Countdown armed (or re-armed after a boundary).
    Started {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Session returned to its initial state.
    Reset {
        at: DateTime<Utc>,
    },
    /// New `mm:ss` text for the countdown.
    DisplayUpdated {
        remaining_secs: u64,
        display: String,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        phase: Phase,
        label: String,
        at: DateTime<Utc>,
    },
    SessionCountChanged {
        count: u64,
        at: DateTime<Utc>,
    },
    /// A phase ran out; the host should play its alert.
    PhaseBoundary {
        from: Phase,
        to: Phase,
        at: DateTime<Utc>,
    },
    /// The host should stop any alert still playing.
    NotificationSilenced {
        at: DateTime<Utc>,
    },
    /// The tick callback failed.
    DriverFault {
        message: String,
        at: DateTime<Utc>,
    },
}
