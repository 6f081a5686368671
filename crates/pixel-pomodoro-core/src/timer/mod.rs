mod machine;
mod phase;
mod schedule;

pub use machine::{format_clock, SessionSnapshot, SessionState, SessionStateMachine};
pub use phase::Phase;
pub use schedule::{
    CycleStep, SessionConfig, DEFAULT_LONG_BREAK_EVERY, DEFAULT_LONG_BREAK_SECS,
    DEFAULT_SHORT_BREAK_SECS, DEFAULT_WORK_SECS,
};
