//! # Pixel Pomodoro Core Library
//!
//! This library provides the core logic for the Pixel Pomodoro timer: a
//! work / short break / long break countdown that cycles indefinitely and
//! tells a display layer what to draw. Front ends (the terminal CLI in this
//! workspace, or any GUI) stay thin and only render events.
//!
//! ## Architecture
//!
//! - **Session state machine**: pure, tick-driven; every command returns the
//!   events it produced
//! - **Tick driver**: a cancellable once-per-second task on a Tokio runtime
//! - **Session runtime**: glues the two together behind a mutex and sends
//!   events over a channel the display side drains
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionStateMachine`]: Phase transitions and countdown
//! - [`TimerDriver`]: Repeating tick source
//! - [`PomodoroSession`]: Running session with an event channel
//! - [`Presenter`]: Display callbacks driven by [`Event`]s
//! - [`Config`]: Application configuration management

pub mod driver;
pub mod error;
pub mod events;
pub mod presenter;
pub mod session;
pub mod storage;
pub mod timer;

pub use driver::{FaultPolicy, TimerDriver};
pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use presenter::Presenter;
pub use session::{EventReceiver, PomodoroSession};
pub use storage::Config;
pub use timer::{
    format_clock, CycleStep, Phase, SessionConfig, SessionSnapshot, SessionState,
    SessionStateMachine,
};
