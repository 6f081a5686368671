//! Running session: state machine + tick driver + event channel.
//!
//! Commands (`start`, `reset`) and ticks both mutate the machine under one
//! mutex, and every event is sent while that mutex is held, so the receiver
//! sees events in exactly the order the state changed. Each `start`/`reset`
//! bumps a generation counter; a tick carrying an older generation ends its
//! stream without touching the machine.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::driver::TimerDriver;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::timer::{SessionConfig, SessionSnapshot, SessionState, SessionStateMachine};

pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

pub struct PomodoroSession {
    machine: Arc<Mutex<SessionStateMachine>>,
    generation: Arc<AtomicU64>,
    driver: TimerDriver,
    events: mpsc::UnboundedSender<Event>,
}

impl PomodoroSession {
    /// Build a session and the receiver its events arrive on.
    pub fn new(config: SessionConfig, driver: TimerDriver) -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            machine: Arc::new(Mutex::new(SessionStateMachine::new(config))),
            generation: Arc::new(AtomicU64::new(0)),
            driver,
            events: tx,
        };
        (session, rx)
    }

    /// Session on the current Tokio runtime with a one-second tick.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoRuntime`] outside a Tokio runtime.
    pub fn with_config(config: SessionConfig) -> Result<(Self, EventReceiver)> {
        Ok(Self::new(config, TimerDriver::current()?))
    }

    pub fn state(&self) -> Result<SessionState> {
        Ok(*self.machine.lock()?.state())
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        Ok(self.machine.lock()?.snapshot())
    }

    pub fn config(&self) -> Result<SessionConfig> {
        Ok(*self.machine.lock()?.config())
    }

    pub fn driver(&self) -> &TimerDriver {
        &self.driver
    }

    pub fn is_ticking(&self) -> bool {
        self.driver.is_ticking()
    }

    /// Start counting down. Returns `false` if already running.
    pub fn start(&mut self) -> Result<bool> {
        let armed = {
            let mut machine = self.machine.lock()?;
            let events = machine.start();
            if events.is_empty() {
                return Ok(false);
            }
            let armed = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            publish(&self.events, events);
            armed
        };

        // The machine was stopped, so whatever stream is parked in the driver
        // belongs to an older generation.
        self.driver.stop_ticking();
        self.driver.start_ticking(tick_callback(
            self.machine.clone(),
            self.generation.clone(),
            armed,
            self.events.clone(),
        ));
        debug!(generation = armed, "tick stream armed");
        Ok(true)
    }

    /// Return to the initial state and cancel any pending ticks.
    pub fn reset(&mut self) -> Result<()> {
        {
            let mut machine = self.machine.lock()?;
            self.generation.fetch_add(1, Ordering::SeqCst);
            publish(&self.events, machine.reset());
        }
        self.driver.stop_ticking();
        Ok(())
    }

    /// Stop ticking and pause the countdown where it is. A later `start`
    /// resumes from the same phase and remaining time.
    pub fn shutdown(&mut self) {
        {
            let mut machine = self
                .machine
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            self.generation.fetch_add(1, Ordering::SeqCst);
            machine.stop();
        }
        self.driver.stop_ticking();
    }
}

fn tick_callback(
    machine: Arc<Mutex<SessionStateMachine>>,
    generation: Arc<AtomicU64>,
    armed: u64,
    events: mpsc::UnboundedSender<Event>,
) -> impl FnMut() -> Result<ControlFlow<()>> + Send + 'static {
    move || {
        let mut guard = match machine.lock() {
            Ok(guard) => guard,
            Err(_) => {
                let err = CoreError::LockPoisoned;
                let _ = events.send(Event::DriverFault {
                    message: err.to_string(),
                    at: Utc::now(),
                });
                return Err(err);
            }
        };
        if generation.load(Ordering::SeqCst) != armed {
            trace!(armed, "dropping stale tick");
            return Ok(ControlFlow::Break(()));
        }
        publish(&events, guard.on_tick());
        if guard.is_running() {
            Ok(ControlFlow::Continue(()))
        } else {
            Ok(ControlFlow::Break(()))
        }
    }
}

fn publish(tx: &mpsc::UnboundedSender<Event>, events: Vec<Event>) {
    for event in events {
        if tx.send(event).is_err() {
            trace!("event receiver dropped");
            return;
        }
    }
}
