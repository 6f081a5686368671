//! Repeating tick source.
//!
//! The driver spawns one task on a Tokio runtime that calls a callback every
//! `period` (one second by default) until it is cancelled, the callback asks
//! to stop, or, under [`FaultPolicy::Stop`], the callback fails. Ticks are
//! serialized: the next tick is not scheduled until the previous callback has
//! returned.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::{CoreError, Result};

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// What the driver does when a tick callback returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Log, record the fault, keep ticking.
    #[default]
    LogAndContinue,
    /// Log, record the fault, end the tick stream.
    Stop,
}

#[derive(Debug, Default)]
struct FaultLog {
    count: AtomicU64,
    last: Mutex<Option<String>>,
}

impl FaultLog {
    fn record(&self, err: &CoreError) {
        self.count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last.lock() {
            *last = Some(err.to_string());
        }
    }
}

struct Ticker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Ticker {
    fn is_live(&self) -> bool {
        !self.cancel.is_cancelled() && !self.handle.is_finished()
    }
}

pub struct TimerDriver {
    runtime: Handle,
    period: Duration,
    fault_policy: FaultPolicy,
    faults: Arc<FaultLog>,
    ticker: Option<Ticker>,
}

impl TimerDriver {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            period: DEFAULT_TICK_PERIOD,
            fault_policy: FaultPolicy::default(),
            faults: Arc::new(FaultLog::default()),
            ticker: None,
        }
    }

    /// Driver bound to the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoRuntime`] when called outside a Tokio runtime.
    pub fn current() -> Result<Self> {
        Ok(Self::new(Handle::try_current()?))
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(Ticker::is_live)
    }

    pub fn fault_count(&self) -> u64 {
        self.faults.count.load(Ordering::SeqCst)
    }

    pub fn last_fault(&self) -> Option<String> {
        self.faults.last.lock().ok().and_then(|last| last.clone())
    }

    /// Begin calling `callback` once per period.
    ///
    /// Returns `false` and leaves the running stream alone if the driver is
    /// already ticking. The first tick fires one full period after the call.
    pub fn start_ticking<F>(&mut self, callback: F) -> bool
    where
        F: FnMut() -> Result<ControlFlow<()>> + Send + 'static,
    {
        if self.is_ticking() {
            debug!("start_ticking ignored: already ticking");
            return false;
        }
        // A finished stream may still be parked here.
        self.stop_ticking();

        let cancel = CancellationToken::new();
        let handle = self.runtime.spawn(tick_loop(
            self.period,
            self.fault_policy,
            self.faults.clone(),
            cancel.clone(),
            callback,
        ));
        self.ticker = Some(Ticker { cancel, handle });
        true
    }

    /// Stop future ticks. A callback already in progress runs to completion.
    pub fn stop_ticking(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel.cancel();
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.stop_ticking();
    }
}

async fn tick_loop<F>(
    period: Duration,
    policy: FaultPolicy,
    faults: Arc<FaultLog>,
    cancel: CancellationToken,
    mut callback: F,
) where
    F: FnMut() -> Result<ControlFlow<()>> + Send + 'static,
{
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("tick loop cancelled");
                break;
            }
            _ = ticker.tick() => {
                if cancel.is_cancelled() {
                    break;
                }
                match callback() {
                    Ok(ControlFlow::Continue(())) => {}
                    Ok(ControlFlow::Break(())) => {
                        debug!("tick loop finished by callback");
                        break;
                    }
                    Err(err) => {
                        faults.record(&err);
                        error!(error = %err, "tick callback failed");
                        if policy == FaultPolicy::Stop {
                            warn!("tick loop stopped after callback fault");
                            break;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn stop_without_start_is_harmless() {
        let mut driver = TimerDriver::current().unwrap();
        driver.stop_ticking();
        driver.stop_ticking();
        assert!(!driver.is_ticking());
    }

    #[test]
    fn current_outside_runtime_fails() {
        assert!(matches!(TimerDriver::current(), Err(CoreError::NoRuntime(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn default_period_is_one_second() {
        let driver = TimerDriver::current().unwrap();
        assert_eq!(driver.period(), Duration::from_secs(1));
    }
}
