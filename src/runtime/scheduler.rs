//! Periodic tick driver
//!
//! Runs a caller-supplied async action at a fixed period on the tokio runtime. Ticks
//! never overlap: the next wait only starts once the previous action has completed, so
//! a slow action slows the loop down instead of piling up. Stopping cancels the pending
//! wait right away but lets an in-flight action finish.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, trace};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("tick interval must be positive")]
    InvalidInterval,
    #[error("tick loop must be started from within a tokio runtime")]
    NoRuntime,
}

struct ActiveLoop {
    cancel: watch::Sender<bool>,
    period: Duration,
    handle: JoinHandle<()>,
}

impl ActiveLoop {
    fn cancel(self) {
        // Receiver gone means the loop already exited
        let _ = self.cancel.send(true);
    }
}

/// Owns at most one running tick loop
///
/// `Idle -> start -> Running -> stop -> Idle`. Starting while running stops the old
/// loop first, so two loops never run side by side. All methods take `&self` and may
/// be called from any thread, including from inside a tick action.
#[derive(Default)]
pub struct TickScheduler {
    active: Mutex<Option<ActiveLoop>>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&self) -> MutexGuard<'_, Option<ActiveLoop>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start calling `tick` every `period`, replacing any running loop
    ///
    /// The first tick fires one full period after the call.
    pub fn start<F, Fut>(&self, mut tick: F, period: Duration) -> Result<(), SchedulerError>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if period.is_zero() {
            return Err(SchedulerError::InvalidInterval);
        }
        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

        let mut active = self.active();
        if let Some(previous) = active.take() {
            previous.cancel();
        }

        let (cancel, mut cancelled) = watch::channel(false);
        let handle = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // Fires on cancel, and on the sender being dropped
                    _ = cancelled.changed() => break,
                    _ = ticker.tick() => {}
                }

                trace!("tick");
                tick().await;

                if *cancelled.borrow() {
                    break;
                }
            }
            debug!("Tick loop ({:?}) exited", period);
        });

        debug!("Tick loop started with period {:?}", period);
        *active = Some(ActiveLoop {
            cancel,
            period,
            handle,
        });
        Ok(())
    }

    /// Stop the running loop, if any
    ///
    /// Does not wait for an in-flight tick; that tick completes but no further tick
    /// is scheduled.
    pub fn stop(&self) {
        if let Some(previous) = self.active().take() {
            debug!("Stopping tick loop ({:?})", previous.period);
            previous.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.active()
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    /// Period of the current loop
    pub fn period(&self) -> Option<Duration> {
        self.active().as_ref().map(|active| active.period)
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
