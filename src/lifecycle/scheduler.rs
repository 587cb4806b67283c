//! Periodic reload task.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::error::{RegistryError, Result};
use crate::observability::logging::Logger;

/// Handle to a running reload task.
///
/// Dropping the handle closes the stop channel, which also ends the task.
#[derive(Debug)]
pub struct Scheduler {
    period: Duration,
    stop_tx: broadcast::Sender<()>,
    handle: JoinHandle<Result<()>>,
}

impl Scheduler {
    /// Spawn a task that calls `tick` every `period`, starting one period from now.
    ///
    /// `tick` returning `ControlFlow::Break` ends the task quietly; an error
    /// ends it with that error.
    pub fn start<F, Fut>(period: Duration, log: Logger, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<ControlFlow<()>>> + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = broadcast::channel(1);
        log.log(format_args!(
            "start ticker and trigger it every {}s",
            period.as_secs_f64()
        ));

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.recv() => {
                        log.log(format_args!("ticker stopped"));
                        break;
                    }
                    _ = ticker.tick() => {
                        log.log(format_args!("ticker fired"));
                        match tick().await {
                            Ok(ControlFlow::Continue(())) => {}
                            Ok(ControlFlow::Break(())) => break,
                            Err(e) => {
                                log.log(format_args!("ticker halted: {e}"));
                                return Err(e);
                            }
                        }
                    }
                }
            }
            Ok(())
        });

        Self {
            period,
            stop_tx,
            handle,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task to end on its own.
    ///
    /// Once this has returned the handle is spent; do not call [`stop`](Self::stop) after it.
    pub async fn finished(&mut self) -> Result<()> {
        match (&mut self.handle).await {
            Ok(result) => result,
            Err(e) => Err(RegistryError::Scheduler(e.to_string())),
        }
    }

    /// Signal the task and wait for it to exit.
    ///
    /// A reload already in progress runs to completion first. Returns the
    /// error that ended the task if it had already failed.
    pub async fn stop(mut self) -> Result<()> {
        let _ = self.stop_tx.send(());
        self.finished().await
    }
}
