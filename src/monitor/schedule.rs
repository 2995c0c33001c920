//! Owned handle to a recurring tick loop.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A spawned loop that fires once immediately and then every `period`.
///
/// The loop lives exactly as long as this handle: [`Schedule::stop`] and
/// plain `drop` both signal it, so every exit path of the owner releases
/// it. A tick that is already running is allowed to finish; no further
/// tick starts after the signal.
#[derive(Debug)]
pub struct Schedule {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    period: Duration,
}

impl Schedule {
    /// Spawns the loop on the current tokio runtime.
    pub fn spawn<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = timer.tick() => on_tick().await,
                }
            }
        });

        Self {
            stop_tx,
            task,
            period,
        }
    }

    /// Time between ticks.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns `true` once the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the loop. Equivalent to dropping the handle.
    pub fn stop(self) {}
}

impl Drop for Schedule {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
    }
}
