//! Timer driver
//!
//! Runs a `BreathCycleEngine` on its own task. The task owns the engine and
//! the one live interval timer, so starts, stops and ticks are applied one at
//! a time and in order. Callers talk to it through `DriverHandle`; the latest
//! engine snapshot is published on a watch channel after every change.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::debug;

use crate::engine::{BreathCycleEngine, EngineError, Snapshot, TickOutcome};
use crate::params::BreathParams;

/// Default tick period
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

enum Command {
    Start {
        params: BreathParams,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Stop {
        reply: oneshot::Sender<bool>,
    },
}

/// Handle to a running driver task
pub struct DriverHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Spawn a driver ticking once per `period`
    pub fn spawn(engine: BreathCycleEngine, period: Duration) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let (publisher, snapshots) = watch::channel(engine.snapshot());
        let driver = Driver {
            engine,
            period,
            ticker: None,
            publisher,
        };
        let task = tokio::spawn(driver.run(receiver));

        Self {
            commands,
            snapshots,
            task,
        }
    }

    /// Start a run, replacing any current one
    pub async fn start(&self, params: BreathParams) -> Result<(), EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Start { params, reply })
            .map_err(|_| EngineError::DriverClosed)?;
        response.await.map_err(|_| EngineError::DriverClosed)?
    }

    /// Stop the current run
    ///
    /// Once this returns, no further tick is applied to the stopped run.
    pub async fn stop(&self) -> Result<bool, EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Stop { reply })
            .map_err(|_| EngineError::DriverClosed)?;
        response.await.map_err(|_| EngineError::DriverClosed)
    }

    /// Receiver of engine snapshots, starting from the current one
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Latest published snapshot
    pub fn current(&self) -> Snapshot {
        *self.snapshots.borrow()
    }

    /// Stop accepting commands and wait for the task to exit
    pub async fn shutdown(self) {
        drop(self.commands);
        let _ = self.task.await;
    }
}

struct Driver {
    engine: BreathCycleEngine,
    period: Duration,
    /// At most one live timer
    ticker: Option<Interval>,
    publisher: watch::Sender<Snapshot>,
}

impl Driver {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },

                _ = next_tick(&mut self.ticker) => self.tick(),
            }
        }
        debug!("Timer driver exiting");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Start { params, reply } => {
                let result = self.engine.start(params);
                if result.is_ok() {
                    // Replacing the ticker drops the previous run's timer
                    self.ticker = Some(new_ticker(self.period));
                    self.publish();
                }
                let _ = reply.send(result);
            }
            Command::Stop { reply } => {
                self.ticker = None;
                let stopped = self.engine.stop();
                if stopped {
                    self.publish();
                }
                let _ = reply.send(stopped);
            }
        }
    }

    fn tick(&mut self) {
        match self.engine.on_tick() {
            TickOutcome::Ignored => {
                self.ticker = None;
                return;
            }
            TickOutcome::Finished { total_elapsed_seconds } => {
                debug!(total_elapsed_seconds, "Cancelling timer after final exhale");
                self.ticker = None;
            }
            TickOutcome::Advanced | TickOutcome::Switched(_) => {}
        }
        self.publish();
    }

    fn publish(&self) {
        // No receivers left is fine; the handle keeps one alive anyway
        let _ = self.publisher.send(self.engine.snapshot());
    }
}

/// First tick fires one full period after the timer is created
fn new_ticker(period: Duration) -> Interval {
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
