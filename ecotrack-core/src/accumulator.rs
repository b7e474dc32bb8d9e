//! Background task that simulates sensor readings while a session is active.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::store::BinStore;

/// Default time between two accumulation passes.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(5);

/// Store shared between the session and its accumulation task.
pub type SharedStore = Arc<Mutex<BinStore>>;

/// Lock the store. A poisoned lock is recovered since every mutation leaves the store valid.
pub fn lock(store: &SharedStore) -> MutexGuard<'_, BinStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Tuning for the fill-level simulation.
pub struct SimulationConfig {
    /// Time between two accumulation passes.
    pub tick_period: Duration,
    /// Fixed RNG seed, or `None` to seed from the OS.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            seed: None,
        }
    }
}

impl SimulationConfig {
    fn rng(&self) -> ChaCha8Rng {
        self.seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64)
    }
}

/// Handle to a running accumulation task. Dropping it cancels the task.
#[derive(Debug)]
pub struct Accumulator {
    handle: JoinHandle<()>,
}

impl Accumulator {
    /// Spawn the accumulation task on the current tokio runtime.
    ///
    /// The first pass happens one full period after the call.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn start(store: SharedStore, config: SimulationConfig) -> Self {
        let mut rng = config.rng();
        let period = config.tick_period;
        info!("Starting fill-level simulation every {period:?}");

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                lock(&store).tick(&mut rng);
            }
        });

        Self { handle }
    }

    /// Whether the task is still scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Cancel the task. No pass runs after this returns control to the runtime.
    pub fn stop(self) {
        // Drop does the work.
        drop(self);
    }
}

impl Drop for Accumulator {
    fn drop(&mut self) {
        debug!("Stopping fill-level simulation");
        self.handle.abort();
    }
}
