//! High-level session facade used by clients.

use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDateTime};

use crate::accumulator::{Accumulator, SharedStore, SimulationConfig, lock};
use crate::model::{Bin, BinId, BinPatch, BinType, CollectionRoute, User, UserRole};
use crate::planner;
use crate::ports::AiPort;
use crate::status::{self, DashboardStats};
use crate::store::BinStore;

/// Application context: owns the store, the AI port, and the session's accumulation task.
pub struct EcoTrack {
    store: SharedStore,
    port: Arc<dyn AiPort>,
    config: SimulationConfig,
    accumulator: Option<Accumulator>,
}

impl EcoTrack {
    /// Create a context over the default fixtures.
    #[must_use]
    pub fn new(port: Arc<dyn AiPort>, config: SimulationConfig) -> Self {
        Self::from_store(port, config, BinStore::default())
    }

    /// Create a context over a prepared store.
    #[must_use]
    pub fn from_store(port: Arc<dyn AiPort>, config: SimulationConfig, store: BinStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            port,
            config,
            accumulator: None,
        }
    }

    /// Sign in with `role` and (re)start the fill-level simulation.
    ///
    /// A simulation left over from an earlier login is cancelled first, so at most one runs.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn login(&mut self, role: UserRole) -> Option<User> {
        self.stop_accumulator();
        let user = lock(&self.store).login(role).cloned();
        if user.is_some() {
            self.accumulator = Some(Accumulator::start(Arc::clone(&self.store), self.config));
        }
        user
    }

    /// Sign out and stop the simulation. Bins and routes are kept.
    pub fn logout(&mut self) {
        self.stop_accumulator();
        lock(&self.store).logout();
    }

    fn stop_accumulator(&mut self) {
        if let Some(accumulator) = self.accumulator.take() {
            accumulator.stop();
        }
    }

    /// Whether the fill-level simulation is scheduled.
    #[must_use]
    pub fn is_simulating(&self) -> bool {
        self.accumulator
            .as_ref()
            .is_some_and(Accumulator::is_running)
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        lock(&self.store).user().cloned()
    }

    /// Run `reader` against the current store state.
    pub fn read<T>(&self, reader: impl FnOnce(&BinStore) -> T) -> T {
        reader(&lock(&self.store))
    }

    /// Copy of the current bins.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Bin> {
        self.read(|store| store.bins().to_vec())
    }

    /// Copy of the route history, most recent first.
    #[must_use]
    pub fn routes(&self) -> Vec<CollectionRoute> {
        self.read(|store| store.routes().to_vec())
    }

    /// Dashboard counters over the current bins.
    #[must_use]
    pub fn stats(&self) -> DashboardStats {
        self.read(|store| DashboardStats::from_bins(store.bins()))
    }

    /// Bin count per type over the current bins.
    #[must_use]
    pub fn type_distribution(&self) -> Vec<(BinType, usize)> {
        self.read(|store| status::type_distribution(store.bins()))
    }

    /// Merge `patch` into a bin. Unknown ids are ignored and reported as `false`.
    pub fn update_bin(&self, id: &BinId, patch: BinPatch) -> bool {
        lock(&self.store).update_bin(id, patch)
    }

    /// Mark a bin as collected now.
    pub fn empty_bin(&self, id: &BinId) -> bool {
        lock(&self.store).empty_bin(id, now())
    }

    /// Prepend a route to the history.
    pub fn add_route(&self, route: CollectionRoute) {
        lock(&self.store).add_route(route);
    }

    /// Restore the initial bins and clear the route history.
    pub fn reset_simulation(&self) {
        lock(&self.store).reset_simulation();
    }

    /// Plan a route over the bins that need collection and record it.
    ///
    /// Returns `None` when no bin needs collection.
    pub async fn optimize_route(&self) -> Option<CollectionRoute> {
        let bins = self.snapshot();
        let route = planner::plan_route(self.port.as_ref(), &bins, now()).await?;
        self.add_route(route.clone());
        Some(route)
    }

    /// Predict when a bin overflows and store the result on the bin.
    ///
    /// Returns `None` when the id is unknown at request time.
    pub async fn predict_overflow(&self, id: &BinId) -> Option<String> {
        let bin = self.read(|store| store.bin(id).cloned())?;
        let prediction = planner::predict_overflow(self.port.as_ref(), &bin, now()).await;
        self.update_bin(id, BinPatch::prediction(prediction.clone()));
        Some(prediction)
    }
}

impl Drop for EcoTrack {
    fn drop(&mut self) {
        self.stop_accumulator();
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
