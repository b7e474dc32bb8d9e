//! In-memory store holding bins, route history, and the active user.

use chrono::NaiveDateTime;
use log::{debug, info};
use rand::Rng;

use crate::fixture;
use crate::model::{Bin, BinId, BinPatch, CollectionRoute, MAX_FILL_LEVEL, User, UserRole};

/// Largest fill increment a single accumulation pass may add to a bin.
pub const MAX_TICK_INCREMENT: u8 = 2;

/// Single source of truth for bins, routes, and the signed-in user.
#[derive(Debug, Clone)]
pub struct BinStore {
    bins: Vec<Bin>,
    routes: Vec<CollectionRoute>,
    user: Option<User>,
    roster: Vec<User>,
    ticks: u64,
}

impl Default for BinStore {
    fn default() -> Self {
        Self::new(fixture::initial_bins(), fixture::users())
    }
}

impl BinStore {
    /// Build a store from a bin roster and a user roster.
    #[must_use]
    pub fn new(bins: Vec<Bin>, roster: Vec<User>) -> Self {
        Self {
            bins,
            routes: Vec::new(),
            user: None,
            roster,
            ticks: 0,
        }
    }

    /// Current bins in roster order.
    #[must_use]
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Look up a bin by id.
    #[must_use]
    pub fn bin(&self, id: &BinId) -> Option<&Bin> {
        self.bins.iter().find(|bin| &bin.id == id)
    }

    /// Route history, most recent first.
    #[must_use]
    pub fn routes(&self) -> &[CollectionRoute] {
        &self.routes
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Number of accumulation passes applied so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Bins whose location or type contains `term`, ignoring case.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&Bin> {
        let needle = term.trim().to_lowercase();
        self.bins
            .iter()
            .filter(|bin| {
                bin.location_name.to_lowercase().contains(&needle)
                    || bin.kind.label().to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Sign in as the first roster user with `role`, or the first roster user if none matches.
    pub fn login(&mut self, role: UserRole) -> Option<&User> {
        let user = self
            .roster
            .iter()
            .find(|user| user.role == role)
            .or_else(|| self.roster.first())
            .cloned();
        if let Some(user) = &user {
            info!("{} signed in as {}", user.name, user.role);
        }
        self.user = user;
        self.user.as_ref()
    }

    /// Clear the active user. Bins and routes are kept.
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!("{} signed out", user.name);
        }
    }

    /// Merge `patch` into the bin with `id`.
    ///
    /// Returns `false` and leaves the store untouched when no such bin exists.
    pub fn update_bin(&mut self, id: &BinId, patch: BinPatch) -> bool {
        let Some(bin) = self.bins.iter_mut().find(|bin| &bin.id == id) else {
            debug!("Ignoring update for unknown bin {id}");
            return false;
        };
        bin.apply(patch);
        true
    }

    /// Mark a bin as emptied: fill level 0 and collection time `at`, in one update.
    pub fn empty_bin(&mut self, id: &BinId, at: NaiveDateTime) -> bool {
        self.update_bin(id, BinPatch::emptied(at))
    }

    /// Prepend a route to the history.
    pub fn add_route(&mut self, route: CollectionRoute) {
        info!("Added route {} with {} stops", route.id, route.stops.len());
        self.routes.insert(0, route);
    }

    /// Restore the initial bins and clear the route history. The user stays signed in.
    pub fn reset_simulation(&mut self) {
        info!("Resetting simulation to initial bins");
        self.bins = fixture::initial_bins();
        self.routes.clear();
    }

    /// One accumulation pass: every bin gains 0–2 percent, capped at 100.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for bin in &mut self.bins {
            let increment = rng.gen_range(0..=MAX_TICK_INCREMENT);
            bin.fill_level = bin.fill_level.saturating_add(increment).min(MAX_FILL_LEVEL);
        }
        self.ticks += 1;
        debug!("Accumulation pass {} applied", self.ticks);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::model::{RouteId, RouteSource, RouteStatus};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 12)
            .and_then(|date| date.and_hms_opt(9, 30, 0))
            .expect("valid timestamp")
    }

    fn route(id: &str) -> CollectionRoute {
        CollectionRoute {
            id: RouteId(id.to_owned()),
            driver_name: "Test".to_owned(),
            vehicle_id: "TRUCK-T".to_owned(),
            stops: Vec::new(),
            total_distance: "1 km".to_owned(),
            estimated_time: "2 mins".to_owned(),
            status: RouteStatus::Pending,
            source: RouteSource::Ai,
        }
    }

    #[test]
    fn login_picks_first_matching_user() {
        let mut store = BinStore::default();
        let user = store.login(UserRole::Collector).cloned();
        assert_eq!(user.map(|user| user.name), Some("Bob Collector".to_owned()));
    }

    #[test]
    fn login_without_match_falls_back_to_first_user() {
        let roster = fixture::users()
            .into_iter()
            .filter(|user| user.role != UserRole::Citizen)
            .collect();
        let mut store = BinStore::new(fixture::initial_bins(), roster);
        let user = store.login(UserRole::Citizen).cloned();
        assert_eq!(user.map(|user| user.id), Some("u1".to_owned()));
    }

    #[test]
    fn logout_keeps_data() {
        let mut store = BinStore::default();
        store.login(UserRole::Admin);
        store.add_route(route("R1"));
        store.logout();
        assert!(store.user().is_none());
        assert_eq!(store.routes().len(), 1);
        assert_eq!(store.bins(), fixture::initial_bins().as_slice());
    }

    #[test]
    fn update_unknown_bin_is_ignored() {
        let mut store = BinStore::default();
        let before = store.bins().to_vec();
        let updated = store.update_bin(&BinId::new("BIN-404"), BinPatch::emptied(now()));
        assert!(!updated);
        assert_eq!(store.bins(), before.as_slice());
    }

    #[test]
    fn empty_bin_sets_level_and_timestamp_together() {
        let mut store = BinStore::default();
        let id = BinId::new("BIN-008");
        assert!(store.empty_bin(&id, now()));

        let bin = store.bin(&id).expect("fixture bin");
        assert_eq!(bin.fill_level, 0);
        assert_eq!(bin.last_collected, now());
    }

    #[test]
    fn routes_are_most_recent_first() {
        let mut store = BinStore::default();
        store.add_route(route("R1"));
        store.add_route(route("R2"));
        store.add_route(route("R2"));
        let ids: Vec<_> = store.routes().iter().map(|route| route.id.0.as_str()).collect();
        assert_eq!(ids, ["R2", "R2", "R1"]);
    }

    #[test]
    fn reset_restores_fixture_and_keeps_user() {
        let mut store = BinStore::default();
        store.login(UserRole::Admin);
        store.empty_bin(&BinId::new("BIN-002"), now());
        store.update_bin(&BinId::new("BIN-001"), BinPatch::prediction("soon"));
        store.add_route(route("R1"));
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        store.tick(&mut rng);

        store.reset_simulation();

        assert_eq!(store.bins(), fixture::initial_bins().as_slice());
        assert!(store.routes().is_empty());
        assert!(store.user().is_some());
    }

    #[test]
    fn ticks_never_decrease_or_overflow() {
        let mut store = BinStore::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut previous: Vec<u8> = store.bins().iter().map(|bin| bin.fill_level).collect();

        for _ in 0..200 {
            store.tick(&mut rng);
            for (bin, before) in store.bins().iter().zip(&previous) {
                assert!(bin.fill_level >= *before);
                assert!(bin.fill_level - *before <= MAX_TICK_INCREMENT);
                assert!(bin.fill_level <= MAX_FILL_LEVEL);
            }
            previous = store.bins().iter().map(|bin| bin.fill_level).collect();
        }

        assert_eq!(store.ticks(), 200);
        // 200 passes averaging +1 each saturate every bin
        assert!(store.bins().iter().all(|bin| bin.fill_level == MAX_FILL_LEVEL));
    }

    #[test]
    fn search_matches_location_and_type() {
        let store = BinStore::default();
        let by_location: Vec<_> = store.search("library").iter().map(|bin| bin.id.0.clone()).collect();
        assert_eq!(by_location, ["BIN-003"]);
        assert_eq!(store.search("ORGANIC").len(), 2);
        assert_eq!(store.search("").len(), 8);
    }
}
