//! Shaping of AI requests and responses, including the local fallbacks.
//!
//! Nothing in here fails: every path ends in a route or a display string.

use chrono::{NaiveDateTime, TimeDelta};
use log::warn;

use crate::model::{Bin, CollectionRoute, RouteId, RouteSource, RouteStatus};
use crate::ports::{
    AiPort, FillReading, OverflowEstimate, PredictionRequest, RouteBin, RoutePlan, RouteRequest,
};

/// Bins above this fill level are sent to the optimizer.
pub const COLLECTION_THRESHOLD: u8 = 50;

/// Distance shown when the optimizer leaves it out.
pub const DEFAULT_DISTANCE: &str = "10 km";
/// Duration shown when the optimizer leaves it out.
pub const DEFAULT_DURATION: &str = "30 mins";
/// Driver label of optimizer routes.
pub const AI_DRIVER: &str = "Assigned by AI";
/// Vehicle label of optimizer routes.
pub const AI_VEHICLE: &str = "TRUCK-AI-01";

/// Driver label of fallback routes.
pub const FALLBACK_DRIVER: &str = "System Default";
/// Vehicle label of fallback routes.
pub const FALLBACK_VEHICLE: &str = "TRUCK-01";
/// Distance text of fallback routes.
pub const FALLBACK_DISTANCE: &str = "15.2 km";
/// Duration text of fallback routes.
pub const FALLBACK_DURATION: &str = "45 mins";

/// Shown when the overflow predictor fails.
pub const FALLBACK_PREDICTION: &str = "Tomorrow, 10:00 AM";
/// Hours assumed when the predictor answers without a usable count.
pub const DEFAULT_PREDICTION_HOURS: f64 = 24.0;
/// Hour counts beyond roughly a century are treated as garbage.
const MAX_PREDICTION_HOURS: f64 = 1_000_000.0;
/// Display format of a predicted overflow time, e.g. `Tue 14:30`.
pub const PREDICTION_FORMAT: &str = "%a %H:%M";

/// Bins that need collection, in their original order.
#[must_use]
pub fn route_candidates(bins: &[Bin]) -> Vec<Bin> {
    bins.iter()
        .filter(|bin| bin.fill_level > COLLECTION_THRESHOLD)
        .cloned()
        .collect()
}

/// Optimizer request for the given candidates.
#[must_use]
pub fn route_request(candidates: &[Bin]) -> RouteRequest {
    RouteRequest {
        bins: candidates
            .iter()
            .map(|bin| RouteBin {
                id: bin.id.clone(),
                location: bin.location_name.clone(),
                coordinates: bin.coordinates,
            })
            .collect(),
    }
}

/// Route used when the optimizer is unavailable: all candidates in original order.
#[must_use]
pub fn fallback_route(candidates: Vec<Bin>, now: NaiveDateTime) -> CollectionRoute {
    CollectionRoute {
        id: RouteId(format!("ROUTE-FALLBACK-{}", now.and_utc().timestamp_millis())),
        driver_name: FALLBACK_DRIVER.to_owned(),
        vehicle_id: FALLBACK_VEHICLE.to_owned(),
        stops: candidates,
        total_distance: FALLBACK_DISTANCE.to_owned(),
        estimated_time: FALLBACK_DURATION.to_owned(),
        status: RouteStatus::Pending,
        source: RouteSource::Fallback,
    }
}

/// Turn an optimizer answer into a route, resolving ids against `bins`.
///
/// Ids that match no bin are dropped.
#[must_use]
pub fn route_from_plan(plan: RoutePlan, bins: &[Bin], now: NaiveDateTime) -> CollectionRoute {
    let stops = plan
        .stops
        .iter()
        .filter_map(|id| bins.iter().find(|bin| &bin.id == id).cloned())
        .collect();

    CollectionRoute {
        id: RouteId(format!("ROUTE-{}", now.and_utc().timestamp_millis())),
        driver_name: AI_DRIVER.to_owned(),
        vehicle_id: AI_VEHICLE.to_owned(),
        stops,
        total_distance: plan
            .total_distance
            .unwrap_or_else(|| DEFAULT_DISTANCE.to_owned()),
        estimated_time: plan
            .estimated_time
            .unwrap_or_else(|| DEFAULT_DURATION.to_owned()),
        status: RouteStatus::Pending,
        source: RouteSource::Ai,
    }
}

/// Plan a collection route over `bins`.
///
/// Returns `None` when no bin needs collection; the port is not called in that case.
pub async fn plan_route(
    port: &dyn AiPort,
    bins: &[Bin],
    now: NaiveDateTime,
) -> Option<CollectionRoute> {
    let candidates = route_candidates(bins);
    if candidates.is_empty() {
        return None;
    }

    let request = route_request(&candidates);
    let route = match port.optimize_route(&request).await {
        Ok(plan) => route_from_plan(plan, bins, now),
        Err(err) => {
            warn!("AI route optimization failed, using default route: {err}");
            fallback_route(candidates, now)
        }
    };
    Some(route)
}

/// Predictor request with a synthesized three-day history.
#[must_use]
pub fn prediction_request(bin: &Bin) -> PredictionRequest {
    let level = bin.fill_level;
    let past = |offset: u8, floor: u8| match level.checked_sub(offset) {
        Some(value) if value > 0 => value,
        _ => floor,
    };

    PredictionRequest {
        history: vec![
            FillReading {
                day: "Monday",
                level: past(40, 10),
            },
            FillReading {
                day: "Tuesday",
                level: past(20, 20),
            },
            FillReading {
                day: "Today",
                level,
            },
        ],
        current_level: level,
        kind: bin.kind,
    }
}

/// Format a predictor answer relative to `now`.
///
/// Returns `None` for counts that cannot be a duration. Negative counts are
/// rejected here rather than shown as a time in the past.
#[must_use]
pub fn format_prediction(estimate: OverflowEstimate, now: NaiveDateTime) -> Option<String> {
    let hours = match estimate.hours {
        Some(hours) if !hours.is_finite() || hours < 0.0 => return None,
        Some(hours) if hours > 0.0 => hours,
        // A zero count means the model had no answer.
        _ => DEFAULT_PREDICTION_HOURS,
    };

    // Fractional hours are truncated.
    let whole_hours = hours.trunc();
    if whole_hours > MAX_PREDICTION_HOURS {
        return None;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "whole_hours is a non-negative integer bounded by MAX_PREDICTION_HOURS"
    )]
    let delta = TimeDelta::try_hours(whole_hours as i64)?;
    let at = now.checked_add_signed(delta)?;
    Some(at.format(PREDICTION_FORMAT).to_string())
}

/// Predict when `bin` overflows, as display text. Falls back to a fixed placeholder.
pub async fn predict_overflow(port: &dyn AiPort, bin: &Bin, now: NaiveDateTime) -> String {
    let request = prediction_request(bin);
    let formatted = match port.predict_overflow(&request).await {
        Ok(estimate) => format_prediction(estimate, now),
        Err(err) => {
            warn!("AI overflow prediction for {} failed: {err}", bin.id);
            None
        }
    };
    formatted.unwrap_or_else(|| FALLBACK_PREDICTION.to_owned())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;
    use crate::fixture::initial_bins;
    use crate::model::BinId;
    use crate::ports::AiError;

    /// Port answering from canned results and recording what it was asked.
    struct CannedPort {
        route: Mutex<Option<Result<RoutePlan, AiError>>>,
        estimate: Mutex<Option<Result<OverflowEstimate, AiError>>>,
        route_requests: Mutex<Vec<RouteRequest>>,
    }

    impl CannedPort {
        fn new() -> Self {
            Self {
                route: Mutex::new(None),
                estimate: Mutex::new(None),
                route_requests: Mutex::new(Vec::new()),
            }
        }

        fn with_route(self, result: Result<RoutePlan, AiError>) -> Self {
            *self.route.lock().expect("lock") = Some(result);
            self
        }

        fn with_estimate(self, result: Result<OverflowEstimate, AiError>) -> Self {
            *self.estimate.lock().expect("lock") = Some(result);
            self
        }
    }

    #[async_trait]
    impl AiPort for CannedPort {
        async fn optimize_route(&self, request: &RouteRequest) -> Result<RoutePlan, AiError> {
            self.route_requests.lock().expect("lock").push(request.clone());
            self.route
                .lock()
                .expect("lock")
                .take()
                .unwrap_or(Err(AiError::EmptyResponse))
        }

        async fn predict_overflow(
            &self,
            _request: &PredictionRequest,
        ) -> Result<OverflowEstimate, AiError> {
            self.estimate
                .lock()
                .expect("lock")
                .take()
                .unwrap_or(Err(AiError::EmptyResponse))
        }
    }

    fn now() -> NaiveDateTime {
        // A Tuesday
        NaiveDate::from_ymd_opt(2024, 3, 12)
            .and_then(|date| date.and_hms_opt(9, 30, 0))
            .expect("valid timestamp")
    }

    fn ids(bins: &[Bin]) -> Vec<&str> {
        bins.iter().map(|bin| bin.id.0.as_str()).collect()
    }

    #[test]
    fn fixture_candidates_are_bins_above_half() {
        let candidates = route_candidates(&initial_bins());
        assert_eq!(
            ids(&candidates),
            ["BIN-002", "BIN-004", "BIN-005", "BIN-007", "BIN-008"]
        );
    }

    #[test]
    fn exactly_half_full_is_not_a_candidate() {
        let mut bins = initial_bins();
        for bin in &mut bins {
            bin.fill_level = 50;
        }
        assert!(route_candidates(&bins).is_empty());
    }

    #[tokio::test]
    async fn no_candidates_means_no_route_and_no_call() {
        let mut bins = initial_bins();
        for bin in &mut bins {
            bin.fill_level = 10;
        }
        let port = CannedPort::new();

        assert!(plan_route(&port, &bins, now()).await.is_none());
        assert!(port.route_requests.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn failed_optimization_uses_candidates_in_order() {
        let port = CannedPort::new().with_route(Err(AiError::MissingApiKey));
        let route = plan_route(&port, &initial_bins(), now())
            .await
            .expect("candidates exist");

        assert_eq!(route.source, RouteSource::Fallback);
        assert_eq!(route.status, RouteStatus::Pending);
        assert_eq!(route.stops, route_candidates(&initial_bins()));
        assert_eq!(route.driver_name, FALLBACK_DRIVER);
        assert_eq!(route.vehicle_id, FALLBACK_VEHICLE);
        assert_eq!(route.total_distance, FALLBACK_DISTANCE);
        assert_eq!(route.estimated_time, FALLBACK_DURATION);
        assert!(route.id.0.starts_with("ROUTE-FALLBACK-"));
    }

    #[tokio::test]
    async fn request_carries_only_candidates() {
        let port = CannedPort::new();
        let _route = plan_route(&port, &initial_bins(), now()).await;

        let requests = port.route_requests.lock().expect("lock");
        let sent: Vec<_> = requests
            .iter()
            .flat_map(|request| request.bins.iter().map(|bin| bin.id.0.as_str()))
            .collect();
        assert_eq!(sent, ["BIN-002", "BIN-004", "BIN-005", "BIN-007", "BIN-008"]);
    }

    #[tokio::test]
    async fn optimized_route_follows_returned_order_and_drops_unknown_ids() {
        let plan = RoutePlan {
            stops: ["BIN-008", "BIN-999", "BIN-002", "BIN-005"]
                .into_iter()
                .map(BinId::new)
                .collect(),
            total_distance: Some("12.5 km".to_owned()),
            estimated_time: None,
        };
        let port = CannedPort::new().with_route(Ok(plan));
        let route = plan_route(&port, &initial_bins(), now())
            .await
            .expect("candidates exist");

        assert_eq!(route.source, RouteSource::Ai);
        assert_eq!(ids(&route.stops), ["BIN-008", "BIN-002", "BIN-005"]);
        assert_eq!(route.total_distance, "12.5 km");
        assert_eq!(route.estimated_time, DEFAULT_DURATION);
        assert_eq!(route.driver_name, AI_DRIVER);
        assert_eq!(route.status, RouteStatus::Pending);
        assert!(!route.id.0.starts_with("ROUTE-FALLBACK-"));
    }

    #[rstest]
    #[case(85, 45, 65)]
    #[case(40, 10, 20)]
    #[case(30, 10, 10)]
    #[case(20, 10, 20)]
    #[case(0, 10, 20)]
    fn synthesized_history(#[case] level: u8, #[case] monday: u8, #[case] tuesday: u8) {
        let mut bin = initial_bins().remove(0);
        bin.fill_level = level;
        let request = prediction_request(&bin);

        let levels: Vec<_> = request.history.iter().map(|reading| reading.level).collect();
        assert_eq!(levels, [monday, tuesday, level]);
        assert_eq!(request.current_level, level);
        assert_eq!(request.kind, bin.kind);
    }

    #[rstest]
    #[case(Some(5.0), "Tue 14:30")]
    #[case(Some(30.0), "Wed 15:30")]
    #[case(None, "Wed 09:30")]
    #[case(Some(0.0), "Wed 09:30")]
    fn prediction_is_formatted_from_now(#[case] hours: Option<f64>, #[case] expected: &str) {
        let formatted = format_prediction(OverflowEstimate { hours }, now());
        assert_eq!(formatted.as_deref(), Some(expected));
    }

    #[rstest]
    #[case(-3.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(2.0e6)]
    fn unusable_hour_counts_are_rejected(#[case] hours: f64) {
        assert!(format_prediction(OverflowEstimate { hours: Some(hours) }, now()).is_none());
    }

    #[tokio::test]
    async fn failed_prediction_returns_placeholder() {
        let port = CannedPort::new().with_estimate(Err(AiError::Internal("boom".to_owned())));
        let bin = initial_bins().remove(1);
        assert_eq!(predict_overflow(&port, &bin, now()).await, FALLBACK_PREDICTION);
    }

    #[tokio::test]
    async fn successful_prediction_is_formatted() {
        let port = CannedPort::new().with_estimate(Ok(OverflowEstimate { hours: Some(2.0) }));
        let bin = initial_bins().remove(1);
        assert_eq!(predict_overflow(&port, &bin, now()).await, "Tue 11:30");
    }
}
