//! Helpers shared by the UI tests.

use std::sync::Arc;

use async_trait::async_trait;
use ecotrack_core::{
    AiError, AiPort, EcoTrack, OverflowEstimate, PredictionRequest, RoutePlan, RouteRequest,
    SimulationConfig,
};

use crate::app::App;

/// Port whose backend is never reachable, so every AI flow takes its fallback.
pub(crate) struct OfflinePort;

#[async_trait]
impl AiPort for OfflinePort {
    async fn optimize_route(&self, _request: &RouteRequest) -> Result<RoutePlan, AiError> {
        Err(AiError::MissingApiKey)
    }

    async fn predict_overflow(
        &self,
        _request: &PredictionRequest,
    ) -> Result<OverflowEstimate, AiError> {
        Err(AiError::MissingApiKey)
    }
}

/// App over the default fixtures, not signed in.
pub(crate) fn offline_app() -> App {
    App::new(EcoTrack::new(
        Arc::new(OfflinePort),
        SimulationConfig::default(),
    ))
}
