//! Traits describing the AI collaborator and the request/response shapes it exchanges.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;

use crate::model::{BinId, BinType, Coordinates};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the AI backend.
pub enum AiError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The model answered with something that is not the expected JSON.
    #[error("Decode error: {0}")]
    Decode(#[from] JsonError),
    /// The model answered without any content.
    #[error("Empty response")]
    EmptyResponse,
    /// No API key was configured.
    #[error("Missing API key")]
    MissingApiKey,
    /// Internal backend error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// One bin as presented to the route optimizer.
pub struct RouteBin {
    /// Bin identifier the optimizer must echo back.
    pub id: BinId,
    /// Location label.
    pub location: String,
    /// Display coordinates.
    #[serde(rename = "coords")]
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Bins that need collection, to be ordered by the optimizer.
pub struct RouteRequest {
    /// Candidate bins in their original order.
    pub bins: Vec<RouteBin>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Optimizer answer: an ordering plus display metadata.
pub struct RoutePlan {
    /// Bin identifiers in visiting order. An answer without it is malformed.
    pub stops: Vec<BinId>,
    /// Distance display text.
    #[serde(default)]
    pub total_distance: Option<String>,
    /// Duration display text.
    #[serde(default)]
    pub estimated_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One synthesized historical reading.
pub struct FillReading {
    /// Day label.
    pub day: &'static str,
    /// Fill level on that day.
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Input for an overflow prediction.
pub struct PredictionRequest {
    /// Oldest-first readings ending with the current level.
    pub history: Vec<FillReading>,
    /// Current fill level.
    pub current_level: u8,
    /// Waste stream of the bin.
    pub kind: BinType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
/// Predictor answer.
pub struct OverflowEstimate {
    /// Hours until the bin is full.
    #[serde(default)]
    pub hours: Option<f64>,
}

#[async_trait]
/// Capability interface for the hosted AI service.
pub trait AiPort: Send + Sync {
    /// Ask for a visiting order over the given bins.
    ///
    /// # Errors
    ///
    /// Returns an [`AiError`] when the backend call fails or answers with garbage.
    async fn optimize_route(&self, request: &RouteRequest) -> Result<RoutePlan, AiError>;

    /// Ask how many hours remain until a bin overflows.
    ///
    /// # Errors
    ///
    /// Returns an [`AiError`] when the backend call fails or answers with garbage.
    async fn predict_overflow(
        &self,
        request: &PredictionRequest,
    ) -> Result<OverflowEstimate, AiError>;
}
