//! AI port implementation backed by the Gemini `generateContent` API.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use ecotrack_core::ports::{
    AiError, AiPort, OverflowEstimate, PredictionRequest, RoutePlan, RouteRequest,
};

/// Public Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Model used for route ordering.
pub const DEFAULT_ROUTE_MODEL: &str = "gemini-3-pro-preview";
/// Model used for overflow predictions.
pub const DEFAULT_PREDICTION_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Connection settings for the Gemini backend.
pub struct GeminiConfig {
    /// API root without trailing slash.
    pub base_url: String,
    /// API key; requests fail fast without one.
    pub api_key: Option<String>,
    /// Model asked for route orderings.
    pub route_model: String,
    /// Model asked for overflow predictions.
    pub prediction_model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            route_model: DEFAULT_ROUTE_MODEL.to_owned(),
            prediction_model: DEFAULT_PREDICTION_MODEL.to_owned(),
        }
    }
}

/// Body of a `generateContent` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

/// Response from `generateContent`.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    // usageMetadata and safety ratings are ignored
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.trim().is_empty())
    }
}

/// [`AiPort`] talking to Gemini over HTTP. Each call is a single attempt.
pub struct GeminiPort {
    client: Client,
    config: GeminiConfig,
}

impl GeminiPort {
    /// Create a port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    async fn generate<T: DeserializeOwned>(
        &self,
        model: &str,
        prompt: String,
        schema: Value,
    ) -> Result<T, AiError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(AiError::MissingApiKey)?;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        debug!("Calling Gemini model {model}");
        let req = self
            .client
            .post(format!(
                "{}/models/{model}:generateContent",
                self.config.base_url
            ))
            .header("x-goog-api-key", api_key)
            .json(&body);

        let resp = fetch_json::<GenerateResponse>(req).await?;
        decode_answer(resp)
    }
}

#[async_trait]
impl AiPort for GeminiPort {
    async fn optimize_route(&self, request: &RouteRequest) -> Result<RoutePlan, AiError> {
        let prompt = route_prompt(request)?;
        self.generate(&self.config.route_model, prompt, route_schema())
            .await
    }

    async fn predict_overflow(
        &self,
        request: &PredictionRequest,
    ) -> Result<OverflowEstimate, AiError> {
        let prompt = prediction_prompt(request)?;
        self.generate(&self.config.prediction_model, prompt, prediction_schema())
            .await
    }
}

fn route_prompt(request: &RouteRequest) -> Result<String, AiError> {
    let bins = serde_json::to_string(&request.bins)?;
    Ok(format!(
        "You are planning the route of a waste collection truck that starts and ends at \
         coordinates (0,0).\n\
         These bins need collection: {bins}.\n\
         Order them so the truck visits every bin on the shortest tour. Estimate the total \
         Euclidean distance and the driving time at an average of 30 km/h.\n\
         Answer with JSON only: {{\"stops\": [bin ids in visiting order], \
         \"totalDistance\": \"e.g. 12.5 km\", \"estimatedTime\": \"e.g. 25 mins\"}}"
    ))
}

fn prediction_prompt(request: &PredictionRequest) -> Result<String, AiError> {
    let history = serde_json::to_string(&request.history)?;
    Ok(format!(
        "Estimate the fill rate of a waste bin.\n\
         Readings: {history}.\n\
         Current level: {level}%.\n\
         Bin type: {kind}.\n\
         How many hours from now will it reach 100%? Answer with JSON only: {{\"hours\": number}}",
        level = request.current_level,
        kind = request.kind,
    ))
}

fn route_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "stops": { "type": "ARRAY", "items": { "type": "STRING" } },
            "totalDistance": { "type": "STRING" },
            "estimatedTime": { "type": "STRING" }
        }
    })
}

fn prediction_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "hours": { "type": "NUMBER" }
        }
    })
}

/// Decode the JSON the model wrote into its first text part.
fn decode_answer<T: DeserializeOwned>(resp: GenerateResponse) -> Result<T, AiError> {
    let text = resp.into_text().ok_or(AiError::EmptyResponse)?;
    serde_json::from_str(&text).map_err(AiError::from)
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, AiError> {
    req.send()
        .await
        .map_err(AiError::from)?
        .error_for_status()
        .map_err(AiError::from)?
        .json()
        .await
        .map_err(AiError::from)
}
