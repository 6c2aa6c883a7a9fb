use serde::{Deserialize, Serialize};

/// Body of `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<f64>,
}

/// Successful prediction. `probability` serializes to `null` when the
/// artifact does not expose probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: u8,
    pub probability: Option<f64>,
}

/// Body of `GET /health` while an artifact is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: ModelStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub path: String,
    pub loaded: bool,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub name: String,
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    pub health: String,
    pub predict: String,
    pub docs: String,
}

/// Uniform error body for every failure path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
