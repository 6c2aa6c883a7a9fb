//! HTTP surface: routes, error mapping, and the Rocket builder.

use ndarray::{aview1, Axis};
use rocket::http::Status;
use rocket::response::{status, Responder};
use rocket::serde::json::{self, json, Json, Value};
use rocket::{catch, catchers, get, post, routes, Build, Request, Rocket, State};
use thiserror::Error;

use crate::data::FEATURE_COUNT;
use crate::latency::RequestTimer;
use crate::state::AppState;
use crate::types::{
    Endpoints, ErrorResponse, HealthResponse, IndexResponse, ModelStatus, PredictRequest,
    PredictResponse,
};

pub const SERVICE_NAME: &str = "Cancer Detection API";

/// Request failures, mapped onto the status codes clients key on.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No artifact loaded; the degraded-mode signal (503).
    #[error("model not loaded")]
    ModelUnavailable,
    /// Request rejected before touching the model (422).
    #[error("{0}")]
    Validation(String),
    /// The artifact itself failed during inference (400).
    #[error("{0}")]
    Inference(String),
}

impl ApiError {
    fn status(&self) -> Status {
        match self {
            ApiError::ModelUnavailable => Status::ServiceUnavailable,
            ApiError::Validation(_) => Status::UnprocessableEntity,
            ApiError::Inference(_) => Status::BadRequest,
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'static> {
        let code = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        status::Custom(code, body).respond_to(request)
    }
}

#[get("/")]
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        name: SERVICE_NAME.to_string(),
        endpoints: Endpoints {
            health: "/health".to_string(),
            predict: "/predict".to_string(),
            docs: "/docs".to_string(),
        },
    })
}

/// Machine-readable description of the surface; the root listing points here
/// in place of a generated docs page.
#[get("/docs")]
pub async fn docs() -> Json<Value> {
    Json(json!({
        "name": SERVICE_NAME,
        "routes": {
            "GET /": "service name and endpoint map",
            "GET /health": "artifact status; 503 while no model is loaded",
            "GET /docs": "this document",
            "POST /predict": {
                "body": {
                    "features": format!("array of exactly {FEATURE_COUNT} finite numbers"),
                },
                "responses": {
                    "200": "{\"prediction\": 0|1, \"probability\": number|null}",
                    "400": "inference failure",
                    "422": "request body failed validation",
                    "503": "no model loaded",
                },
            },
        },
    }))
}

#[get("/health")]
pub async fn health(state: &State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    if state.model().is_none() {
        return Err(ApiError::ModelUnavailable);
    }
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        model: ModelStatus {
            path: state.model_path().to_string(),
            loaded: true,
        },
    }))
}

#[post("/predict", data = "<req>")]
pub async fn predict(
    state: &State<AppState>,
    req: Result<Json<PredictRequest>, json::Error<'_>>,
) -> Result<Json<PredictResponse>, ApiError> {
    let req = req.map_err(|err| {
        let reason = match err {
            json::Error::Io(err) => err.to_string(),
            json::Error::Parse(_, err) => err.to_string(),
        };
        ApiError::Validation(reason)
    })?;

    let features = &req.features;
    if features.len() != FEATURE_COUNT {
        return Err(ApiError::Validation(format!(
            "features must have length {FEATURE_COUNT}, got {}",
            features.len()
        )));
    }
    if let Some(bad) = features.iter().position(|v| !v.is_finite()) {
        return Err(ApiError::Validation(format!(
            "features[{bad}] is not a finite number"
        )));
    }

    let model = state.model().ok_or(ApiError::ModelUnavailable)?;

    // One request row; the artifact sees the same batch interface that
    // training and evaluation use.
    let row = aview1(features).insert_axis(Axis(0));
    let labels = model
        .predict(row)
        .map_err(|err| ApiError::Inference(err.to_string()))?;
    let prediction = labels
        .first()
        .copied()
        .ok_or_else(|| ApiError::Inference("artifact returned no prediction".to_string()))?;

    let probability = match model.predict_proba(row) {
        Some(proba) => {
            let proba = proba.map_err(|err| ApiError::Inference(err.to_string()))?;
            let p = proba.get([0, 1]).copied().ok_or_else(|| {
                ApiError::Inference("artifact returned no positive-class probability".to_string())
            })?;
            Some(p)
        }
        None => None,
    };

    Ok(Json(PredictResponse {
        prediction,
        probability,
    }))
}

#[catch(400)]
fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: "bad request".to_string(),
    })
}

#[catch(404)]
fn not_found() -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: "resource not found".to_string(),
    })
}

#[catch(422)]
fn unprocessable() -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: "request body failed validation".to_string(),
    })
}

#[catch(500)]
fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: "internal server error".to_string(),
    })
}

/// Assemble the Rocket instance: injected state, latency fairing, routes,
/// and the JSON catchers.
pub fn rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .attach(RequestTimer::default())
        .mount("/", routes![index, docs, health, predict])
        .register(
            "/",
            catchers![bad_request, not_found, unprocessable, internal_error],
        )
}
