//! HTTP-level tests driven through Rocket's local client.

use std::sync::Arc;

use cancer_detection_server::api;
use cancer_detection_server::data::{self, FEATURE_COUNT};
use cancer_detection_server::model::{Classifier, LogisticModel, ModelConfig, PredictError};
use cancer_detection_server::state::AppState;
use cancer_detection_server::types::{ErrorResponse, PredictResponse};
use ndarray::{s, Array1, Array2, ArrayView2};
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use rocket::serde::json::{json, Value};

/// Fixed-output artifact used to pin serving behavior independently of
/// training.
struct StubClassifier {
    label: u8,
    probability: Option<f64>,
}

impl Classifier for StubClassifier {
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<u8>, PredictError> {
        Ok(Array1::from_elem(x.nrows(), self.label))
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Option<Result<Array2<f64>, PredictError>> {
        self.probability.map(|p| {
            let mut proba = Array2::zeros((x.nrows(), 2));
            for mut row in proba.rows_mut() {
                row[0] = 1.0 - p;
                row[1] = p;
            }
            Ok(proba)
        })
    }
}

fn client_with(state: AppState) -> Client {
    Client::tracked(api::rocket(state)).expect("valid rocket instance")
}

fn stub_client(label: u8, probability: Option<f64>) -> Client {
    client_with(AppState::with_model(
        Arc::new(StubClassifier { label, probability }),
        "models/model.json",
    ))
}

fn valid_features() -> Vec<f64> {
    data::load_dataset().features.row(0).to_vec()
}

fn post_features(client: &Client, body: String) -> rocket::local::blocking::LocalResponse<'_> {
    client
        .post("/predict")
        .header(ContentType::JSON)
        .body(body)
        .dispatch()
}

#[test]
fn root_lists_the_endpoints() {
    let client = stub_client(1, Some(0.9));
    let response = client.get("/").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().expect("json body");
    assert_eq!(body["name"], "Cancer Detection API");
    assert_eq!(body["endpoints"]["health"], "/health");
    assert_eq!(body["endpoints"]["predict"], "/predict");
    assert_eq!(body["endpoints"]["docs"], "/docs");
}

#[test]
fn docs_are_served() {
    let client = stub_client(1, Some(0.9));
    let response = client.get("/docs").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().expect("json body");
    assert_eq!(body["name"], "Cancer Detection API");
    assert!(body["routes"]["POST /predict"].is_object());
}

#[test]
fn health_reports_a_loaded_model() {
    let client = stub_client(1, Some(0.9));
    let response = client.get("/health").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().expect("json body");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"]["loaded"], true);
    assert_eq!(body["model"]["path"], "models/model.json");
}

#[test]
fn health_is_unavailable_without_a_model() {
    let client = client_with(AppState::degraded("models/missing.json"));
    let response = client.get("/health").dispatch();
    assert_eq!(response.status(), Status::ServiceUnavailable);

    let body: ErrorResponse = response.into_json().expect("json body");
    assert_eq!(body.error, "model not loaded");
}

#[test]
fn predict_is_unavailable_without_a_model() {
    let client = client_with(AppState::degraded("models/missing.json"));
    let response = post_features(&client, json!({ "features": valid_features() }).to_string());
    assert_eq!(response.status(), Status::ServiceUnavailable);

    let body: ErrorResponse = response.into_json().expect("json body");
    assert_eq!(body.error, "model not loaded");
}

#[test]
fn predict_rejects_wrong_feature_count() {
    let client = stub_client(1, Some(0.9));
    let response = post_features(&client, json!({ "features": [1.0, 2.0] }).to_string());
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let body: ErrorResponse = response.into_json().expect("json body");
    assert!(
        body.error.contains("length 30, got 2"),
        "error should name the expected length: {}",
        body.error
    );
}

#[test]
fn predict_rejects_non_numeric_elements() {
    let client = stub_client(1, Some(0.9));
    let features = vec!["not_a_number"; FEATURE_COUNT];
    let response = post_features(&client, json!({ "features": features }).to_string());
    assert_eq!(response.status(), Status::UnprocessableEntity);
}

#[test]
fn predict_rejects_a_missing_features_key() {
    let client = stub_client(1, Some(0.9));
    let response = post_features(&client, "{}".to_string());
    assert_eq!(response.status(), Status::UnprocessableEntity);
}

#[test]
fn predict_rejects_malformed_json() {
    let client = stub_client(1, Some(0.9));
    let response = post_features(&client, "{\"features\": [1.0,".to_string());
    assert_eq!(response.status(), Status::UnprocessableEntity);
}

#[test]
fn predict_rejects_non_finite_values() {
    let client = stub_client(1, Some(0.9));
    let mut elements: Vec<String> = valid_features().iter().map(|v| v.to_string()).collect();
    // 1e999 overflows f64 to infinity during parsing.
    elements[3] = "1e999".to_string();
    let body = format!("{{\"features\":[{}]}}", elements.join(","));

    let response = post_features(&client, body);
    assert_eq!(response.status(), Status::UnprocessableEntity);
}

#[test]
fn predict_returns_the_stub_output() {
    let client = stub_client(1, Some(0.25));
    let response = post_features(&client, json!({ "features": valid_features() }).to_string());
    assert_eq!(response.status(), Status::Ok);

    let body: PredictResponse = response.into_json().expect("json body");
    assert_eq!(body.prediction, 1);
    assert_eq!(body.probability, Some(0.25));
}

#[test]
fn probability_is_null_without_the_capability() {
    let client = stub_client(0, None);
    let response = post_features(&client, json!({ "features": valid_features() }).to_string());
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().expect("json body");
    assert_eq!(body["prediction"], 0);
    assert!(body["probability"].is_null());
}

#[test]
fn predict_agrees_with_the_artifact_itself() {
    let dataset = data::load_dataset();
    let config = ModelConfig {
        max_iter: 200,
        ..ModelConfig::default()
    };
    let model = LogisticModel::fit(dataset.features.view(), dataset.labels.view(), &config);

    let expected = model
        .predict(dataset.features.slice(s![0..1, ..]))
        .expect("predict first row")[0];

    let client = client_with(AppState::with_model(Arc::new(model), "models/model.json"));
    let response = post_features(&client, json!({ "features": valid_features() }).to_string());
    assert_eq!(response.status(), Status::Ok);

    let body: PredictResponse = response.into_json().expect("json body");
    assert_eq!(body.prediction, expected);
    let p = body.probability.expect("trained model exposes probabilities");
    assert!((0.0..=1.0).contains(&p), "probability out of range: {p}");
}

#[test]
fn inference_failure_maps_to_bad_request() {
    // Artifact trained on a narrower schema than the serving surface.
    let dataset = data::load_dataset();
    let narrow = dataset.features.slice(s![.., 0..10]).to_owned();
    let config = ModelConfig {
        max_iter: 50,
        ..ModelConfig::default()
    };
    let model = LogisticModel::fit(narrow.view(), dataset.labels.view(), &config);

    let client = client_with(AppState::with_model(Arc::new(model), "models/model.json"));
    let response = post_features(&client, json!({ "features": valid_features() }).to_string());
    assert_eq!(response.status(), Status::BadRequest);

    let body: ErrorResponse = response.into_json().expect("json body");
    assert!(
        body.error.contains("expected 10 features"),
        "error should carry the artifact message: {}",
        body.error
    );
}

#[test]
fn unknown_routes_get_a_json_error() {
    let client = stub_client(1, Some(0.9));
    let response = client.get("/nope").dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let body: ErrorResponse = response.into_json().expect("json body");
    assert_eq!(body.error, "resource not found");
}
