use crate::config::Config;
use crate::enrichment::{build_features, lookup_features};
use crate::errors::AppError;
use crate::models::{LeadFeaturesResponse, LeadQuery, LeadRecord};
use crate::normalizer::Normalizer;
use crate::transunion_client::TransunionClient;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Client for the Transunion lead endpoint.
    pub transunion: TransunionClient,
    /// Field tables used to flatten lead records.
    pub normalizer: Normalizer,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let transunion = TransunionClient::new(&config.transunion)?;
        Ok(Self {
            transunion,
            normalizer: Normalizer::default(),
        })
    }
}

/// Lead routes, without the outer middleware stack.
pub fn lead_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/leads/features", post(lookup_lead_features))
        .route("/api/v1/leads/normalize", post(normalize_lead))
}

/// Full application router with state applied.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(lead_routes())
        .with_state(state)
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-tu-leads",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/leads/features
///
/// Looks the lead up at Transunion and returns its normalized features.
/// An unmatched lead is a successful response with `matched: false`.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `query` - JSON object of identifiers (e.g. `email`, `phone`).
pub async fn lookup_lead_features(
    State(state): State<Arc<AppState>>,
    Json(query): Json<LeadQuery>,
) -> Result<Json<LeadFeaturesResponse>, AppError> {
    tracing::info!("POST /leads/features - params: {:?}", query.keys());

    if query.is_empty() {
        return Err(AppError::BadRequest(
            "At least one identifier required (e.g. email or phone)".to_string(),
        ));
    }

    let response = lookup_features(&state.transunion, &state.normalizer, &query).await?;
    Ok(Json(response))
}

/// POST /api/v1/leads/normalize
///
/// Normalizes a lead record supplied by the caller, without calling Transunion.
/// A `null` body stands for an absent record.
pub async fn normalize_lead(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<LeadFeaturesResponse>, AppError> {
    let record = match body {
        Value::Null => None,
        other => Some(LeadRecord::from_value(other).ok_or_else(|| {
            AppError::BadRequest("Lead record must be a JSON object or null".to_string())
        })?),
    };

    // The caller owns this record, so a bad score is their fault rather than ours.
    let response = build_features(&state.normalizer, record.as_ref()).map_err(|e| match e {
        AppError::InvalidScore { .. } => AppError::BadRequest(e.to_string()),
        other => other,
    })?;

    Ok(Json(response))
}
