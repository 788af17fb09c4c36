//! Request handlers for the screener API

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Query, State,
    },
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::inference::CompanyForm;

use super::error::{Result, ServerError};
use super::openapi::openapi_document;
use super::state::AppState;
use super::templates;

// ============================================================================
// UI Handlers
// ============================================================================

pub async fn serve_index() -> Html<String> {
    Html(templates::index_page())
}

pub async fn predict_form() -> Html<String> {
    Html(templates::predict_page())
}

// ============================================================================
// Prediction Handlers
// ============================================================================

/// Unwrap the submitted form, turning extractor rejections into JSON errors
fn company_form(
    fields: std::result::Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<CompanyForm> {
    let Form(fields) = fields.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
    Ok(CompanyForm::new(fields))
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    fields: std::result::Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Json<Value>> {
    let form = company_form(fields)?;
    let prediction = state.predictor.predict(&form)?;

    info!(
        label = prediction.label,
        probability = prediction.positive_probability,
        "Served prediction"
    );

    Ok(Json(json!({
        "Prediction": prediction.label,
        "Confidence": prediction.confidence_text(),
    })))
}

pub async fn predict_outcomes(
    State(state): State<Arc<AppState>>,
    fields: std::result::Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Json<Value>> {
    let form = company_form(fields)?;
    let outcomes = state.predictor.predict_outcomes(&form)?;

    let results: BTreeMap<String, Value> = outcomes
        .into_iter()
        .map(|r| {
            (
                format!("{} Prediction", r.target.short_name()),
                json!({
                    "outcome": r.outcome,
                    "prediction": r.prediction,
                    "probability": r.probability,
                }),
            )
        })
        .collect();

    Ok(Json(json!({ "results": results })))
}

// ============================================================================
// Search Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    company_name: String,
    format: Option<String>,
}

pub async fn search_companies(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return ServerError::BadRequest(rejection.body_text()).into_response(),
    };
    let hits = state.index.search(&params.company_name);
    debug!(query = %params.company_name, matches = hits.len(), "Company search");

    match params.format.as_deref() {
        Some("json") => Json(hits).into_response(),
        _ => Html(templates::search_results_page(
            &params.company_name,
            state.index.columns(),
            &hits,
        ))
        .into_response(),
    }
}

// ============================================================================
// System Handlers
// ============================================================================

pub async fn openapi_spec() -> Json<Value> {
    Json(openapi_document())
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let uptime = chrono::Utc::now().signed_duration_since(state.started_at);
    let contract = state.predictor.contract();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": uptime.num_seconds(),
        "features": contract.len(),
        "contract": contract.fingerprint(),
        "companies": state.index.len(),
    }))
}
