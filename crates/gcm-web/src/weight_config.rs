//! Weight/Config Store endpoints (spec §4.11, §6): `GET|POST|PUT|DELETE
//! /weight-config`, the tenant query parameter selecting scope and the
//! `history` flag returning the audit trail instead of the live value.

use axum::extract::{Query, State};
use axum::Json;
use gcm_core::config::{AlgorithmParams, ComponentWeights, ConfidenceLevels, WeightConfiguration};
use gcm_core::AuditLogEntry;
use gcm_match::WeightConfigPatch;
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::AuthenticatedUser;
use crate::response::{ok_json, ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct WeightConfigQuery {
    pub tenant_id: Option<String>,
    pub history: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct WeightConfigBody {
    pub weights: Option<ComponentWeights>,
    pub confidence_levels: Option<ConfidenceLevels>,
    pub algorithm_params: Option<AlgorithmParams>,
}

fn scope_for(user: &AuthenticatedUser, query_tenant: Option<&str>) -> Result<String, ApiError> {
    let tenant_id = query_tenant.unwrap_or(&user.tenant_id);
    if tenant_id != user.tenant_id {
        return Err(ApiError::AccessDenied);
    }
    Ok(tenant_id.to_string())
}

pub async fn get_weight_config(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<WeightConfigQuery>,
) -> ApiResult<serde_json::Value> {
    let tenant_id = scope_for(&user, query.tenant_id.as_deref())?;

    if query.history.unwrap_or(false) {
        let history: Vec<AuditLogEntry> = state.weight_config_store.audit_history(&tenant_id).await;
        return ok_json(serde_json::to_value(history).unwrap_or_default());
    }

    let config: WeightConfiguration = state.weight_config_store.get_effective(Some(&tenant_id)).await;
    ok_json(serde_json::to_value(config).unwrap_or_default())
}

async fn apply_patch(
    state: &AppState,
    user: &AuthenticatedUser,
    tenant_id: &str,
    body: WeightConfigBody,
) -> ApiResult<WeightConfiguration> {
    let config_key = gcm_match::tenant_config_key(tenant_id);
    let patch = WeightConfigPatch { weights: body.weights, confidence_levels: body.confidence_levels, algorithm_params: body.algorithm_params };

    let updated = state
        .weight_config_store
        .put(&config_key, tenant_id, patch, &user.user_id)
        .await
        .map_err(|err| ApiError::ProcessingFailed(err.to_string()))?;

    ok_json(updated)
}

pub async fn create_weight_config(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<WeightConfigQuery>,
    Json(body): Json<WeightConfigBody>,
) -> ApiResult<WeightConfiguration> {
    let tenant_id = scope_for(&user, query.tenant_id.as_deref())?;
    apply_patch(&state, &user, &tenant_id, body).await
}

pub async fn update_weight_config(
    state: State<Arc<AppState>>,
    user: AuthenticatedUser,
    query: Query<WeightConfigQuery>,
    body: Json<WeightConfigBody>,
) -> ApiResult<WeightConfiguration> {
    create_weight_config(state, user, query, body).await
}

#[derive(Debug, serde::Serialize)]
pub struct ResetWeightConfigResponse {
    pub reset: bool,
}

pub async fn reset_weight_config(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<WeightConfigQuery>,
) -> ApiResult<ResetWeightConfigResponse> {
    let tenant_id = scope_for(&user, query.tenant_id.as_deref())?;
    let config_key = gcm_match::tenant_config_key(&tenant_id);
    state
        .weight_config_store
        .reset_to_defaults(&config_key, &tenant_id, &user.user_id)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    ok_json(ResetWeightConfigResponse { reset: true })
}
