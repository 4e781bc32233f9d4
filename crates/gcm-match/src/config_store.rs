//! Weight/Config Store (C11, spec §4.11): GET with tenant → global →
//! built-in-defaults fallback, PUT/POST merge-and-validate, DELETE reset
//! to defaults. Every mutation writes an immutable audit row (spec §7).

use chrono::Utc;
use gcm_core::audit::AuditLogEntry;
use gcm_core::config::{
    validate_weight_configuration, AlgorithmParams, ComponentWeights, ConfidenceLevels, WeightConfigError,
    WeightConfiguration,
};
use gcm_storage::{KvError, KvTable};
use std::sync::Arc;
use thiserror::Error;

pub const GLOBAL_CONFIG_KEY: &str = "global";

pub fn tenant_config_key(tenant_id: &str) -> String {
    format!("tenant_{tenant_id}")
}

#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error(transparent)]
    Validation(#[from] WeightConfigError),
}

/// Fields a caller may update; `None` means "leave unchanged", matching
/// the source's merge-update semantics (spec §4.11 POST/PUT).
#[derive(Debug, Clone, Default)]
pub struct WeightConfigPatch {
    pub weights: Option<ComponentWeights>,
    pub confidence_levels: Option<ConfidenceLevels>,
    pub algorithm_params: Option<AlgorithmParams>,
}

pub struct WeightConfigStore {
    table: Arc<dyn KvTable<WeightConfiguration>>,
    audit_log: Arc<dyn KvTable<Vec<AuditLogEntry>>>,
}

impl WeightConfigStore {
    pub fn new(table: Arc<dyn KvTable<WeightConfiguration>>, audit_log: Arc<dyn KvTable<Vec<AuditLogEntry>>>) -> Self {
        Self { table, audit_log }
    }

    fn default_configuration(config_key: &str) -> WeightConfiguration {
        WeightConfiguration {
            config_key: config_key.to_string(),
            weights: ComponentWeights::default(),
            confidence_levels: ConfidenceLevels::default(),
            algorithm_params: AlgorithmParams::default(),
            version: 0,
            updated_by: "system".to_string(),
            updated_at: Utc::now(),
        }
    }

    /// Per-tenant config, falling back to global, falling back to
    /// built-in defaults (spec §4.11 GET contract).
    pub async fn get_effective(&self, tenant_id: Option<&str>) -> WeightConfiguration {
        if let Some(tenant_id) = tenant_id {
            if let Some(cfg) = self.table.get(&tenant_config_key(tenant_id)).await {
                return cfg;
            }
        }
        if let Some(cfg) = self.table.get(GLOBAL_CONFIG_KEY).await {
            return cfg;
        }
        Self::default_configuration(tenant_id.map(tenant_config_key).as_deref().unwrap_or(GLOBAL_CONFIG_KEY))
    }

    async fn append_audit(&self, tenant_id: &str, caller_identity: &str, action_type: &str, details: serde_json::Value) {
        let entry = AuditLogEntry {
            tenant_id: tenant_id.to_string(),
            timestamp: Utc::now(),
            caller_identity: caller_identity.to_string(),
            target_resource: format!("weight_configuration/{tenant_id}"),
            action_type: action_type.to_string(),
            details,
        };
        let key = tenant_id.to_string();
        let mut rows = self.audit_log.get(&key).await.unwrap_or_default();
        rows.push(entry);
        self.audit_log.upsert(key, rows).await;
    }

    fn emit_weight_gauges(config_key: &str, weights: &ComponentWeights) {
        for (name, value) in weights.as_pairs() {
            tracing::info!(target: "metrics", gauge = "weight_config.weight", config_key, component = name, value, "weight changed");
        }
    }

    fn emit_threshold_gauges(config_key: &str, levels: &ConfidenceLevels) {
        tracing::info!(target: "metrics", gauge = "weight_config.confidence_high", config_key, value = levels.high);
        tracing::info!(target: "metrics", gauge = "weight_config.confidence_medium", config_key, value = levels.medium);
        tracing::info!(target: "metrics", gauge = "weight_config.confidence_low", config_key, value = levels.low);
    }

    /// Merge-update with validation (spec §4.11). `config_key` is either
    /// `"global"` or `tenant_<id>`; `tenant_id` for the audit row is
    /// derived from the caller's claims, not parsed back out of the key.
    pub async fn put(
        &self,
        config_key: &str,
        tenant_id_for_audit: &str,
        patch: WeightConfigPatch,
        caller_identity: &str,
    ) -> Result<WeightConfiguration, ConfigStoreError> {
        let existing = self.table.get(config_key).await.unwrap_or_else(|| Self::default_configuration(config_key));

        let weights = patch.weights.unwrap_or(existing.weights);
        let confidence_levels = patch.confidence_levels.unwrap_or(existing.confidence_levels);
        let algorithm_params = patch.algorithm_params.unwrap_or(existing.algorithm_params);

        validate_weight_configuration(&weights, &confidence_levels, &algorithm_params)?;

        let updated = WeightConfiguration {
            config_key: config_key.to_string(),
            weights,
            confidence_levels,
            algorithm_params,
            version: existing.version + 1,
            updated_by: caller_identity.to_string(),
            updated_at: Utc::now(),
        };

        self.table.upsert(config_key.to_string(), updated.clone()).await;

        let diff = serde_json::json!({
            "previous_version": existing.version,
            "new_version": updated.version,
            "weights_changed": existing.weights != updated.weights,
            "confidence_levels_changed": existing.confidence_levels != updated.confidence_levels,
            "algorithm_params_changed": existing.algorithm_params != updated.algorithm_params,
        });
        self.append_audit(tenant_id_for_audit, caller_identity, "weight_config_update", diff).await;

        Self::emit_weight_gauges(config_key, &updated.weights);
        Self::emit_threshold_gauges(config_key, &updated.confidence_levels);

        Ok(updated)
    }

    /// Resets `config_key` to built-in defaults (spec §4.11 DELETE).
    pub async fn reset_to_defaults(
        &self,
        config_key: &str,
        tenant_id_for_audit: &str,
        caller_identity: &str,
    ) -> Result<(), KvError> {
        let previous = self.table.get(config_key).await;
        self.table.delete(config_key).await;
        self.append_audit(
            tenant_id_for_audit,
            caller_identity,
            "weight_config_reset",
            serde_json::json!({ "had_previous_override": previous.is_some() }),
        )
        .await;
        Ok(())
    }

    pub async fn audit_history(&self, tenant_id: &str) -> Vec<AuditLogEntry> {
        self.audit_log.get(tenant_id).await.unwrap_or_default()
    }
}
