use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::domain::{AlertRule, AlertRuleForm, RuleId};
use crate::error::RegistryError;
use crate::observability::MetricsRegistry;
use crate::storage::RuleStore;

use super::cache::RuleRegistry;
use super::validator;

/// Orchestrates rule changes: validate, persist, then update the registry.
///
/// A workflow that fails at any step leaves both the store and the registry
/// as they were. The registry is only touched after the store write
/// succeeded.
///
/// Mutating workflows are serialized by `writes`, held from the first store
/// call until the registry reflects the result, so the registry never
/// applies changes in a different order than the store did. Readers never
/// take it.
pub struct RegistryController {
    store: Arc<dyn RuleStore>,
    registry: Arc<RuleRegistry>,
    metrics: Arc<MetricsRegistry>,
    writes: Mutex<()>,
}

impl RegistryController {
    pub fn new(
        store: Arc<dyn RuleStore>,
        registry: Arc<RuleRegistry>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        RegistryController {
            store,
            registry,
            metrics,
            writes: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// Every cached rule, ordered by id.
    pub fn list(&self) -> Vec<AlertRule> {
        let mut rules = self.registry.snapshot();
        rules.sort_unstable_by_key(|rule| rule.id);
        rules
    }

    /// Create a rule and return its store-assigned id.
    pub async fn create(&self, form: AlertRuleForm) -> Result<RuleId, RegistryError> {
        let mut rule = form.into_rule(0);
        self.validate(&rule)?;

        let _writes = self.writes.lock().await;
        let id = self
            .store
            .create(&rule)
            .await
            .map_err(|e| self.persistence_failure("create", e))?;

        rule.id = id;
        self.registry.upsert(rule);
        self.metrics.record_create();

        info!(rule_id = id, "Alert rule created");
        Ok(id)
    }

    /// Replace every field of an existing rule; only the id is kept.
    pub async fn update(&self, id: RuleId, form: AlertRuleForm) -> Result<RuleId, RegistryError> {
        let _writes = self.writes.lock().await;
        let existing = self
            .store
            .fetch(id)
            .await
            .map_err(|e| self.persistence_failure("fetch", e))?;

        let Some(existing) = existing else {
            self.metrics.record_not_found();
            warn!(rule_id = id, "Update of unknown alert rule");
            return Err(RegistryError::NotFound(id));
        };

        let rule = form.into_rule(existing.id);
        self.validate(&rule)?;

        let updated = self
            .store
            .update(&rule)
            .await
            .map_err(|e| self.persistence_failure("update", e))?;

        // Deleted between fetch and update.
        if !updated {
            self.metrics.record_not_found();
            return Err(RegistryError::NotFound(id));
        }

        self.registry.upsert(rule);
        self.metrics.record_update();

        info!(rule_id = id, "Alert rule updated");
        Ok(id)
    }

    /// Hard-delete a batch of rules. Unknown ids are not an error.
    pub async fn batch_delete(&self, ids: Vec<RuleId>) -> Result<(), RegistryError> {
        let _writes = self.writes.lock().await;
        let deleted = self
            .store
            .delete_many(&ids)
            .await
            .map_err(|e| self.persistence_failure("delete", e))?;

        let evicted = self.registry.remove(&ids);
        self.metrics.record_delete(deleted);

        info!(
            requested = ids.len(),
            deleted = deleted,
            evicted = evicted,
            "Alert rules deleted"
        );
        Ok(())
    }

    fn validate(&self, rule: &AlertRule) -> Result<(), RegistryError> {
        validator::validate(rule).map_err(|e| {
            self.metrics.record_rejection();
            warn!(rule_id = rule.id, reason = %e, "Alert rule rejected");
            RegistryError::from(e)
        })
    }

    fn persistence_failure(&self, operation: &'static str, source: anyhow::Error) -> RegistryError {
        self.metrics.record_persistence_failure();
        error!(operation = operation, error = %source, "Alert rule store failed");
        RegistryError::persistence(operation, source)
    }
}
