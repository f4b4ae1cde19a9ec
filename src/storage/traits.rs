use async_trait::async_trait;

use crate::domain::{AlertRule, RuleId};

/// Durable persistence for alert rule records.
///
/// Each call is its own transaction. Errors are opaque to callers; the
/// registry controller wraps them before they leave the crate.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Persist a new record and return its assigned id. `rule.id` is ignored.
    async fn create(&self, rule: &AlertRule) -> anyhow::Result<RuleId>;

    /// Load a record by id.
    async fn fetch(&self, id: RuleId) -> anyhow::Result<Option<AlertRule>>;

    /// Overwrite the record with `rule.id`. Returns false if it does not exist.
    async fn update(&self, rule: &AlertRule) -> anyhow::Result<bool>;

    /// Hard-delete every matching record, returning how many existed.
    async fn delete_many(&self, ids: &[RuleId]) -> anyhow::Result<u64>;

    /// Load every record, ordered by id.
    async fn list(&self) -> anyhow::Result<Vec<AlertRule>>;
}
