use tracing::info;

use crate::error::RegistryError;
use crate::storage::RuleStore;

use super::cache::RuleRegistry;

/// Rebuild the registry from every record in the store.
///
/// Called once at process start, before any request is served. Returns the
/// number of rules loaded.
pub async fn rebuild(store: &dyn RuleStore, registry: &RuleRegistry) -> Result<usize, RegistryError> {
    let rules = store
        .list()
        .await
        .map_err(|e| RegistryError::persistence("list", e))?;

    let count = rules.len();
    let enabled = rules.iter().filter(|rule| rule.is_enabled()).count();
    registry.replace_all(rules);

    info!(rules = count, enabled = enabled, "Alert rule registry rebuilt");
    Ok(count)
}
