use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics registry for the application.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Rules successfully created
    pub rules_created_total: AtomicU64,

    /// Rules successfully updated
    pub rules_updated_total: AtomicU64,

    /// Records removed by batch deletes
    pub rules_deleted_total: AtomicU64,

    /// Definitions rejected by validation
    pub validation_rejections_total: AtomicU64,

    /// Updates addressed to unknown ids
    pub not_found_total: AtomicU64,

    /// Store operations that failed
    pub persistence_failures_total: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
    pub rejections: u64,
    pub not_found: u64,
    pub persistence_failures: u64,
}

impl MetricsRegistry {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        MetricsRegistry::default()
    }

    pub fn record_create(&self) {
        self.rules_created_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_update(&self) {
        self.rules_updated_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self, deleted: u64) {
        self.rules_deleted_total.fetch_add(deleted, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.validation_rejections_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_found(&self) {
        self.not_found_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persistence_failure(&self) {
        self.persistence_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            created: self.rules_created_total.load(Ordering::Relaxed),
            updated: self.rules_updated_total.load(Ordering::Relaxed),
            deleted: self.rules_deleted_total.load(Ordering::Relaxed),
            rejections: self.validation_rejections_total.load(Ordering::Relaxed),
            not_found: self.not_found_total.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures_total.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus format.
    ///
    /// Registry size and generation are gauges owned by the registry, so the
    /// caller passes them in.
    pub fn to_prometheus(&self, cached_rules: usize, generation: u64, uptime_secs: u64) -> String {
        let m = self.snapshot();

        format!(
            r#"# HELP alertd_uptime_seconds Application uptime in seconds
# TYPE alertd_uptime_seconds counter
alertd_uptime_seconds {}

# HELP alertd_registry_rules Alert rules currently cached
# TYPE alertd_registry_rules gauge
alertd_registry_rules {}

# HELP alertd_registry_generation Registry mutations since start
# TYPE alertd_registry_generation counter
alertd_registry_generation {}

# HELP alertd_rule_changes_total Successful alert rule changes
# TYPE alertd_rule_changes_total counter
alertd_rule_changes_total{{op="create"}} {}
alertd_rule_changes_total{{op="update"}} {}
alertd_rule_changes_total{{op="delete"}} {}

# HELP alertd_validation_rejections_total Rule definitions rejected by validation
# TYPE alertd_validation_rejections_total counter
alertd_validation_rejections_total {}

# HELP alertd_not_found_total Changes addressed to unknown rule ids
# TYPE alertd_not_found_total counter
alertd_not_found_total {}

# HELP alertd_persistence_failures_total Failed store operations
# TYPE alertd_persistence_failures_total counter
alertd_persistence_failures_total {}
"#,
            uptime_secs,
            cached_rules,
            generation,
            m.created,
            m.updated,
            m.deleted,
            m.rejections,
            m.not_found,
            m.persistence_failures,
        )
    }
}
