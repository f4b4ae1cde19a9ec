use anyhow::bail;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::{AlertRule, RuleId};

use super::traits::RuleStore;

/// In-process rule store.
///
/// Used when no database is configured, and by tests.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    inner: Mutex<Inner>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: RuleId,
    records: BTreeMap<RuleId, AlertRule>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail until cleared (for testing).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every fetch and list fail until cleared (for testing).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of stored records (for assertions).
    pub fn record_count(&self) -> usize {
        self.inner.lock().records.len()
    }

    fn check_writable(&self) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("memory store rejected write");
        }
        Ok(())
    }

    fn check_readable(&self) -> anyhow::Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("memory store rejected read");
        }
        Ok(())
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn create(&self, rule: &AlertRule) -> anyhow::Result<RuleId> {
        self.check_writable()?;

        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;

        let mut record = rule.clone();
        record.id = id;
        inner.records.insert(id, record);

        Ok(id)
    }

    async fn fetch(&self, id: RuleId) -> anyhow::Result<Option<AlertRule>> {
        self.check_readable()?;
        Ok(self.inner.lock().records.get(&id).cloned())
    }

    async fn update(&self, rule: &AlertRule) -> anyhow::Result<bool> {
        self.check_writable()?;

        let mut inner = self.inner.lock();
        match inner.records.get_mut(&rule.id) {
            Some(existing) => {
                *existing = rule.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_many(&self, ids: &[RuleId]) -> anyhow::Result<u64> {
        self.check_writable()?;

        let mut inner = self.inner.lock();
        let deleted = ids
            .iter()
            .filter(|id| inner.records.remove(*id).is_some())
            .count();

        Ok(deleted as u64)
    }

    async fn list(&self) -> anyhow::Result<Vec<AlertRule>> {
        self.check_readable()?;
        Ok(self.inner.lock().records.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DurationRule, RuleExpression, TriggerMode};

    fn rule(name: &str) -> AlertRule {
        AlertRule {
            id: 0,
            name: name.to_string(),
            rules: vec![RuleExpression::Duration(DurationRule {
                metric: "memory".to_string(),
                min: None,
                max: Some(95.0),
                duration: 5,
            })],
            trigger_mode: TriggerMode::Always,
            fail_trigger_tasks: Default::default(),
            recover_trigger_tasks: Default::default(),
            notification_group_id: 0,
            enabled: Some(true),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = MemoryRuleStore::new();

        let first = store.create(&rule("a")).await.unwrap();
        let second = store.create(&rule("b")).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(store.fetch(2).await.unwrap().unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_update_missing_returns_false() {
        let store = MemoryRuleStore::new();
        let mut missing = rule("ghost");
        missing.id = 42;

        assert!(!store.update(&missing).await.unwrap());
        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_many_ignores_unknown_ids() {
        let store = MemoryRuleStore::new();
        let id = store.create(&rule("a")).await.unwrap();
        store.create(&rule("b")).await.unwrap();

        let deleted = store.delete_many(&[id, 1000]).await.unwrap();

        assert_eq!(deleted, 1);
        assert!(store.fetch(id).await.unwrap().is_none());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fail_writes() {
        let store = MemoryRuleStore::new();
        store.set_fail_writes(true);

        assert!(store.create(&rule("a")).await.is_err());
        assert!(store.delete_many(&[1]).await.is_err());

        store.set_fail_writes(false);
        assert!(store.create(&rule("a")).await.is_ok());
    }
}
