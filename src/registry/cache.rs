use std::sync::atomic::{AtomicBool, Ordering};

use ahash::AHashMap;
use parking_lot::RwLock;
use tokio::sync::watch;

use crate::domain::{AlertRule, RuleId};

/// In-memory view of every alert rule, read by the evaluation engine.
///
/// All access goes through one reader-writer lock over the whole map.
/// Writers only ever hold it for the map mutation itself; persistence
/// happens before a hook is called.
///
/// Every mutation bumps a generation counter published on a watch channel
/// so consumers know when to take a fresh snapshot.
pub struct RuleRegistry {
    rules: RwLock<AHashMap<RuleId, AlertRule>>,
    generation: watch::Sender<u64>,
    loaded: AtomicBool,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    /// Create an empty registry at generation 0.
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);

        RuleRegistry {
            rules: RwLock::new(AHashMap::new()),
            generation,
            loaded: AtomicBool::new(false),
        }
    }

    /// Copy every cached rule.
    ///
    /// The returned rules are owned by the caller; order is unspecified.
    pub fn snapshot(&self) -> Vec<AlertRule> {
        let read_guard = self.rules.read();
        read_guard.values().cloned().collect()
    }

    /// Copy only rules whose `enabled` flag is explicitly set.
    pub fn enabled_snapshot(&self) -> Vec<AlertRule> {
        let read_guard = self.rules.read();
        read_guard
            .values()
            .filter(|rule| rule.is_enabled())
            .cloned()
            .collect()
    }

    /// Copy a single rule.
    pub fn get(&self, id: RuleId) -> Option<AlertRule> {
        self.rules.read().get(&id).cloned()
    }

    /// Insert or replace the entry for `rule.id`.
    pub fn upsert(&self, rule: AlertRule) {
        {
            let mut write_guard = self.rules.write();
            write_guard.insert(rule.id, rule);
        }
        self.bump();
    }

    /// Evict the given ids. Unknown ids are ignored.
    ///
    /// Returns the number of entries actually removed.
    pub fn remove(&self, ids: &[RuleId]) -> usize {
        let removed = {
            let mut write_guard = self.rules.write();
            ids.iter()
                .filter(|id| write_guard.remove(*id).is_some())
                .count()
        };
        self.bump();
        removed
    }

    /// Replace the whole cache, used when rebuilding from the store.
    pub fn replace_all(&self, rules: Vec<AlertRule>) {
        let fresh: AHashMap<RuleId, AlertRule> =
            rules.into_iter().map(|rule| (rule.id, rule)).collect();
        {
            let mut write_guard = self.rules.write();
            *write_guard = fresh;
        }
        self.loaded.store(true, Ordering::Release);
        self.bump();
    }

    /// True once the cache has been filled from the store.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    /// Current generation, incremented once per mutation.
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Receive a notification whenever the registry changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    fn bump(&self) {
        self.generation.send_modify(|g| *g += 1);
    }
}
