//! Which gestures are currently active on which target.
//!
//! Gesture instances consult the registry to honor `preventIf` exclusion and
//! to fill the active-gesture list of every emitted event. Writes are visible
//! to the very next read, including reads by instances dispatched later in
//! the same notification pass.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tactus_core::TargetId;

/// Identity of one gesture instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Registry record of an active instance.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveRecord {
    instance: InstanceId,
    name: String,
}

/// Map of active gesture instances per target.
#[derive(Debug, Default)]
pub struct GestureRegistry {
    active: HashMap<TargetId, Vec<ActiveRecord>>,
    next_instance: u64,
}

impl GestureRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh instance identity.
    pub fn allocate_instance(&mut self) -> InstanceId {
        self.next_instance += 1;
        InstanceId(self.next_instance)
    }

    /// Record `instance` as active on `target`.
    ///
    /// Returns `false` if it already was.
    pub fn register_active(&mut self, target: TargetId, instance: InstanceId, name: &str) -> bool {
        let records = self.active.entry(target).or_default();
        if records.iter().any(|r| r.instance == instance) {
            return false;
        }
        records.push(ActiveRecord {
            instance,
            name: name.to_string(),
        });
        true
    }

    /// Remove the record of `instance` on `target`.
    ///
    /// Returns `false` if there was none.
    pub fn unregister_active(&mut self, target: TargetId, instance: InstanceId) -> bool {
        let Some(records) = self.active.get_mut(&target) else {
            return false;
        };
        let before = records.len();
        records.retain(|r| r.instance != instance);
        let removed = records.len() != before;
        if records.is_empty() {
            self.active.remove(&target);
        }
        removed
    }

    /// Check if `instance` is active on `target`.
    #[must_use]
    pub fn is_active(&self, target: TargetId, instance: InstanceId) -> bool {
        self.active
            .get(&target)
            .is_some_and(|records| records.iter().any(|r| r.instance == instance))
    }

    /// Check if any instance named `name` is active on `target`.
    #[must_use]
    pub fn is_name_active(&self, target: TargetId, name: &str) -> bool {
        self.active
            .get(&target)
            .is_some_and(|records| records.iter().any(|r| r.name == name))
    }

    /// Check if any of `names` is active on `target`.
    #[must_use]
    pub fn any_active<'a, I>(&self, target: TargetId, names: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().any(|n| self.is_name_active(target, n))
    }

    /// Names of the gestures active on `target`.
    #[must_use]
    pub fn active_names(&self, target: TargetId) -> BTreeSet<String> {
        self.active
            .get(&target)
            .map(|records| records.iter().map(|r| r.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Drop every record on `target`.
    pub fn clear_target(&mut self, target: TargetId) {
        self.active.remove(&target);
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Total number of active records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.values().map(Vec::len).sum()
    }

    /// Whether nothing is active anywhere.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
