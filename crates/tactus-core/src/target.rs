//! Interactive surfaces ("targets") and subtree membership.
//!
//! The engine never hit-tests. Every input already names the target it
//! originated from; gestures only need to know whether that origin lies
//! inside the subtree of the target they are bound to.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Opaque identifier of an interactive surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct TargetId(pub u64);

impl TargetId {
    /// Create a new target ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Answers subtree membership questions for the host's surface tree.
pub trait TargetTree {
    /// Parent of `node`, or `None` for a root or an unknown node.
    fn parent(&self, node: TargetId) -> Option<TargetId>;

    /// Whether `node` is `ancestor` itself or lies anywhere below it.
    fn contains(&self, ancestor: TargetId, node: TargetId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}

impl<T: TargetTree + ?Sized> TargetTree for RefCell<T> {
    fn parent(&self, node: TargetId) -> Option<TargetId> {
        self.borrow().parent(node)
    }
}

impl<T: TargetTree + ?Sized> TargetTree for Rc<T> {
    fn parent(&self, node: TargetId) -> Option<TargetId> {
        (**self).parent(node)
    }
}

/// Child → parent map of targets.
///
/// Nodes that were never inserted are treated as roots of their own
/// single-node tree, so a flat host can skip building a hierarchy entirely.
#[derive(Debug, Clone, Default)]
pub struct TargetHierarchy {
    parents: HashMap<TargetId, TargetId>,
}

impl TargetHierarchy {
    /// Create an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `child` below `parent`, replacing any previous parent.
    ///
    /// Attaching a node below itself or one of its descendants would form a
    /// cycle; such requests are refused and return `false`.
    pub fn attach(&mut self, child: TargetId, parent: TargetId) -> bool {
        if self.contains(child, parent) {
            return false;
        }
        self.parents.insert(child, parent);
        true
    }

    /// Builder form of [`attach`](Self::attach).
    #[must_use]
    pub fn with_child(mut self, child: TargetId, parent: TargetId) -> Self {
        self.attach(child, parent);
        self
    }

    /// Detach `node` from its parent. Its own descendants stay attached to it.
    pub fn detach(&mut self, node: TargetId) -> Option<TargetId> {
        self.parents.remove(&node)
    }

    /// Number of parent links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Whether no parent links exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

impl TargetTree for TargetHierarchy {
    fn parent(&self, node: TargetId) -> Option<TargetId> {
        self.parents.get(&node).copied()
    }
}
