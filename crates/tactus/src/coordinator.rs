//! Per-root facade binding named gestures to targets.

use crate::descriptor::{GestureDescriptor, GestureManifest};
use crate::error::{GestureError, Result};
use crate::event::GestureSink;
use crate::gesture::GestureInstance;
use crate::options::GestureOptionsPatch;
use crate::registry::{GestureRegistry, InstanceId};
use crate::runtime::GestureRuntime;
use crate::tracker::{PointerTracker, SubscriptionId, TrackerConfig};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tactus_core::{TargetId, TargetTree};
use tracing::{debug, warn};

struct Binding {
    instance: Rc<RefCell<GestureInstance>>,
    subscription: SubscriptionId,
}

/// Registers gesture templates on targets and routes their events to a sink.
///
/// Each `(name, target)` pair has at most one live instance.
pub struct GestureCoordinator {
    templates: HashMap<String, GestureDescriptor>,
    bindings: HashMap<TargetId, HashMap<String, Binding>>,
    tracker: Rc<RefCell<PointerTracker>>,
    registry: Rc<RefCell<GestureRegistry>>,
    tree: Rc<dyn TargetTree>,
    sink: Rc<RefCell<dyn GestureSink>>,
}

impl fmt::Debug for GestureCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut templates: Vec<_> = self.templates.keys().collect();
        templates.sort();
        f.debug_struct("GestureCoordinator")
            .field("templates", &templates)
            .field("targets", &self.bindings.len())
            .finish_non_exhaustive()
    }
}

impl GestureCoordinator {
    /// Create a coordinator, initializing the runtime's tracker if needed.
    ///
    /// Built-in templates are available under their default names.
    pub fn new(
        runtime: &mut GestureRuntime,
        config: TrackerConfig,
        tree: Rc<dyn TargetTree>,
        sink: Rc<RefCell<dyn GestureSink>>,
    ) -> Self {
        let tracker = runtime.init_tracker(config);
        let registry = runtime.registry();
        let templates = GestureDescriptor::builtins()
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        Self {
            templates,
            bindings: HashMap::new(),
            tracker,
            registry,
            tree,
            sink,
        }
    }

    /// Add or replace a template. Returns the replaced one.
    pub fn add_template(&mut self, descriptor: GestureDescriptor) -> Option<GestureDescriptor> {
        debug!(gesture = %descriptor.name, kind = ?descriptor.kind, "template added");
        self.templates.insert(descriptor.name.clone(), descriptor)
    }

    /// Add every template of a manifest. Returns how many were added.
    pub fn load_manifest(&mut self, manifest: &GestureManifest) -> usize {
        let descriptors = manifest.descriptors();
        let count = descriptors.len();
        for descriptor in descriptors {
            self.add_template(descriptor);
        }
        count
    }

    /// Parse a YAML manifest and add its templates.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Manifest`] if the YAML does not parse.
    pub fn load_manifest_yaml(&mut self, yaml: &str) -> Result<usize> {
        let manifest = GestureManifest::from_yaml(yaml)?;
        Ok(self.load_manifest(&manifest))
    }

    /// Template registered under `name`.
    #[must_use]
    pub fn template(&self, name: &str) -> Option<&GestureDescriptor> {
        self.templates.get(name)
    }

    /// Bind the template `name` to `target`, optionally overriding options.
    ///
    /// An existing instance of the same name on `target` is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::UnknownGesture`] if no template has that name.
    pub fn register(
        &mut self,
        name: &str,
        target: TargetId,
        overrides: Option<&GestureOptionsPatch>,
    ) -> Result<InstanceId> {
        let Some(template) = self.templates.get(name) else {
            warn!(gesture = name, %target, "unknown gesture");
            return Err(GestureError::UnknownGesture(name.to_string()));
        };
        let mut descriptor = template.clone();
        if let Some(patch) = overrides {
            patch.apply(&mut descriptor.options);
        }

        if self.unbind(name, target) {
            warn!(gesture = name, %target, "gesture registered twice, replacing");
        }

        let id = self.registry.borrow_mut().allocate_instance();
        let instance = Rc::new(RefCell::new(GestureInstance::new(id, descriptor, target)));
        let subscription = {
            let instance = Rc::clone(&instance);
            let registry = Rc::clone(&self.registry);
            let tree = Rc::clone(&self.tree);
            let sink = Rc::clone(&self.sink);
            self.tracker.borrow_mut().subscribe(move |pointers, event| {
                instance.borrow_mut().handle(
                    pointers,
                    event,
                    &*tree,
                    &mut registry.borrow_mut(),
                    &mut *sink.borrow_mut(),
                );
            })
        };

        debug!(gesture = name, %target, instance = %id, "gesture registered");
        self.bindings
            .entry(target)
            .or_default()
            .insert(name.to_string(), Binding {
                instance,
                subscription,
            });
        Ok(id)
    }

    /// Register several templates on `target`, with per-name overrides.
    ///
    /// Unknown names are logged and skipped.
    pub fn register_names(
        &mut self,
        names: &[&str],
        target: TargetId,
        overrides: &HashMap<String, GestureOptionsPatch>,
    ) -> Vec<InstanceId> {
        names
            .iter()
            .filter_map(|name| self.register(name, target, overrides.get(*name)).ok())
            .collect()
    }

    /// Detach the instance `name` from `target`.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NotRegistered`] if there is none.
    pub fn unregister(&mut self, name: &str, target: TargetId) -> Result<()> {
        if self.unbind(name, target) {
            debug!(gesture = name, %target, "gesture unregistered");
            Ok(())
        } else {
            Err(GestureError::NotRegistered {
                name: name.to_string(),
                target,
            })
        }
    }

    /// Detach every instance from `target`. Returns how many there were.
    pub fn unregister_all(&mut self, target: TargetId) -> usize {
        let Some(bindings) = self.bindings.remove(&target) else {
            return 0;
        };
        let count = bindings.len();
        for binding in bindings.into_values() {
            self.release(&binding, target);
        }
        debug!(%target, count, "gestures unregistered");
        count
    }

    fn unbind(&mut self, name: &str, target: TargetId) -> bool {
        let Some(bindings) = self.bindings.get_mut(&target) else {
            return false;
        };
        let Some(binding) = bindings.remove(name) else {
            return false;
        };
        if bindings.is_empty() {
            self.bindings.remove(&target);
        }
        self.release(&binding, target);
        true
    }

    fn release(&self, binding: &Binding, target: TargetId) {
        self.tracker.borrow_mut().unsubscribe(binding.subscription);
        let id = binding.instance.borrow().id();
        self.registry.borrow_mut().unregister_active(target, id);
    }

    /// Update the options of a live instance.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NotRegistered`] if `name` is not bound to
    /// `target`.
    pub fn change_options(
        &mut self,
        name: &str,
        target: TargetId,
        patch: &GestureOptionsPatch,
    ) -> Result<()> {
        let binding = self
            .bindings
            .get(&target)
            .and_then(|b| b.get(name))
            .ok_or_else(|| GestureError::NotRegistered {
                name: name.to_string(),
                target,
            })?;
        binding.instance.borrow_mut().update_options(patch);
        debug!(gesture = name, %target, "options changed");
        Ok(())
    }

    /// Update options from a JSON object of option fields.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::InvalidOptions`] for malformed JSON and
    /// [`GestureError::NotRegistered`] for an unknown binding.
    pub fn change_options_json(&mut self, name: &str, target: TargetId, json: &str) -> Result<()> {
        let patch = GestureOptionsPatch::from_json(json)?;
        self.change_options(name, target, &patch)
    }

    /// Whether `name` is bound to `target`.
    #[must_use]
    pub fn is_registered(&self, name: &str, target: TargetId) -> bool {
        self.bindings
            .get(&target)
            .is_some_and(|b| b.contains_key(name))
    }

    /// Whether the instance `name` on `target` is mid-gesture.
    #[must_use]
    pub fn is_active(&self, name: &str, target: TargetId) -> bool {
        self.bindings
            .get(&target)
            .and_then(|b| b.get(name))
            .is_some_and(|binding| binding.instance.borrow().is_active())
    }

    /// Names bound to `target`, sorted.
    #[must_use]
    pub fn registered_names(&self, target: TargetId) -> Vec<String> {
        let mut names: Vec<String> = self
            .bindings
            .get(&target)
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Targets with at least one binding.
    #[must_use]
    pub fn targets(&self) -> Vec<TargetId> {
        let mut targets: Vec<TargetId> = self.bindings.keys().copied().collect();
        targets.sort();
        targets
    }

    /// Detach everything and tear the runtime down.
    pub fn destroy(mut self, runtime: &mut GestureRuntime) {
        for target in self.targets() {
            self.unregister_all(target);
        }
        runtime.teardown();
    }
}

impl Drop for GestureCoordinator {
    fn drop(&mut self) {
        for (target, bindings) in std::mem::take(&mut self.bindings) {
            for binding in bindings.values() {
                self.release(binding, target);
            }
        }
    }
}
