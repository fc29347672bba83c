//! Gesture templates and YAML gesture manifests.

use crate::error::Result;
use crate::options::{GestureOptions, GestureOptionsPatch};
use serde::{Deserialize, Serialize};

/// Recognition strategy of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GestureKind {
    /// Threshold-activated translation of the pointer centroid
    Pan,
    /// Change of pointer spread
    Pinch,
    /// Change of pointer angle
    Rotate,
    /// Continuous centroid tracking, including hover
    Move,
    /// Short press counting
    Tap,
    /// Scroll/zoom deltas from the wheel channel
    TurnWheel,
}

impl GestureKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Pan,
        Self::Pinch,
        Self::Rotate,
        Self::Move,
        Self::Tap,
        Self::TurnWheel,
    ];

    /// Name of the built-in template for this kind.
    #[must_use]
    pub const fn default_name(&self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::Pinch => "pinch",
            Self::Rotate => "rotate",
            Self::Move => "move",
            Self::Tap => "tap",
            Self::TurnWheel => "wheel",
        }
    }

    /// Check if this kind goes through start/ongoing/end phases.
    #[must_use]
    pub const fn is_multi_phase(&self) -> bool {
        matches!(self, Self::Pan | Self::Pinch | Self::Rotate | Self::Move)
    }

    /// Default options for this kind.
    #[must_use]
    pub fn default_options(&self) -> GestureOptions {
        let base = GestureOptions::default();
        match self {
            Self::Pan => GestureOptions {
                threshold: 10.0,
                ..base
            },
            Self::Pinch | Self::Rotate => GestureOptions {
                min_pointers: 2,
                ..base
            },
            Self::Move => GestureOptions {
                min_pointers: 0,
                prevent_default: false,
                ..base
            },
            Self::Tap => GestureOptions {
                max_pointers: 1,
                ..base
            },
            Self::TurnWheel => base,
        }
    }
}

/// Immutable gesture template, cloned once per target on registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureDescriptor {
    /// Gesture name, also the prefix of emitted event names
    pub name: String,
    /// Recognition strategy
    pub kind: GestureKind,
    /// Options
    pub options: GestureOptions,
}

impl GestureDescriptor {
    /// Create a descriptor with the kind's default options.
    pub fn new(name: impl Into<String>, kind: GestureKind) -> Self {
        Self {
            name: name.into(),
            options: kind.default_options(),
            kind,
        }
    }

    /// Built-in template of a kind under its default name.
    #[must_use]
    pub fn builtin(kind: GestureKind) -> Self {
        Self::new(kind.default_name(), kind)
    }

    /// All built-in templates.
    #[must_use]
    pub fn builtins() -> Vec<Self> {
        GestureKind::ALL.iter().map(|k| Self::builtin(*k)).collect()
    }

    /// Apply an options patch.
    #[must_use]
    pub fn with_options(mut self, patch: &GestureOptionsPatch) -> Self {
        patch.apply(&mut self.options);
        self
    }
}

/// One gesture entry in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Gesture name
    pub name: String,
    /// Recognition strategy
    pub kind: GestureKind,
    /// Options overriding the kind's defaults
    #[serde(flatten)]
    pub options: GestureOptionsPatch,
}

/// Gesture templates loaded from YAML.
///
/// ```yaml
/// gestures:
///   - name: swipe
///     kind: pan
///     threshold: 40
///     directions: [left, right]
///   - name: doubleTap
///     kind: tap
///     maxTaps: 2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureManifest {
    /// Gesture entries
    #[serde(default)]
    pub gestures: Vec<ManifestEntry>,
}

impl GestureManifest {
    /// Parse a manifest from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Resolve entries into descriptors.
    #[must_use]
    pub fn descriptors(&self) -> Vec<GestureDescriptor> {
        self.gestures
            .iter()
            .map(|entry| GestureDescriptor::new(entry.name.clone(), entry.kind).with_options(&entry.options))
            .collect()
    }
}
