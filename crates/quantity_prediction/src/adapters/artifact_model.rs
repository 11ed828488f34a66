// Rust guideline compliant 2026-03-09

//! Trained-artifact adapter: loads the JSON export of the training run and
//! implements the `Model` port over its serialized regression forest.
//!
//! The artifact mirrors the training side's bundle layout: a `model` entry
//! (the forest), one ordered class list per categorical field under
//! `label_encoders`, and the `month_mapping`. Any missing or structurally
//! deficient part is an [`ArtifactError`] -- fatal at startup, never a
//! per-request condition.

use domain::{CategoricalField, FeatureVector, Model, ModelError};
use registry::{CategoryRegistry, RegistryError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ArtifactError
// ---------------------------------------------------------------------------

/// Errors raised while loading the trained artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// The artifact file could not be read.
    #[error("artifact read failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
    /// The artifact is not valid JSON for the expected layout.
    #[error("artifact parse failed: {source}")]
    Parse {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },
    /// The artifact parsed but its content is unusable.
    #[error("artifact malformed: {reason}")]
    Malformed {
        /// Human-readable description of the deficiency.
        reason: String,
    },
    /// The artifact's encoders do not form a valid category registry.
    #[error("artifact registry invalid: {source}")]
    Registry {
        /// The underlying registry build error.
        #[from]
        source: RegistryError,
    },
}

// ---------------------------------------------------------------------------
// Forest layout
// ---------------------------------------------------------------------------

/// One node of a serialized regression tree, in array layout.
///
/// Internal nodes carry a feature index, a threshold, and the indices of
/// both children; leaves have `feature: null` and carry the predicted value.
#[derive(Debug, Clone, Deserialize)]
struct TreeNode {
    feature: Option<usize>,
    #[serde(default)]
    threshold: f64,
    #[serde(default)]
    left: usize,
    #[serde(default)]
    right: usize,
    #[serde(default)]
    value: f64,
}

/// A single regression tree: node 0 is the root.
#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<TreeNode>,
}

fn default_model_name() -> String {
    "random_forest_quantity".to_owned()
}

/// The `model` entry of the artifact.
#[derive(Debug, Clone, Deserialize)]
struct ForestSpec {
    #[serde(default = "default_model_name")]
    name: String,
    trees: Vec<Tree>,
}

// ---------------------------------------------------------------------------
// ModelArtifact
// ---------------------------------------------------------------------------

/// Parsed trained-artifact bundle, not yet split into registry and model.
#[derive(Debug, Deserialize)]
pub struct ModelArtifact {
    model: ForestSpec,
    label_encoders: BTreeMap<String, Vec<String>>,
    month_mapping: BTreeMap<String, u32>,
}

impl ModelArtifact {
    /// Read and parse the artifact file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Io`] when the file cannot be read,
    /// [`ArtifactError::Parse`] for invalid JSON, and
    /// [`ArtifactError::Malformed`] for a structurally deficient forest.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse an artifact from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Parse`] for invalid JSON and
    /// [`ArtifactError::Malformed`] for a structurally deficient forest.
    pub fn from_json_str(text: &str) -> Result<Self, ArtifactError> {
        let artifact: Self = serde_json::from_str(text)?;
        artifact.check()?;
        Ok(artifact)
    }

    /// Structural checks that serde cannot express.
    fn check(&self) -> Result<(), ArtifactError> {
        if self.model.trees.is_empty() {
            return Err(ArtifactError::Malformed { reason: "model has no trees".to_owned() });
        }
        for (i, tree) in self.model.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ArtifactError::Malformed { reason: format!("tree {i} has no nodes") });
            }
        }
        for field in CategoricalField::ALL {
            if !self.label_encoders.contains_key(field.wire_name()) {
                return Err(ArtifactError::Malformed {
                    reason: format!("no label encoder for {}", field.wire_name()),
                });
            }
        }
        Ok(())
    }

    /// Split the artifact into the process-wide registry and the model
    /// adapter.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Registry`] when the encoder class lists or
    /// the month mapping do not form a valid [`CategoryRegistry`].
    pub fn into_parts(self) -> Result<(CategoryRegistry, ForestModel), ArtifactError> {
        let mut encoders = self.label_encoders;
        let mut builder = CategoryRegistry::builder().months(self.month_mapping);
        for field in CategoricalField::ALL {
            // Presence was verified by `check()`.
            if let Some(classes) = encoders.remove(field.wire_name()) {
                builder = builder.classes(field, classes);
            }
        }
        let registry = builder.build()?;
        let model = ForestModel { name: self.model.name, trees: self.model.trees };
        Ok((registry, model))
    }
}

// ---------------------------------------------------------------------------
// ForestModel
// ---------------------------------------------------------------------------

/// Concrete adapter for the `domain::Model` port: a serialized regression
/// forest evaluated by plain node-array traversal, averaged across trees.
#[derive(Debug)]
pub struct ForestModel {
    name: String,
    trees: Vec<Tree>,
}

impl ForestModel {
    /// Walk one tree from the root to a leaf.
    ///
    /// Malformed node/feature indices and non-terminating traversals are
    /// reported as inference failures rather than panicking: the artifact
    /// is external input.
    fn eval_tree(tree: &Tree, features: &[f64; 6]) -> Result<f64, ModelError> {
        let mut idx = 0usize;
        // A valid root-to-leaf path visits each node at most once.
        for _ in 0..=tree.nodes.len() {
            let node = tree.nodes.get(idx).ok_or_else(|| ModelError::InferenceFailed {
                reason: format!("tree node index {idx} out of bounds"),
            })?;
            let Some(feature) = node.feature else {
                return Ok(node.value);
            };
            let x = features.get(feature).ok_or_else(|| ModelError::InferenceFailed {
                reason: format!("feature index {feature} out of bounds"),
            })?;
            idx = if *x <= node.threshold { node.left } else { node.right };
        }
        Err(ModelError::InferenceFailed { reason: "tree traversal did not terminate".to_owned() })
    }
}

impl Model for ForestModel {
    /// Average the per-tree regression outputs.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InferenceFailed` for an empty or malformed
    /// forest.
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InferenceFailed { reason: "model has no trees".to_owned() });
        }
        let mut total = 0.0_f64;
        for tree in &self.trees {
            total += Self::eval_tree(tree, features.as_array())?;
        }
        #[expect(clippy::cast_precision_loss, reason = "tree counts are tiny")]
        let count = self.trees.len() as f64;
        Ok(total / count)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
