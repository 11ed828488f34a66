// Rust guideline compliant 2026-03-02

//! Shared domain types for the quantity-prediction pipeline.
//!
//! Defines the wire payload [`RawTransaction`], the validator output
//! [`ValidatedTransaction`], the model input [`FeatureVector`], the response
//! types [`Prediction`] / [`ErrorResponse`], and the hexagonal [`Model`] port.
//! All pipeline components depend on this crate; no other workspace crate is
//! imported here.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Wire payload
// ---------------------------------------------------------------------------

/// Untyped prediction request as received on the wire.
///
/// Every field is optional at the serde level: presence and type checking are
/// the validator's job, so a structurally odd payload still deserializes and
/// gets a descriptive rejection instead of a framework-generated one.
///
/// The canonical key for the transaction-type field is `"Transaction Type"`
/// (space form). The `"Transaction_Type"` spelling used by one historical
/// deployment is intentionally not accepted; dual naming was itself a source
/// of inconsistency.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTransaction {
    /// Month as number (1-12) or month name; resolved by the validator.
    #[serde(rename = "Month")]
    pub month: Option<serde_json::Value>,
    /// Calendar year.
    #[serde(rename = "Year")]
    pub year: Option<serde_json::Value>,
    /// Municipality label, must match the trained vocabulary exactly.
    #[serde(rename = "Municipality")]
    pub municipality: Option<serde_json::Value>,
    /// `"Sale"` or `"Dispersal"`.
    #[serde(rename = "Transaction Type")]
    pub transaction_type: Option<serde_json::Value>,
    /// Transaction cost; business-ruled against the transaction type.
    #[serde(rename = "Cost")]
    pub cost: Option<serde_json::Value>,
    /// Species label, must match the trained vocabulary exactly.
    #[serde(rename = "Species")]
    pub species: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Categorical fields
// ---------------------------------------------------------------------------

/// The three categorical fields that are label-encoded before inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoricalField {
    /// Municipality of the transaction.
    Municipality,
    /// Sale or dispersal.
    TransactionType,
    /// Species transacted.
    Species,
}

impl CategoricalField {
    /// All encoded categorical fields, in wire order.
    pub const ALL: [Self; 3] = [Self::Municipality, Self::TransactionType, Self::Species];

    /// The exact JSON key and artifact-encoder key for this field.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Municipality => "Municipality",
            Self::TransactionType => "Transaction Type",
            Self::Species => "Species",
        }
    }
}

impl fmt::Display for CategoricalField {
    /// Human-readable lowercase name, used in error messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Municipality => "municipality",
            Self::TransactionType => "transaction type",
            Self::Species => "species",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Transaction type
// ---------------------------------------------------------------------------

/// The two business transaction types.
///
/// Labels are stable wire values; anything else is outside the trained
/// vocabulary and rejected during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    /// Stock dispersal to growers; always zero-cost.
    Dispersal,
    /// Commercial sale; always positive-cost.
    Sale,
}

impl TransactionType {
    /// Both variants, in canonical-code order.
    pub const ALL: [Self; 2] = [Self::Dispersal, Self::Sale];

    /// The exact wire label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Dispersal => "Dispersal",
            Self::Sale => "Sale",
        }
    }

    /// Parse an exact (case-sensitive, pre-trimmed) wire label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tt| tt.label() == label)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Validated request
// ---------------------------------------------------------------------------

/// A fully validated prediction request, ready for encoding.
///
/// Only the validator produces values of this type; every invariant of the
/// validation state machine (month in 1-12, labels inside the trained
/// vocabulary, cost consistent with the transaction type) holds by
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTransaction {
    /// Resolved month number, 1-12.
    pub month: u32,
    /// Calendar year, unbounded.
    pub year: i64,
    /// Trimmed municipality label, present in the registry.
    pub municipality: String,
    /// Parsed transaction type.
    pub transaction_type: TransactionType,
    /// Finite, non-negative cost consistent with `transaction_type`.
    pub cost: f64,
    /// Trimmed species label, present in the registry.
    pub species: String,
}

// ---------------------------------------------------------------------------
// Feature vector
// ---------------------------------------------------------------------------

/// The fixed-order numeric input of the trained model.
///
/// Order and arity are a hard contract with training time:
/// `(month, year, municipality_code, transaction_code, cost, species_code)`.
/// Reordering produces silently wrong predictions, which is why the only
/// constructor takes each scalar as a named parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f64; 6]);

impl FeatureVector {
    /// Number of features the model was trained with.
    pub const LEN: usize = 6;

    /// Build a feature vector in the training-time order.
    #[expect(
        clippy::cast_precision_loss,
        reason = "years and category codes are far below 2^52"
    )]
    #[must_use]
    pub fn new(
        month: u32,
        year: i64,
        municipality_code: i64,
        transaction_code: i64,
        cost: f64,
        species_code: i64,
    ) -> Self {
        Self([
            f64::from(month),
            year as f64,
            municipality_code as f64,
            transaction_code as f64,
            cost,
            species_code as f64,
        ])
    }

    /// The raw numeric array, in training-time order.
    #[must_use]
    pub fn as_array(&self) -> &[f64; 6] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Successful prediction: a sanitized, non-negative integer quantity.
///
/// Derived per request, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// Rounded, zero-clamped model output.
    pub predicted_quantity: u64,
}

/// Failure payload shape shared by client and internal errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error string.
    pub error: String,
}

// ---------------------------------------------------------------------------
// Model port
// ---------------------------------------------------------------------------

/// Errors from the `Model` hexagonal port.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Inference could not be completed.
    #[error("inference failed: {reason}")]
    InferenceFailed {
        /// Human-readable description.
        reason: String,
    },
}

/// Hexagonal port: the pre-trained regression model.
///
/// Implemented by concrete artifact adapters in the binary crate. The
/// pipeline depends exclusively on this trait -- never on a concrete adapter.
/// Inference is CPU-bound and bounded, so the port is synchronous; the raw
/// scalar output is sanitized by the pipeline post-processor, not here.
pub trait Model {
    /// Predict the raw (unrounded, unclamped) quantity for `features`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InferenceFailed` when the model cannot evaluate
    /// the vector.
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError>;

    /// Name of this model (e.g. `"random_forest_quantity"`).
    fn name(&self) -> &str;
}
