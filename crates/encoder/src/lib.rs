// Rust guideline compliant 2026-03-02

//! Encoder Bridge component -- maps validated categorical labels to the
//! integer codes the model was trained with.
//!
//! Entry points: [`EncoderBridge::encode`], [`EncoderBridge::encode_all`].
//! The transaction-type field never uses the registry's raw code directly:
//! a hardcoded canonical table pins `Dispersal -> 0` and `Sale -> 1`.

use domain::{CategoricalField, ValidatedTransaction};
use registry::CategoryRegistry;

// ---------------------------------------------------------------------------
// EncodeError
// ---------------------------------------------------------------------------

/// Errors from the encoder bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The label is outside the trained vocabulary for the field.
    ///
    /// Defensive: unreachable for labels that passed validation, and treated
    /// as an internal error (not a client error) when it does fire.
    #[error("unknown {field}: {value}")]
    UnknownCategory {
        /// The field being encoded.
        field: CategoricalField,
        /// The label that has no trained code.
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Canonical transaction codes
// ---------------------------------------------------------------------------

/// Fixed business codes for the transaction-type field.
///
/// The trained encoder's integers for this field are an accident of
/// training-data ordering; the business contract is `Dispersal = 0`,
/// `Sale = 1`, and that must hold no matter what the artifact says.
const CANONICAL_TRANSACTION_CODES: &[(&str, i64)] = &[("Dispersal", 0), ("Sale", 1)];

// ---------------------------------------------------------------------------
// EncoderBridge
// ---------------------------------------------------------------------------

/// Label-to-code bridge over a [`CategoryRegistry`].
///
/// Borrow-only view: the registry is process-wide immutable state, the
/// bridge is constructed per call site at zero cost.
#[derive(Debug, Clone, Copy)]
pub struct EncoderBridge<'r> {
    registry: &'r CategoryRegistry,
}

impl<'r> EncoderBridge<'r> {
    /// Create a bridge over `registry`.
    #[must_use]
    pub fn new(registry: &'r CategoryRegistry) -> Self {
        Self { registry }
    }

    /// Encode one validated label to its model integer code.
    ///
    /// The registry's encoder is consulted first for every field; for
    /// [`CategoricalField::TransactionType`] the canonical table then
    /// overrides the registry code unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnknownCategory`] when `label` has no trained
    /// code. After validation this is unreachable.
    pub fn encode(&self, field: CategoricalField, label: &str) -> Result<i64, EncodeError> {
        let raw = self
            .registry
            .code(field, label)
            .ok_or_else(|| EncodeError::UnknownCategory { field, value: label.to_owned() })?;
        // usize -> i64: class lists are tiny, far below i64::MAX.
        #[expect(clippy::cast_possible_wrap, reason = "class lists are tiny")]
        let raw = raw as i64;

        if field == CategoricalField::TransactionType
            && let Some((_, canonical)) =
                CANONICAL_TRANSACTION_CODES.iter().find(|(l, _)| *l == label)
        {
            if *canonical != raw {
                log::debug!(
                    "encoder.transaction_override: label={label} raw={raw} canonical={canonical}"
                );
            }
            return Ok(*canonical);
        }
        Ok(raw)
    }

    /// Encode all three categorical fields of a validated transaction.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnknownCategory`] for the first field whose
    /// label has no trained code. After validation this is unreachable.
    pub fn encode_all(&self, tx: &ValidatedTransaction) -> Result<CategoryCodes, EncodeError> {
        Ok(CategoryCodes {
            municipality: self.encode(CategoricalField::Municipality, &tx.municipality)?,
            transaction_type: self
                .encode(CategoricalField::TransactionType, tx.transaction_type.label())?,
            species: self.encode(CategoricalField::Species, &tx.species)?,
        })
    }
}

/// Integer codes for the three categorical fields of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCodes {
    /// Registry code of the municipality label.
    pub municipality: i64,
    /// Canonical transaction code: `Dispersal = 0`, `Sale = 1`.
    pub transaction_type: i64,
    /// Registry code of the species label.
    pub species: i64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
