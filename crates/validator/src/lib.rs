// Rust guideline compliant 2026-03-02

//! Input Validator component -- turns a raw wire payload into a
//! [`ValidatedTransaction`] or a single, descriptive [`ValidationError`].
//!
//! Entry point: [`validate`]. The checks run as an ordered state machine
//! (`Received -> FieldsExtracted -> MonthResolved -> CategoriesChecked ->
//! CostChecked -> Valid`); the first violated rule wins and short-circuits,
//! so exactly one failure is ever reported per request and nothing is
//! encoded before the whole payload is known-good.

use domain::{CategoricalField, RawTransaction, TransactionType, ValidatedTransaction};
use registry::CategoryRegistry;

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Rejection reasons, one per state-machine rule.
///
/// All variants are client errors; the HTTP layer surfaces the `Display`
/// message verbatim with a 400 status.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A required field is absent (or JSON `null`).
    #[error("missing required field: {field}")]
    MissingField {
        /// Wire name of the absent field.
        field: &'static str,
    },
    /// A field is present but cannot be coerced to its required type.
    #[error("field {field} must be {expected}")]
    TypeError {
        /// Wire name of the offending field.
        field: &'static str,
        /// What the field must coerce to.
        expected: &'static str,
    },
    /// Month is neither a known month name nor an integer in 1-12.
    #[error("Month must be 1-12 or a valid month name")]
    InvalidMonth,
    /// A categorical label is outside the trained vocabulary.
    #[error("unknown {field}: {value}")]
    UnknownCategory {
        /// The field whose vocabulary was missed.
        field: CategoricalField,
        /// The trimmed label that was rejected.
        value: String,
    },
    /// The cost violates the transaction-type business rule.
    #[error("invalid cost {cost} for {transaction_type} transaction: {rule}")]
    InvalidCost {
        /// The parsed transaction type.
        transaction_type: TransactionType,
        /// The offending cost.
        cost: f64,
        /// The violated rule, human-readable.
        rule: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

/// Coerce a JSON value to an integer: integer numbers, integral floats, and
/// trimmed integer strings all pass.
#[expect(
    clippy::float_cmp,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "integral floats are accepted verbatim; bounds are checked before the cast"
)]
fn coerce_integer(value: &serde_json::Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if let Some(f) = value.as_f64()
        && f.is_finite()
        && f.fract() == 0.0_f64
        && (i64::MIN as f64..=i64::MAX as f64).contains(&f)
    {
        return Some(f as i64);
    }
    value.as_str().and_then(|s| s.trim().parse::<i64>().ok())
}

/// Coerce a JSON value to a finite decimal: numbers and trimmed numeric
/// strings pass.
fn coerce_decimal(value: &serde_json::Value) -> Option<f64> {
    let f = match value.as_f64() {
        Some(f) => f,
        None => value.as_str().and_then(|s| s.trim().parse::<f64>().ok())?,
    };
    f.is_finite().then_some(f)
}

/// Coerce a JSON value to a trimmed string.
fn coerce_string(value: &serde_json::Value) -> Option<String> {
    value.as_str().map(|s| s.trim().to_owned())
}

// ---------------------------------------------------------------------------
// State machine steps
// ---------------------------------------------------------------------------

/// State `FieldsExtracted`: every field present and type-coerced.
///
/// Month is carried raw -- its dual string/number nature is resolved by the
/// next state, with its own rejection reason.
#[derive(Debug)]
struct ExtractedFields {
    month: serde_json::Value,
    year: i64,
    municipality: String,
    transaction_type: String,
    cost: f64,
    species: String,
}

/// `Received -> FieldsExtracted`: presence and type coercion.
fn extract_fields(raw: &RawTransaction) -> Result<ExtractedFields, ValidationError> {
    let month = raw
        .month
        .clone()
        .ok_or(ValidationError::MissingField { field: "Month" })?;
    let year = raw
        .year
        .as_ref()
        .ok_or(ValidationError::MissingField { field: "Year" })
        .map(coerce_integer)?
        .ok_or(ValidationError::TypeError { field: "Year", expected: "an integer" })?;
    let municipality = raw
        .municipality
        .as_ref()
        .ok_or(ValidationError::MissingField { field: "Municipality" })
        .map(coerce_string)?
        .ok_or(ValidationError::TypeError { field: "Municipality", expected: "a string" })?;
    let transaction_type = raw
        .transaction_type
        .as_ref()
        .ok_or(ValidationError::MissingField { field: "Transaction Type" })
        .map(coerce_string)?
        .ok_or(ValidationError::TypeError {
            field: "Transaction Type",
            expected: "a string",
        })?;
    let cost = raw
        .cost
        .as_ref()
        .ok_or(ValidationError::MissingField { field: "Cost" })
        .map(coerce_decimal)?
        .filter(|c| *c >= 0.0_f64)
        .ok_or(ValidationError::TypeError {
            field: "Cost",
            expected: "a non-negative number",
        })?;
    let species = raw
        .species
        .as_ref()
        .ok_or(ValidationError::MissingField { field: "Species" })
        .map(coerce_string)?
        .ok_or(ValidationError::TypeError { field: "Species", expected: "a string" })?;

    Ok(ExtractedFields { month, year, municipality, transaction_type, cost, species })
}

/// `FieldsExtracted -> MonthResolved`: name mapping first for string input,
/// integer coercion with range check otherwise.
fn resolve_month(
    month: &serde_json::Value,
    registry: &CategoryRegistry,
) -> Result<u32, ValidationError> {
    if let Some(name) = month.as_str()
        && let Some(number) = registry.month_number(name.trim())
    {
        return Ok(number);
    }
    let number = coerce_integer(month).ok_or(ValidationError::InvalidMonth)?;
    match u32::try_from(number) {
        Ok(m) if (1..=12).contains(&m) => Ok(m),
        _ => Err(ValidationError::InvalidMonth),
    }
}

/// `MonthResolved -> CategoriesChecked`: exact membership in the trained
/// vocabulary, checked in order municipality, species, transaction type;
/// the first failing field is reported.
fn check_categories(
    fields: &ExtractedFields,
    registry: &CategoryRegistry,
) -> Result<TransactionType, ValidationError> {
    if !registry.contains(CategoricalField::Municipality, &fields.municipality) {
        return Err(ValidationError::UnknownCategory {
            field: CategoricalField::Municipality,
            value: fields.municipality.clone(),
        });
    }
    if !registry.contains(CategoricalField::Species, &fields.species) {
        return Err(ValidationError::UnknownCategory {
            field: CategoricalField::Species,
            value: fields.species.clone(),
        });
    }
    if !registry.contains(CategoricalField::TransactionType, &fields.transaction_type) {
        return Err(ValidationError::UnknownCategory {
            field: CategoricalField::TransactionType,
            value: fields.transaction_type.clone(),
        });
    }
    // Membership alone is not enough: the business rules only know the two
    // canonical variants, so an exotic registry label is still unknown.
    TransactionType::from_label(&fields.transaction_type).ok_or_else(|| {
        ValidationError::UnknownCategory {
            field: CategoricalField::TransactionType,
            value: fields.transaction_type.clone(),
        }
    })
}

/// `CategoriesChecked -> CostChecked`: dispersals are free, sales are not.
#[expect(clippy::float_cmp, reason = "exact zero is the business rule")]
fn check_cost(transaction_type: TransactionType, cost: f64) -> Result<(), ValidationError> {
    match transaction_type {
        TransactionType::Dispersal if cost != 0.0_f64 => Err(ValidationError::InvalidCost {
            transaction_type,
            cost,
            rule: "cost must be exactly 0",
        }),
        TransactionType::Sale if cost <= 0.0_f64 => Err(ValidationError::InvalidCost {
            transaction_type,
            cost,
            rule: "cost must be greater than 0",
        }),
        TransactionType::Dispersal | TransactionType::Sale => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

/// Run the full validation state machine over a raw payload.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered, in state-machine
/// order: presence/type, month, category membership, cost rule.
pub fn validate(
    raw: &RawTransaction,
    registry: &CategoryRegistry,
) -> Result<ValidatedTransaction, ValidationError> {
    let fields = extract_fields(raw)?;
    let month = resolve_month(&fields.month, registry)?;
    let transaction_type = check_categories(&fields, registry)?;
    check_cost(transaction_type, fields.cost)?;

    log::debug!(
        "validator.accepted: month={month} year={} municipality={} type={} species={}",
        fields.year,
        fields.municipality,
        transaction_type,
        fields.species
    );
    Ok(ValidatedTransaction {
        month,
        year: fields.year,
        municipality: fields.municipality,
        transaction_type,
        cost: fields.cost,
        species: fields.species,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
