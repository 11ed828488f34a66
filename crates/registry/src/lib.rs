// Rust guideline compliant 2026-03-02

//! Category Registry component -- the authoritative set of valid labels per
//! categorical field plus the month-name-to-number mapping.
//!
//! Built once at process start from the trained artifact via
//! [`CategoryRegistry::builder`]; immutable and shared read-only afterwards.
//! Lookups are exact and case-sensitive: the registry mirrors the trained
//! encoders, it does not normalize input.

use domain::CategoricalField;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Errors raised while building a [`CategoryRegistry`].
///
/// All of these indicate a deficient trained artifact and are fatal at
/// startup; none can occur per request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The artifact carries no encoder for one of the categorical fields.
    #[error("no label classes supplied for field {field:?}")]
    MissingField {
        /// The field without classes.
        field: CategoricalField,
    },
    /// An encoder was supplied but its class list is empty.
    #[error("empty label class list for field {field:?}")]
    EmptyClasses {
        /// The field with an empty class list.
        field: CategoricalField,
    },
    /// The month-name mapping is empty.
    #[error("month mapping is empty")]
    NoMonths,
    /// A month name maps to a number outside 1-12.
    #[error("month {name:?} maps to invalid number {number}")]
    InvalidMonthNumber {
        /// The offending month name.
        name: String,
        /// The out-of-range number.
        number: u32,
    },
}

// ---------------------------------------------------------------------------
// CategoryRegistry + builder
// ---------------------------------------------------------------------------

/// Per-field ordered label lists and the month-name mapping of the trained
/// artifact.
///
/// Class-list order is significant: a label's position is the integer code
/// the model was trained with, exactly as the artifact's label encoders
/// assigned it. Construct via [`CategoryRegistry::builder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistry {
    classes: BTreeMap<CategoricalField, Vec<String>>,
    months: BTreeMap<String, u32>,
}

/// Builder for [`CategoryRegistry`].
///
/// Obtain via [`CategoryRegistry::builder`]; finalize with
/// [`build`](Self::build).
#[derive(Debug, Default)]
pub struct CategoryRegistryBuilder {
    classes: BTreeMap<CategoricalField, Vec<String>>,
    months: BTreeMap<String, u32>,
}

impl CategoryRegistry {
    /// Create an empty builder.
    #[must_use]
    pub fn builder() -> CategoryRegistryBuilder {
        CategoryRegistryBuilder::default()
    }

    /// The ordered valid labels for `field`.
    #[must_use]
    pub fn valid_values(&self, field: CategoricalField) -> &[String] {
        // Every field is guaranteed present by `build()`.
        self.classes.get(&field).map_or(&[], Vec::as_slice)
    }

    /// Whether `label` is a member of the trained vocabulary for `field`.
    ///
    /// Exact, case-sensitive comparison on a pre-trimmed label.
    #[must_use]
    pub fn contains(&self, field: CategoricalField, label: &str) -> bool {
        self.code(field, label).is_some()
    }

    /// The trained integer code for `label`: its position in the artifact's
    /// ordered class list. `None` when the label is outside the vocabulary.
    #[must_use]
    pub fn code(&self, field: CategoricalField, label: &str) -> Option<usize> {
        self.valid_values(field).iter().position(|l| l == label)
    }

    /// Resolve a month name to its 1-12 number. `None` for unknown names;
    /// matching is exact and case-sensitive.
    #[must_use]
    pub fn month_number(&self, name: &str) -> Option<u32> {
        self.months.get(name).copied()
    }

    /// Number of labels in the vocabulary of `field`.
    #[must_use]
    pub fn class_count(&self, field: CategoricalField) -> usize {
        self.valid_values(field).len()
    }
}

impl CategoryRegistryBuilder {
    /// Supply the ordered class list for `field`, replacing any earlier one.
    #[must_use]
    pub fn classes(mut self, field: CategoricalField, labels: Vec<String>) -> Self {
        self.classes.insert(field, labels);
        self
    }

    /// Add a single month-name mapping entry.
    #[must_use]
    pub fn month(mut self, name: impl Into<String>, number: u32) -> Self {
        self.months.insert(name.into(), number);
        self
    }

    /// Supply the whole month mapping, replacing any earlier entries.
    #[must_use]
    pub fn months(mut self, months: BTreeMap<String, u32>) -> Self {
        self.months = months;
        self
    }

    /// Validate and build the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingField`] or
    /// [`RegistryError::EmptyClasses`] when a categorical field has no
    /// usable class list, [`RegistryError::NoMonths`] when the month mapping
    /// is empty, and [`RegistryError::InvalidMonthNumber`] when a month maps
    /// outside 1-12.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<CategoryRegistry, RegistryError> {
        for field in CategoricalField::ALL {
            match self.classes.get(&field) {
                None => return Err(RegistryError::MissingField { field }),
                Some(labels) if labels.is_empty() => {
                    return Err(RegistryError::EmptyClasses { field });
                }
                Some(_) => {}
            }
        }
        if self.months.is_empty() {
            return Err(RegistryError::NoMonths);
        }
        for (name, number) in &self.months {
            if !(1..=12).contains(number) {
                return Err(RegistryError::InvalidMonthNumber {
                    name: name.clone(),
                    number: *number,
                });
            }
        }
        Ok(CategoryRegistry { classes: self.classes, months: self.months })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
