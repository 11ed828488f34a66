// Rust guideline compliant 2026-03-09

//! Prediction pipeline -- feature assembly, post-processing, and the
//! request-scoped orchestrator.
//!
//! Entry points: [`Pipeline::predict`], plus the pure stages [`assemble`]
//! and [`postprocess`]. [`Pipeline`] is the single process-wide context
//! object: it owns the [`CategoryRegistry`] and the injected [`Model`]
//! adapter, is built once at startup, and is shared read-only by all
//! concurrent requests.

use domain::{FeatureVector, Model, ModelError, Prediction, RawTransaction, ValidatedTransaction};
use encoder::{CategoryCodes, EncodeError, EncoderBridge};
use registry::CategoryRegistry;
use validator::ValidationError;

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Errors from a full pipeline run.
///
/// Only the validation variant is a client error; everything else means the
/// service itself misbehaved and is surfaced generically.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The payload was rejected by the validation state machine.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The encoder was handed a label outside the trained vocabulary.
    /// Unreachable after validation; kept as a defensive internal error.
    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),
    /// The model adapter failed to evaluate the feature vector.
    #[error("model error: {0}")]
    Model(#[from] ModelError),
    /// The model produced NaN or an infinity; surfaced, never clamped.
    #[error("model returned non-finite prediction: {value}")]
    NonFinite {
        /// The offending raw output.
        value: f64,
    },
}

impl PipelineError {
    /// Whether this failure is the client's fault (HTTP 400) rather than an
    /// internal one (HTTP 500).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// ---------------------------------------------------------------------------
// Feature assembly
// ---------------------------------------------------------------------------

/// Order a validated request and its category codes into the model's
/// fixed-width input vector.
///
/// Pure and infallible: both inputs are already validated/encoded. The
/// field order is the training-time contract and lives in
/// [`FeatureVector::new`]'s parameter order.
#[must_use]
pub fn assemble(tx: &ValidatedTransaction, codes: &CategoryCodes) -> FeatureVector {
    FeatureVector::new(
        tx.month,
        tx.year,
        codes.municipality,
        codes.transaction_type,
        tx.cost,
        codes.species,
    )
}

// ---------------------------------------------------------------------------
// Post-processing
// ---------------------------------------------------------------------------

/// Sanitize a raw model output into a response quantity.
///
/// Rounds half away from zero, clamps the lower bound to zero (quantities
/// cannot be negative), applies no upper clamp.
///
/// # Errors
///
/// Returns [`PipelineError::NonFinite`] for NaN or infinite input -- a
/// broken model must be surfaced, not silently clamped.
pub fn postprocess(raw: f64) -> Result<u64, PipelineError> {
    if !raw.is_finite() {
        return Err(PipelineError::NonFinite { value: raw });
    }
    let clamped = raw.round().max(0.0_f64);
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "rounded and zero-clamped on the line above"
    )]
    let quantity = clamped as u64;
    Ok(quantity)
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Process-wide prediction context: registry plus model, wired once.
///
/// Generic over `M: Model` for zero-cost static dispatch; holds no other
/// state, so sharing between worker threads needs no locking.
#[derive(Debug)]
pub struct Pipeline<M: Model> {
    registry: CategoryRegistry,
    model: M,
}

impl<M: Model> Pipeline<M> {
    /// Wire a pipeline from its immutable parts.
    #[must_use]
    pub fn new(registry: CategoryRegistry, model: M) -> Self {
        Self { registry, model }
    }

    /// The category registry backing validation and encoding.
    #[must_use]
    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Name of the injected model adapter.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Run one request through validate -> encode -> assemble -> predict ->
    /// post-process.
    ///
    /// Short-circuits on the first failure; nothing is encoded before the
    /// payload is fully validated and the model is never invoked for a
    /// rejected request.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`] for client-side rejections and
    /// the other variants for internal failures.
    pub fn predict(&self, raw: &RawTransaction) -> Result<Prediction, PipelineError> {
        let tx = validator::validate(raw, &self.registry)?;
        let codes = EncoderBridge::new(&self.registry).encode_all(&tx)?;
        let features = assemble(&tx, &codes);
        log::debug!("pipeline.features: {:?}", features.as_array());

        let raw_output = self.model.predict(&features)?;
        let predicted_quantity = postprocess(raw_output)?;
        log::info!(
            "pipeline.predicted: model={} raw={raw_output} quantity={predicted_quantity}",
            self.model.name()
        );
        Ok(Prediction { predicted_quantity })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use domain::CategoricalField;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    // ------------------------------------------------------------------
    // MockModel helper
    // ------------------------------------------------------------------

    /// Records invocations and the last feature vector; returns a fixed
    /// output (or a forced error).
    struct MockModel {
        output: f64,
        force_error: bool,
        calls: Cell<usize>,
        last_features: RefCell<Option<FeatureVector>>,
    }

    impl MockModel {
        fn returning(output: f64) -> Self {
            Self {
                output,
                force_error: false,
                calls: Cell::new(0),
                last_features: RefCell::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                output: 0.0_f64,
                force_error: true,
                calls: Cell::new(0),
                last_features: RefCell::new(None),
            }
        }
    }

    impl Model for MockModel {
        fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_features.borrow_mut() = Some(features.clone());
            if self.force_error {
                return Err(ModelError::InferenceFailed { reason: "forced".to_owned() });
            }
            Ok(self.output)
        }

        fn name(&self) -> &str {
            "MOCK"
        }
    }

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|l| (*l).to_owned()).collect()
    }

    /// Transaction-type classes stored Sale-first so the raw registry codes
    /// disagree with the canonical business codes.
    fn test_registry() -> CategoryRegistry {
        CategoryRegistry::builder()
            .classes(CategoricalField::Municipality, labels(&["Talibon", "Tubigon"]))
            .classes(CategoricalField::TransactionType, labels(&["Sale", "Dispersal"]))
            .classes(CategoricalField::Species, labels(&["Hito", "Tilapia"]))
            .month("January", 1)
            .build()
            .unwrap()
    }

    fn pipeline(model: MockModel) -> Pipeline<MockModel> {
        Pipeline::new(test_registry(), model)
    }

    fn sale_payload() -> RawTransaction {
        serde_json::from_value(json!({
            "Month": "January",
            "Year": 2023,
            "Municipality": "Tubigon",
            "Transaction Type": "Sale",
            "Cost": 150.0,
            "Species": "Tilapia"
        }))
        .unwrap()
    }

    fn dispersal_payload() -> RawTransaction {
        serde_json::from_value(json!({
            "Month": 1,
            "Year": 2023,
            "Municipality": "Talibon",
            "Transaction Type": "Dispersal",
            "Cost": 0,
            "Species": "Hito"
        }))
        .unwrap()
    }

    // ------------------------------------------------------------------
    // postprocess
    // ------------------------------------------------------------------

    #[test]
    fn postprocess_rounds_half_away_from_zero() {
        assert_eq!(postprocess(2.4_f64).unwrap(), 2);
        assert_eq!(postprocess(2.5_f64).unwrap(), 3);
        assert_eq!(postprocess(41.7_f64).unwrap(), 42);
    }

    #[test]
    fn postprocess_clamps_negatives_to_zero() {
        assert_eq!(postprocess(-0.4_f64).unwrap(), 0);
        assert_eq!(postprocess(-5.0_f64).unwrap(), 0);
    }

    #[test]
    fn postprocess_has_no_upper_clamp() {
        assert_eq!(postprocess(1.0e9_f64).unwrap(), 1_000_000_000);
    }

    #[test]
    fn postprocess_surfaces_non_finite_output() {
        assert!(matches!(postprocess(f64::NAN), Err(PipelineError::NonFinite { .. })));
        assert!(matches!(postprocess(f64::INFINITY), Err(PipelineError::NonFinite { .. })));
        assert!(matches!(
            postprocess(f64::NEG_INFINITY),
            Err(PipelineError::NonFinite { .. })
        ));
    }

    // ------------------------------------------------------------------
    // assemble
    // ------------------------------------------------------------------

    #[test]
    #[expect(clippy::float_cmp, reason = "exact integer-valued literals")]
    fn assemble_orders_fields_for_training_contract() {
        let tx = ValidatedTransaction {
            month: 3,
            year: 2022,
            municipality: "Tubigon".to_owned(),
            transaction_type: domain::TransactionType::Sale,
            cost: 75.5_f64,
            species: "Tilapia".to_owned(),
        };
        let codes = CategoryCodes { municipality: 7, transaction_type: 1, species: 2 };
        let v = assemble(&tx, &codes);
        assert_eq!(v.as_array(), &[3.0_f64, 2022.0_f64, 7.0_f64, 1.0_f64, 75.5_f64, 2.0_f64]);
    }

    // ------------------------------------------------------------------
    // Pipeline: success path
    // ------------------------------------------------------------------

    #[test]
    fn valid_sale_yields_sanitized_prediction() {
        let p = pipeline(MockModel::returning(41.7_f64));
        let prediction = p.predict(&sale_payload()).unwrap();
        assert_eq!(prediction, Prediction { predicted_quantity: 42 });
        assert_eq!(p.model.calls.get(), 1);
    }

    #[test]
    fn negative_model_output_clamps_to_zero() {
        let p = pipeline(MockModel::returning(-3.2_f64));
        let prediction = p.predict(&sale_payload()).unwrap();
        assert_eq!(prediction.predicted_quantity, 0);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "codes are exact integer-valued floats")]
    fn sale_transaction_code_is_always_one() {
        // The registry stores Sale at index 0; the canonical override must
        // still place 1 in the feature vector.
        let p = pipeline(MockModel::returning(1.0_f64));
        p.predict(&sale_payload()).unwrap();
        let features = p.model.last_features.borrow().clone().unwrap();
        assert_eq!(features.as_array()[3], 1.0_f64);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "codes are exact integer-valued floats")]
    fn dispersal_transaction_code_is_always_zero() {
        // Registry index for Dispersal is 1; canonical override pins 0.
        let p = pipeline(MockModel::returning(1.0_f64));
        p.predict(&dispersal_payload()).unwrap();
        let features = p.model.last_features.borrow().clone().unwrap();
        assert_eq!(features.as_array()[3], 0.0_f64);
    }

    #[test]
    fn month_name_and_number_feed_identical_vectors() {
        let by_name = pipeline(MockModel::returning(1.0_f64));
        by_name.predict(&sale_payload()).unwrap();

        let body = json!({
            "Month": 1,
            "Year": 2023,
            "Municipality": "Tubigon",
            "Transaction Type": "Sale",
            "Cost": 150.0,
            "Species": "Tilapia"
        });
        let by_number = pipeline(MockModel::returning(1.0_f64));
        by_number.predict(&serde_json::from_value(body).unwrap()).unwrap();

        assert_eq!(
            *by_name.model.last_features.borrow(),
            *by_number.model.last_features.borrow()
        );
    }

    // ------------------------------------------------------------------
    // Pipeline: rejection short-circuits
    // ------------------------------------------------------------------

    #[test]
    fn unknown_species_never_reaches_the_model() {
        let p = pipeline(MockModel::returning(1.0_f64));
        let body = json!({
            "Month": "January",
            "Year": 2023,
            "Municipality": "Tubigon",
            "Transaction Type": "Sale",
            "Cost": 150.0,
            "Species": "Unicorn"
        });
        let result = p.predict(&serde_json::from_value(body).unwrap());
        let err = result.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "unknown species: Unicorn");
        assert_eq!(p.model.calls.get(), 0, "rejected requests must not run inference");
    }

    #[test]
    fn invalid_month_never_reaches_the_model() {
        let p = pipeline(MockModel::returning(1.0_f64));
        let body = json!({
            "Month": 13,
            "Year": 2023,
            "Municipality": "Tubigon",
            "Transaction Type": "Sale",
            "Cost": 150.0,
            "Species": "Tilapia"
        });
        let result = p.predict(&serde_json::from_value(body).unwrap());
        assert!(result.unwrap_err().is_client_error());
        assert_eq!(p.model.calls.get(), 0);
    }

    #[test]
    fn costed_dispersal_never_reaches_the_model() {
        let p = pipeline(MockModel::returning(1.0_f64));
        let body = json!({
            "Month": 1,
            "Year": 2023,
            "Municipality": "Talibon",
            "Transaction Type": "Dispersal",
            "Cost": 50.0,
            "Species": "Hito"
        });
        let result = p.predict(&serde_json::from_value(body).unwrap());
        assert!(matches!(
            result,
            Err(PipelineError::Validation(ValidationError::InvalidCost { .. }))
        ));
        assert_eq!(p.model.calls.get(), 0);
    }

    // ------------------------------------------------------------------
    // Pipeline: internal failures
    // ------------------------------------------------------------------

    #[test]
    fn non_finite_model_output_is_internal() {
        let p = pipeline(MockModel::returning(f64::NAN));
        let err = p.predict(&sale_payload()).unwrap_err();
        assert!(matches!(err, PipelineError::NonFinite { .. }));
        assert!(!err.is_client_error());
    }

    #[test]
    fn model_failure_is_internal() {
        let p = pipeline(MockModel::failing());
        let err = p.predict(&sale_payload()).unwrap_err();
        assert!(matches!(err, PipelineError::Model(_)));
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "model error: inference failed: forced");
    }
}
