// Rust guideline compliant 2026-03-09

//! Adapters (secondary ports) for the quantity-prediction binary.
//!
//! Each sub-module implements one or more hexagonal port traits defined in
//! the `domain` crate. Adapters are intentionally isolated from pipeline
//! logic.

pub mod artifact_model;
