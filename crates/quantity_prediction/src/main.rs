// Rust guideline compliant 2026-03-09

//! Quantity-prediction service entry point.
//!
//! Loads the trained artifact once (fatal on failure), wires the registry
//! and forest model into the shared [`Pipeline`] context, and serves the
//! prediction endpoint over actix-web.
//!
//! # Usage
//!
//! ```text
//! RUST_LOG=info cargo run
//!
//! # Environment
//! HOST        bind address      (default 127.0.0.1)
//! PORT        bind port         (default 8080)
//! MODEL_PATH  artifact location (default model/quantity_artifact.json)
//! ```

mod adapters;
mod http;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use adapters::artifact_model::ModelArtifact;
use anyhow::Context as _;
use domain::CategoricalField;
use pipeline::Pipeline;
use std::path::Path;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize the log facade before any other work.
    env_logger::init();

    // -- Trained artifact: the one scoped acquisition. Failure here must
    // prevent the process from serving any request at all.
    let model_path = std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| "model/quantity_artifact.json".to_owned());
    let artifact = ModelArtifact::load(Path::new(&model_path))
        .with_context(|| format!("failed to load model artifact from {model_path}"))?;
    let (registry, model) = artifact.into_parts().context("model artifact is unusable")?;
    log::info!(
        "main.artifact.loaded: path={model_path} municipalities={} species={} transaction_types={}",
        registry.class_count(CategoricalField::Municipality),
        registry.class_count(CategoricalField::Species),
        registry.class_count(CategoricalField::TransactionType)
    );

    // Single process-wide context, shared read-only by all workers.
    let pipeline = web::Data::new(Pipeline::new(registry, model));
    log::info!("main.pipeline.ready: model={}", pipeline.model_name());

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_owned())
        .parse::<u16>()
        .context("PORT must be a valid TCP port")?;
    log::info!("main.server.listening: host={host} port={port}");

    HttpServer::new(move || {
        App::new()
            // The original deployment fronts a browser SPA on another origin.
            .wrap(Cors::permissive())
            .app_data(pipeline.clone())
            .service(http::predict)
            .service(http::health)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
