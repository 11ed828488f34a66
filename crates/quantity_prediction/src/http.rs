// Rust guideline compliant 2026-03-09

//! HTTP surface of the quantity-prediction service.
//!
//! `POST /predict` runs the pipeline; `GET /health` reports liveness.
//! Client rejections surface their descriptive message with a 400; internal
//! failures are logged with full detail server-side and answered with a
//! generic 500 body, never with internal state.

use crate::adapters::artifact_model::ForestModel;
use actix_web::{HttpResponse, Responder, get, post, web};
use domain::{ErrorResponse, RawTransaction};
use pipeline::Pipeline;

/// Run one prediction request through the shared pipeline context.
#[post("/predict")]
pub async fn predict(
    pipeline: web::Data<Pipeline<ForestModel>>,
    payload: web::Json<RawTransaction>,
) -> impl Responder {
    let request_id = uuid::Uuid::new_v4();
    log::debug!("http.predict.received: request_id={request_id}");

    match pipeline.predict(&payload) {
        Ok(prediction) => {
            log::info!(
                "http.predict.ok: request_id={request_id} quantity={}",
                prediction.predicted_quantity
            );
            HttpResponse::Ok().json(prediction)
        }
        Err(e) if e.is_client_error() => {
            log::warn!("http.predict.rejected: request_id={request_id} reason={e}");
            HttpResponse::BadRequest().json(ErrorResponse { error: e.to_string() })
        }
        Err(e) => {
            // Full detail stays in the server log only.
            log::error!("http.predict.internal: request_id={request_id} detail={e}");
            HttpResponse::InternalServerError()
                .json(ErrorResponse { error: "internal prediction error".to_owned() })
        }
    }
}

/// Liveness probe; also names the loaded model.
#[get("/health")]
pub async fn health(pipeline: web::Data<Pipeline<ForestModel>>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "model": pipeline.model_name(),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
