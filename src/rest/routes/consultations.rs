// rest/routes/consultations.rs — run one consultation batch.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::dispatcher::{self, QueryError};
use crate::parser;
use crate::AppContext;

#[derive(Deserialize)]
pub struct ConsultationRequest {
    pub query: String,
}

/// POST /api/v1/consultations
///
/// Fans the query out to all four models, waits for every call to settle,
/// and returns one entry per model with scores, cleaned text, and the
/// section/fragment tree the client renders.
pub async fn create_consultation(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<ConsultationRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let results = dispatcher::dispatch(ctx.model.clone(), &body.query)
        .await
        .map_err(|e: QueryError| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            )
        })?;

    let results: Vec<Value> = results
        .iter()
        .map(|r| {
            let sections: Vec<Value> = parser::segment(&r.response)
                .iter()
                .map(|s| {
                    json!({
                        "id": s.id,
                        "title": s.title,
                        "fragments": parser::render_section(&s.body),
                    })
                })
                .collect();
            json!({
                "model": r.model,
                "display_name": r.display_name,
                "response": r.response,
                "confidence": r.confidence,
                "accuracy": r.accuracy,
                "f1": r.f1,
                "sections": sections,
            })
        })
        .collect();

    Ok(Json(json!({
        "query": body.query.trim(),
        "results": results,
    })))
}
