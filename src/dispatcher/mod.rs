// SPDX-License-Identifier: MIT
//! Query dispatch: fan one user query out to all fixed model identifiers,
//! wait for every request to settle, and fold per-model failures into
//! placeholder results instead of failing the batch.

pub mod prompt;

use std::sync::Arc;

use futures_util::future;
use serde::Serialize;
use tracing::{info, warn};

use crate::parser::{self, Scores};
use crate::provider::TextModel;

pub use prompt::{build_user_prompt, CONSULTATION_PREAMBLE};

/// The four fixed model identifiers, in request (and result) order.
pub const MODEL_IDS: [&str; 4] = [
    "gemini-2.5-pro",
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gemini-2.0-flash",
];

/// Human label for a model identifier.
pub fn display_name(model_id: &str) -> &'static str {
    match model_id {
        "gemini-2.5-pro" => "Gemini 2.5 Pro",
        "gemini-2.5-flash" => "Gemini 2.5 Flash",
        "gemini-2.5-flash-lite" => "Gemini 2.5 Flash-Lite",
        "gemini-2.0-flash" => "Gemini 2.0 Flash",
        _ => "Unknown Model",
    }
}

/// One model's answer: cleaned display text plus self-reported scores.
/// Immutable once built; a new submission replaces the whole batch.
#[derive(Debug, Clone, Serialize)]
pub struct ModelQueryResult {
    pub model: String,
    pub display_name: String,
    pub response: String,
    pub confidence: f64,
    pub accuracy: f64,
    pub f1: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("query is empty")]
    EmptyQuery,
}

/// Fan the query out to every model in [`MODEL_IDS`] concurrently and wait
/// for all of them to settle.
///
/// Always returns exactly one result per model identifier, in `MODEL_IDS`
/// order.  Per-model failures become placeholders — an availability error
/// scores 0.0 across the board, anything else 0.1 so a failed call stays
/// distinguishable from a genuine zero-confidence answer.
///
/// No timeout is applied; a hung request stalls the whole batch.
pub async fn dispatch(
    model: Arc<dyn TextModel>,
    query: &str,
) -> Result<Vec<ModelQueryResult>, QueryError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(QueryError::EmptyQuery);
    }

    let user_prompt = build_user_prompt(trimmed);
    info!(models = MODEL_IDS.len(), "dispatching consultation batch");

    let calls = MODEL_IDS.iter().map(|&id| {
        let model = model.clone();
        let user_prompt = user_prompt.clone();
        async move {
            match model.generate(id, CONSULTATION_PREAMBLE, &user_prompt).await {
                Ok(raw) => scored_result(id, &raw),
                Err(e) => {
                    warn!(model = id, error = %e, "model call failed");
                    placeholder_result(id, &e.to_string())
                }
            }
        }
    });

    // Wait-for-all barrier: one settled result per model, order preserved.
    Ok(future::join_all(calls).await)
}

fn scored_result(model_id: &str, raw: &str) -> ModelQueryResult {
    let scores = parser::extract_scores(raw);
    ModelQueryResult {
        model: model_id.to_string(),
        display_name: display_name(model_id).to_string(),
        response: parser::clean_display_text(raw),
        confidence: scores.confidence,
        accuracy: scores.accuracy,
        f1: scores.f1,
    }
}

/// Convert a per-model error into a placeholder result.
///
/// Availability wording ("model ... not found / not available / invalid")
/// gets all-zero scores; any other failure gets 0.1 so it remains visually
/// distinct from a real zero-confidence answer.
fn placeholder_result(model_id: &str, error: &str) -> ModelQueryResult {
    let lower = error.to_lowercase();
    let unavailable = lower.contains("model")
        && (lower.contains("not found")
            || lower.contains("not available")
            || lower.contains("invalid"));

    let (scores, response) = if unavailable {
        (
            Scores {
                confidence: 0.0,
                accuracy: 0.0,
                f1: 0.0,
            },
            format!(
                "Model {model_id} is not currently available. It may be temporarily \
                 unavailable or not supported in your region. Please try again later."
            ),
        )
    } else {
        (
            Scores {
                confidence: 0.1,
                accuracy: 0.1,
                f1: 0.1,
            },
            format!("Error: unable to generate a response from this model. Please try again. ({error})"),
        )
    };

    ModelQueryResult {
        model: model_id.to_string(),
        display_name: display_name(model_id).to_string(),
        response,
        confidence: scores.confidence,
        accuracy: scores.accuracy,
        f1: scores.f1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Scripted backend: per-model canned replies or errors.
    struct ScriptedModel {
        replies: HashMap<&'static str, Result<String, String>>,
    }

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn generate(&self, model_id: &str, _system: &str, _user: &str) -> Result<String> {
            match self.replies.get(model_id) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(msg)) => Err(anyhow!("{msg}")),
                None => Ok(
                    "Fine.\n\n**RESPONSE METRICS:**\n- **Confidence Score:** 80%\n- **Accuracy Score:** 85%\n- **F1 Score:** 82%"
                        .to_string(),
                ),
            }
        }
    }

    fn scripted(replies: HashMap<&'static str, Result<String, String>>) -> Arc<dyn TextModel> {
        Arc::new(ScriptedModel { replies })
    }

    #[tokio::test]
    async fn batch_returns_one_result_per_model_in_request_order() {
        let results = dispatch(scripted(HashMap::new()), "headache for a week")
            .await
            .unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(ids, MODEL_IDS);
    }

    #[tokio::test]
    async fn empty_query_rejected_before_dispatch() {
        let err = dispatch(scripted(HashMap::new()), "   \n\t").await.unwrap_err();
        assert!(matches!(err, QueryError::EmptyQuery));
    }

    #[tokio::test]
    async fn unavailable_model_yields_zero_score_placeholder_only_for_that_model() {
        let mut replies = HashMap::new();
        replies.insert(
            "gemini-2.5-flash-lite",
            Err("requested model not found: gemini-2.5-flash-lite".to_string()),
        );
        let results = dispatch(scripted(replies), "dizzy spells").await.unwrap();

        let broken = &results[2];
        assert_eq!(broken.model, "gemini-2.5-flash-lite");
        assert_eq!(broken.confidence, 0.0);
        assert_eq!(broken.accuracy, 0.0);
        assert_eq!(broken.f1, 0.0);
        assert!(broken.response.contains("not currently available"));

        for other in [&results[0], &results[1], &results[3]] {
            assert_eq!(other.confidence, 0.80);
            assert!(!other.response.contains("RESPONSE METRICS"));
        }
    }

    #[tokio::test]
    async fn generic_failure_yields_low_nonzero_scores() {
        let mut replies = HashMap::new();
        replies.insert("gemini-2.0-flash", Err("connection reset by peer".to_string()));
        let results = dispatch(scripted(replies), "sore throat").await.unwrap();

        let broken = &results[3];
        assert_eq!(broken.confidence, 0.1);
        assert_eq!(broken.accuracy, 0.1);
        assert_eq!(broken.f1, 0.1);
        assert!(broken.response.starts_with("Error:"));
    }

    #[tokio::test]
    async fn successful_reply_is_cleaned_and_scored() {
        let results = dispatch(scripted(HashMap::new()), "mild fever").await.unwrap();
        let r = &results[0];
        assert_eq!(r.display_name, "Gemini 2.5 Pro");
        assert_eq!(r.response, "Fine.");
        assert_eq!((r.confidence, r.accuracy, r.f1), (0.80, 0.85, 0.82));
    }

    #[test]
    fn display_name_covers_all_fixed_ids() {
        for id in MODEL_IDS {
            assert_ne!(display_name(id), "Unknown Model");
        }
    }
}
