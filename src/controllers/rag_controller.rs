use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

const NO_CONTEXT_ANSWER: &str = "The context does not provide enough information.";
const CONTEXT_LIMIT: usize = 3;

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

// POST /api/rag/ask
//
// Stateless pipeline: embed the question, pull the closest context from the
// vector store, then let the model answer against that context only.
pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<Value>, ApiError> {
    let question = req.question.trim();
    if question.is_empty() {
        return Err(ApiError::Validation("Missing question.".to_string()));
    }

    let vector = state.ollama.embed(question).await?;
    let contexts = state.qdrant.search(vector, CONTEXT_LIMIT).await?;

    if contexts.is_empty() {
        return Ok(Json(json!({ "answer": NO_CONTEXT_ANSWER })));
    }

    let context = contexts.join("\n\n");
    let answer = state.ollama.answer_with_context(&context, question).await?;

    Ok(Json(json!({ "answer": answer })))
}

// GET /api/rag/daily-advice
pub async fn daily_advice(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let advice = state.ollama.daily_investment_advice().await?;
    Ok(Json(json!({ "advice": advice })))
}
