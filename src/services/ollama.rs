use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

// Local models can be slow to answer, so the generation gateway gets a much
// more relaxed bound than the market/identity gateways.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation upstream error: {0}")]
    Upstream(String),
}

/// Client for the local inference server: embeddings for retrieval, text
/// generation for answers.
#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
    embed_model: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, embed_model: String) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build http client");

        Self {
            http,
            base_url,
            model,
            embed_model,
        }
    }

    /// Embed a piece of text with the embedding model.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, OllamaError> {
        let url = format!("{}/api/embeddings", self.base_url);

        let res = self
            .http
            .post(&url)
            .json(&json!({
                "model": self.embed_model,
                "prompt": text,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(OllamaError::Upstream(format!(
                "embedding failed: {status} {body}"
            )));
        }

        let body = res
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| OllamaError::Upstream(format!("malformed embedding response: {e}")))?;

        Ok(body.embedding)
    }

    /// Run one non-streaming generation and return the raw response text.
    pub async fn generate(&self, prompt: &str) -> Result<String, OllamaError> {
        let url = format!("{}/api/generate", self.base_url);

        let res = self
            .http
            .post(&url)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(OllamaError::Upstream(format!(
                "generation failed: {status} {body}"
            )));
        }

        let body = res
            .json::<GenerateResponse>()
            .await
            .map_err(|e| OllamaError::Upstream(format!("malformed generation response: {e}")))?;

        Ok(body.response)
    }

    /// Answer a question constrained to the retrieved context.
    pub async fn answer_with_context(
        &self,
        context: &str,
        question: &str,
    ) -> Result<String, OllamaError> {
        let prompt = format!(
            r#"
You are an AI assistant answering based **only** on the provided context.

**Context:**
{context}

**User Question:**
{question}

**Instructions:**
- **Your answer MUST contain at least one direct quote** from the context.
- **Format your quote exactly like this:**
  'According to the text: "..."'.
- If the context **does not provide enough information**, respond with:
  'The context does not provide enough information to answer this question.'
- **DO NOT** use external knowledge beyond the given context.
- **DO NOT** paraphrase the quotes, use the exact wording from the context.

Now answer the question strictly following these instructions.
"#
        );

        self.generate(&prompt).await
    }

    /// Daily market-insight blurb rendered by the frontend widget; the rigid
    /// TITLE/CONTENT/POINTS framing is what the widget parses.
    pub async fn daily_investment_advice(&self) -> Result<String, OllamaError> {
        let prompt = r#"
You are an AI Investment Advisor providing daily stock market insights. Your response will be displayed directly in a widget, so you MUST follow this exact format:

TITLE: [Compelling investment insight title - under 40 characters]
CONTENT: [2-3 sentences analyzing current market trends and giving specific actionable advice]
POINTS:
- success: [One positive market opportunity - one sentence]
- warning: [One specific risk to monitor - one sentence]
- info: [One concrete actionable recommendation - one sentence]

IMPORTANT RULES:
1. If you're uncertain about market conditions, create plausible advice based on current investment best practices.
2. ALWAYS maintain the exact format with TITLE:, CONTENT:, and POINTS: keywords.
3. ALWAYS include exactly three points with the labels success:, warning:, and info:.
4. Provide ONLY the formatted output with no additional text before or after.
"#;

        self.generate(prompt).await
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}
