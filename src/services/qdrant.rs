use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum QdrantError {
    #[error("vector search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vector search upstream error: {0}")]
    Upstream(String),
}

/// Client for the vector database used by the retrieval Q&A pipeline.
#[derive(Clone)]
pub struct QdrantClient {
    http: Client,
    base_url: String,
    collection: String,
}

impl QdrantClient {
    pub fn new(base_url: String, collection: String) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build http client");

        Self {
            http,
            base_url,
            collection,
        }
    }

    /// Return the payload texts of the points closest to `vector`.
    pub async fn search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<String>, QdrantError> {
        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        );

        let res = self
            .http
            .post(&url)
            .json(&json!({
                "vector": vector,
                "limit": limit,
                "with_payload": true,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(QdrantError::Upstream(format!(
                "search failed: {status} {body}"
            )));
        }

        let envelope = res
            .json::<SearchEnvelope>()
            .await
            .map_err(|e| QdrantError::Upstream(format!("malformed search response: {e}")))?;

        Ok(envelope
            .result
            .into_iter()
            .filter_map(|p| p.payload.and_then(|pl| pl.text))
            .filter(|t| !t.is_empty())
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    result: Vec<SearchPoint>,
}

#[derive(Debug, Deserialize)]
struct SearchPoint {
    payload: Option<Payload>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    text: Option<String>,
}
