use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    pub firebase_api_key: String,
    pub starting_balance: f64,

    pub qdrant_url: String,
    pub qdrant_collection: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub ollama_embed_model: String,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost:5432/stockfolio".to_string());

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let firebase_api_key = env::var("FIREBASE_API_KEY").unwrap_or_default();

    let starting_balance = env::var("STARTING_BALANCE")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(10_000.0);

    let qdrant_url = env::var("QDRANT_URL")
        .unwrap_or_else(|_| "http://localhost:6333".to_string());

    let qdrant_collection = env::var("QDRANT_COLLECTION")
        .unwrap_or_else(|_| "investing_data".to_string());

    let ollama_url = env::var("OLLAMA_URL")
        .unwrap_or_else(|_| "http://localhost:11434".to_string());

    let ollama_model = env::var("OLLAMA_MODEL").unwrap_or_else(|_| "gemma:2b".to_string());

    let ollama_embed_model =
        env::var("OLLAMA_EMBED_MODEL").unwrap_or_else(|_| "nomic-embed-text".to_string());

    Settings {
        database_url,
        host,
        port,
        firebase_api_key,
        starting_balance,
        qdrant_url,
        qdrant_collection,
        ollama_url,
        ollama_model,
        ollama_embed_model,
    }
}
