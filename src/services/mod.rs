pub mod avatars;
pub mod firebase;
pub mod ledger;
pub mod market;
pub mod ollama;
pub mod qdrant;
pub mod trading_service;
pub mod user_service;
