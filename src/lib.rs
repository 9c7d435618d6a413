//! Library entrypoint for stockfolio.
//!
//! This file exists mainly to make controller tests easy (integration tests
//! under `tests/` can import the app state, routers, controllers, services).

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod controllers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::AnyPool,
    pub settings: config::Settings,
    pub market: services::market::YahooClient,
    pub firebase: services::firebase::FirebaseClient,
    pub qdrant: services::qdrant::QdrantClient,
    pub ollama: services::ollama::OllamaClient,
    pub trade_locks: services::trading_service::TradeLocks,
}
