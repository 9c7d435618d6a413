pub mod portfolio_controller;
pub mod rag_controller;
pub mod stock_controller;
pub mod trading_controller;
pub mod user_controller;
