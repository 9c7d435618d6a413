pub mod user;
pub mod balance;
pub mod user_stock;
pub mod transaction;

pub use user::{User, UserDto};
pub use balance::Balance;
pub use user_stock::{UserStock, UserStockDto};
pub use transaction::{StockTransaction, TransactionDto};
