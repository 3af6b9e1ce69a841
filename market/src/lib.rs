pub mod error;
pub mod finnhub;
pub mod history;
pub mod manager;
pub mod registry;
pub mod types;
