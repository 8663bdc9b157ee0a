pub mod arcade;
pub mod bridge;
pub mod config;
