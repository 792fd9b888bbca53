pub mod api;
pub mod config;
pub mod datasource;
pub mod models;
pub mod services;

pub use config::*;
pub use models::*;
