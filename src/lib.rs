pub mod config;
pub mod error;
pub mod ingest;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod similarity;
pub mod store;

pub use error::{AppError, AppResult};
