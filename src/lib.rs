pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod state;

pub use app::app;
pub use config::AppConfig;
pub use error::{ApiError, DomainError};
pub use state::{AppState, Stores};
