//! fittrack - Personal workout log
//!
//! Records, body measurements, history and progress charts on top of a
//! hosted or embedded backend.

pub mod analytics;
pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod exercises;
pub mod models;
pub mod session;
pub mod share;
pub mod tui;
pub mod validation;
pub mod workflows;

pub use db::LocalBackend;
pub use error::{AppError, AppResult, BackendError};
