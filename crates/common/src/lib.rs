//! NoteGraph Common Library
//!
//! Shared code for the NoteGraph services including:
//! - Database models and repository patterns
//! - The citation / knowledge-graph engine
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Metrics and observability

pub mod auth;
pub mod citation;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use citation::{CitationService, CitationStyle, RenderResult, Renderer};
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
