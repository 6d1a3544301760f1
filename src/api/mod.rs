//! Backend API integration
//!
//! Provides the HTTP client for the navigation tree, textbook metadata,
//! the PDF proxy, and the streaming chat endpoint.

pub mod client;
pub mod error;
pub mod models;
pub mod streaming;

// Re-export commonly used types
pub use client::ApiClient;
pub use error::ApiError;
pub use models::{ChatRequest, Message, Role, StreamEvent};
