//! Typed client for the knowledge-base chat backend.
//!
//! Wraps the backend REST API (`/api/chat`, `/api/history`,
//! `/api/clear-history`, `/api/search`, `/health`, `/config`) with typed
//! payloads, a client-enforced request timeout, and an error taxonomy that
//! distinguishes transport failures, timeouts, HTTP-level errors, and
//! application-level rejections.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use config::{ApiConfig, DEFAULT_BASE_URL, REQUEST_TIMEOUT};
pub use error::{ApiError, ApiResult};
