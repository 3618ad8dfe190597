//! Structured logging for Greenlight services.
//!
//! - **Logging**: JSON or pretty output through `tracing-subscriber`, with an
//!   `EnvFilter` built from the configured level.
//! - **Request spans**: one span per request carrying a UUID v7 request id,
//!   the method and the path.
//!
//! # Example
//!
//! ```rust,ignore
//! use greenlight_telemetry::{init_logging, request_span, new_request_id, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//!
//! let span = request_span(&new_request_id(), &http::Method::GET, "/v1/movies/1");
//! let _guard = span.enter();
//! tracing::info!("handling request");
//! ```

#![doc(html_root_url = "https://docs.rs/greenlight-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{
    create_env_filter, fields, init_logging, new_request_id, request_span, LogConfig,
    SERVICE_NAME,
};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
