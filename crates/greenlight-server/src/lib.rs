//! # Greenlight Server
//!
//! JSON REST API for the Greenlight movie catalogue.
//!
//! - [`Application`]: routes a collected request to its handler and turns
//!   every failure into a `{"error": ...}` envelope
//! - [`Server`]: hyper HTTP/1 loop with body limits, timeouts, panic
//!   recovery and graceful shutdown
//!
//! ## Routes
//!
//! | Method | Path | |
//! |--------|------|-|
//! | `GET` | `/v1/healthcheck` | availability, environment, version |
//! | `POST` | `/v1/movies` | create a movie |
//! | `GET` | `/v1/movies/{id}` | show a movie |
//! | `PATCH` | `/v1/movies/{id}` | partially update a movie |
//! | `DELETE` | `/v1/movies/{id}` | delete a movie |

#![doc(html_root_url = "https://docs.rs/greenlight-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod errors;
mod handlers;
pub mod routes;
mod server;
pub mod shutdown;

pub use app::Application;
pub use errors::{
    ApiError, ServerError, EDIT_CONFLICT_MESSAGE, NOT_FOUND_MESSAGE, SERVER_ERROR_MESSAGE,
    TIMEOUT_MESSAGE,
};
pub use routes::{Endpoint, RouteOutcome, Router};
pub use server::{HttpResponse, Server, REQUEST_ID_HEADER};
pub use shutdown::ShutdownSignal;

/// Version reported by the healthcheck.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
