//! ddbackup HTTP Presentation Shell
//!
//! Thin axum layer over the core services: renders the device list and the
//! schedule, accepts the two forms and re-arms the scheduler.

pub mod error;
pub mod handler;
pub mod page;
pub mod server;
pub mod state;

pub use error::HttpError;
pub use server::{router, HttpServer, HttpServerConfig};
pub use state::AppState;
