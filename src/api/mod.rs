//! HTTP surface.

pub mod routes;

pub use routes::{AppState, REPORT_TOKEN_HEADER, api_routes};
