//! HTTP surface: pages, the per-tool upload endpoint and meta routes.

mod download;
mod error;
pub mod models;
mod pages;
mod server;
pub mod services;
pub mod site;
pub mod state;

pub use download::attachment;
pub use error::{ApiError, CONVERSION_FAILED_MESSAGE};
pub use server::{router, run};
pub use state::AppState;
