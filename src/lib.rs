//! CuanBook: bookkeeping for small businesses, backed by the CuanBook REST service.
//!
//! The library holds everything the `cuan` binary does: the backend client, period reports,
//! exports, the saved session and the business profile.

pub mod api;
pub mod args;
pub mod commands;
mod config;
pub mod dashboard;
mod error;
pub mod export;
pub mod format;
pub mod model;
pub mod profile;
pub mod report;
pub mod session;
mod utils;
pub mod validate;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::{Config, DEFAULT_API_URL};
pub use error::{error_type_of, Error, ErrorType, IntoResult, Result};
