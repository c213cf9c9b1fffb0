use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory, its subdirectories and an initial `config.json` pointing at
/// `api_url`.
///
/// # Arguments
/// - `cuan_home` - The directory that will be the root of the home directory, e.g.
///   `$HOME/cuanbook`
/// - `api_url` - The base URL of the CuanBook REST backend, e.g. `http://localhost:3000/api`
///
/// # Errors
/// - Returns an error if the directory was already initialized or any file operation fails.
pub async fn init(cuan_home: &Path, api_url: &str) -> Result<Out<()>> {
    let config = Config::create(cuan_home, api_url)
        .await
        .context("Unable to create the CuanBook home directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Created CuanBook home at '{}' using backend {}",
        config.root().display(),
        config.api_url()
    )
    .into())
}
