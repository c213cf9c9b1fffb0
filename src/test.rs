//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::{Backend, Mode, TestBackend, DEMO_EMAIL, DEMO_PASSWORD};
use crate::session::Session;
use crate::Config;
use tempfile::TempDir;
use uuid::Uuid;

/// Test environment with a CuanBook home directory and its own seeded in-memory backend.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a home directory whose API URL is unique, so that `Mode::Test` resolves to a
    /// `TestBackend` that no other test shares.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("cuanbook");
        let api_url = format!("http://{}.test/api", Uuid::new_v4().simple());
        let config = Config::create(&root, &api_url).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Creates the environment and logs in as the demo account.
    pub async fn logged_in() -> Self {
        let env = Self::new().await;
        let token = env
            .backend()
            .login(DEMO_EMAIL, DEMO_PASSWORD)
            .await
            .unwrap();
        env.config
            .session_store()
            .save(&Session::new(token, DEMO_EMAIL))
            .await
            .unwrap();
        env
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        Mode::Test
    }

    /// The in-memory backend that commands run against in this environment.
    pub fn backend(&self) -> TestBackend {
        TestBackend::shared(self.config.api_url().as_str())
    }
}
