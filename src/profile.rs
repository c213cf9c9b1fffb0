//! The business profile shown on the account page and printed at the top of exported reports.

use crate::error::{ErrorType, IntoResult};
use crate::{utils, validate, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub email: String,
}

/// Partial update of a `Profile`. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub business_name: Option<String>,
    pub owner_name: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.business_name.is_none()
            && self.owner_name.is_none()
            && self.contact.is_none()
            && self.email.is_none()
    }
}

impl Profile {
    /// Validates each field in `update` and applies it. Nothing changes if any field is invalid.
    pub fn apply(&mut self, update: ProfileUpdate) -> Result<()> {
        if let Some(name) = &update.business_name {
            validate::required(name, "Nama bisnis")?;
        }
        if let Some(name) = &update.owner_name {
            validate::required(name, "Nama pemilik")?;
        }
        if let Some(contact) = &update.contact {
            validate::phone(contact)?;
        }
        if let Some(email) = &update.email {
            validate::email(email)?;
        }
        if let Some(v) = update.business_name {
            self.business_name = v.trim().to_string();
        }
        if let Some(v) = update.owner_name {
            self.owner_name = v.trim().to_string();
        }
        if let Some(v) = update.contact {
            self.contact = v.split_whitespace().collect();
        }
        if let Some(v) = update.email {
            self.email = v.trim().to_string();
        }
        Ok(())
    }
}

/// Reads and writes `profile.json`.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the saved profile, or an empty one if none has been saved yet.
    pub async fn load(&self) -> Result<Profile> {
        if !self.path.is_file() {
            return Ok(Profile::default());
        }
        utils::deserialize(&self.path)
            .await
            .pub_result(ErrorType::Io)
    }

    pub async fn save(&self, profile: &Profile) -> Result<()> {
        utils::serialize(&self.path, profile)
            .await
            .pub_result(ErrorType::Io)
    }
}
