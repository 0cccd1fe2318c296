//! Common types shared by the widget service and its collaborators

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{error::AppError, utils::validation, Result};

/// Label shown when no user could be resolved.
pub const ANONYMOUS_LABEL: &str = "Anonymous";

/// Host-assigned unique user name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if !validation::is_valid_username(trimmed) {
            return Err(AppError::validation(format!("Invalid username: {:?}", raw)));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Username::parse(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of identity resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "username", rename_all = "snake_case")]
pub enum Identity {
    User(Username),
    Anonymous,
}

impl Identity {
    pub fn display_name(&self) -> &str {
        match self {
            Identity::User(username) => username.as_str(),
            Identity::Anonymous => ANONYMOUS_LABEL,
        }
    }

    pub fn username(&self) -> Option<&Username> {
        match self {
            Identity::User(username) => Some(username),
            Identity::Anonymous => None,
        }
    }
}

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: Username,
}

/// Community metadata from the directory lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityInfo {
    /// Internal identifier (`t5_...`); absent when the directory did not return one.
    pub id: Option<String>,
    pub name: String,
    pub subscribers_count: u64,
    pub active_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityStyles {
    pub primary_color: Option<String>,
}

/// Transient user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub text: String,
}

impl Toast {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
