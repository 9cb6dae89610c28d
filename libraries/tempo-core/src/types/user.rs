/// User domain type
use super::UserId;
use serde::{Deserialize, Serialize};

/// Owner of a post
///
/// Shared read-only between every post the user authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Handle shown in the feed
    pub username: String,

    pub first_name: String,

    pub last_name: String,
}

impl User {
    /// Create a new user
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::new(id),
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// "First Last", or the username when both names are blank
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}
