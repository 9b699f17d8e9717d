//! Customers

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Stable customer identity issued by the messaging platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(i64);

impl CustomerId {
    /// Wrap a raw platform user id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw platform user id.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// Conversation a reply should be delivered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(i64);

impl ConversationId {
    /// Wrap a raw platform chat id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw platform chat id.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Display for ConversationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// Profile details the platform sends along with every message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerProfile {
    /// Given name
    pub first_name: String,

    /// Family name, when shared
    #[serde(default)]
    pub last_name: Option<String>,

    /// Platform handle, when set
    #[serde(default)]
    pub username: Option<String>,
}

impl CustomerProfile {
    /// Full name, falling back to `"Unknown"` when both parts are blank.
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, self.last_name.as_deref().unwrap_or_default())
    }
}

/// Join first and last name the way reports and receipts show them.
pub fn display_name(first_name: &str, last_name: &str) -> String {
    let name = format!("{first_name} {last_name}");
    let name = name.trim();

    if name.is_empty() {
        "Unknown".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_joins_parts() {
        let profile = CustomerProfile {
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
            username: None,
        };

        assert_eq!(profile.display_name(), "Ada Lovelace");
    }

    #[test]
    fn display_name_without_last_name() {
        assert_eq!(display_name("Ada", ""), "Ada");
    }

    #[test]
    fn blank_names_fall_back_to_unknown() {
        assert_eq!(display_name(" ", ""), "Unknown");
    }
}
