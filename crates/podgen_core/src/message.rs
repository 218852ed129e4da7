//! Chat message types.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Roles understood by the plain-text prompt format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parses a wire name. Unknown roles yield `None`.
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in the conversation.
///
/// The role is kept as the caller sent it, unknown values included; a
/// missing role or content deserializes as empty.
///
/// # Examples
///
/// ```
/// use podgen_core::{ChatMessage, Role};
///
/// let msg: ChatMessage = serde_json::from_str(r#"{"role": "user"}"#).unwrap();
/// assert_eq!(msg.content(), "");
/// assert_eq!(msg.known_role(), Some(Role::User));
/// ```
#[derive(
    Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, Getters, derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    role: String,
    /// Message content
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    content: String,
}

impl ChatMessage {
    /// Create a message with an arbitrary role.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System.as_str(), content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User.as_str(), content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant.as_str(), content)
    }

    /// The role, if it is one of the known roles.
    pub fn known_role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}
