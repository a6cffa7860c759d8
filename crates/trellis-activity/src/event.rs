//! Entity-changed events emitted by business modules.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use trellis_core::UserId;

use crate::context::RequestContext;

/// Kind of operation an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    PasswordChange,
    ProfileUpdate,
    SettingsUpdate,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::Login => write!(f, "login"),
            Operation::Logout => write!(f, "logout"),
            Operation::PasswordChange => write!(f, "password_change"),
            Operation::ProfileUpdate => write!(f, "profile_update"),
            Operation::SettingsUpdate => write!(f, "settings_update"),
        }
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            "login" => Ok(Operation::Login),
            "logout" => Ok(Operation::Logout),
            "password_change" => Ok(Operation::PasswordChange),
            "profile_update" => Ok(Operation::ProfileUpdate),
            "settings_update" => Ok(Operation::SettingsUpdate),
            _ => Err(format!("Invalid operation: {s}")),
        }
    }
}

/// A single observed mutation, as reported by the business module that
/// performed it.
///
/// `changed_fields` is an explicit manifest supplied by the caller: the
/// engine records only what is listed there, never a diff of the whole
/// record. `actor_hint` carries the authenticated request principal when one
/// exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Logical entity name, e.g. "project" or "support_ticket".
    pub entity_kind: String,
    /// Identifier of the mutated record.
    pub entity_id: String,
    /// What happened.
    pub operation: Operation,
    /// Explicit actor supplied by the caller context, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_hint: Option<UserId>,
    /// Changed-field snapshot (field name → new value).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_fields: Option<Map<String, JsonValue>>,
    /// HTTP metadata when the mutation originated from a request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestContext>,
}

impl ChangeEvent {
    /// Create an event with just the required fields.
    pub fn new(entity_kind: impl Into<String>, entity_id: impl Into<String>, operation: Operation) -> Self {
        Self {
            entity_kind: entity_kind.into(),
            entity_id: entity_id.into(),
            operation,
            actor_hint: None,
            changed_fields: None,
            request: None,
        }
    }

    /// Attach the acting principal.
    #[must_use]
    pub fn with_actor(mut self, actor: UserId) -> Self {
        self.actor_hint = Some(actor);
        self
    }

    /// Attach the changed-field manifest.
    #[must_use]
    pub fn with_changed_fields(mut self, fields: Map<String, JsonValue>) -> Self {
        self.changed_fields = Some(fields);
        self
    }

    /// Attach HTTP request metadata.
    #[must_use]
    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = Some(request);
        self
    }
}
