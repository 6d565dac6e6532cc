//! Item record and create input.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::NewItemError;

/// Name given to items created without one.
pub const DEFAULT_ITEM_NAME: &str = "New Item";

/// A stored item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Item {
    /// Backend-assigned identifier.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Free-form description, empty when not supplied.
    pub description: String,
    /// Insertion time. Only the database backend records it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Item {
    /// Create an item without a creation timestamp.
    pub fn new(id: i32, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            created_at: None,
        }
    }
}

/// Fields accepted when creating an item.
///
/// Missing fields stay `None`; defaults are applied by [`NewItem::name`] and
/// [`NewItem::description`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewItem {
    /// Requested name.
    pub name: Option<String>,
    /// Requested description.
    pub description: Option<String>,
}

impl NewItem {
    /// Build a create request with both fields set.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
        }
    }

    /// Parse a raw request body.
    ///
    /// An empty body is treated as `{}`. Strings are taken as-is, numbers and
    /// booleans are coerced to their JSON text, `null` means absent.
    pub fn from_body(body: &[u8]) -> Result<Self, NewItemError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| NewItemError::Malformed(e.to_string()))?;

        match value {
            Value::Object(fields) => Ok(Self {
                name: text_field(&fields, "name")?,
                description: text_field(&fields, "description")?,
            }),
            _ => Err(NewItemError::NotAnObject),
        }
    }

    /// Name with the default applied.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_ITEM_NAME)
    }

    /// Description with the default applied.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

fn text_field(fields: &Map<String, Value>, key: &'static str) -> Result<Option<String>, NewItemError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(v.to_string())),
        Some(Value::Array(_) | Value::Object(_)) => Err(NewItemError::InvalidField(key)),
    }
}
