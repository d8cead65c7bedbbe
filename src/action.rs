use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A conventional action: a `kind` discriminant plus an untyped payload.
///
/// The store never inspects actions, so any type works as `A`. This one is
/// provided for applications that don't want to define their own. The
/// payload is a [`serde_json::Value`]; reducers give it meaning.
///
/// # Examples
///
/// ```
/// use foldstore::Action;
/// use serde_json::json;
///
/// let add = Action::new("ADD_TODO", json!({"id": 0, "text": "Learn Redux"}));
/// assert!(add.is("ADD_TODO"));
/// assert_eq!(add.payload["text"], "Learn Redux");
///
/// let inc = Action::kind("INC");
/// assert_eq!(inc.payload, json!(null));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct Action {
    /// Action discriminant, e.g. `"ADD_TODO"`. Serialized as `"type"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Arbitrary payload. `null` when the action carries nothing.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl Action {
    /// Create an action with a payload.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Action {
            kind: kind.into(),
            payload,
        }
    }

    /// Create an action without a payload.
    pub fn kind(kind: impl Into<String>) -> Self {
        Action::new(kind, Value::Null)
    }

    /// Whether this action's discriminant is `kind`.
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}
