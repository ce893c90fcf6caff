//! Producer outcomes
//!
//! `read_through` only persists results that report success.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// == Outcome Trait ==
/// A producer result that can say whether it succeeded.
pub trait Outcome {
    fn is_success(&self) -> bool;
}

// == Response Envelope ==
/// The `{success, data, error}` envelope returned by weather producers.
///
/// A present `data` field, `null` included, always reads back as `Some`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T> Outcome for ApiResponse<T> {
    fn is_success(&self) -> bool {
        self.success
    }
}

/// Untyped payloads succeed only with an explicit `"success": true`.
impl Outcome for Value {
    fn is_success(&self) -> bool {
        self.get("success").and_then(Value::as_bool).unwrap_or(false)
    }
}

impl<T, E> Outcome for Result<T, E> {
    fn is_success(&self) -> bool {
        self.is_ok()
    }
}
