use serde::{Deserialize, Serialize};

/// Failure body returned by the allocation server.
///
/// Servers reply with `{ "error": "..." }`, `{ "success": false, "message": "..." }`
/// or a mix of both; whichever text is present is what gets shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            error: Some(message.into()),
            message: None,
        }
    }

    /// The user-facing text, preferring `error` over `message`.
    pub fn user_message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
