use crate::PochiError;

/// Text result of a tool call.
///
/// Failures are ordinary responses with `is_error` set; a tool call never
/// fails at the transport level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResponse {
    /// Human-readable payload.
    pub text: String,
    /// Whether the tool reported an error.
    pub is_error: bool,
}

impl ToolResponse {
    /// Successful (or informational) response.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    /// Error response.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

impl From<&PochiError> for ToolResponse {
    fn from(error: &PochiError) -> Self {
        Self::error(error.user_message())
    }
}
