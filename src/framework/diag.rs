//! Diagnostics
//!
//! Every lifecycle call reports problems as a list of [`Diagnostic`]s instead
//! of a single error, so independent validation failures surface together.

use crate::api::ApiError;
use crate::context::ContextError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Summary used for every not-found diagnostic
pub const NOT_FOUND_SUMMARY: &str = "Resource not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single user-facing problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
    /// Dotted attribute path the problem refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn at(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(attr) = &self.attribute {
            write!(f, "{}: ", attr)?;
        }
        write!(f, "{}", self.summary)?;
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// Ordered collection of diagnostics.
///
/// A failed call may still carry the state of an object it managed to create
/// remotely, see [`Diagnostics::with_partial_state`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    #[serde(skip)]
    partial_state: Option<Value>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::error(summary, detail));
    }

    pub fn add_attribute_error(
        &mut self,
        attribute: impl Into<String>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.push(Diagnostic::error(summary, detail).at(attribute));
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::warning(summary, detail));
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// `Err(self)` when any error was recorded
    pub fn into_result(self) -> Result<(), Diagnostics> {
        if self.has_errors() {
            Err(self)
        } else {
            Ok(())
        }
    }

    /// A single-error collection
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        let mut diags = Self::new();
        diags.add_error(summary, detail);
        diags
    }

    /// Wrap an API failure that happened while doing `action`
    pub fn api(action: &str, err: ApiError) -> Self {
        match err {
            ApiError::NotFound(detail) => Self::error(NOT_FOUND_SUMMARY, detail),
            ApiError::Cancelled(ctx) => Self::cancelled(action, ctx),
            other => Self::error(format!("Failed to {}", action), other.to_string()),
        }
    }

    pub fn cancelled(action: &str, err: ContextError) -> Self {
        Self::error(
            format!("Interrupted while waiting to {}", action),
            format!("{}; the remote resource may still be converging", err),
        )
    }

    /// Attach the state of an object that exists remotely even though the
    /// call failed, so the host keeps tracking it
    pub fn with_partial_state(mut self, state: Value) -> Self {
        self.partial_state = Some(state);
        self
    }

    pub fn partial_state(&self) -> Option<&Value> {
        self.partial_state.as_ref()
    }

    pub fn take_partial_state(&mut self) -> Option<Value> {
        self.partial_state.take()
    }

    pub fn is_not_found(&self) -> bool {
        self.items.iter().any(|d| d.summary == NOT_FOUND_SUMMARY)
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            items: vec![diagnostic],
            partial_state: None,
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.items.iter().map(|d| d.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_are_not_errors() {
        let mut diags = Diagnostics::new();
        diags.add_warning("deprecated", "use something else");
        assert!(!diags.has_errors());
        assert!(diags.clone().into_result().is_ok());
        diags.add_attribute_error("name", "Missing required attribute", "");
        assert!(diags.has_errors());
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_api_not_found_gets_distinct_summary() {
        let diags = Diagnostics::api("read network", ApiError::NotFound("network n1".into()));
        assert!(diags.is_not_found());

        let diags = Diagnostics::api(
            "read network",
            ApiError::Status {
                status: 500,
                message: "boom".into(),
            },
        );
        assert!(!diags.is_not_found());
        assert_eq!(diags.to_string(), "Failed to read network: API request failed: 500 - boom");
    }

    #[test]
    fn test_partial_state_is_not_serialized() {
        let mut diags = Diagnostics::error("Failed to activate transfer", "boom")
            .with_partial_state(serde_json::json!({"id": "t1"}));
        assert_eq!(diags.partial_state().unwrap()["id"], "t1");
        assert_eq!(
            serde_json::to_value(&diags).unwrap(),
            serde_json::json!([{"severity": "error", "summary": "Failed to activate transfer", "detail": "boom"}])
        );
        assert!(diags.take_partial_state().is_some());
        assert!(diags.partial_state().is_none());
    }

    #[test]
    fn test_cancellation_mentions_context_error() {
        let diags = Diagnostics::api("create cluster", ApiError::Cancelled(ContextError::DeadlineExceeded));
        assert!(diags.to_string().contains("context deadline exceeded"));
    }
}
