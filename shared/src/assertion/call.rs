//! Field-level assertions and their two-phase lifecycle

use serde_json::Value;
use std::fmt;

use super::diff::UnorderedDiff;
use crate::types::Assertions;

/// Strategy used to compare an actual value against the expected one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Exact, order-sensitive and type-sensitive equality
    Equality,
    /// Structural comparison that ignores sequence order
    Unordered,
}

/// Final outcome of an assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionStatus {
    Passed,
    Failed,
    /// The field was not configured, so nothing was evaluated
    Skipped,
}

/// Entry point for creating assertions on a single field
pub struct Assertion;

impl Assertion {
    /// Equality assertion on `field`, live only if `assertions` configures it
    pub fn equal(field: &str, assertions: &Assertions, description: &str) -> PendingAssertion {
        PendingAssertion::new(field, assertions, description, Comparison::Equality)
    }

    /// Unordered structural assertion on `field`
    pub fn unordered(field: &str, assertions: &Assertions, description: &str) -> PendingAssertion {
        PendingAssertion::new(field, assertions, description, Comparison::Unordered)
    }
}

/// An assertion waiting for its actual value.
///
/// [`PendingAssertion::evaluate`] consumes it, so an actual value can be set once only.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a pending assertion does nothing until it is evaluated"]
pub struct PendingAssertion {
    field: String,
    description: String,
    expected: Option<Value>,
    comparison: Comparison,
}

impl PendingAssertion {
    fn new(
        field: &str,
        assertions: &Assertions,
        description: &str,
        comparison: Comparison,
    ) -> Self {
        Self {
            field: field.to_string(),
            description: description.to_string(),
            expected: assertions.get(field).cloned(),
            comparison,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Whether the field is configured and will actually be checked
    pub fn is_live(&self) -> bool {
        self.expected.is_some()
    }

    /// Record the actual value and freeze the outcome
    pub fn evaluate(self, actual: impl Into<Value>) -> AssertionCall {
        let actual = actual.into();
        let (status, diff) = match &self.expected {
            Some(expected) => {
                let (passed, diff) = evaluate(self.comparison, expected, &actual);
                let status = if passed {
                    AssertionStatus::Passed
                } else {
                    AssertionStatus::Failed
                };
                (status, diff)
            }
            None => (AssertionStatus::Skipped, None),
        };

        AssertionCall {
            field: self.field,
            description: self.description,
            expected: self.expected,
            actual: Some(actual),
            comparison: self.comparison,
            status,
            diff,
        }
    }
}

/// Compare `actual` against `expected`; pure, so repeated calls agree
pub fn evaluate(
    comparison: Comparison,
    expected: &Value,
    actual: &Value,
) -> (bool, Option<UnorderedDiff>) {
    match comparison {
        Comparison::Equality => (expected == actual, None),
        Comparison::Unordered => {
            let diff = UnorderedDiff::compute(expected, actual);
            (diff.is_empty(), Some(diff))
        }
    }
}

/// An evaluated (or skipped) assertion on one field
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionCall {
    field: String,
    description: String,
    expected: Option<Value>,
    actual: Option<Value>,
    comparison: Comparison,
    status: AssertionStatus,
    diff: Option<UnorderedDiff>,
}

impl AssertionCall {
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Human description of what was checked, e.g. "http response status_code"
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn expected(&self) -> Option<&Value> {
        self.expected.as_ref()
    }

    pub fn actual(&self) -> Option<&Value> {
        self.actual.as_ref()
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn status(&self) -> AssertionStatus {
        self.status
    }

    pub fn diff(&self) -> Option<&UnorderedDiff> {
        self.diff.as_ref()
    }

    /// True once the field was actually evaluated
    pub fn called(&self) -> bool {
        self.status != AssertionStatus::Skipped
    }

    /// Skipped assertions count as passed; use [`AssertionCall::called`] to tell them apart
    pub fn passed(&self) -> bool {
        self.status != AssertionStatus::Failed
    }

    pub fn skipped(&self) -> bool {
        self.status == AssertionStatus::Skipped
    }
}

impl fmt::Display for AssertionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected = self.expected.as_ref().unwrap_or(&Value::Null);
        let actual = self.actual.as_ref().unwrap_or(&Value::Null);
        match (self.status, &self.diff) {
            (AssertionStatus::Skipped, _) => write!(f, "assertion skipped on {}", self.field),
            (AssertionStatus::Passed, _) => write!(
                f,
                "assertion passed on {}, expected {expected}, and got {actual}",
                self.field
            ),
            (AssertionStatus::Failed, Some(diff)) => write!(
                f,
                "assertion failed on {}, expected {expected}, diff: {diff}",
                self.field
            ),
            (AssertionStatus::Failed, None) => write!(
                f,
                "assertion failed on {}, expected {expected}, but got {actual}",
                self.field
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn configured(field: &str, expected: Value) -> Assertions {
        Assertions::new().with(field, expected)
    }

    #[test]
    fn test_value_not_matches() {
        let assertions = configured("description", json!("this"));
        let call = Assertion::equal("description", &assertions, "text").evaluate("that");
        assert!(!call.passed());
        assert!(call.called());
        assert_eq!(call.status(), AssertionStatus::Failed);
    }

    #[test]
    fn test_value_matches() {
        let assertions = configured("description", json!("this"));
        let call = Assertion::equal("description", &assertions, "text").evaluate("this");
        assert!(call.passed());
        assert!(call.called());
    }

    #[test]
    fn test_unconfigured_field_is_skipped_not_evaluated() {
        let pending = Assertion::equal("body", &configured("status_code", json!(201)), "http body");
        assert!(!pending.is_live());

        let call = pending.evaluate("anything");
        assert!(call.passed());
        assert!(!call.called());
        assert!(call.skipped());
        assert_eq!(call.to_string(), "assertion skipped on body");
    }

    #[test]
    fn test_equality_is_type_sensitive() {
        let call = Assertion::equal("status_code", &configured("status_code", json!(201)), "status")
            .evaluate("201");
        assert!(!call.passed());
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let expected = json!([{"a": 1}, {"b": 2}]);
        let actual = json!([{"b": 2}, {"a": 1}]);
        for comparison in [Comparison::Equality, Comparison::Unordered] {
            let first = evaluate(comparison, &expected, &actual).0;
            let second = evaluate(comparison, &expected, &actual).0;
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_unordered_passes_on_reordered_multiset() {
        let assertions = configured("unordered", json!(["A", "B"]));
        let call =
            Assertion::unordered("unordered", &assertions, "events").evaluate(json!(["B", "A"]));
        assert!(call.passed());
        assert!(call.diff().is_some_and(UnorderedDiff::is_empty));
    }

    #[test]
    fn test_unordered_fails_on_repeated_element() {
        let assertions = configured("unordered", json!(["A", "B"]));
        let call =
            Assertion::unordered("unordered", &assertions, "events").evaluate(json!(["A", "A"]));
        assert!(!call.passed());
        assert!(call.to_string().contains("diff:"));
    }

    #[test]
    fn test_unordered_json_documents_equal() {
        let document = r#"{"foo": "bar", "x": {"a": "b"}}"#;
        let call = Assertion::unordered("json", &configured("json", json!(document)), "json")
            .evaluate(document);
        assert!(call.passed());
    }

    #[test]
    fn test_unordered_nested_field_differs() {
        let assertions = configured("json", json!({"foo": "bar", "x": {"a": "b"}}));
        let call = Assertion::unordered("json", &assertions, "json")
            .evaluate(json!({"foo": "bar", "x": {"a": "x"}}));
        assert!(!call.passed());
    }
}
