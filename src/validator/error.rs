use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

/// One rejected field.
///
/// `field` is the top-level field name; `location` is the full path to the
/// offending value (`assets[2]`, `accounts[0].address`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub location: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        FieldIssue {
            location: field.clone(),
            field,
            message: message.into(),
        }
    }

    /// Issue whose location is nested below the top-level field
    pub fn at(
        field: impl Into<String>,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        FieldIssue {
            field: field.into(),
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Merged payload rejected by a descriptor. Carries every issue found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub schema: String,
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(schema: impl Into<String>, issues: Vec<FieldIssue>) -> Self {
        Self {
            schema: schema.into(),
            issues,
        }
    }

    /// Distinct offending top-level field names, in report order
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.issues.len());
        for issue in &self.issues {
            if !names.contains(&issue.field.as_str()) {
                names.push(&issue.field);
            }
        }
        names
    }

    #[must_use]
    pub fn issue_for(&self, field: &str) -> Option<&FieldIssue> {
        self.issues.iter().find(|i| i.field == field)
    }

    /// Body of the 400 response
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": "Request validation failed",
            "details": self.issues,
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rejected the request arguments:", self.schema)?;
        for issue in &self.issues {
            write!(f, " [{}] {}", issue.location, issue.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_deduplicated_in_order() {
        let err = ValidationError::new(
            "S",
            vec![
                FieldIssue::at("assets", "assets[2]", "bad"),
                FieldIssue::new("to_timestamp", "Missing data for required field."),
                FieldIssue::at("assets", "assets[3]", "bad"),
            ],
        );
        assert_eq!(err.fields(), vec!["assets", "to_timestamp"]);
        assert_eq!(err.issue_for("assets").unwrap().location, "assets[2]");
    }

    #[test]
    fn json_body_lists_details() {
        let err = ValidationError::new("S", vec![FieldIssue::new("a", "Unknown field.")]);
        let body = err.to_json();
        assert_eq!(body["error"], "Request validation failed");
        assert_eq!(body["details"][0]["field"], "a");
        assert_eq!(body["details"][0]["location"], "a");
    }
}
