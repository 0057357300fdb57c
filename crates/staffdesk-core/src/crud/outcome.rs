use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use super::entity::Resource;
use crate::api::ApiError;

const NON_FIELD_ERRORS: &str = "non_field_errors";
const DETAIL: &str = "detail";

/// Per-field first messages, keyed by backend field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Result of a create, update, or delete.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<T> {
    Success {
        /// Decoded response body; `None` for deletes
        data: Option<T>,
    },
    Failure {
        error: String,
        /// Present only when the backend sent field arrays
        field_errors: Option<FieldErrors>,
    },
}

impl<T> MutationOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, MutationOutcome::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            MutationOutcome::Success { .. } => None,
            MutationOutcome::Failure { error, .. } => Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Add,
    Update,
    Delete,
}

impl Mutation {
    pub fn verb(self) -> &'static str {
        match self {
            Mutation::Add => "add",
            Mutation::Update => "update",
            Mutation::Delete => "delete",
        }
    }

    pub fn past(self) -> &'static str {
        match self {
            Mutation::Add => "added",
            Mutation::Update => "updated",
            Mutation::Delete => "deleted",
        }
    }

    /// `"<Entity> added successfully!"`
    pub fn success_message(self, resource: &Resource) -> String {
        format!("{} {} successfully!", resource.display_name(), self.past())
    }

    /// `"Failed to add <entity>."`
    pub fn failure_message(self, resource: &Resource) -> String {
        format!("Failed to {} {}.", self.verb(), resource.entity_name)
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verb())
    }
}

/// Turns a failed mutation into `(message, field_errors)`.
///
/// Message precedence: `non_field_errors`, the resource's known fields in
/// declared order, any other field array, `detail`, then the fallback.
pub fn mutation_error(
    err: &ApiError,
    resource: &Resource,
    mutation: Mutation,
) -> (String, Option<FieldErrors>) {
    let fallback = mutation.failure_message(resource);
    let Some(Value::Object(body)) = err.body.as_ref() else {
        return (fallback, None);
    };

    let mut field_errors = FieldErrors::new();
    for (field, value) in body {
        if field == DETAIL {
            continue;
        }
        if let Some(message) = first_message(value) {
            field_errors.insert(field.clone(), message.to_string());
        }
    }

    let message = field_errors
        .get(NON_FIELD_ERRORS)
        .or_else(|| {
            resource
                .error_fields
                .iter()
                .find_map(|field| field_errors.get(*field))
        })
        .or_else(|| field_errors.values().next())
        .cloned()
        .or_else(|| err.detail().map(ToString::to_string))
        .unwrap_or(fallback);

    let field_errors = if field_errors.is_empty() {
        None
    } else {
        Some(field_errors)
    };
    (message, field_errors)
}

fn first_message(value: &Value) -> Option<&str> {
    value
        .as_array()
        .and_then(|items| items.first())
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::ApiErrorKind;

    const EMPLOYEE: Resource = Resource {
        endpoint: "/employees/",
        all_endpoint: None,
        entity_name: "employee",
        entity_name_plural: "employees",
        error_fields: &["name", "email"],
    };

    fn validation(body: Value) -> ApiError {
        ApiError::from_status(400, body)
    }

    #[test]
    fn test_non_field_errors_win() {
        let err = validation(json!({
            "name": ["Too short."],
            "non_field_errors": ["Duplicate employee."]
        }));
        let (message, fields) = mutation_error(&err, &EMPLOYEE, Mutation::Add);
        assert_eq!(message, "Duplicate employee.");
        let fields = fields.unwrap();
        assert_eq!(fields["name"], "Too short.");
        assert_eq!(fields["non_field_errors"], "Duplicate employee.");
    }

    #[test]
    fn test_declared_field_order_beats_alphabetical() {
        let err = validation(json!({
            "email": ["Enter a valid email address."],
            "name": ["This field is required."],
            "address": ["Too long."]
        }));
        let (message, _) = mutation_error(&err, &EMPLOYEE, Mutation::Add);
        assert_eq!(message, "This field is required.");
    }

    #[test]
    fn test_unknown_field_used_before_detail() {
        let err = validation(json!({
            "mobile": ["Invalid."],
            "detail": "Bad request"
        }));
        let (message, fields) = mutation_error(&err, &EMPLOYEE, Mutation::Update);
        assert_eq!(message, "Invalid.");
        assert_eq!(fields.unwrap().len(), 1);
    }

    #[test]
    fn test_detail_then_fallback() {
        let err = ApiError::from_status(403, json!({"detail": "Not allowed."}));
        let (message, fields) = mutation_error(&err, &EMPLOYEE, Mutation::Delete);
        assert_eq!(message, "Not allowed.");
        assert!(fields.is_none());

        let err = ApiError::new(ApiErrorKind::Network, "Request timed out");
        let (message, fields) = mutation_error(&err, &EMPLOYEE, Mutation::Delete);
        assert_eq!(message, "Failed to delete employee.");
        assert!(fields.is_none());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Mutation::Update.success_message(&EMPLOYEE),
            "Employee updated successfully!"
        );
        assert_eq!(
            Mutation::Add.failure_message(&EMPLOYEE),
            "Failed to add employee."
        );
    }
}
