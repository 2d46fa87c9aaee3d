use super::coerce::coerce;
use super::{FieldIssue, TypedValue, ValidatedArguments, ValidationError};
use crate::payload::MergedPayload;
use crate::schema::SchemaDescriptor;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Validate a merged payload against a descriptor.
///
/// Every declared field ends up in the result: present values are coerced and
/// checked, absent optional fields take their default (or `Null`). Unknown
/// keys, missing required fields and rule violations are all collected before
/// failing. Whole-payload checks only run once every field is clean.
pub fn validate(
    payload: &MergedPayload,
    schema: &SchemaDescriptor,
) -> Result<ValidatedArguments, ValidationError> {
    match validate_fields(schema, payload, None) {
        Ok(values) => {
            debug!(
                schema = %schema.name(),
                field_count = values.len(),
                "Arguments validated"
            );
            Ok(ValidatedArguments::new(values))
        }
        Err(issues) => {
            warn!(
                schema = %schema.name(),
                issue_count = issues.len(),
                fields = ?issues.iter().map(|i| i.location.as_str()).collect::<Vec<_>>(),
                "Argument validation failed"
            );
            Err(ValidationError::new(schema.name(), issues))
        }
    }
}

/// Field-level validation shared by the top level and nested objects.
///
/// `nested` is `(top-level field, location)` of the enclosing object, if any.
pub(crate) fn validate_fields(
    schema: &SchemaDescriptor,
    map: &Map<String, Value>,
    nested: Option<(&str, &str)>,
) -> Result<BTreeMap<String, TypedValue>, Vec<FieldIssue>> {
    let locate = |key: &str| -> (String, String) {
        match nested {
            Some((field, location)) => (field.to_string(), format!("{location}.{key}")),
            None => (key.to_string(), key.to_string()),
        }
    };

    let mut values = BTreeMap::new();
    let mut issues = Vec::new();

    for spec in schema.fields() {
        let (field, location) = locate(&spec.name);
        let Some(raw) = map.get(&spec.name) else {
            if spec.required {
                issues.push(FieldIssue::at(field, location, "Missing data for required field."));
            } else {
                values.insert(spec.name.clone(), spec.absent_value());
            }
            continue;
        };

        if raw.is_null() && spec.nullable {
            values.insert(spec.name.clone(), TypedValue::Null);
            continue;
        }

        let coerced = match coerce(&spec.ty, raw, spec.delimiter, &field, &location) {
            Ok(value) => value,
            Err(mut found) => {
                issues.append(&mut found);
                continue;
            }
        };

        let checked = spec
            .rules
            .iter()
            .try_fold(coerced, |value, rule| rule.apply(value));
        match checked {
            Ok(value) => {
                values.insert(spec.name.clone(), value);
            }
            Err(message) => issues.push(FieldIssue::at(field, location, message)),
        }
    }

    for key in map.keys() {
        if !schema.contains(key) {
            let (field, location) = locate(key);
            issues.push(FieldIssue::at(field, location, "Unknown field."));
        }
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    for check in schema.checks() {
        if let Err(found) = (check.run)(&mut values) {
            debug!(check = check.name, issue_count = found.len(), "Schema check failed");
            issues.extend(found.into_iter().map(|issue| match nested {
                Some((field, location)) => FieldIssue::at(
                    field,
                    format!("{location}.{}", issue.location),
                    issue.message,
                ),
                None => issue,
            }));
        }
    }

    if issues.is_empty() {
        Ok(values)
    } else {
        Err(issues)
    }
}
