//! Wire DTOs and explicit conversions to and from core values.
//!
//! Request fields are optional on the wire so a missing field is reported
//! as a validation error naming it, instead of a generic decode failure.

pub mod day;
pub mod routine;
pub mod todo;

use crate::error::ApiError;
use knighttodo_core::{Hardness, Scariness, TodoDraft};
use serde::Deserialize;

/// `?ready=` query of the ready endpoints.
#[derive(Debug, Deserialize)]
pub struct ReadyQuery {
    pub ready: String,
}

impl ReadyQuery {
    /// Only a case-insensitive `true` means ready; every other value is false.
    pub fn is_ready(&self) -> bool {
        self.ready.trim().eq_ignore_ascii_case("true")
    }
}

pub(crate) fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

pub(crate) fn required_name(value: Option<String>, field: &'static str) -> Result<String, ApiError> {
    let value = required(value, field)?;
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} must not be blank")));
    }
    Ok(value)
}

pub(crate) fn todo_draft(
    name: Option<String>,
    name_field: &'static str,
    scariness: Option<Scariness>,
    hardness: Option<Hardness>,
) -> Result<TodoDraft, ApiError> {
    Ok(TodoDraft::new(
        required_name(name, name_field)?,
        required(scariness, "scariness")?,
        required(hardness, "hardness")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::{todo_draft, ReadyQuery};
    use crate::error::ApiError;
    use knighttodo_core::{Hardness, Scariness};

    #[test]
    fn ready_query_parses_like_a_lenient_boolean() {
        for (raw, expected) in [
            ("true", true),
            ("TRUE", true),
            ("True", true),
            ("false", false),
            ("yes", false),
            ("1", false),
            ("", false),
        ] {
            let query = ReadyQuery {
                ready: raw.to_string(),
            };
            assert_eq!(query.is_ready(), expected, "ready={raw}");
        }
    }

    #[test]
    fn todo_draft_names_the_missing_field() {
        let err = todo_draft(Some("Run".to_string()), "todoName", None, Some(Hardness::Easy))
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(message) if message == "scariness is required"));

        let err = todo_draft(
            Some("  ".to_string()),
            "todoName",
            Some(Scariness::Low),
            Some(Hardness::Easy),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(message) if message.contains("todoName")));
    }
}
