use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

use super::TaskDraft;

/// Maximum number of characters in a task name.
pub const NAME_MAX_LENGTH: usize = 150;

/// Per-field validation failures, keyed by the JSON field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure message for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the failure messages grouped by field.
    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Task fields that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTask {
    pub name: String,
    pub description: Option<String>,
    pub task_date: DateTime<Utc>,
    pub registered_at: Option<DateTime<Utc>>,
    pub completed: bool,
}

/// Checks the required fields of a draft.
///
/// `name` must be present, not blank and at most [`NAME_MAX_LENGTH`] characters.
/// `taskDate` must be present. Every failing field is reported, not just the first.
pub fn validate_task(draft: &TaskDraft) -> Result<ValidTask, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = match draft.name.as_deref() {
        Some(name) if name.trim().is_empty() => {
            errors.add("name", "The name field is required.");
            None
        }
        Some(name) if name.chars().count() > NAME_MAX_LENGTH => {
            errors.add(
                "name",
                format!("The name field must not exceed {NAME_MAX_LENGTH} characters."),
            );
            None
        }
        Some(name) => Some(name.to_string()),
        None => {
            errors.add("name", "The name field is required.");
            None
        }
    };

    if draft.task_date.is_none() {
        errors.add("taskDate", "The taskDate field is required.");
    }

    match (name, draft.task_date) {
        (Some(name), Some(task_date)) if errors.is_empty() => Ok(ValidTask {
            name,
            description: draft.description.clone(),
            task_date,
            registered_at: draft.registered_at,
            completed: draft.completed,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn can_accept_valid_draft() {
        let mut draft = TaskDraft::new("Buy milk", task_date());
        draft.description = Some("Semi-skimmed".to_string());
        draft.completed = true;

        let valid = validate_task(&draft).expect("draft should be valid");

        assert_eq!(valid.name, "Buy milk");
        assert_eq!(valid.description.as_deref(), Some("Semi-skimmed"));
        assert_eq!(valid.task_date, task_date());
        assert_eq!(valid.registered_at, None);
        assert!(valid.completed);
    }

    #[test]
    fn can_accept_name_at_max_length() {
        let draft = TaskDraft::new("a".repeat(NAME_MAX_LENGTH), task_date());
        assert!(validate_task(&draft).is_ok());
    }

    #[test]
    fn counts_name_length_in_characters() {
        let draft = TaskDraft::new("é".repeat(NAME_MAX_LENGTH), task_date());
        assert!(validate_task(&draft).is_ok());
    }

    #[test]
    fn cannot_accept_name_over_max_length() {
        let draft = TaskDraft::new("a".repeat(NAME_MAX_LENGTH + 1), task_date());

        let errors = validate_task(&draft).unwrap_err();

        assert_eq!(
            errors.fields().get("name"),
            Some(&vec![
                "The name field must not exceed 150 characters.".to_string()
            ])
        );
    }

    #[test]
    fn cannot_accept_blank_name() {
        for name in ["", "   "] {
            let errors = validate_task(&TaskDraft::new(name, task_date())).unwrap_err();
            assert_eq!(
                errors.fields().get("name"),
                Some(&vec!["The name field is required.".to_string()])
            );
        }
    }

    #[test]
    fn reports_every_missing_field() {
        let errors = validate_task(&TaskDraft::default()).unwrap_err();

        assert_eq!(errors.fields().len(), 2);
        assert!(errors.fields().contains_key("name"));
        assert!(errors.fields().contains_key("taskDate"));
        assert_eq!(
            errors.to_string(),
            "name: The name field is required.; taskDate: The taskDate field is required."
        );
    }
}
