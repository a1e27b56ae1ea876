//! Gatekeeping checks run before a timer is persisted.
//!
//! Every message produced here is safe to show to the end user verbatim.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::state::timer::{Level, Timer};

/// Shortest accepted timer name, counted in characters.
pub const MIN_NAME_LEN: usize = 3;

pub(crate) fn failure(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

impl Validate for Timer {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.id.is_nil() {
            errors.add("id", failure("required", "id cannot be empty"));
        }
        if self.owner_id.trim().is_empty() {
            errors.add("owner_id", failure("required", "user id cannot be empty"));
        }
        if self.name.trim().chars().count() < MIN_NAME_LEN {
            errors.add(
                "name",
                failure(
                    "length",
                    format!("name must be {MIN_NAME_LEN} or more characters in length"),
                ),
            );
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Validate for Level {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.id.is_nil() {
            errors.add("id", failure("required", "id cannot be empty"));
        }
        if self.timer_id.is_nil() {
            errors.add("timer_id", failure("required", "timer id cannot be empty"));
        }
        if self.duration_minutes == 0 {
            errors.add(
                "duration",
                failure("range", "duration must be greater than 0"),
            );
        }
        // Amounts are unsigned, so only the ordering can be wrong.
        if self.small_blind > self.big_blind {
            errors.add(
                "small_blind",
                failure("ordering", "small blind cannot be greater than big blind"),
            );
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Validate the timer and then each of its levels, stopping at the first failing record.
pub fn validate_aggregate(timer: &Timer) -> Result<(), ValidationErrors> {
    timer.validate()?;
    timer.levels.iter().try_for_each(Validate::validate)
}

/// Flatten validation errors into one user-facing sentence, fields in a stable order.
pub fn public_message(errors: &ValidationErrors) -> String {
    let mut fields = errors
        .field_errors()
        .into_iter()
        .map(|(field, failures)| (field.to_string(), failures))
        .collect::<Vec<_>>();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, failures)| {
            failures.iter().map(move |failure| {
                failure
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}
