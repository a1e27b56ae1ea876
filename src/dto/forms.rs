//! Explicit parsing of the dashboard's HTML forms into typed input.

use serde::Deserialize;
use validator::ValidationErrors;

use crate::state::{
    timer::{LevelContent, LevelKind},
    validation::failure,
};

/// Body of the "new timer" form.
#[derive(Debug, Default, Deserialize)]
pub struct TimerForm {
    /// Display name.
    #[serde(default)]
    pub name: String,
}

impl TimerForm {
    /// Submitted name without surrounding whitespace; length is checked on the timer itself.
    pub fn name(&self) -> String {
        self.name.trim().to_string()
    }
}

/// Body of the "add level" and "edit level" forms. Every field arrives as raw text.
#[derive(Debug, Default, Deserialize)]
pub struct LevelForm {
    /// `blind` or `break`; ignored when editing.
    #[serde(default)]
    pub kind: Option<String>,
    /// Raw small blind; blank reads as zero.
    #[serde(default)]
    pub small_blind: Option<String>,
    /// Raw big blind; blank reads as zero.
    #[serde(default)]
    pub big_blind: Option<String>,
    /// Raw ante; blank reads as zero.
    #[serde(default)]
    pub ante: Option<String>,
    /// Raw duration in minutes.
    #[serde(default)]
    pub duration_minutes: Option<String>,
}

/// A level form that passed parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedLevel {
    /// Blind or break.
    pub kind: LevelKind,
    /// Amounts and duration.
    pub content: LevelContent,
}

impl LevelForm {
    /// Parse a new level, kind included.
    pub fn parse(&self) -> Result<ParsedLevel, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let kind = match self.kind.as_deref().map(str::parse::<LevelKind>) {
            Some(Ok(kind)) => Some(kind),
            _ => {
                errors.add(
                    "kind",
                    failure(
                        "kind",
                        "type is not a valid type, expected one of: blind,break",
                    ),
                );
                None
            }
        };

        let content = kind.map(|kind| self.collect_content(kind, &mut errors));
        match (kind, content) {
            (Some(kind), Some(content)) if errors.is_empty() => Ok(ParsedLevel { kind, content }),
            _ => Err(errors),
        }
    }

    /// Parse replacement content for an existing level of `kind`; a submitted kind is ignored.
    pub fn parse_content(&self, kind: LevelKind) -> Result<LevelContent, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let content = self.collect_content(kind, &mut errors);
        if errors.is_empty() { Ok(content) } else { Err(errors) }
    }

    fn collect_content(&self, kind: LevelKind, errors: &mut ValidationErrors) -> LevelContent {
        let duration_minutes = match parse_whole(self.duration_minutes.as_deref()) {
            Ok(minutes) if minutes > 0 => u32::try_from(minutes).unwrap_or_else(|_| {
                errors.add("duration_minutes", failure("range", "duration is too long"));
                0
            }),
            Ok(_) => {
                errors.add(
                    "duration_minutes",
                    failure("range", "duration must be greater than 0"),
                );
                0
            }
            Err(WholeError::NotANumber) => {
                errors.add(
                    "duration_minutes",
                    failure("number", "duration must be a whole number of minutes"),
                );
                0
            }
        };

        if kind == LevelKind::Break {
            return LevelContent::rest(duration_minutes);
        }

        let mut amount = |field: &'static str, label: &str, raw: Option<&str>| -> u64 {
            match parse_whole(raw) {
                Ok(value) if value >= 0 => value as u64,
                Ok(_) => {
                    errors.add(
                        field,
                        failure("range", format!("{label} must be greater than or equal to 0")),
                    );
                    0
                }
                Err(WholeError::NotANumber) => {
                    errors.add(
                        field,
                        failure("number", format!("{label} must be a whole number")),
                    );
                    0
                }
            }
        };

        LevelContent {
            small_blind: amount("small_blind", "small blind", self.small_blind.as_deref()),
            big_blind: amount("big_blind", "large blind", self.big_blind.as_deref()),
            ante: amount("ante", "ante", self.ante.as_deref()),
            duration_minutes,
        }
    }
}

enum WholeError {
    NotANumber,
}

/// Blank input reads as zero.
fn parse_whole(raw: Option<&str>) -> Result<i64, WholeError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(0),
        Some(value) => value.parse::<i64>().map_err(|_| WholeError::NotANumber),
    }
}
