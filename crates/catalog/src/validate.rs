use albumhub_core::{DomainError, DomainResult};

/// Collects field problems so a payload reports all of them at once.
#[derive(Debug, Default)]
pub(crate) struct FieldCheck {
    missing: Vec<&'static str>,
    invalid: Vec<String>,
}

impl FieldCheck {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A field that must be present.
    pub(crate) fn required<T>(&mut self, field: &'static str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.missing.push(field);
        }
        value
    }

    /// A string field that must be present and not blank; surrounding
    /// whitespace is trimmed.
    pub(crate) fn required_text(&mut self, field: &'static str, value: Option<String>) -> Option<String> {
        match value {
            None => {
                self.missing.push(field);
                None
            }
            Some(v) => self.non_blank(field, v),
        }
    }

    /// A string field that may be absent, but not blank when present.
    pub(crate) fn optional_text(&mut self, field: &'static str, value: Option<String>) -> Option<String> {
        value.and_then(|v| self.non_blank(field, v))
    }

    pub(crate) fn invalid(&mut self, message: impl Into<String>) {
        self.invalid.push(message.into());
    }

    pub(crate) fn finish(self) -> DomainResult<()> {
        let mut problems = Vec::new();
        if !self.missing.is_empty() {
            problems.push(format!("missing required fields: {}", self.missing.join(", ")));
        }
        problems.extend(self.invalid);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(problems.join("; ")))
        }
    }

    fn non_blank(&mut self, field: &'static str, value: String) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.invalid.push(format!("{field} must not be blank"));
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
