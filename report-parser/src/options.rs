use crate::string_safety::safe_truncate;

pub const DEFAULT_MAX_TEXT_FIELD_LEN: usize = 8_000;

/// Knobs for a [`crate::parser::ReportParser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Upper bound, in bytes, for every string copied out of a report.
    pub max_text_field_len: usize,
    /// Keep JUnit `system-out`/`system-err` text on outcomes.
    pub capture_output: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_text_field_len: DEFAULT_MAX_TEXT_FIELD_LEN,
            capture_output: true,
        }
    }
}

impl ParseOptions {
    pub fn truncate<'a>(&self, value: &'a str) -> &'a str {
        safe_truncate(value, self.max_text_field_len)
    }

    /// Truncated copy of `value`, or `None` when nothing is left after trimming.
    pub fn text<T: AsRef<str>>(&self, value: T) -> Option<String> {
        let value = self.truncate(value.as_ref());
        if value.is_empty() {
            None
        } else {
            Some(String::from(value))
        }
    }
}
