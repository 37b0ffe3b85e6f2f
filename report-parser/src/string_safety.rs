/// Trims `value` and cuts it to at most `max_len` bytes without splitting a character.
pub fn safe_truncate(value: &str, max_len: usize) -> &str {
    let trimmed = value.trim();
    if trimmed.len() <= max_len {
        return trimmed;
    }
    let mut end = max_len;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    &trimmed[..end]
}

/// Length class of a trimmed identifier field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLen<'a> {
    Empty,
    /// Holds the field cut down to the limit.
    TooLong(&'a str),
    Valid,
}

impl<'a> FieldLen<'a> {
    pub fn check(field: &'a str, max_len: usize) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            FieldLen::Empty
        } else if trimmed.len() > max_len {
            FieldLen::TooLong(safe_truncate(trimmed, max_len))
        } else {
            FieldLen::Valid
        }
    }
}
