//! Shared validation helpers used by the section validators.

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error if `value` is blank.
pub(crate) fn validate_non_empty(errors: &mut Vec<String>, name: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{name} must not be empty"));
    }
}

/// Push an error if `value` cannot be used as a pipe name.
pub(crate) fn validate_pipe_name(errors: &mut Vec<String>, name: &str, value: &str) {
    validate_non_empty(errors, name, value);
    if value.contains(['/', '\\']) {
        errors.push(format!("{name} = {value:?} must not contain path separators"));
    }
}
