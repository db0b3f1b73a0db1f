/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate a phone number: must contain at least 7 digits once punctuation
/// is stripped. Formatting is otherwise left alone.
pub fn validate_phone(phone: &str) -> Option<String> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 7 {
        return Some("Phone must contain at least 7 digits".to_string());
    }
    None
}
