use validator::{ValidateEmail, ValidationError};

pub fn is_valid_email(value: &str) -> bool {
    value.trim().to_string().validate_email()
}

/// Trim, drop empties and deduplicate case-insensitively, keeping the first
/// spelling seen.
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// `%term%` for ILIKE with the term's own `%`, `_` and `\` matched literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Stripe intent ids look like `pi_3Nxyz...`; anything else never reaches a URL.
pub fn is_payment_intent_id(value: &str) -> bool {
    let Some(rest) = value.strip_prefix("pi_") else {
        return false;
    };
    !rest.is_empty()
        && rest.len() <= 255
        && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn validate_payment_intent_id(value: &str) -> Result<(), ValidationError> {
    if is_payment_intent_id(value) {
        Ok(())
    } else {
        Err(ValidationError::new("payment_intent_id"))
    }
}
