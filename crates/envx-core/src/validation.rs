//! Identifier rules shared by the store, the profile manager and config.
//!
//! Project names double as file names, so they are held to a conservative
//! character set. Environment names follow the same rules. Variable keys only
//! need to survive a `KEY=value` round trip.

/// Longest identifier accepted, in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Check a project or environment name.
///
/// Returns the reason the name was rejected.
pub fn check_identifier(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("cannot be empty");
    }

    if name.len() > MAX_NAME_LEN {
        return Err("is longer than 255 bytes");
    }

    if name.contains("..") {
        return Err("cannot contain '..'");
    }

    if name.starts_with('.') || name.starts_with('-') {
        return Err("cannot start with '.' or '-'");
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err("may only contain letters, digits, '-', '_' and '.'");
    }

    Ok(())
}

/// Check a variable key.
pub fn check_variable_key(key: &str) -> Result<(), &'static str> {
    if key.is_empty() {
        return Err("cannot be empty");
    }

    if key.contains('=') {
        return Err("cannot contain '='");
    }

    if key.chars().any(char::is_whitespace) {
        return Err("cannot contain whitespace");
    }

    Ok(())
}
