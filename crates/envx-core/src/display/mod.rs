//! Display-time masking of secret values.
//!
//! Masking never touches stored data. A variable flagged secret is kept in
//! plain form and only hidden when printed.

use crate::projects::types::Variable;

const MASK_CHAR: char = '*';

/// Characters left visible at each end of a long secret.
const VISIBLE_EDGE: usize = 4;

/// Mask a secret value for display.
///
/// Values longer than 8 characters keep their first and last four characters
/// and have everything in between replaced, so the length is preserved.
/// Shorter values are masked entirely.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();

    if len <= VISIBLE_EDGE * 2 {
        return MASK_CHAR.to_string().repeat(len);
    }

    let head: String = chars[..VISIBLE_EDGE].iter().collect();
    let tail: String = chars[len - VISIBLE_EDGE..].iter().collect();
    let middle = MASK_CHAR.to_string().repeat(len - VISIBLE_EDGE * 2);

    format!("{}{}{}", head, middle, tail)
}

/// The value to show for a variable, masked if it is secret.
pub fn display_value(variable: &Variable, show_secrets: bool) -> String {
    if variable.is_secret && !show_secrets {
        mask_secret(&variable.value)
    } else {
        variable.value.clone()
    }
}
