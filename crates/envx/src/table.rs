use std::collections::BTreeMap;

use envx_core::Variable;
use envx_core::display::display_value;

/// Truncate a string to at most `max_chars` characters, adding "..." if cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

pub struct VariableTable {
    key_width: usize,
    value_width: usize,
    show_descriptions: bool,
    show_secrets: bool,
}

impl VariableTable {
    pub fn new(variables: &BTreeMap<String, Variable>, show_secrets: bool) -> Self {
        let key_width = variables
            .keys()
            .map(|k| k.chars().count())
            .max()
            .unwrap_or(20)
            .clamp(20, 50);

        let value_width = variables
            .values()
            .map(|v| display_value(v, show_secrets).chars().count())
            .max()
            .unwrap_or(0)
            .min(60);

        Self {
            key_width,
            value_width,
            show_descriptions: variables.values().any(|v| !v.description.is_empty()),
            show_secrets,
        }
    }

    pub fn print(&self, variables: &BTreeMap<String, Variable>) {
        for (key, variable) in variables {
            println!("{}", self.row(key, variable));
        }
    }

    fn row(&self, key: &str, variable: &Variable) -> String {
        let key = truncate(key, self.key_width);
        let value = display_value(variable, self.show_secrets);

        if self.show_descriptions && !variable.description.is_empty() {
            format!(
                "{:<key_width$} {:<value_width$}  # {}",
                key,
                truncate(&value, self.value_width),
                truncate(&variable.description, 40),
                key_width = self.key_width,
                value_width = self.value_width,
            )
        } else {
            format!("{:<width$} {}", key, value, width = self.key_width)
        }
    }
}
