//! Names known to the conversion.
//!
//! Both collections only grow: a variable declared anywhere is a variable for
//! the rest of the stylesheet, and property aliases are never popped.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub(crate) struct Scope {
    /// Variable names, stored without a leading `$`.
    variables: HashSet<String>,
    property_keys: Vec<String>,
    property_values: Vec<String>,
}

impl Scope {
    pub(crate) fn declare(&mut self, name: &str) {
        self.variables.insert(bare_name(name).to_string());
    }

    pub(crate) fn is_variable(&self, name: &str) -> bool {
        self.variables.contains(bare_name(name))
    }

    /// Record the rendered value of a property.
    pub(crate) fn push_alias(&mut self, key: String, value: String) {
        self.property_keys.push(key);
        self.property_values.push(value);
    }

    /// The most recent value rendered for a property called `key`.
    pub(crate) fn lookup_alias(&self, key: &str) -> Option<&str> {
        self.property_keys
            .iter()
            .rposition(|k| k == key)
            .map(|index| self.property_values[index].as_str())
    }
}

fn bare_name(name: &str) -> &str {
    name.trim_start_matches('$')
}

/// `name` or `$name` as a variable reference.
pub(crate) fn variable_ref(name: &str) -> String {
    format!("${}", bare_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_ignores_dollar() {
        let mut scope = Scope::default();
        scope.declare("$size");
        assert!(scope.is_variable("size"));
        assert!(scope.is_variable("$size"));
        assert!(!scope.is_variable("color"));
    }

    #[test]
    fn test_latest_alias_wins() {
        let mut scope = Scope::default();
        scope.push_alias("width".into(), "10px".into());
        scope.push_alias("height".into(), "5px".into());
        scope.push_alias("width".into(), "$w".into());
        assert_eq!(scope.lookup_alias("width"), Some("$w"));
        assert_eq!(scope.lookup_alias("height"), Some("5px"));
        assert_eq!(scope.lookup_alias("margin"), None);
    }

    #[test]
    fn test_variable_ref() {
        assert_eq!(variable_ref("size"), "$size");
        assert_eq!(variable_ref("$size"), "$size");
    }
}
