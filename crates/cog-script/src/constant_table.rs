//! Named compile-time constants.
//!
//! The host registers these alongside verbs (damage classes, surface
//! flags and the like). The resolver substitutes them into the
//! instruction stream as literals; they have no runtime presence.

use crate::value::Value;

/// Host-registered named constants, resolved case-insensitively at
/// compile time.
#[derive(Debug, Clone, Default)]
pub struct ConstantTable {
    entries: Vec<(String, Value)>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constant. Later registrations of the same name shadow
    /// earlier ones.
    pub fn register(&mut self, name: impl Into<String>, value: Value) {
        self.entries.push((name.into(), value));
    }

    /// Look up a constant's value by name.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        let mut constants = ConstantTable::new();
        constants.register("damage_fire", Value::Int(0x4));
        assert_eq!(constants.lookup("DAMAGE_FIRE"), Some(Value::Int(0x4)));
        assert_eq!(constants.lookup("damage_ice"), None);
    }

    #[test]
    fn test_shadowing() {
        let mut constants = ConstantTable::new();
        constants.register("gravity", Value::Float(4.0));
        constants.register("gravity", Value::Float(9.8));
        assert_eq!(constants.lookup("gravity"), Some(Value::Float(9.8)));
    }
}
