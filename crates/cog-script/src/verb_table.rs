//! Host verb registration and marshalled dispatch.
//!
//! Verbs are registered by name before compilation; the resolver turns
//! every call site into a [`VerbId`], so runtime dispatch is an array
//! index and never a name lookup.

use crate::value::{Value, ValueKind};
use thiserror::Error;

/// Compile-time-resolved verb index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerbId(pub u16);

/// Error raised by verb dispatch: either the host function failed, or
/// an operand could not be marshalled to the declared signature.
#[derive(Debug, Clone, Error)]
pub enum VerbError {
    #[error("argument {index} of '{verb}': expected {expected}, got {got}")]
    ArgumentType {
        verb: String,
        index: usize,
        expected: ValueKind,
        got: ValueKind,
    },
    #[error("'{verb}' returned {got:?}, declared {declared:?}")]
    ResultType {
        verb: String,
        declared: Option<ValueKind>,
        got: Option<ValueKind>,
    },
    #[error("'{verb}': {message}")]
    Host { verb: String, message: String },
}

impl VerbError {
    /// Convenience for host verbs reporting their own failure.
    pub fn host(verb: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Host {
            verb: verb.into(),
            message: message.into(),
        }
    }
}

/// A native function exposed to scripts. Receives already-marshalled
/// operands matching its declared parameter kinds.
pub type VerbFn = Box<dyn FnMut(&[Value]) -> Result<Option<Value>, VerbError>>;

/// Declared shape of a verb: fixed parameter kinds and an optional
/// result kind.
#[derive(Debug, Clone, PartialEq)]
pub struct VerbSignature {
    pub params: Vec<ValueKind>,
    pub returns: Option<ValueKind>,
}

struct VerbEntry {
    name: String,
    signature: VerbSignature,
    native: VerbFn,
}

/// The host-supplied verb table. Populated before any `compile()` call
/// that references its verbs.
#[derive(Default)]
pub struct VerbTable {
    entries: Vec<VerbEntry>,
}

impl VerbTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native verb. Later registrations of the same name
    /// shadow earlier ones for new compilations.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        params: Vec<ValueKind>,
        returns: Option<ValueKind>,
        native: impl FnMut(&[Value]) -> Result<Option<Value>, VerbError> + 'static,
    ) -> VerbId {
        let id = VerbId(self.entries.len() as u16);
        self.entries.push(VerbEntry {
            name: name.into(),
            signature: VerbSignature { params, returns },
            native: Box::new(native),
        });
        id
    }

    /// Resolve a verb by name, case-insensitively. Compile-time only.
    pub fn lookup(&self, name: &str) -> Option<VerbId> {
        self.entries
            .iter()
            .rposition(|e| e.name.eq_ignore_ascii_case(name))
            .map(|i| VerbId(i as u16))
    }

    /// Declared arity of a verb.
    pub fn arity(&self, id: VerbId) -> usize {
        self.entries[id.0 as usize].signature.params.len()
    }

    /// Whether a verb pushes a result.
    pub fn has_result(&self, id: VerbId) -> bool {
        self.entries[id.0 as usize].signature.returns.is_some()
    }

    /// Registered name of a verb.
    pub fn name(&self, id: VerbId) -> &str {
        &self.entries[id.0 as usize].name
    }

    /// Marshal `args` to the verb's declared parameter kinds, invoke the
    /// native function, and check the result against the declared return
    /// kind. `args` must already have the declared arity — the code
    /// generator guarantees it.
    pub fn invoke(&mut self, id: VerbId, args: &[Value]) -> Result<Option<Value>, VerbError> {
        let entry = &mut self.entries[id.0 as usize];
        debug_assert_eq!(args.len(), entry.signature.params.len());

        let mut marshalled = Vec::with_capacity(args.len());
        for (index, (arg, &want)) in args.iter().zip(&entry.signature.params).enumerate() {
            match arg.coerce(want) {
                Some(v) => marshalled.push(v),
                None => {
                    return Err(VerbError::ArgumentType {
                        verb: entry.name.clone(),
                        index,
                        expected: want,
                        got: arg.kind(),
                    })
                }
            }
        }

        let result = (entry.native)(&marshalled)?;
        match (&entry.signature.returns, &result) {
            (None, None) => Ok(None),
            (Some(want), Some(got)) => match got.coerce(*want) {
                Some(v) => Ok(Some(v)),
                None => Err(VerbError::ResultType {
                    verb: entry.name.clone(),
                    declared: Some(*want),
                    got: Some(got.kind()),
                }),
            },
            (declared, got) => Err(VerbError::ResultType {
                verb: entry.name.clone(),
                declared: *declared,
                got: got.as_ref().map(Value::kind),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_verbs() -> VerbTable {
        let mut verbs = VerbTable::new();
        verbs.register(
            "GetHealth",
            vec![ValueKind::Int],
            Some(ValueKind::Float),
            |_args| Ok(Some(Value::Float(100.0))),
        );
        verbs.register("Reset", vec![], None, |_args| Ok(None));
        verbs
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let verbs = table_with_verbs();
        assert_eq!(verbs.lookup("GetHealth"), verbs.lookup("gethealth"));
        assert_eq!(verbs.lookup("GETHEALTH"), Some(VerbId(0)));
        assert_eq!(verbs.lookup("Unknown"), None);
    }

    #[test]
    fn test_invoke_marshals_arguments() {
        let mut verbs = table_with_verbs();
        let id = verbs.register(
            "Probe",
            vec![ValueKind::Int, ValueKind::Float],
            None,
            |args| {
                // Marshalled per the declared signature.
                assert_eq!(args[0], Value::Int(2));
                assert_eq!(args[1], Value::Float(3.0));
                Ok(None)
            },
        );
        let result = verbs.invoke(id, &[Value::Float(2.5), Value::Int(3)]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_invoke_rejects_vector_where_number_expected() {
        let mut verbs = table_with_verbs();
        let id = verbs.lookup("GetHealth").unwrap();
        let err = verbs
            .invoke(id, &[Value::Vector(crate::Vector::ZERO)])
            .unwrap_err();
        assert!(matches!(err, VerbError::ArgumentType { index: 0, .. }));
    }

    #[test]
    fn test_invoke_checks_result_against_declaration() {
        let mut verbs = VerbTable::new();
        let id = verbs.register("Lies", vec![], Some(ValueKind::Int), |_| Ok(None));
        let err = verbs.invoke(id, &[]).unwrap_err();
        assert!(matches!(err, VerbError::ResultType { .. }));
    }

    #[test]
    fn test_reregistration_shadows() {
        let mut verbs = table_with_verbs();
        verbs.register("GetHealth", vec![ValueKind::Int], Some(ValueKind::Float), |_| {
            Ok(Some(Value::Float(50.0)))
        });
        let id = verbs.lookup("GetHealth").unwrap();
        assert_eq!(
            verbs.invoke(id, &[Value::Int(1)]).unwrap(),
            Some(Value::Float(50.0))
        );
    }
}
