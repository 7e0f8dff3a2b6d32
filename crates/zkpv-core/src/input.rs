//! Input binding: stringly-typed input maps → schema-typed witnesses.
//!
//! A [`CircuitInputMap`] is what callers hand over (`{"a": ["0"], "b": ["1"]}`).
//! [`bind`] validates it against the circuit's [`InputSchema`] and parses each
//! decimal string into a field element, producing a [`BoundWitness`] ordered by
//! declaration. Decimal strings never cross this boundary inward.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use zkpv_field::Goldilocks as F;

use crate::error::{ZkError, ZkResult};
use crate::keys::CircuitId;

/// Input name → ordered decimal-string values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CircuitInputMap(BTreeMap<String, Vec<String>>);

impl CircuitInputMap {
    /// Empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) an input.
    pub fn insert<K, I, S>(&mut self, name: K, values: I) -> &mut Self
    where
        K: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with<K, I, S>(mut self, name: K, values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(name, values);
        self
    }

    /// Remove an input, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.0.remove(name)
    }

    /// Values for `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Input names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, S: Into<String>> FromIterator<(K, Vec<S>)> for CircuitInputMap {
    fn from_iter<T: IntoIterator<Item = (K, Vec<S>)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

/// Whether an input is committed into the public-input vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Appears in the public-input vector.
    Public,
    /// Known only to the prover.
    Private,
}

/// One declared input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDecl {
    /// Input name.
    pub name: String,
    /// Exact number of field elements.
    pub arity: usize,
    /// Public or private.
    pub visibility: Visibility,
}

impl InputDecl {
    /// Public input of the given arity.
    #[must_use]
    pub fn public(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
            visibility: Visibility::Public,
        }
    }

    /// Private input of the given arity.
    #[must_use]
    pub fn private(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
            visibility: Visibility::Private,
        }
    }
}

/// Circuit identity plus its ordered input declarations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSchema {
    /// Circuit the schema belongs to.
    pub circuit_id: CircuitId,
    /// Declarations in binding order.
    pub inputs: Vec<InputDecl>,
}

impl InputSchema {
    /// Total arity of public inputs.
    #[must_use]
    pub fn public_arity(&self) -> usize {
        self.inputs
            .iter()
            .filter(|d| d.visibility == Visibility::Public)
            .map(|d| d.arity)
            .sum()
    }

    fn declares(&self, name: &str) -> bool {
        self.inputs.iter().any(|d| d.name == name)
    }
}

/// A validated input assignment, in schema order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundWitness {
    circuit_id: CircuitId,
    entries: Vec<(InputDecl, Vec<F>)>,
}

impl BoundWitness {
    /// Circuit this witness was bound against.
    #[must_use]
    pub const fn circuit_id(&self) -> CircuitId {
        self.circuit_id
    }

    /// Values of a declared input.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[F]> {
        self.entries
            .iter()
            .find(|(d, _)| d.name == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Concatenated public values, in declaration order.
    #[must_use]
    pub fn public_values(&self) -> Vec<F> {
        self.entries
            .iter()
            .filter(|(d, _)| d.visibility == Visibility::Public)
            .flat_map(|(_, v)| v.iter().copied())
            .collect()
    }

    /// Iterate `(declaration, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&InputDecl, &[F])> {
        self.entries.iter().map(|(d, v)| (d, v.as_slice()))
    }
}

/// Validate `map` against `schema` and parse every value.
///
/// Checks run in a fixed order so the reported error is deterministic:
/// undeclared keys first (sorted by name), then each declared input in schema
/// order: presence, arity, then each value.
pub fn bind(schema: &InputSchema, map: &CircuitInputMap) -> ZkResult<BoundWitness> {
    if let Some(extra) = map.names().find(|n| !schema.declares(n)) {
        return Err(ZkError::UnexpectedInput {
            name: extra.to_owned(),
        });
    }

    let mut entries = Vec::with_capacity(schema.inputs.len());
    for decl in &schema.inputs {
        let raw = map.get(&decl.name).ok_or_else(|| ZkError::MissingInput {
            name: decl.name.clone(),
        })?;
        if raw.len() != decl.arity {
            return Err(ZkError::ArityMismatch {
                name: decl.name.clone(),
                expected: decl.arity,
                found: raw.len(),
            });
        }
        let values: Vec<F> = zkpv_field::codec::parse_decimal_vec(raw).map_err(|(index, source)| {
            ZkError::MalformedValue {
                name: decl.name.clone(),
                index,
                source,
            }
        })?;
        entries.push((decl.clone(), values));
    }

    tracing::debug!(
        circuit = %schema.circuit_id,
        inputs = entries.len(),
        "bound witness"
    );
    Ok(BoundWitness {
        circuit_id: schema.circuit_id,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkpv_field::ParseFieldError;

    fn schema() -> InputSchema {
        InputSchema {
            circuit_id: CircuitId([7; 32]),
            inputs: vec![
                InputDecl::public("x", 1),
                InputDecl::private("coeffs", 3),
                InputDecl::public("y", 1),
            ],
        }
    }

    fn full() -> CircuitInputMap {
        CircuitInputMap::new()
            .with("x", ["2"])
            .with("coeffs", ["1", "0", "5"])
            .with("y", ["9"])
    }

    #[test]
    fn binds_in_schema_order() {
        let w = bind(&schema(), &full()).unwrap();
        assert_eq!(w.circuit_id(), CircuitId([7; 32]));
        assert_eq!(w.get("coeffs").unwrap().len(), 3);
        assert_eq!(w.public_values(), vec![F::from_u64(2), F::from_u64(9)]);
        let names: Vec<_> = w.iter().map(|(d, _)| d.name.as_str()).collect();
        assert_eq!(names, ["x", "coeffs", "y"]);
        assert_eq!(schema().public_arity(), 2);
    }

    #[test]
    fn unexpected_key_wins_over_missing_key() {
        let map = CircuitInputMap::new().with("zzz", ["1"]).with("aaa", ["1"]);
        match bind(&schema(), &map) {
            Err(ZkError::UnexpectedInput { name }) => assert_eq!(name, "aaa"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn missing_is_reported_in_schema_order() {
        let map = CircuitInputMap::new().with("y", ["1"]);
        match bind(&schema(), &map) {
            Err(ZkError::MissingInput { name }) => assert_eq!(name, "x"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn arity_is_exact() {
        let map = full().with("coeffs", ["1", "2"]);
        assert!(matches!(
            bind(&schema(), &map),
            Err(ZkError::ArityMismatch {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn malformed_value_carries_position() {
        let map = full().with("coeffs", ["1", "-4", "5"]);
        match bind(&schema(), &map) {
            Err(ZkError::MalformedValue {
                name,
                index,
                source,
            }) => {
                assert_eq!(name, "coeffs");
                assert_eq!(index, 1);
                assert!(matches!(source, ParseFieldError::InvalidDigit { .. }));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn input_map_json_shape() {
        let map: CircuitInputMap = serde_json::from_str(r#"{"a":["0"],"b":["1"]}"#).unwrap();
        assert_eq!(map.get("a"), Some(&["0".to_string()][..]));
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"a":["0"],"b":["1"]}"#);
    }
}
