//! Built-in circuits.
//!
//! A [`Circuit`] pairs its [`Air`] with the input schema callers bind against
//! and with witness → trace generation. [`instantiate`] maps a key's
//! [`CircuitDescriptor`] to the matching implementation.

use zkpv_core::{BoundWitness, CircuitDescriptor, CircuitId, InputDecl, InputSchema, ZkError, ZkResult};
use zkpv_field::Goldilocks as F;

use crate::air::{Air, TraceTable};

mod fibonacci;
mod poly_eval;
mod sha256;

pub use fibonacci::FibonacciAir;
pub use poly_eval::PolyEvalAir;
pub use sha256::{pad_single_block, Sha256Air};

/// A circuit: schema, trace generation and public vector on top of its AIR.
pub trait Circuit: Air {
    /// Declared inputs, in binding order.
    fn inputs(&self) -> Vec<InputDecl>;

    /// Execution trace for a bound witness.
    fn generate_trace(&self, witness: &BoundWitness) -> ZkResult<TraceTable>;

    /// Public inputs followed by public outputs. Its length is [`Air::public_len`].
    fn public_vector(&self, witness: &BoundWitness, trace: &TraceTable) -> ZkResult<Vec<F>>;
}

/// Circuit implementation for a descriptor.
#[must_use]
pub fn instantiate(descriptor: &CircuitDescriptor) -> Box<dyn Circuit> {
    match *descriptor {
        CircuitDescriptor::Fibonacci { rows } => Box::new(FibonacciAir::new(rows as usize)),
        CircuitDescriptor::PolyEval { coeffs } => Box::new(PolyEvalAir::new(coeffs as usize)),
        CircuitDescriptor::Sha256 => Box::new(Sha256Air),
    }
}

/// Input schema of the circuit a key describes.
#[must_use]
pub fn input_schema(circuit_id: CircuitId, descriptor: &CircuitDescriptor) -> InputSchema {
    InputSchema {
        circuit_id,
        inputs: instantiate(descriptor).inputs(),
    }
}

/// A single declared value of the witness.
fn scalar(witness: &BoundWitness, name: &str) -> ZkResult<F> {
    vector(witness, name)?
        .first()
        .copied()
        .ok_or_else(|| ZkError::ArityMismatch {
            name: name.to_owned(),
            expected: 1,
            found: 0,
        })
}

fn vector<'w>(witness: &'w BoundWitness, name: &str) -> ZkResult<&'w [F]> {
    witness.get(name).ok_or_else(|| ZkError::MissingInput {
        name: name.to_owned(),
    })
}
