//! Horner evaluation of a private polynomial at a public point.
//!
//! Columns `(acc, coeff, x)` over `m` rows, coefficients highest degree
//! first: `acc_0 = coeff_0`, `acc_{i+1} = acc_i · x + coeff_{i+1}`, and `x`
//! is constant. The last row pins `acc` to the claimed evaluation `y`.

use zkpv_core::{BoundWitness, InputDecl, ZkResult};
use zkpv_field::Goldilocks as F;

use super::{scalar, vector, Circuit};
use crate::air::{Air, RowKind, TraceTable};

const ACC: usize = 0;
const COEFF: usize = 1;
const X: usize = 2;

/// Horner AIR over `coeffs` coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolyEvalAir {
    coeffs: usize,
}

impl PolyEvalAir {
    /// AIR for a polynomial with `coeffs` coefficients.
    #[must_use]
    pub const fn new(coeffs: usize) -> Self {
        Self { coeffs }
    }
}

impl Air for PolyEvalAir {
    fn column_labels(&self) -> Vec<String> {
        ["poly/acc", "poly/coeff", "poly/x"].map(String::from).to_vec()
    }

    fn rows(&self) -> usize {
        self.coeffs
    }

    fn public_len(&self) -> usize {
        2
    }

    fn eval_transition(&self, cur: &[F], next: &[F], out: &mut Vec<F>) {
        out.push(next[ACC] - (cur[ACC] * cur[X] + next[COEFF]));
        out.push(next[X] - cur[X]);
    }

    fn eval_boundary(&self, kind: RowKind, row: &[F], public: &[F], out: &mut Vec<F>) {
        match kind {
            RowKind::First => {
                out.push(row[ACC] - row[COEFF]);
                out.push(row[X] - public[0]);
            }
            RowKind::Last => out.push(row[ACC] - public[1]),
        }
    }

    fn constraint_degree(&self) -> usize {
        2
    }
}

impl Circuit for PolyEvalAir {
    fn inputs(&self) -> Vec<InputDecl> {
        vec![
            InputDecl::public("x", 1),
            InputDecl::private("coeffs", self.coeffs),
            InputDecl::public("y", 1),
        ]
    }

    fn generate_trace(&self, witness: &BoundWitness) -> ZkResult<TraceTable> {
        let x = scalar(witness, "x")?;
        let coeffs = vector(witness, "coeffs")?.to_vec();
        let mut acc = Vec::with_capacity(coeffs.len());
        let mut running = F::zero();
        for &c in &coeffs {
            running = running * x + c;
            acc.push(running);
        }
        let xs = vec![x; coeffs.len()];
        TraceTable::from_columns(vec![acc, coeffs, xs])
    }

    fn public_vector(&self, witness: &BoundWitness, _trace: &TraceTable) -> ZkResult<Vec<F>> {
        Ok(vec![scalar(witness, "x")?, scalar(witness, "y")?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::air::check_constraints;
    use zkpv_core::{bind, CircuitId, CircuitInputMap, InputSchema, ZkError};

    fn prepare(y: &str) -> (PolyEvalAir, TraceTable, Vec<F>) {
        let air = PolyEvalAir::new(4);
        let schema = InputSchema {
            circuit_id: CircuitId([0; 32]),
            inputs: air.inputs(),
        };
        // 2x^3 + 0x^2 + 1x + 5 at x = 3 is 62.
        let map = CircuitInputMap::new()
            .with("x", ["3"])
            .with("coeffs", ["2", "0", "1", "5"])
            .with("y", [y]);
        let w = bind(&schema, &map).unwrap();
        let t = air.generate_trace(&w).unwrap();
        let public = air.public_vector(&w, &t).unwrap();
        (air, t, public)
    }

    #[test]
    fn correct_claim_satisfies_every_constraint() {
        let (air, t, public) = prepare("62");
        assert_eq!(t.column(ACC)[3], F::from_u64(62));
        assert_eq!(public, vec![F::from_u64(3), F::from_u64(62)]);
        check_constraints(&air, &t, &public).unwrap();
    }

    #[test]
    fn wrong_claim_is_unsatisfiable() {
        let (air, t, public) = prepare("63");
        match check_constraints(&air, &t, &public) {
            Err(ZkError::ProvingFailed(msg)) => assert!(msg.contains("last-row constraint 0 fails at row 3")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
