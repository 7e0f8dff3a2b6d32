//! Fibonacci recurrence.
//!
//! Columns `(left, right)`. Row 0 is `(a, b)` and each step maps
//! `(l, r) -> (r, l + r)`. The public vector is `[a, b, right_{n-1}]`.

use zkpv_core::{BoundWitness, InputDecl, ZkResult};
use zkpv_field::Goldilocks as F;

use super::{scalar, Circuit};
use crate::air::{Air, RowKind, TraceTable};

const LEFT: usize = 0;
const RIGHT: usize = 1;

/// Fibonacci AIR over `rows` steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FibonacciAir {
    rows: usize,
}

impl FibonacciAir {
    /// AIR for a trace of `rows` rows.
    #[must_use]
    pub const fn new(rows: usize) -> Self {
        Self { rows }
    }
}

impl Air for FibonacciAir {
    fn column_labels(&self) -> Vec<String> {
        vec!["fib/left".into(), "fib/right".into()]
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn public_len(&self) -> usize {
        3
    }

    fn eval_transition(&self, cur: &[F], next: &[F], out: &mut Vec<F>) {
        out.push(next[LEFT] - cur[RIGHT]);
        out.push(next[RIGHT] - (cur[LEFT] + cur[RIGHT]));
    }

    fn eval_boundary(&self, kind: RowKind, row: &[F], public: &[F], out: &mut Vec<F>) {
        match kind {
            RowKind::First => {
                out.push(row[LEFT] - public[0]);
                out.push(row[RIGHT] - public[1]);
            }
            RowKind::Last => out.push(row[RIGHT] - public[2]),
        }
    }

    fn constraint_degree(&self) -> usize {
        1
    }
}

impl Circuit for FibonacciAir {
    fn inputs(&self) -> Vec<InputDecl> {
        vec![InputDecl::public("a", 1), InputDecl::public("b", 1)]
    }

    fn generate_trace(&self, witness: &BoundWitness) -> ZkResult<TraceTable> {
        let (mut l, mut r) = (scalar(witness, "a")?, scalar(witness, "b")?);
        let mut left = Vec::with_capacity(self.rows);
        let mut right = Vec::with_capacity(self.rows);
        for _ in 0..self.rows {
            left.push(l);
            right.push(r);
            (l, r) = (r, l + r);
        }
        TraceTable::from_columns(vec![left, right])
    }

    fn public_vector(&self, witness: &BoundWitness, trace: &TraceTable) -> ZkResult<Vec<F>> {
        let out = trace.column(RIGHT)[trace.n_rows() - 1];
        Ok(vec![scalar(witness, "a")?, scalar(witness, "b")?, out])
    }
}
