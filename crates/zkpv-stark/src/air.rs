//! AIR: trace tables, constraint evaluation and the composition quotient.
//!
//! Constraints are polynomial identities over adjacent rows:
//! - *transition* constraints relate row `i` to row `i + 1` and apply to every
//!   row except the last,
//! - *boundary* constraints pin the first or last row to public values.
//!
//! Each family is folded with powers of its own transcript challenge and
//! divided by the vanishing polynomial of the rows it applies to. For a
//! satisfying trace the sum is a polynomial of degree below
//! [`ProofShape::quotient_degree`]; for any other trace it is not, which is
//! what FRI detects. The verifier recomputes the quotient at every queried
//! point from the opened columns.

use core::fmt;

use zkpv_core::{ZkError, ZkResult};
use zkpv_crypto::{Label, Transcript};
use zkpv_field::{batch_inverse, Goldilocks as F};

use crate::params::{self, ProofShape};

/// Column-major execution trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceTable {
    cols: Vec<Vec<F>>,
}

impl TraceTable {
    /// Build from columns of equal power-of-two height.
    pub fn from_columns(cols: Vec<Vec<F>>) -> ZkResult<Self> {
        let Some(n) = cols.first().map(Vec::len) else {
            return Err(ZkError::ProvingFailed("trace has no columns".into()));
        };
        if !n.is_power_of_two() || cols.iter().any(|c| c.len() != n) {
            return Err(ZkError::ProvingFailed(format!(
                "trace columns must share a power-of-two height (first column has {n} rows)"
            )));
        }
        Ok(Self { cols })
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.cols[0].len()
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.cols.len()
    }

    /// Column `j`.
    #[must_use]
    pub fn column(&self, j: usize) -> &[F] {
        &self.cols[j]
    }

    /// Row `i`, one value per column.
    #[must_use]
    pub fn row(&self, i: usize) -> Vec<F> {
        self.cols.iter().map(|c| c[i]).collect()
    }

    /// Iterate columns.
    pub fn columns(&self) -> impl Iterator<Item = &[F]> {
        self.cols.iter().map(Vec::as_slice)
    }
}

/// Which boundary a constraint family pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowKind {
    /// Row 0.
    First,
    /// Row `n - 1`.
    Last,
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "first-row",
            Self::Last => "last-row",
        })
    }
}

/// Algebraic description of a circuit's trace.
pub trait Air: Send + Sync {
    /// Column labels, bound into the commitment leaves. `len()` is the trace width.
    fn column_labels(&self) -> Vec<String>;

    /// Trace length (power of two).
    fn rows(&self) -> usize;

    /// Length of the public vector the boundary constraints read.
    fn public_len(&self) -> usize;

    /// Push transition constraint values for the pair `(cur, next)`.
    fn eval_transition(&self, cur: &[F], next: &[F], out: &mut Vec<F>);

    /// Push boundary constraint values for `row` at boundary `kind`.
    fn eval_boundary(&self, kind: RowKind, row: &[F], public: &[F], out: &mut Vec<F>);

    /// Highest total degree of any constraint in the row values.
    fn constraint_degree(&self) -> usize;

    /// Public columns of `rows()` values each. Rows handed to the `eval_*`
    /// methods carry them after the committed columns.
    fn fixed_columns(&self) -> Vec<Vec<F>> {
        Vec::new()
    }

    /// Committed trace width.
    fn width(&self) -> usize {
        self.column_labels().len()
    }

    /// Reject public vectors the constraints cannot pin down on their own.
    fn check_public(&self, _public: &[F]) -> Result<(), String> {
        Ok(())
    }
}

/// Composition coefficients, one per constraint family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alphas {
    /// Transition family.
    pub transition: F,
    /// First-row boundary family.
    pub first: F,
    /// Last-row boundary family.
    pub last: F,
}

impl Alphas {
    /// Draw from the transcript (after the column roots are bound).
    #[must_use]
    pub fn derive<T: Transcript>(tr: &mut T) -> Self {
        let a = params::derive_field_elems(tr, Label::Alphas, 3);
        Self {
            transition: a[0],
            first: a[1],
            last: a[2],
        }
    }
}

/// `Σ α^(c+1) · v_c`. No constraint gets the coefficient 1, so families
/// with independent challenges cannot be made to cancel each other.
fn fold_powers(values: &[F], alpha: F) -> F {
    values.iter().rev().fold(F::zero(), |acc, &v| (acc + v) * alpha)
}

/// Folded transition, first-row and last-row numerators at one point.
fn numerators<A: Air + ?Sized>(
    air: &A,
    cur: &[F],
    next: &[F],
    public: &[F],
    alphas: &Alphas,
    buf: &mut Vec<F>,
) -> [F; 3] {
    buf.clear();
    air.eval_transition(cur, next, buf);
    let t = fold_powers(buf, alphas.transition);
    buf.clear();
    air.eval_boundary(RowKind::First, cur, public, buf);
    let f = fold_powers(buf, alphas.first);
    buf.clear();
    air.eval_boundary(RowKind::Last, cur, public, buf);
    let l = fold_powers(buf, alphas.last);
    [t, f, l]
}

/// Composition quotient at an LDE point `x`, from the full rows at `x` and `ω·x`.
///
/// `x` must lie off the trace domain, which every LDE coset point does.
#[must_use]
pub fn quotient_at<A: Air + ?Sized>(
    air: &A,
    shape: &ProofShape,
    x: F,
    cur: &[F],
    next: &[F],
    public: &[F],
    alphas: &Alphas,
) -> F {
    let mut buf = Vec::new();
    let [t, f, l] = numerators(air, cur, next, public, alphas, &mut buf);
    let last = shape.trace_generator().pow(shape.n as u64 - 1);
    let z_h = x.pow(shape.n as u64) - F::one();
    t * (x - last) * z_h.inv() + f * (x - F::one()).inv() + l * (x - last).inv()
}

/// Composition quotient over the whole LDE coset.
///
/// `committed` and `fixed` hold column evaluations on the coset; the row at
/// `ω·x` sits [`ProofShape::next_offset`] positions further on.
#[must_use]
pub fn quotient_on_lde<A: Air + ?Sized>(
    air: &A,
    shape: &ProofShape,
    committed: &[Vec<F>],
    fixed: &[Vec<F>],
    public: &[F],
    alphas: &Alphas,
) -> Vec<F> {
    let size = shape.lde_size();
    let last = shape.trace_generator().pow(shape.n as u64 - 1);
    let w = shape.lde_generator();
    let mut xs = Vec::with_capacity(size);
    let mut x = params::coset_shift();
    for _ in 0..size {
        xs.push(x);
        x *= w;
    }
    let z_h_inv = batch_inverse(
        &xs.iter()
            .map(|&x| x.pow(shape.n as u64) - F::one())
            .collect::<Vec<_>>(),
    );
    let first_inv = batch_inverse(&xs.iter().map(|&x| x - F::one()).collect::<Vec<_>>());
    let last_inv = batch_inverse(&xs.iter().map(|&x| x - last).collect::<Vec<_>>());

    let row_at = |i: usize, row: &mut Vec<F>| {
        row.clear();
        row.extend(committed.iter().chain(fixed).map(|c| c[i]));
    };
    let mut buf = Vec::new();
    let (mut cur, mut next) = (Vec::new(), Vec::new());
    (0..size)
        .map(|i| {
            row_at(i, &mut cur);
            row_at(shape.next_position(i), &mut next);
            let [t, f, l] = numerators(air, &cur, &next, public, alphas, &mut buf);
            t * (xs[i] - last) * z_h_inv[i] + f * first_inv[i] + l * last_inv[i]
        })
        .collect()
}

/// Check every constraint on the full trace, naming the first that fails.
pub fn check_constraints<A: Air + ?Sized>(
    air: &A,
    trace: &TraceTable,
    public: &[F],
) -> ZkResult<()> {
    air.check_public(public)
        .map_err(|e| ZkError::ProvingFailed(format!("public values rejected: {e}")))?;
    let n = trace.n_rows();
    let fail = |what: String, k: usize, i: usize| -> ZkResult<()> {
        Err(ZkError::ProvingFailed(format!(
            "witness does not satisfy the circuit: {what} constraint {k} fails at row {i}"
        )))
    };
    let first_nonzero = |vals: &[F]| vals.iter().position(|v| !v.is_zero());

    let mut buf = Vec::new();
    let fixed = air.fixed_columns();
    let rows: Vec<Vec<F>> = (0..n)
        .map(|i| {
            let mut row = trace.row(i);
            row.extend(fixed.iter().map(|c| c[i]));
            row
        })
        .collect();
    for i in 0..n {
        if i == 0 {
            buf.clear();
            air.eval_boundary(RowKind::First, &rows[0], public, &mut buf);
            if let Some(k) = first_nonzero(&buf) {
                return fail(RowKind::First.to_string(), k, 0);
            }
        }
        if i + 1 < n {
            buf.clear();
            air.eval_transition(&rows[i], &rows[i + 1], &mut buf);
            if let Some(k) = first_nonzero(&buf) {
                return fail("transition".into(), k, i);
            }
        }
    }
    buf.clear();
    air.eval_boundary(RowKind::Last, &rows[n - 1], public, &mut buf);
    if let Some(k) = first_nonzero(&buf) {
        return fail(RowKind::Last.to_string(), k, n - 1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lde::coset_lde;
    use crate::masking::blind_column;
    use rand::{rngs::StdRng, SeedableRng};
    use zkpv_core::StarkParams;
    use zkpv_field::ntt::interpolate_from_evals;

    /// Counter: `next = cur + 1`, starting at `public[0]`.
    struct Counter(usize);

    impl Air for Counter {
        fn column_labels(&self) -> Vec<String> {
            vec!["ctr".into()]
        }
        fn rows(&self) -> usize {
            self.0
        }
        fn public_len(&self) -> usize {
            1
        }
        fn eval_transition(&self, cur: &[F], next: &[F], out: &mut Vec<F>) {
            out.push(next[0] - cur[0] - F::one());
        }
        fn eval_boundary(&self, kind: RowKind, row: &[F], public: &[F], out: &mut Vec<F>) {
            if kind == RowKind::First {
                out.push(row[0] - public[0]);
            }
        }
        fn constraint_degree(&self) -> usize {
            1
        }
    }

    fn trace(start: u64, n: u64) -> TraceTable {
        TraceTable::from_columns(vec![(start..start + n).map(F::from_u64).collect()]).unwrap()
    }

    fn alphas() -> Alphas {
        Alphas {
            transition: F::from_u64(3),
            first: F::from_u64(7),
            last: F::from_u64(11),
        }
    }

    fn shape() -> ProofShape {
        ProofShape::new(8, 1, &StarkParams {
            blowup_log2: 2,
            num_queries: 3,
            col_chunk_log2: 4,
        })
    }

    fn quotient_coeffs(t: &TraceTable, public: &[F]) -> Vec<F> {
        let shape = shape();
        let mut rng = StdRng::seed_from_u64(9);
        let col = coset_lde(&blind_column(t.column(0), shape.blinding, &mut rng), &shape);
        let q = quotient_on_lde(&Counter(8), &shape, &[col], &[], public, &alphas());
        interpolate_from_evals(&q)
    }

    #[test]
    fn satisfying_trace_has_a_low_degree_quotient() {
        let air = Counter(8);
        let t = trace(5, 8);
        let public = [F::from_u64(5)];
        check_constraints(&air, &t, &public).unwrap();
        let coeffs = quotient_coeffs(&t, &public);
        assert!(coeffs[shape().quotient_degree..].iter().all(|c| c.is_zero()));
    }

    #[test]
    fn broken_transition_leaves_a_high_degree_remainder() {
        let mut cols = vec![(0..8u64).map(F::from_u64).collect::<Vec<_>>()];
        cols[0][4] = F::from_u64(40);
        let t = TraceTable::from_columns(cols).unwrap();
        let coeffs = quotient_coeffs(&t, &[F::zero()]);
        assert!(coeffs[shape().quotient_degree..].iter().any(|c| !c.is_zero()));
    }

    #[test]
    fn pointwise_quotient_matches_the_coset_sweep() {
        let shape = shape();
        let t = trace(2, 8);
        let public = [F::from_u64(2)];
        let mut rng = StdRng::seed_from_u64(10);
        let col = coset_lde(&blind_column(t.column(0), shape.blinding, &mut rng), &shape);
        let q = quotient_on_lde(&Counter(8), &shape, &[col.clone()], &[], &public, &alphas());
        for i in [0, 1, 5, shape.lde_size() - 1] {
            let next = shape.next_position(i);
            let v = quotient_at(&Counter(8), &shape, shape.point(i), &[col[i]], &[col[next]], &public, &alphas());
            assert_eq!(v, q[i], "i={i}");
        }
    }

    #[test]
    fn folding_never_uses_a_unit_coefficient() {
        let a = F::from_u64(5);
        assert_eq!(fold_powers(&[F::one()], a), a);
        assert_eq!(fold_powers(&[F::one(), F::one()], a), a + a * a);
    }

    #[test]
    fn violations_name_row_and_family() {
        let air = Counter(8);
        let mut cols = vec![(0..8u64).map(F::from_u64).collect::<Vec<_>>()];
        cols[0][4] = F::from_u64(40);
        let t = TraceTable::from_columns(cols).unwrap();
        match check_constraints(&air, &t, &[F::zero()]) {
            Err(ZkError::ProvingFailed(msg)) => assert!(msg.contains("transition constraint 0 fails at row 3")),
            other => panic!("unexpected {other:?}"),
        }
        match check_constraints(&air, &trace(1, 8), &[F::zero()]) {
            Err(ZkError::ProvingFailed(msg)) => assert!(msg.contains("first-row")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ragged_trace_is_rejected() {
        let cols = vec![vec![F::zero(); 4], vec![F::zero(); 8]];
        assert!(TraceTable::from_columns(cols).is_err());
        assert!(TraceTable::from_columns(vec![vec![F::zero(); 3]]).is_err());
    }
}
