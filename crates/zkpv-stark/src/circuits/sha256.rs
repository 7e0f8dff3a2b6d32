//! One SHA-256 compression of a private 512-bit block under the standard IV.
//!
//! Row `t` holds the working state before round `t` and the two words the
//! round produces. `a, b, c, e, f, g` live as 32 little-endian bit columns
//! each, since the round functions are bitwise; `d` and `h` only feed
//! additions and stay words. Additions are checked over the integers as
//! `word(out) + 2^32 · carry = sum`, with the carry decomposed into bits.
//!
//! The message schedule rides along as a window `w[0..16]` holding
//! `W_t ..= W_{t+15}`; each step shifts it and appends `W_{t+16}`. The bits of
//! `w[0]` range-check every schedule word and feed `σ0` through the next row,
//! the bits of `w[14]` feed `σ1`. Round constants are a fixed column.
//!
//! The public vector is the digest `IV + state_64`, eight words.

use zkpv_core::{BoundWitness, InputDecl, ZkError, ZkResult};
use zkpv_field::Goldilocks as F;

use super::{vector, Circuit};
use crate::air::{Air, RowKind, TraceTable};

const ROUNDS: usize = 64;

const IV: [u32; 8] = [
    0x6a09_e667, 0xbb67_ae85, 0x3c6e_f372, 0xa54f_f53a, 0x510e_527f, 0x9b05_688c, 0x1f83_d9ab,
    0x5be0_cd19,
];

const K: [u32; ROUNDS] = [
    0x428a_2f98, 0x7137_4491, 0xb5c0_fbcf, 0xe9b5_dba5, 0x3956_c25b, 0x59f1_11f1, 0x923f_82a4,
    0xab1c_5ed5, 0xd807_aa98, 0x1283_5b01, 0x2431_85be, 0x550c_7dc3, 0x72be_5d74, 0x80de_b1fe,
    0x9bdc_06a7, 0xc19b_f174, 0xe49b_69c1, 0xefbe_4786, 0x0fc1_9dc6, 0x240c_a1cc, 0x2de9_2c6f,
    0x4a74_84aa, 0x5cb0_a9dc, 0x76f9_88da, 0x983e_5152, 0xa831_c66d, 0xb003_27c8, 0xbf59_7fc7,
    0xc6e0_0bf3, 0xd5a7_9147, 0x06ca_6351, 0x1429_2967, 0x27b7_0a85, 0x2e1b_2138, 0x4d2c_6dfc,
    0x5338_0d13, 0x650a_7354, 0x766a_0abb, 0x81c2_c92e, 0x9272_2c85, 0xa2bf_e8a1, 0xa81a_664b,
    0xc24b_8b70, 0xc76c_51a3, 0xd192_e819, 0xd699_0624, 0xf40e_3585, 0x106a_a070, 0x19a4_c116,
    0x1e37_6c08, 0x2748_774c, 0x34b0_bcb5, 0x391c_0cb3, 0x4ed8_aa4a, 0x5b9c_ca4f, 0x682e_6ff3,
    0x748f_82ee, 0x78a5_636f, 0x84c8_7814, 0x8cc7_0208, 0x90be_fffa, 0xa450_6ceb, 0xbef9_a3f7,
    0xc671_78f2,
];

// Column layout.
const A_BITS: usize = 0;
const B_BITS: usize = 32;
const C_BITS: usize = 64;
const E_BITS: usize = 96;
const F_BITS: usize = 128;
const G_BITS: usize = 160;
const D: usize = 192;
const H: usize = 193;
const OUT_A: usize = 194;
const OUT_E: usize = 226;
const CARRY_A: usize = 258;
const CARRY_E: usize = 261;
const W: usize = 264;
const W0_BITS: usize = 280;
const W14_BITS: usize = 312;
const CARRY_W: usize = 344;
const WIDTH: usize = 346;
/// Round constant, the only fixed column.
const K_COL: usize = WIDTH;

const ADD_CARRY_BITS: usize = 3;
const SCHEDULE_CARRY_BITS: usize = 2;

/// Column ranges holding booleans.
const BIT_RANGES: [(usize, usize); 3] = [(A_BITS, D), (OUT_A, W), (W0_BITS, WIDTH)];

/* ------------------------------ native reference ------------------------------ */

fn big_sigma0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

fn big_sigma1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

fn small_sigma0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

fn small_sigma1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

/// Pad a message of at most 55 bytes into the single SHA-256 block that hashes it.
#[must_use]
pub fn pad_single_block(msg: &[u8]) -> Option<[u32; 16]> {
    if msg.len() > 55 {
        return None;
    }
    let mut bytes = [0u8; 64];
    bytes[..msg.len()].copy_from_slice(msg);
    bytes[msg.len()] = 0x80;
    bytes[56..].copy_from_slice(&(msg.len() as u64 * 8).to_be_bytes());
    let mut words = [0u32; 16];
    for (w, c) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *w = u32::from_be_bytes([c[0], c[1], c[2], c[3]]);
    }
    Some(words)
}

/* ------------------------------ field gadgets ------------------------------ */

fn two_32() -> F {
    F::from_u64(1 << 32)
}

/// Little-endian bits to a value.
fn word(bits: &[F]) -> F {
    bits.iter().rev().fold(F::zero(), |acc, &b| acc + acc + b)
}

fn bits32(row: &[F], at: usize) -> &[F] {
    &row[at..at + 32]
}

/// XOR of three booleans as a cubic.
fn xor3(x: F, y: F, z: F) -> F {
    x + y + z - F::from_u64(2) * (x * y + y * z + z * x) + F::from_u64(4) * x * y * z
}

fn bitwise(bit: impl Fn(usize) -> F) -> F {
    (0..32).rev().fold(F::zero(), |acc, k| acc + acc + bit(k))
}

/// `ROTR^r0 ⊕ ROTR^r1 ⊕ ROTR^r2` of a bit-decomposed word.
fn big_sigma(x: &[F], r: [usize; 3]) -> F {
    bitwise(|k| xor3(x[(k + r[0]) % 32], x[(k + r[1]) % 32], x[(k + r[2]) % 32]))
}

/// `ROTR^r0 ⊕ ROTR^r1 ⊕ SHR^s` of a bit-decomposed word.
fn small_sigma(x: &[F], r0: usize, r1: usize, s: usize) -> F {
    bitwise(|k| {
        let shr = if k + s < 32 { x[k + s] } else { F::zero() };
        xor3(x[(k + r0) % 32], x[(k + r1) % 32], shr)
    })
}

fn ch(e: &[F], f: &[F], g: &[F]) -> F {
    bitwise(|k| e[k] * f[k] + (F::one() - e[k]) * g[k])
}

fn maj(a: &[F], b: &[F], c: &[F]) -> F {
    bitwise(|k| a[k] * b[k] + a[k] * c[k] + b[k] * c[k] - F::from_u64(2) * a[k] * b[k] * c[k])
}

fn bit_of(v: u64, k: usize) -> F {
    F::from_u64((v >> k) & 1)
}

/// Booleans, bit/word links and both round additions, on a single row.
fn row_local(row: &[F], out: &mut Vec<F>) {
    for &(lo, hi) in &BIT_RANGES {
        out.extend(row[lo..hi].iter().map(|&b| b * (b - F::one())));
    }
    out.push(word(bits32(row, W0_BITS)) - row[W]);
    out.push(word(bits32(row, W14_BITS)) - row[W + 14]);

    let (a, b, c) = (bits32(row, A_BITS), bits32(row, B_BITS), bits32(row, C_BITS));
    let (e, f, g) = (bits32(row, E_BITS), bits32(row, F_BITS), bits32(row, G_BITS));
    let t1 = row[H] + big_sigma(e, [6, 11, 25]) + ch(e, f, g) + row[K_COL] + row[W];
    let t2 = big_sigma(a, [2, 13, 22]) + maj(a, b, c);
    let carry_a = word(&row[CARRY_A..CARRY_A + ADD_CARRY_BITS]);
    let carry_e = word(&row[CARRY_E..CARRY_E + ADD_CARRY_BITS]);
    out.push(word(bits32(row, OUT_A)) + two_32() * carry_a - (t1 + t2));
    out.push(word(bits32(row, OUT_E)) + two_32() * carry_e - (row[D] + t1));
}

/// SHA-256 compression AIR, 64 rounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256Air;

impl Air for Sha256Air {
    fn column_labels(&self) -> Vec<String> {
        let mut labels = Vec::with_capacity(WIDTH);
        for reg in ["a", "b", "c", "e", "f", "g"] {
            labels.extend((0..32).map(|k| format!("sha/{reg}{k}")));
        }
        labels.push("sha/d".into());
        labels.push("sha/h".into());
        for out in ["out_a", "out_e"] {
            labels.extend((0..32).map(|k| format!("sha/{out}{k}")));
        }
        for carry in ["carry_a", "carry_e"] {
            labels.extend((0..ADD_CARRY_BITS).map(|k| format!("sha/{carry}{k}")));
        }
        labels.extend((0..16).map(|i| format!("sha/w{i}")));
        for win in ["w0_bit", "w14_bit"] {
            labels.extend((0..32).map(|k| format!("sha/{win}{k}")));
        }
        labels.extend((0..SCHEDULE_CARRY_BITS).map(|k| format!("sha/carry_w{k}")));
        labels
    }

    fn rows(&self) -> usize {
        ROUNDS
    }

    fn public_len(&self) -> usize {
        8
    }

    fn eval_transition(&self, cur: &[F], next: &[F], out: &mut Vec<F>) {
        row_local(cur, out);
        for k in 0..32 {
            out.push(next[A_BITS + k] - cur[OUT_A + k]);
            out.push(next[B_BITS + k] - cur[A_BITS + k]);
            out.push(next[C_BITS + k] - cur[B_BITS + k]);
            out.push(next[E_BITS + k] - cur[OUT_E + k]);
            out.push(next[F_BITS + k] - cur[E_BITS + k]);
            out.push(next[G_BITS + k] - cur[F_BITS + k]);
        }
        out.push(next[D] - word(bits32(cur, C_BITS)));
        out.push(next[H] - word(bits32(cur, G_BITS)));

        for i in 0..15 {
            out.push(next[W + i] - cur[W + i + 1]);
        }
        let scheduled = small_sigma(bits32(cur, W14_BITS), 17, 19, 10)
            + cur[W + 9]
            + small_sigma(bits32(next, W0_BITS), 7, 18, 3)
            + cur[W];
        let carry_w = word(&cur[CARRY_W..CARRY_W + SCHEDULE_CARRY_BITS]);
        out.push(next[W + 15] + two_32() * carry_w - scheduled);
    }

    fn eval_boundary(&self, kind: RowKind, row: &[F], public: &[F], out: &mut Vec<F>) {
        match kind {
            RowKind::First => {
                for (reg, at) in [(0, A_BITS), (1, B_BITS), (2, C_BITS), (4, E_BITS), (5, F_BITS), (6, G_BITS)] {
                    out.extend((0..32).map(|k| row[at + k] - bit_of(u64::from(IV[reg]), k)));
                }
                out.push(row[D] - F::from_u64(u64::from(IV[3])));
                out.push(row[H] - F::from_u64(u64::from(IV[7])));
            }
            RowKind::Last => {
                row_local(row, out);
                let state = [OUT_A, A_BITS, B_BITS, C_BITS, OUT_E, E_BITS, F_BITS, G_BITS];
                for ((at, iv), &digest) in state.into_iter().zip(IV).zip(public) {
                    // Feed-forward modulo 2^32: the difference is 0 or 2^32.
                    let s = word(bits32(row, at)) + F::from_u64(u64::from(iv)) - digest;
                    out.push(s * (s - two_32()));
                }
            }
        }
    }

    fn constraint_degree(&self) -> usize {
        3
    }

    fn fixed_columns(&self) -> Vec<Vec<F>> {
        vec![K.iter().map(|&k| F::from_u64(u64::from(k))).collect()]
    }

    fn check_public(&self, public: &[F]) -> Result<(), String> {
        match public.iter().position(|v| v.as_canonical_u64() > u64::from(u32::MAX)) {
            Some(i) => Err(format!("digest word {i} does not fit in 32 bits")),
            None => Ok(()),
        }
    }
}

fn set_bits(cols: &mut [Vec<F>], at: usize, row: usize, v: u64, n_bits: usize) {
    for k in 0..n_bits {
        cols[at + k][row] = bit_of(v, k);
    }
}

impl Circuit for Sha256Air {
    fn inputs(&self) -> Vec<InputDecl> {
        vec![InputDecl::private("block", 16), InputDecl::public("digest", 8)]
    }

    fn generate_trace(&self, witness: &BoundWitness) -> ZkResult<TraceTable> {
        let block = vector(witness, "block")?;
        let mut w = Vec::with_capacity(ROUNDS + 16);
        for (i, v) in block.iter().enumerate() {
            let v32 = u32::try_from(v.as_canonical_u64()).map_err(|_| {
                ZkError::ProvingFailed(format!("block word {i} does not fit in 32 bits"))
            })?;
            w.push(v32);
        }
        // The window at the last row reaches W_78.
        for j in 16..ROUNDS + 15 {
            let next = small_sigma1(w[j - 2])
                .wrapping_add(w[j - 7])
                .wrapping_add(small_sigma0(w[j - 15]))
                .wrapping_add(w[j - 16]);
            w.push(next);
        }

        let mut cols = vec![vec![F::zero(); ROUNDS]; WIDTH];
        let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = IV;
        for t in 0..ROUNDS {
            let choose = (e & f) ^ (!e & g);
            let majority = (a & b) ^ (a & c) ^ (b & c);
            let t1 = u64::from(h)
                + u64::from(big_sigma1(e))
                + u64::from(choose)
                + u64::from(K[t])
                + u64::from(w[t]);
            let t2 = u64::from(big_sigma0(a)) + u64::from(majority);
            let sum_a = t1 + t2;
            let sum_e = u64::from(d) + t1;

            for (at, v) in [(A_BITS, a), (B_BITS, b), (C_BITS, c), (E_BITS, e), (F_BITS, f), (G_BITS, g)] {
                set_bits(&mut cols, at, t, u64::from(v), 32);
            }
            cols[D][t] = F::from_u64(u64::from(d));
            cols[H][t] = F::from_u64(u64::from(h));
            set_bits(&mut cols, OUT_A, t, sum_a, 32);
            set_bits(&mut cols, OUT_E, t, sum_e, 32);
            set_bits(&mut cols, CARRY_A, t, sum_a >> 32, ADD_CARRY_BITS);
            set_bits(&mut cols, CARRY_E, t, sum_e >> 32, ADD_CARRY_BITS);

            for i in 0..16 {
                cols[W + i][t] = F::from_u64(u64::from(w[t + i]));
            }
            set_bits(&mut cols, W0_BITS, t, u64::from(w[t]), 32);
            set_bits(&mut cols, W14_BITS, t, u64::from(w[t + 14]), 32);
            let scheduled = u64::from(small_sigma1(w[t + 14]))
                + u64::from(w[t + 9])
                + u64::from(small_sigma0(w[t + 1]))
                + u64::from(w[t]);
            set_bits(&mut cols, CARRY_W, t, scheduled >> 32, SCHEDULE_CARRY_BITS);

            (h, g, f, e, d, c, b, a) = (g, f, e, sum_e as u32, c, b, a, sum_a as u32);
        }
        TraceTable::from_columns(cols)
    }

    fn public_vector(&self, witness: &BoundWitness, _trace: &TraceTable) -> ZkResult<Vec<F>> {
        Ok(vector(witness, "digest")?.to_vec())
    }
}
