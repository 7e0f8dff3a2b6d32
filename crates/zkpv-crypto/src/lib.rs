//! BLAKE3 Fiat–Shamir transcript with a domain-separated absorb/challenge API.
//!
//! Every absorb and every challenge is framed as `tag ‖ len(label) ‖ label ‖
//! len(payload) ‖ payload`, so two different call sequences can never collide
//! on the same hasher input. Challenges are read from the BLAKE3 XOF of the
//! current state and then folded back into the state, so consecutive
//! challenges under the same label differ.
//!
//! ⚠️ This models a random oracle for a prototype proof system; it has not
//! been reviewed as a protocol design.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

use blake3::Hasher;

/// Fixed prefix mixed in before the caller's domain string.
const TRANSCRIPT_PREFIX: &[u8] = b"zkpv.transcript.v1";

/// Transcript interface shared by prover and verifier.
pub trait Transcript {
    /// Add raw bytes under a label.
    fn absorb(&mut self, label: &str, bytes: &[u8]);

    /// Absorb an unsigned 64-bit value (LE).
    fn absorb_u64(&mut self, label: &str, x: u64) {
        self.absorb(label, &x.to_le_bytes());
    }

    /// Absorb a sequence of `u64` values, length-prefixed.
    fn absorb_u64_slice(&mut self, label: &str, xs: &[u64]) {
        let mut buf = Vec::with_capacity(8 * (xs.len() + 1));
        buf.extend_from_slice(&(xs.len() as u64).to_le_bytes());
        for x in xs {
            buf.extend_from_slice(&x.to_le_bytes());
        }
        self.absorb(label, &buf);
    }

    /// Squeeze `n` bytes as a challenge under `label`.
    #[must_use]
    fn challenge_bytes(&mut self, label: &str, n: usize) -> Vec<u8>;

    /// Squeeze `k` little-endian `u64` words under `label`.
    #[must_use]
    fn challenge_u64s(&mut self, label: &str, k: usize) -> Vec<u64> {
        self.challenge_bytes(label, 8 * k)
            .chunks_exact(8)
            .map(|c| {
                let mut le = [0u8; 8];
                le.copy_from_slice(c);
                u64::from_le_bytes(le)
            })
            .collect()
    }
}

#[inline]
fn frame(st: &mut Hasher, tag: &[u8], label: &str) {
    st.update(tag);
    st.update(&(label.len() as u32).to_le_bytes());
    st.update(label.as_bytes());
}

/// BLAKE3-backed transcript.
#[derive(Clone, Debug)]
pub struct Blake3Transcript {
    st: Hasher,
}

impl Blake3Transcript {
    /// Create a transcript bound to a protocol domain string.
    #[must_use]
    pub fn new(domain_sep: &str) -> Self {
        let mut st = Hasher::new();
        st.update(TRANSCRIPT_PREFIX);
        frame(&mut st, b"domain", domain_sep);
        Self { st }
    }
}

impl Transcript for Blake3Transcript {
    fn absorb(&mut self, label: &str, bytes: &[u8]) {
        frame(&mut self.st, b"absorb", label);
        self.st.update(&(bytes.len() as u64).to_le_bytes());
        self.st.update(bytes);
    }

    fn challenge_bytes(&mut self, label: &str, n: usize) -> Vec<u8> {
        let mut st = self.st.clone();
        frame(&mut st, b"challenge", label);
        let mut out = vec![0u8; n];
        st.finalize_xof().fill(&mut out);

        // Forward progress: later challenges depend on this one having been drawn.
        frame(&mut self.st, b"after_challenge", label);
        self.st.update(&(n as u64).to_le_bytes());
        out
    }
}

/// Canonical transcript labels for the ZKPV STARK.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Label {
    /// Circuit identity digest.
    CircuitId,
    /// Trace shape and proof parameters.
    Params,
    /// Public-input vector.
    PublicInputs,
    /// Root of the blinded trace and mask commitment.
    TraceRoot,
    /// Constraint combination coefficients.
    Alphas,
    /// Per-column weights folding the trace into the first FRI layer.
    Combine,
    /// FRI layer commitment root.
    FriRoot,
    /// FRI folding coefficient.
    FriBeta,
    /// Constant value of the last FRI layer.
    FriFinal,
    /// FRI query positions.
    FriQueries,
}

impl Label {
    /// Borrow the canonical string.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CircuitId => "zkpv/circuit_id",
            Self::Params => "zkpv/params",
            Self::PublicInputs => "zkpv/public_inputs",
            Self::TraceRoot => "zkpv/trace_root",
            Self::Alphas => "zkpv/alphas",
            Self::Combine => "zkpv/combine",
            Self::FriRoot => "zkpv/fri_root",
            Self::FriBeta => "zkpv/fri_beta",
            Self::FriFinal => "zkpv/fri_final",
            Self::FriQueries => "zkpv/fri_queries",
        }
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::{Blake3Transcript, Label, Transcript};

    #[test]
    fn determinism_and_label_separation() {
        let mut t1 = Blake3Transcript::new("dom");
        let mut t2 = Blake3Transcript::new("dom");
        t1.absorb("a", b"hello");
        t2.absorb("a", b"hello");
        assert_eq!(t1.challenge_bytes("c", 32), t2.challenge_bytes("c", 32));

        let mut t3 = Blake3Transcript::new("dom");
        t3.absorb("a", b"hello");
        assert_ne!(t1.challenge_bytes("c", 32), t3.challenge_bytes("d", 32));
    }

    #[test]
    fn domain_separation_changes_output() {
        let mut t1 = Blake3Transcript::new("dom1");
        let mut t2 = Blake3Transcript::new("dom2");
        t1.absorb("x", b"payload");
        t2.absorb("x", b"payload");
        assert_ne!(t1.challenge_bytes("c", 16), t2.challenge_bytes("c", 16));
    }

    #[test]
    fn framing_prevents_concatenation_collisions() {
        let mut t1 = Blake3Transcript::new("dom");
        let mut t2 = Blake3Transcript::new("dom");
        t1.absorb("ab", b"c");
        t2.absorb("a", b"bc");
        assert_ne!(t1.challenge_bytes("c", 16), t2.challenge_bytes("c", 16));
    }

    #[test]
    fn repeated_challenges_advance_state() {
        let mut t = Blake3Transcript::new("dom");
        let first = t.challenge_u64s(Label::Alphas.as_str(), 2);
        let second = t.challenge_u64s(Label::Alphas.as_str(), 2);
        assert_eq!(first.len(), 2);
        assert_ne!(first, second);
    }

    #[test]
    fn label_strings_are_distinct() {
        let all = [
            Label::CircuitId,
            Label::Params,
            Label::PublicInputs,
            Label::TraceRoot,
            Label::Alphas,
            Label::Combine,
            Label::FriRoot,
            Label::FriBeta,
            Label::FriFinal,
            Label::FriQueries,
        ];
        let set: std::collections::HashSet<&str> = all.iter().map(|l| l.as_str()).collect();
        assert_eq!(set.len(), all.len());
    }

    #[test]
    fn u64_slice_is_length_prefixed() {
        let mut t1 = Blake3Transcript::new("dom");
        let mut t2 = Blake3Transcript::new("dom");
        t1.absorb_u64_slice("v", &[1, 2]);
        t2.absorb_u64_slice("v", &[1]);
        t2.absorb_u64_slice("v", &[2]);
        assert_ne!(t1.challenge_bytes("c", 8), t2.challenge_bytes("c", 8));
    }
}
