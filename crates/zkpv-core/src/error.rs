//! Error taxonomy for the proving/verification contract.
//!
//! Every contract operation (store, binder, prover, verifier) returns
//! `Result<_, ZkError>`. A verifier that *ran* and rejected a proof returns
//! `Ok(false)`; `Err` always means the check could not be attempted.

use std::io;

use zkpv_field::ParseFieldError;

use crate::keys::EnvelopeError;

/// Errors surfaced by the ZKPV contract. None of them are retried internally.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ZkError {
    /// The named key material does not exist.
    #[error("artifact not found: {location}")]
    ArtifactNotFound {
        /// Resolved path or name that was looked up.
        location: String,
    },

    /// Key material exists but fails its format check.
    #[error("artifact {location} is corrupt: {source}")]
    ArtifactCorrupt {
        /// Resolved path or name of the blob.
        location: String,
        /// Which envelope check failed.
        #[source]
        source: EnvelopeError,
    },

    /// A schema-declared input is absent from the input map.
    #[error("missing input `{name}`")]
    MissingInput {
        /// Declared input name.
        name: String,
    },

    /// The input map names an input the circuit does not declare.
    #[error("unexpected input `{name}`")]
    UnexpectedInput {
        /// Undeclared key found in the map.
        name: String,
    },

    /// An input sequence has the wrong number of values.
    #[error("input `{name}` expects {expected} value(s), got {found}")]
    ArityMismatch {
        /// Declared input name.
        name: String,
        /// Declared arity.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },

    /// A value does not decode as a canonical field element.
    #[error("input `{name}`[{index}] is not a field element: {source}")]
    MalformedValue {
        /// Input (or vector) name.
        name: String,
        /// Position inside the sequence.
        index: usize,
        /// Decoder diagnosis.
        #[source]
        source: ParseFieldError,
    },

    /// Key material and the object it is applied to describe different circuits.
    #[error("key mismatch: {0}")]
    KeyMismatch(String),

    /// The witness does not satisfy the circuit.
    #[error("proving failed: {0}")]
    ProvingFailed(String),

    /// A circuit descriptor or parameter set is outside the supported range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Proving was cancelled through a [`crate::CancellationToken`].
    #[error("operation cancelled")]
    Cancelled,

    /// An I/O failure other than "not found".
    #[error("I/O error on {location}: {source}")]
    Io {
        /// Path involved.
        location: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl ZkError {
    /// Stable, machine-readable kind name (used for logs and CLI output).
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ArtifactNotFound { .. } => "ArtifactNotFound",
            Self::ArtifactCorrupt { .. } => "ArtifactCorrupt",
            Self::MissingInput { .. } => "MissingInput",
            Self::UnexpectedInput { .. } => "UnexpectedInput",
            Self::ArityMismatch { .. } => "ArityMismatch",
            Self::MalformedValue { .. } => "MalformedValue",
            Self::KeyMismatch(_) => "KeyMismatch",
            Self::ProvingFailed(_) => "ProvingFailed",
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::Cancelled => "Cancelled",
            Self::Io { .. } => "Io",
        }
    }
}

/// Contract result alias.
pub type ZkResult<T> = Result<T, ZkError>;
