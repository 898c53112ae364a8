use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("evoting_zkp: invalid witness: {0}")]
    InvalidWitness(String),

    #[error("evoting_zkp: malformed computation rule: {0}")]
    MalformedComputationRule(String),

    #[error("evoting_zkp: invalid phi function: {0}")]
    InvalidPhiFunction(String),

    #[error("evoting_zkp: invalid input: {0}")]
    InvalidInput(String),

    #[error("evoting_zkp: secure random source unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("evoting_zkp: malformed proof: {0}")]
    MalformedProof(String),

    #[error("evoting_zkp: not enough base elements: need at least {0}, found {1}")]
    InvalidArity(usize, usize),

    #[error("evoting_zkp: {0} must not be empty")]
    EmptyInput(&'static str),

    #[error("evoting_zkp: {0} does not belong to the group")]
    GroupMismatch(String),

    #[error("evoting_zkp: mismatched exponent moduli")]
    ModulusMismatch,

    #[error("evoting_zkp: invalid group parameters: {0}")]
    InvalidGroupParameters(String),

    #[error("evoting_zkp: invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("evoting_zkp: JSON error deserializing: {0}")]
    JSONDeserialization(#[from] serde_json::Error),

    #[error("evoting_zkp: CBOR error deserializing: {0}")]
    CBORDeserialization(#[from] serde_cbor::Error),

    #[error("evoting_zkp: error deserializing: {0}")]
    Deserialization(String),

    #[error("evoting_zkp: error serializing: {0}")]
    Serialization(String),
}

impl Error {
    /// True for every decoding failure, whichever encoding produced it
    pub fn is_deserialization(&self) -> bool {
        matches!(
            self,
            Error::JSONDeserialization(_) | Error::CBORDeserialization(_) | Error::Deserialization(_)
        )
    }
}
