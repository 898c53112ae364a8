use crate::*;
use num_bigint::BigUint;

/// Fiat-Shamir challenge derivation.
///
/// The transcript is a canonical, order-preserving encoding: every field is written as a
/// big-endian `u64` length followed by its bytes, and every list is prefixed with its element
/// count. The domain label and auxiliary data come first so challenges of unrelated proof
/// types never collide.
pub struct ChallengeHasher {
    algorithm: HashAlgorithm,
    transcript: Vec<u8>,
}

impl ChallengeHasher {
    pub fn new(algorithm: HashAlgorithm, context: &ProofContext) -> Self {
        let mut hasher = ChallengeHasher {
            algorithm,
            transcript: Vec::new(),
        };
        hasher.write_field(context.domain().as_bytes());
        hasher.write_field(context.auxiliary());
        hasher
    }

    fn write_field(&mut self, bytes: &[u8]) {
        self.transcript
            .extend_from_slice(&(bytes.len() as u64).to_be_bytes());
        self.transcript.extend_from_slice(bytes);
    }

    /// Append a list of group elements
    pub fn update_elements<G: Group>(&mut self, group: &G, elements: &[G::Element]) -> &mut Self {
        self.transcript
            .extend_from_slice(&(elements.len() as u64).to_be_bytes());
        for element in elements {
            let bytes = group.element_bytes(element);
            self.write_field(&bytes);
        }
        self
    }

    /// Hash the transcript and reduce the digest modulo `q`
    pub fn finalize(&self, q: &BigUint) -> Result<Exponent, Error> {
        let digest = self.algorithm.digest(&self.transcript);
        Exponent::new(BigUint::from_bytes_be(&digest), q)
    }
}

/// `HashToExponent(context, base elements, public outputs, commitment)`
pub fn hash_to_exponent<G: Group>(
    algorithm: HashAlgorithm,
    context: &ProofContext,
    group: &G,
    base_elements: &[G::Element],
    public_outputs: &[G::Element],
    commitment: &[G::Element],
) -> Result<Exponent, Error> {
    ChallengeHasher::new(algorithm, context)
        .update_elements(group, base_elements)
        .update_elements(group, public_outputs)
        .update_elements(group, commitment)
        .finalize(group.order())
}
