//! The fixed phi functions used by the e-voting proofs.
//!
//! Each builder turns an ordered list of base elements into a ready `PhiFunction`. What a
//! base element means (generator, key element, ciphertext component) is fixed by the order
//! the caller supplies them in.

use crate::*;

/// Domain label of exponentiation proofs
pub const EXPONENTIATION_PROOF: &str = "ExponentiationProof";

/// Domain label of decryption proofs
pub const DECRYPTION_PROOF: &str = "DecryptionProof";

/// Domain label of plaintext equality proofs
pub const PLAINTEXT_EQUALITY_PROOF: &str = "PlaintextEqualityProof";

/// One secret exponent applied to every base element: `output_i = base_i ^ x`
pub fn exponentiation<G: Group>(
    group: &G,
    base_elements: Vec<G::Element>,
) -> Result<PhiFunction<G>, Error> {
    if base_elements.is_empty() {
        return Err(Error::InvalidArity(1, 0));
    }

    let num_outputs = base_elements.len();
    let rules = (0..num_outputs)
        .map(|i| ComputationRule::single(i + 1, 1))
        .collect();

    PhiFunction::new(group.clone(), 1, num_outputs, base_elements, rules)
}

/// `num_inputs` exponents, each applied to the same two bases:
/// `output_{2k-2} = base_1 ^ x_k`, `output_{2k-1} = base_2 ^ x_k`
pub fn decryption<G: Group>(
    group: &G,
    num_inputs: usize,
    base_elements: Vec<G::Element>,
) -> Result<PhiFunction<G>, Error> {
    if base_elements.len() < 2 {
        return Err(Error::InvalidArity(2, base_elements.len()));
    }

    let mut rules = Vec::with_capacity(2 * num_inputs);
    for k in 1..=num_inputs {
        rules.push(ComputationRule::single(1, k));
        rules.push(ComputationRule::single(2, k));
    }

    PhiFunction::new(group.clone(), num_inputs, 2 * num_inputs, base_elements, rules)
}

/// Two exponents bound together in every key output. With bases
/// `[g, k_1..k_n, k'_1..k'_n]`: `output_0 = g^x1`, `output_1 = g^x2` and
/// `output_{i+1} = k_i^x1 * k'_i^x2` for `i` in `1..=n`.
pub fn plaintext_equality<G: Group>(
    group: &G,
    base_elements: Vec<G::Element>,
) -> Result<PhiFunction<G>, Error> {
    if base_elements.len() < 3 {
        return Err(Error::InvalidArity(3, base_elements.len()));
    }

    let num_key_elements = (base_elements.len() - 1) / 2;
    let num_outputs = num_key_elements + 2;

    let mut rules = Vec::with_capacity(num_outputs);
    rules.push(ComputationRule::single(1, 1));
    rules.push(ComputationRule::single(1, 2));
    for i in 2..num_outputs {
        rules.push(ComputationRule::from_pairs(&[(i, 1), (i + num_key_elements, 2)]));
    }

    PhiFunction::new(group.clone(), 2, num_outputs, base_elements, rules)
}
