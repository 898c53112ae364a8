use crate::*;
use rand_core::{CryptoRng, RngCore};

/// Generates and verifies proofs that a list of elements are the base elements raised to one
/// secret exponent.
#[derive(Clone, Debug)]
pub struct ExponentiationProofHandler<G: Group> {
    protocol: SigmaProtocol,
    context: ProofContext,
    phi: PhiFunction<G>,
}

impl<G: Group> ExponentiationProofHandler<G> {
    pub fn new(group: &G, base_elements: Vec<G::Element>) -> Result<Self, Error> {
        Ok(ExponentiationProofHandler {
            protocol: SigmaProtocol::default(),
            context: ProofContext::new(catalog::EXPONENTIATION_PROOF),
            phi: catalog::exponentiation(group, base_elements)?,
        })
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.protocol = SigmaProtocol::new(policy);
        self
    }

    /// Bind auxiliary data into the challenge
    pub fn with_auxiliary_data(mut self, auxiliary: Vec<u8>) -> Self {
        self.context = self.context.with_auxiliary_data(auxiliary);
        self
    }

    pub fn phi(&self) -> &PhiFunction<G> {
        &self.phi
    }

    pub fn precompute<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<PreComputation<G>, Error> {
        self.protocol.precompute(&self.phi, rng)
    }

    pub fn generate<R: RngCore + CryptoRng>(
        &self,
        secret: Exponent,
        exponentiated_elements: &[G::Element],
        rng: &mut R,
    ) -> Result<Proof, Error> {
        self.protocol.generate(
            &self.phi,
            Witness::single(secret),
            exponentiated_elements,
            &self.context,
            rng,
        )
    }

    pub fn generate_with_precomputation(
        &self,
        secret: Exponent,
        exponentiated_elements: &[G::Element],
        precomputation: PreComputation<G>,
    ) -> Result<Proof, Error> {
        self.protocol.generate_with_precomputation(
            &self.phi,
            Witness::single(secret),
            exponentiated_elements,
            &self.context,
            precomputation,
        )
    }

    pub fn verify(&self, proof: &Proof, exponentiated_elements: &[G::Element]) -> Result<bool, Error> {
        self.protocol
            .verify(&self.phi, proof, exponentiated_elements, &self.context)
    }
}

/// Generates and verifies proofs that two ElGamal ciphertexts, encrypted under different
/// keys with different randomness, hold the same plaintext.
#[derive(Clone, Debug)]
pub struct PlaintextEqualityProofHandler<G: Group> {
    protocol: SigmaProtocol,
    context: ProofContext,
    phi: PhiFunction<G>,
}

impl<G: Group> PlaintextEqualityProofHandler<G> {
    /// The base elements are `[g] ++ primary_key ++ invert(secondary_key)`
    pub fn new(
        group: &G,
        primary_key: &ElGamalPublicKey<G::Element>,
        secondary_key: &ElGamalPublicKey<G::Element>,
    ) -> Result<Self, Error> {
        if primary_key.is_empty() {
            return Err(Error::EmptyInput("primary public key"));
        }
        if primary_key.len() != secondary_key.len() {
            return Err(Error::InvalidInput(format!(
                "primary public key has {} elements, secondary has {}",
                primary_key.len(),
                secondary_key.len()
            )));
        }
        group.check_members(&primary_key.elements, "primary public key element")?;
        group.check_members(&secondary_key.elements, "secondary public key element")?;

        let mut base_elements = Vec::with_capacity(1 + 2 * primary_key.len());
        base_elements.push(group.generator().clone());
        base_elements.extend(primary_key.elements.iter().cloned());
        base_elements.extend(secondary_key.elements.iter().map(|k| group.invert(k)));

        Ok(PlaintextEqualityProofHandler {
            protocol: SigmaProtocol::default(),
            context: ProofContext::new(catalog::PLAINTEXT_EQUALITY_PROOF),
            phi: catalog::plaintext_equality(group, base_elements)?,
        })
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.protocol = SigmaProtocol::new(policy);
        self
    }

    pub fn with_auxiliary_data(mut self, auxiliary: Vec<u8>) -> Self {
        self.context = self.context.with_auxiliary_data(auxiliary);
        self
    }

    pub fn phi(&self) -> &PhiFunction<G> {
        &self.phi
    }

    /// `[gamma_1, gamma_2, phi_1[k] * phi_2[k]^-1 ...]`
    pub fn public_outputs(
        &self,
        primary: &Ciphertext<G::Element>,
        secondary: &Ciphertext<G::Element>,
    ) -> Result<Vec<G::Element>, Error> {
        let num_keys = self.phi.num_outputs() - 2;
        if primary.phis.len() != num_keys || secondary.phis.len() != num_keys {
            return Err(Error::InvalidInput(format!(
                "ciphertexts must have {} phi elements, found {} and {}",
                num_keys,
                primary.phis.len(),
                secondary.phis.len()
            )));
        }

        let group = self.phi.group();
        let mut outputs = Vec::with_capacity(num_keys + 2);
        outputs.push(primary.gamma.clone());
        outputs.push(secondary.gamma.clone());
        for (a, b) in primary.phis.iter().zip(&secondary.phis) {
            outputs.push(group.multiply(a, &group.invert(b)));
        }
        Ok(outputs)
    }

    /// Prove equality given the randomness of both encryptions
    pub fn generate<R: RngCore + CryptoRng>(
        &self,
        primary_secret: Exponent,
        secondary_secret: Exponent,
        primary: &Ciphertext<G::Element>,
        secondary: &Ciphertext<G::Element>,
        rng: &mut R,
    ) -> Result<Proof, Error> {
        let witness = Witness::new(vec![primary_secret, secondary_secret]);
        self.check_ciphertexts(primary, secondary)?;
        let outputs = self.public_outputs(primary, secondary)?;
        self.protocol
            .generate(&self.phi, witness, &outputs, &self.context, rng)
    }

    pub fn verify(
        &self,
        proof: &Proof,
        primary: &Ciphertext<G::Element>,
        secondary: &Ciphertext<G::Element>,
    ) -> Result<bool, Error> {
        self.check_ciphertexts(primary, secondary)?;
        let outputs = self.public_outputs(primary, secondary)?;
        self.protocol
            .verify(&self.phi, proof, &outputs, &self.context)
    }

    fn check_ciphertexts(
        &self,
        primary: &Ciphertext<G::Element>,
        secondary: &Ciphertext<G::Element>,
    ) -> Result<(), Error> {
        let group = self.phi.group();
        for (name, ciphertext) in &[("primary", primary), ("secondary", secondary)] {
            let elements: Vec<G::Element> = ciphertext.elements().cloned().collect();
            group.check_members(&elements, &format!("{} ciphertext element", name))?;
        }
        Ok(())
    }
}
