use crate::*;
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, warn};

/// Exponentiated values together with the proof that one secret exponent produced all of them.
///
/// `generator_power` is `g^x`, the generator raised to the same exponent. It is bound into
/// the proof as its first public output and is normally the prover's public key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExponentiatedElementsAndProof<T, E = T> {
    pub exponentiated_elements: Vec<T>,
    pub exponentiation_proof: Proof,
    pub generator_power: E,
}

/// Raises batches of cleartexts or ciphertexts to a secret exponent and proves it was done
/// consistently.
#[derive(Clone, Debug)]
pub struct ExponentiationService {
    protocol: SigmaProtocol,
    context: ProofContext,
}

impl Default for ExponentiationService {
    fn default() -> Self {
        ExponentiationService::new(Policy::default())
    }
}

impl ExponentiationService {
    pub fn new(policy: Policy) -> Self {
        ExponentiationService {
            protocol: SigmaProtocol::new(policy),
            context: ProofContext::new(catalog::EXPONENTIATION_PROOF),
        }
    }

    /// Bind auxiliary data into every proof this service generates or verifies
    pub fn with_auxiliary_data(mut self, auxiliary: Vec<u8>) -> Self {
        self.context = self.context.with_auxiliary_data(auxiliary);
        self
    }

    pub fn context(&self) -> &ProofContext {
        &self.context
    }

    /// Raise every value to `exponent`
    pub fn exponentiate_cleartexts<G: Group>(
        &self,
        group: &G,
        values: &[G::Element],
        exponent: Exponent,
    ) -> Result<ExponentiatedElementsAndProof<G::Element>, Error> {
        let mut csprng = rand::rngs::OsRng {};
        self.exponentiate_cleartexts_with_rng(group, values, exponent, &mut csprng)
    }

    pub fn exponentiate_cleartexts_with_rng<G: Group, R: RngCore + CryptoRng>(
        &self,
        group: &G,
        values: &[G::Element],
        exponent: Exponent,
        rng: &mut R,
    ) -> Result<ExponentiatedElementsAndProof<G::Element>, Error> {
        if values.is_empty() {
            return Err(Error::EmptyInput("values"));
        }
        group.check_members(values, "value")?;

        debug!(num_values = values.len(), "exponentiating cleartexts");

        let (mut powers, proof) = self.prove(group, values.to_vec(), exponent, rng)?;
        let generator_power = powers.remove(0);

        Ok(ExponentiatedElementsAndProof {
            exponentiated_elements: powers,
            exponentiation_proof: proof,
            generator_power,
        })
    }

    /// Raise every component of every ciphertext to `exponent`, with one proof for the batch
    pub fn exponentiate_ciphertexts<G: Group>(
        &self,
        group: &G,
        ciphertexts: &[Ciphertext<G::Element>],
        exponent: Exponent,
    ) -> Result<ExponentiatedElementsAndProof<Ciphertext<G::Element>, G::Element>, Error> {
        let mut csprng = rand::rngs::OsRng {};
        self.exponentiate_ciphertexts_with_rng(group, ciphertexts, exponent, &mut csprng)
    }

    pub fn exponentiate_ciphertexts_with_rng<G: Group, R: RngCore + CryptoRng>(
        &self,
        group: &G,
        ciphertexts: &[Ciphertext<G::Element>],
        exponent: Exponent,
        rng: &mut R,
    ) -> Result<ExponentiatedElementsAndProof<Ciphertext<G::Element>, G::Element>, Error> {
        if ciphertexts.is_empty() {
            return Err(Error::EmptyInput("ciphertexts"));
        }
        let flattened = flatten(ciphertexts);
        group.check_members(&flattened, "ciphertext element")?;

        debug!(
            num_ciphertexts = ciphertexts.len(),
            num_elements = flattened.len(),
            "exponentiating ciphertexts"
        );

        let (powers, proof) = self.prove(group, flattened, exponent, rng)?;
        let mut powers = powers.into_iter();
        let generator_power = powers.next().ok_or_else(|| {
            Error::InvalidInput("exponentiation produced no generator power".to_owned())
        })?;
        let exponentiated_elements = reassemble(ciphertexts, &mut powers)?;

        Ok(ExponentiatedElementsAndProof {
            exponentiated_elements,
            exponentiation_proof: proof,
            generator_power,
        })
    }

    /// Check that `result` holds `values` raised to the exponent behind `generator_power`
    pub fn verify_cleartexts<G: Group>(
        &self,
        group: &G,
        values: &[G::Element],
        generator_power: &G::Element,
        result: &ExponentiatedElementsAndProof<G::Element>,
    ) -> Result<bool, Error> {
        if values.is_empty() {
            return Err(Error::EmptyInput("values"));
        }
        if result.exponentiated_elements.len() != values.len() {
            warn!(
                expected = values.len(),
                found = result.exponentiated_elements.len(),
                "exponentiated cleartexts do not match the values"
            );
            return Ok(false);
        }

        let mut outputs = Vec::with_capacity(values.len() + 1);
        outputs.push(generator_power.clone());
        outputs.extend(result.exponentiated_elements.iter().cloned());

        self.check(group, values.to_vec(), &outputs, &result.exponentiation_proof)
    }

    /// Check that `result` holds `ciphertexts` raised to the exponent behind `generator_power`
    pub fn verify_ciphertexts<G: Group>(
        &self,
        group: &G,
        ciphertexts: &[Ciphertext<G::Element>],
        generator_power: &G::Element,
        result: &ExponentiatedElementsAndProof<Ciphertext<G::Element>, G::Element>,
    ) -> Result<bool, Error> {
        if ciphertexts.is_empty() {
            return Err(Error::EmptyInput("ciphertexts"));
        }
        let same_shape = result.exponentiated_elements.len() == ciphertexts.len()
            && ciphertexts
                .iter()
                .zip(&result.exponentiated_elements)
                .all(|(a, b)| a.size() == b.size());
        if !same_shape {
            warn!("exponentiated ciphertexts do not match the input shape");
            return Ok(false);
        }

        let mut outputs = vec![generator_power.clone()];
        outputs.extend(flatten(&result.exponentiated_elements));

        self.check(
            group,
            flatten(ciphertexts),
            &outputs,
            &result.exponentiation_proof,
        )
    }

    fn prove<G: Group, R: RngCore + CryptoRng>(
        &self,
        group: &G,
        values: Vec<G::Element>,
        exponent: Exponent,
        rng: &mut R,
    ) -> Result<(Vec<G::Element>, Proof), Error> {
        group.check_exponent(&exponent)?;
        let phi = catalog::exponentiation(group, with_generator(group, values))?;

        let witness = Witness::single(exponent);
        let powers = phi.evaluate(witness.exponents())?;
        let proof = self
            .protocol
            .generate(&phi, witness, &powers, &self.context, rng)?;

        Ok((powers, proof))
    }

    fn check<G: Group>(
        &self,
        group: &G,
        values: Vec<G::Element>,
        outputs: &[G::Element],
        proof: &Proof,
    ) -> Result<bool, Error> {
        let phi = catalog::exponentiation(group, with_generator(group, values))?;
        self.protocol.verify(&phi, proof, outputs, &self.context)
    }
}

fn with_generator<G: Group>(group: &G, values: Vec<G::Element>) -> Vec<G::Element> {
    let mut base_elements = Vec::with_capacity(values.len() + 1);
    base_elements.push(group.generator().clone());
    base_elements.extend(values);
    base_elements
}

// gamma then phis, ciphertext by ciphertext
fn flatten<E: Clone>(ciphertexts: &[Ciphertext<E>]) -> Vec<E> {
    ciphertexts
        .iter()
        .flat_map(|c| c.elements().cloned())
        .collect()
}

fn reassemble<E>(
    shapes: &[Ciphertext<E>],
    powers: &mut impl Iterator<Item = E>,
) -> Result<Vec<Ciphertext<E>>, Error> {
    let short = || Error::InvalidInput("too few exponentiated elements".to_owned());

    let mut ciphertexts = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let gamma = powers.next().ok_or_else(short)?;
        let phis = powers.by_ref().take(shape.phis.len()).collect::<Vec<_>>();
        if phis.len() != shape.phis.len() {
            return Err(short());
        }
        ciphertexts.push(Ciphertext::new(gamma, phis));
    }
    Ok(ciphertexts)
}
