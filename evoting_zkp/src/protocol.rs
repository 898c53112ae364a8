use crate::hash::hash_to_exponent;
use crate::*;
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, warn};

/// Domain separation for a proof: a label naming the proof type plus optional auxiliary data
/// (an election or ballot-box identifier, for instance) bound into the challenge.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProofContext {
    domain: String,
    auxiliary: Vec<u8>,
}

impl ProofContext {
    pub fn new(domain: &str) -> Self {
        ProofContext {
            domain: domain.to_owned(),
            auxiliary: Vec::new(),
        }
    }

    pub fn with_auxiliary_data(mut self, auxiliary: Vec<u8>) -> Self {
        self.auxiliary = auxiliary;
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn auxiliary(&self) -> &[u8] {
        &self.auxiliary
    }
}

/// The prover's first move, computed ahead of time: random exponents and their image under
/// the phi function.
///
/// A pre-computation is consumed by the proof it backs; reusing one would reveal the
/// witness. The random exponents are overwritten on drop.
pub struct PreComputation<G: Group> {
    randomness: Witness,
    commitment: Vec<G::Element>,
}

impl<G: Group> PreComputation<G> {
    pub fn commitment(&self) -> &[G::Element] {
        &self.commitment
    }
}

impl<G: Group> std::fmt::Debug for PreComputation<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("PreComputation")
            .field("randomness", &self.randomness)
            .field("commitment", &self.commitment)
            .finish()
    }
}

/// Maurer's generalised Sigma protocol made non-interactive with the Fiat-Shamir transform.
///
/// Given a phi function and a witness `x` with `phi(x) = y`, the prover samples `r`, commits
/// to `t = phi(r)`, derives `e = H(context, bases, y, t)` and answers `s = r - e * x`. The
/// verifier recomputes `t' = phi(s) * y^e` and accepts iff `H(context, bases, y, t') = e`.
#[derive(Copy, Clone, Debug, Default)]
pub struct SigmaProtocol {
    policy: Policy,
}

impl SigmaProtocol {
    pub fn new(policy: Policy) -> Self {
        SigmaProtocol { policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Sample the random exponents and compute the commitment
    pub fn precompute<G: Group, R: RngCore + CryptoRng>(
        &self,
        phi: &PhiFunction<G>,
        rng: &mut R,
    ) -> Result<PreComputation<G>, Error> {
        let q = phi.group().order();
        let mut randomness = Vec::with_capacity(phi.num_inputs());
        for _ in 0..phi.num_inputs() {
            randomness.push(Exponent::random(q, rng)?);
        }
        let randomness = Witness::new(randomness);
        let commitment = phi.evaluate(randomness.exponents())?;

        Ok(PreComputation {
            randomness,
            commitment,
        })
    }

    /// Generate a proof that the prover knows `witness` with `phi(witness) = public_outputs`.
    ///
    /// `public_outputs` is supplied by the caller so prover and verifier hash identical
    /// values; it is not re-derived here.
    pub fn generate<G: Group, R: RngCore + CryptoRng>(
        &self,
        phi: &PhiFunction<G>,
        witness: Witness,
        public_outputs: &[G::Element],
        context: &ProofContext,
        rng: &mut R,
    ) -> Result<Proof, Error> {
        check_generation_input(phi, &witness, public_outputs)?;
        let precomputation = self.precompute(phi, rng)?;
        self.generate_with_precomputation(phi, witness, public_outputs, context, precomputation)
    }

    pub fn generate_with_precomputation<G: Group>(
        &self,
        phi: &PhiFunction<G>,
        witness: Witness,
        public_outputs: &[G::Element],
        context: &ProofContext,
        precomputation: PreComputation<G>,
    ) -> Result<Proof, Error> {
        check_generation_input(phi, &witness, public_outputs)?;
        if precomputation.randomness.len() != phi.num_inputs()
            || precomputation.commitment.len() != phi.num_outputs()
        {
            return Err(Error::InvalidInput(
                "pre-computation does not match the phi function".to_owned(),
            ));
        }

        debug!(
            domain = context.domain(),
            num_inputs = phi.num_inputs(),
            num_outputs = phi.num_outputs(),
            "generating proof"
        );

        let group = phi.group();
        let challenge = hash_to_exponent(
            self.policy.hash_algorithm,
            context,
            group,
            phi.base_elements(),
            public_outputs,
            &precomputation.commitment,
        )?;

        let mut responses = Vec::with_capacity(phi.num_inputs());
        for (r, x) in precomputation
            .randomness
            .exponents()
            .iter()
            .zip(witness.exponents())
        {
            // e * x reveals x given e
            let mut ex = challenge.multiply(x)?;
            let response = r.subtract(&ex);
            ex.wipe();
            responses.push(response?);
        }

        Proof::new(challenge, responses)
    }

    /// Verify a proof against claimed public outputs.
    ///
    /// An invalid proof is `Ok(false)`. A proof whose shape does not fit the phi function
    /// is `Err(MalformedProof)`.
    pub fn verify<G: Group>(
        &self,
        phi: &PhiFunction<G>,
        proof: &Proof,
        public_outputs: &[G::Element],
        context: &ProofContext,
    ) -> Result<bool, Error> {
        if let Err(reason) = check_proof_shape(phi, proof, public_outputs) {
            warn!(domain = context.domain(), %reason, "rejecting malformed proof");
            return Err(Error::MalformedProof(reason));
        }

        let group = phi.group();
        if public_outputs.iter().any(|y| !group.is_member(y)) {
            warn!(
                domain = context.domain(),
                "public output outside the group"
            );
            return Ok(false);
        }

        let reconstructed = phi.evaluate(proof.responses())?;
        let mut commitment = Vec::with_capacity(reconstructed.len());
        for (t, y) in reconstructed.iter().zip(public_outputs) {
            let y_e = group.exponentiate(y, proof.challenge())?;
            commitment.push(group.multiply(t, &y_e));
        }

        let challenge = hash_to_exponent(
            self.policy.hash_algorithm,
            context,
            group,
            phi.base_elements(),
            public_outputs,
            &commitment,
        )?;

        let valid = challenge.to_fixed_bytes() == proof.challenge().to_fixed_bytes();
        debug!(domain = context.domain(), valid, "verified proof");

        Ok(valid)
    }
}

fn check_generation_input<G: Group>(
    phi: &PhiFunction<G>,
    witness: &Witness,
    public_outputs: &[G::Element],
) -> Result<(), Error> {
    if witness.len() != phi.num_inputs() {
        return Err(Error::InvalidInput(format!(
            "{} witness exponents for a phi function of {} inputs",
            witness.len(),
            phi.num_inputs()
        )));
    }
    if public_outputs.len() != phi.num_outputs() {
        return Err(Error::InvalidInput(format!(
            "{} public outputs for a phi function of {} outputs",
            public_outputs.len(),
            phi.num_outputs()
        )));
    }
    for exponent in witness.exponents() {
        phi.group().check_exponent(exponent)?;
    }
    phi.group().check_members(public_outputs, "public output")
}

fn check_proof_shape<G: Group>(
    phi: &PhiFunction<G>,
    proof: &Proof,
    public_outputs: &[G::Element],
) -> Result<(), String> {
    if proof.responses().len() != phi.num_inputs() {
        return Err(format!(
            "{} responses for a phi function of {} inputs",
            proof.responses().len(),
            phi.num_inputs()
        ));
    }
    if public_outputs.len() != phi.num_outputs() {
        return Err(format!(
            "{} public outputs for a phi function of {} outputs",
            public_outputs.len(),
            phi.num_outputs()
        ));
    }
    if proof.q() != phi.group().order() {
        return Err("proof modulus differs from the group order".to_owned());
    }
    if proof.responses().iter().any(|r| r.q() != proof.q()) {
        return Err("responses use different moduli".to_owned());
    }
    Ok(())
}
