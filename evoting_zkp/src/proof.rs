use crate::exponent::{decode_biguint, decode_exponent, encode_biguint};
use crate::*;
use num_bigint::BigUint;
use std::convert::TryFrom;

/// A non-interactive zero-knowledge proof of knowledge: the challenge and one response per
/// witness exponent, all modulo the same `q`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "ProofRepr", into = "ProofRepr")]
pub struct Proof {
    challenge: Exponent,
    responses: Vec<Exponent>,
}

impl Proof {
    pub fn new(challenge: Exponent, responses: Vec<Exponent>) -> Result<Self, Error> {
        if responses.is_empty() {
            return Err(Error::MalformedProof("a proof needs at least one response".to_owned()));
        }
        if responses.iter().any(|r| r.q() != challenge.q()) {
            return Err(Error::ModulusMismatch);
        }
        Ok(Proof {
            challenge,
            responses,
        })
    }

    pub fn challenge(&self) -> &Exponent {
        &self.challenge
    }

    pub fn responses(&self) -> &[Exponent] {
        &self.responses
    }

    /// The group order all values are reduced by
    pub fn q(&self) -> &BigUint {
        self.challenge.q()
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pack into CBOR bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_cbor::to_vec(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Unpack from CBOR bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(serde_cbor::from_slice(bytes)?)
    }

    /// Unpack from either encoding
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        // If it starts with `{` then it's JSON
        match bytes.first() {
            Some(b'{') => Ok(serde_json::from_slice(bytes)?),
            Some(_) => Proof::from_bytes(bytes),
            None => Err(Error::Deserialization("empty input".to_owned())),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ProofRepr {
    q: String,
    challenge: String,
    responses: Vec<String>,
}

impl From<Proof> for ProofRepr {
    fn from(proof: Proof) -> Self {
        ProofRepr {
            q: encode_biguint(proof.q()),
            challenge: encode_biguint(proof.challenge.value()),
            responses: proof
                .responses
                .iter()
                .map(|r| encode_biguint(r.value()))
                .collect(),
        }
    }
}

impl TryFrom<ProofRepr> for Proof {
    type Error = Error;

    fn try_from(repr: ProofRepr) -> Result<Self, Self::Error> {
        let q = decode_biguint(&repr.q)?;
        let challenge = decode_exponent(&repr.challenge, &q)?;
        if repr.responses.is_empty() {
            return Err(Error::Deserialization("proof has no responses".to_owned()));
        }
        let responses = repr
            .responses
            .iter()
            .map(|r| decode_exponent(r, &q))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Proof {
            challenge,
            responses,
        })
    }
}
