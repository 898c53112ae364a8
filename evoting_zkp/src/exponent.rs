use crate::*;
use num_bigint::BigUint;
use num_traits::Zero;
use rand_core::{CryptoRng, RngCore};
use std::convert::TryFrom;
use zeroize::Zeroize;

/// An integer reduced modulo a group order `q`.
///
/// Every exponent carries its modulus, and arithmetic between exponents with different
/// moduli fails with `Error::ModulusMismatch` instead of silently mixing groups.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "ExponentRepr", into = "ExponentRepr")]
pub struct Exponent {
    value: BigUint,
    q: BigUint,
}

impl Exponent {
    /// Create an exponent, reducing `value` modulo `q`
    pub fn new(value: BigUint, q: &BigUint) -> Result<Self, Error> {
        if q < &BigUint::from(2u32) {
            return Err(Error::InvalidGroupParameters(format!(
                "exponent modulus must be at least 2, found {}",
                q
            )));
        }

        Ok(Exponent {
            value: value % q,
            q: q.clone(),
        })
    }

    pub fn from_u64(value: u64, q: &BigUint) -> Result<Self, Error> {
        Exponent::new(BigUint::from(value), q)
    }

    pub fn zero(q: &BigUint) -> Result<Self, Error> {
        Exponent::new(BigUint::zero(), q)
    }

    /// Sample a uniformly random exponent in `[0, q)` by rejection sampling.
    ///
    /// Fails with `RandomnessUnavailable` if the source cannot produce bytes. The failure is
    /// never retried here.
    pub fn random<R: RngCore + CryptoRng>(q: &BigUint, rng: &mut R) -> Result<Self, Error> {
        if q < &BigUint::from(2u32) {
            return Err(Error::InvalidGroupParameters(format!(
                "exponent modulus must be at least 2, found {}",
                q
            )));
        }

        let bits = q.bits();
        let num_bytes = ((bits + 7) / 8) as usize;
        let excess_bits = (num_bytes as u64 * 8 - bits) as u32;
        let top_mask: u8 = 0xff >> excess_bits;

        let mut buf = vec![0u8; num_bytes];
        loop {
            rng.try_fill_bytes(&mut buf)
                .map_err(|e| Error::RandomnessUnavailable(e.to_string()))?;
            buf[0] &= top_mask;

            let mut candidate = BigUint::from_bytes_be(&buf);
            // Wipe the bytes but keep the buffer's length for the next draw
            buf.as_mut_slice().zeroize();
            if &candidate < q {
                return Ok(Exponent {
                    value: candidate,
                    q: q.clone(),
                });
            }
            wipe(&mut candidate);
        }
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    fn check_modulus(&self, other: &Exponent) -> Result<(), Error> {
        if self.q != other.q {
            return Err(Error::ModulusMismatch);
        }
        Ok(())
    }

    pub fn add(&self, other: &Exponent) -> Result<Exponent, Error> {
        self.check_modulus(other)?;
        Ok(Exponent {
            value: (&self.value + &other.value) % &self.q,
            q: self.q.clone(),
        })
    }

    pub fn subtract(&self, other: &Exponent) -> Result<Exponent, Error> {
        self.check_modulus(other)?;
        // Both values are already below q
        let value = (&self.value + &self.q - &other.value) % &self.q;
        Ok(Exponent {
            value,
            q: self.q.clone(),
        })
    }

    pub fn multiply(&self, other: &Exponent) -> Result<Exponent, Error> {
        self.check_modulus(other)?;
        Ok(Exponent {
            value: (&self.value * &other.value) % &self.q,
            q: self.q.clone(),
        })
    }

    pub fn negate(&self) -> Exponent {
        let value = (&self.q - &self.value) % &self.q;
        Exponent {
            value,
            q: self.q.clone(),
        }
    }

    /// Big-endian bytes, left-padded to the byte length of `q`
    pub fn to_fixed_bytes(&self) -> Vec<u8> {
        let width = ((self.q.bits() + 7) / 8) as usize;
        let bytes = self.value.to_bytes_be();
        let mut padded = vec![0u8; width.saturating_sub(bytes.len())];
        padded.extend_from_slice(&bytes);
        padded
    }

    /// Overwrite the value in place
    pub(crate) fn wipe(&mut self) {
        wipe(&mut self.value);
    }
}

impl std::fmt::Display for Exponent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

// Clears bits from the lowest digit up, so the digit storage is overwritten before the value
// normalizes down to zero.
fn wipe(value: &mut BigUint) {
    let bits = value.bits();
    for bit in 0..bits {
        value.set_bit(bit, false);
    }
}

/// Secret exponents handed to the prover.
///
/// A witness is consumed by proof generation and its exponents are overwritten when it is
/// dropped.
pub struct Witness(Vec<Exponent>);

impl Witness {
    pub fn new(exponents: Vec<Exponent>) -> Self {
        Witness(exponents)
    }

    pub fn single(exponent: Exponent) -> Self {
        Witness(vec![exponent])
    }

    pub fn exponents(&self) -> &[Exponent] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for Witness {
    fn drop(&mut self) {
        for exponent in self.0.iter_mut() {
            exponent.wipe();
        }
    }
}

// Witness values stay out of debug output
impl std::fmt::Debug for Witness {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Witness({} exponents)", self.0.len())
    }
}

#[derive(Serialize, Deserialize)]
struct ExponentRepr {
    value: String,
    q: String,
}

impl From<Exponent> for ExponentRepr {
    fn from(exponent: Exponent) -> Self {
        ExponentRepr {
            value: encode_biguint(&exponent.value),
            q: encode_biguint(&exponent.q),
        }
    }
}

impl TryFrom<ExponentRepr> for Exponent {
    type Error = Error;

    fn try_from(repr: ExponentRepr) -> Result<Self, Self::Error> {
        let q = decode_biguint(&repr.q)?;
        decode_exponent(&repr.value, &q)
    }
}

/// Hex encoding of an arbitrary-precision integer
pub(crate) fn encode_biguint(value: &BigUint) -> String {
    hex::encode(value.to_bytes_be())
}

/// Decode the hex produced by `encode_biguint`. Leading zero bytes and uppercase digits are
/// rejected so every integer has exactly one encoding.
pub(crate) fn decode_biguint(s: &str) -> Result<BigUint, Error> {
    if s.is_empty() {
        return Err(Error::Deserialization("empty integer".to_owned()));
    }
    let bytes = hex::decode(s).map_err(|e| Error::Deserialization(e.to_string()))?;
    let value = BigUint::from_bytes_be(&bytes);
    if encode_biguint(&value) != s {
        return Err(Error::Deserialization(format!(
            "non-canonical integer encoding {}",
            s
        )));
    }
    Ok(value)
}

/// Decode an exponent without reducing it: out-of-range values are rejected
pub(crate) fn decode_exponent(s: &str, q: &BigUint) -> Result<Exponent, Error> {
    if q < &BigUint::from(2u32) {
        return Err(Error::Deserialization(format!("invalid modulus {}", q)));
    }
    let value = decode_biguint(s)?;
    if &value >= q {
        return Err(Error::Deserialization(format!(
            "exponent {} is not below its modulus",
            value
        )));
    }
    Ok(Exponent {
        value,
        q: q.clone(),
    })
}

#[cfg(test)]
pub(crate) use test::FailingRng;

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn q() -> BigUint {
        BigUint::from(11u32)
    }

    #[test]
    fn test_exponent_arithmetic() {
        let q = q();
        let a = Exponent::from_u64(7, &q).unwrap();
        let b = Exponent::from_u64(9, &q).unwrap();

        assert_eq!(a.add(&b).unwrap().value(), &BigUint::from(5u32));
        assert_eq!(a.subtract(&b).unwrap().value(), &BigUint::from(9u32));
        assert_eq!(b.subtract(&a).unwrap().value(), &BigUint::from(2u32));
        assert_eq!(a.multiply(&b).unwrap().value(), &BigUint::from(8u32));
        assert_eq!(a.negate().value(), &BigUint::from(4u32));
        assert_eq!(Exponent::zero(&q).unwrap().negate().value(), &BigUint::zero());

        // Reduced on construction
        assert_eq!(Exponent::from_u64(25, &q).unwrap().value(), &BigUint::from(3u32));
    }

    #[test]
    fn test_mismatched_moduli() {
        let a = Exponent::from_u64(3, &BigUint::from(11u32)).unwrap();
        let b = Exponent::from_u64(3, &BigUint::from(13u32)).unwrap();

        assert!(matches!(a.add(&b), Err(Error::ModulusMismatch)));
        assert!(matches!(a.subtract(&b), Err(Error::ModulusMismatch)));
        assert!(matches!(a.multiply(&b), Err(Error::ModulusMismatch)));
        assert!(Exponent::from_u64(1, &BigUint::from(1u32)).is_err());
    }

    #[test]
    fn test_random_below_q() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let q = q();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let e = Exponent::random(&q, &mut rng).unwrap();
            assert!(e.value() < &q);
            seen.insert(e.value().clone());
        }
        // 500 draws over 11 values hit all of them
        assert_eq!(seen.len(), 11);
    }

    /// An RNG whose source always fails
    pub(crate) struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for b in dest.iter_mut() {
                *b = 0;
            }
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
            Err(rand_core::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "entropy source exhausted",
            )))
        }
    }

    impl CryptoRng for FailingRng {}

    // Replays fixed bytes, one byte per fill
    struct ReplayRng(Vec<u8>);

    impl RngCore for ReplayRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for b in dest.iter_mut() {
                *b = self.0.remove(0);
            }
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for ReplayRng {}

    #[test]
    fn test_random_retries_after_rejection() {
        // 15 and 12 are masked to 4 bits and rejected for q = 11, then 3 is accepted
        let mut rng = ReplayRng(vec![0xff, 0x0c, 0x03]);
        let e = Exponent::random(&q(), &mut rng).unwrap();
        assert_eq!(e.value(), &BigUint::from(3u32));
        assert!(rng.0.is_empty());
    }

    #[test]
    fn test_random_many_draws_large_modulus() {
        // About a third of the raw 127-bit candidates are at or above this q
        let q = BigUint::parse_bytes(b"53657a5141023aed54ef125a25bda659", 16).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let e = Exponent::random(&q, &mut rng).unwrap();
            assert!(e.value() < &q);
        }
    }

    #[test]
    fn test_canonical_hex() {
        assert_eq!(decode_biguint("0b").unwrap(), BigUint::from(11u32));
        assert_eq!(decode_biguint("00").unwrap(), BigUint::zero());
        for bad in ["000b", "0B", "0000", "b"].iter() {
            assert!(decode_biguint(bad).unwrap_err().is_deserialization(), "{}", bad);
        }
    }

    #[test]
    fn test_random_unavailable() {
        let result = Exponent::random(&q(), &mut FailingRng);
        assert!(matches!(result, Err(Error::RandomnessUnavailable(_))));
    }

    #[test]
    fn test_wipe() {
        let q = BigUint::from(1u64 << 63) * BigUint::from(1u64 << 63) + BigUint::from(1u32);
        let mut e = Exponent::new(&q - BigUint::from(5u32), &q).unwrap();
        e.wipe();
        assert!(e.value().is_zero());

        let witness = Witness::new(vec![Exponent::from_u64(4, &q).unwrap()]);
        assert_eq!(witness.len(), 1);
        assert_eq!(format!("{:?}", witness), "Witness(1 exponents)");
    }

    #[test]
    fn test_serde() {
        let e = Exponent::from_u64(300, &BigUint::from(1009u32)).unwrap();
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, r#"{"value":"012c","q":"03f1"}"#);
        let back: Exponent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);

        // Values at or above q are rejected, not reduced
        let bad = r#"{"value":"03f1","q":"03f1"}"#;
        assert!(serde_json::from_str::<Exponent>(bad).is_err());
        assert!(serde_json::from_str::<Exponent>(r#"{"value":"zz","q":"03f1"}"#).is_err());
    }

    #[test]
    fn test_fixed_bytes() {
        let q = BigUint::from(0x1_0001u32);
        let e = Exponent::from_u64(5, &q).unwrap();
        assert_eq!(e.to_fixed_bytes(), vec![0, 0, 5]);
    }
}
