use crate::exponent::{decode_biguint, encode_biguint};
use crate::*;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::convert::TryFrom;

/// The order-`q` subgroup of the multiplicative group of integers modulo a prime `p`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "ZpSubgroupRepr", into = "ZpSubgroupRepr")]
pub struct ZpSubgroup {
    p: BigUint,
    q: BigUint,
    generator: ZpGroupElement,
}

/// An element of a `ZpSubgroup`. Equality is value equality.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ZpGroupElement {
    value: BigUint,
}

impl ZpGroupElement {
    /// Wrap a raw value without a membership check
    pub fn from_value(value: BigUint) -> Self {
        ZpGroupElement { value }
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }
}

impl From<ZpGroupElement> for String {
    fn from(element: ZpGroupElement) -> Self {
        encode_biguint(&element.value)
    }
}

impl TryFrom<String> for ZpGroupElement {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Ok(ZpGroupElement {
            value: decode_biguint(&s)?,
        })
    }
}

impl std::fmt::Display for ZpGroupElement {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl ZpSubgroup {
    /// Create a group, validating that `q` divides `p - 1` and that `g` generates the
    /// order-`q` subgroup.
    ///
    /// Primality of `p` and `q` is the caller's responsibility.
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Result<Self, Error> {
        let two = BigUint::from(2u32);
        if p <= two || q < two {
            return Err(Error::InvalidGroupParameters(
                "p must be greater than 2 and q at least 2".to_owned(),
            ));
        }
        if !((&p - 1u32) % &q).is_zero() {
            return Err(Error::InvalidGroupParameters(
                "q does not divide p - 1".to_owned(),
            ));
        }
        if g.is_zero() || g.is_one() || g >= p {
            return Err(Error::InvalidGroupParameters(format!(
                "generator {} is out of range",
                g
            )));
        }
        if !g.modpow(&q, &p).is_one() {
            return Err(Error::InvalidGroupParameters(format!(
                "generator {} does not have order q",
                g
            )));
        }

        Ok(ZpSubgroup {
            p,
            q,
            generator: ZpGroupElement { value: g },
        })
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// Create a group element, checking membership
    pub fn element(&self, value: BigUint) -> Result<ZpGroupElement, Error> {
        let element = ZpGroupElement { value };
        if !self.is_member(&element) {
            return Err(Error::GroupMismatch(format!("value {}", element.value)));
        }
        Ok(element)
    }

    pub fn element_from_u64(&self, value: u64) -> Result<ZpGroupElement, Error> {
        self.element(BigUint::from(value))
    }
}

impl Group for ZpSubgroup {
    type Element = ZpGroupElement;

    fn order(&self) -> &BigUint {
        &self.q
    }

    fn generator(&self) -> &ZpGroupElement {
        &self.generator
    }

    fn identity(&self) -> ZpGroupElement {
        ZpGroupElement {
            value: BigUint::one(),
        }
    }

    fn is_member(&self, element: &ZpGroupElement) -> bool {
        let value = &element.value;
        !value.is_zero() && value < &self.p && value.modpow(&self.q, &self.p).is_one()
    }

    fn multiply(&self, a: &ZpGroupElement, b: &ZpGroupElement) -> ZpGroupElement {
        ZpGroupElement {
            value: (&a.value * &b.value) % &self.p,
        }
    }

    fn exponentiate(
        &self,
        base: &ZpGroupElement,
        exponent: &Exponent,
    ) -> Result<ZpGroupElement, Error> {
        self.check_exponent(exponent)?;
        Ok(ZpGroupElement {
            value: base.value.modpow(exponent.value(), &self.p),
        })
    }

    fn invert(&self, element: &ZpGroupElement) -> ZpGroupElement {
        // For a subgroup member, x^(q-1) = x^-1
        let q_minus_one = &self.q - 1u32;
        ZpGroupElement {
            value: element.value.modpow(&q_minus_one, &self.p),
        }
    }

    fn element_bytes(&self, element: &ZpGroupElement) -> Vec<u8> {
        let width = ((self.p.bits() + 7) / 8) as usize;
        let bytes = element.value.to_bytes_be();
        let mut padded = vec![0u8; width.saturating_sub(bytes.len())];
        padded.extend_from_slice(&bytes);
        padded
    }
}

#[derive(Serialize, Deserialize)]
struct ZpSubgroupRepr {
    p: String,
    q: String,
    g: String,
}

impl From<ZpSubgroup> for ZpSubgroupRepr {
    fn from(group: ZpSubgroup) -> Self {
        ZpSubgroupRepr {
            p: encode_biguint(&group.p),
            q: encode_biguint(&group.q),
            g: encode_biguint(&group.generator.value),
        }
    }
}

impl TryFrom<ZpSubgroupRepr> for ZpSubgroup {
    type Error = Error;

    fn try_from(repr: ZpSubgroupRepr) -> Result<Self, Self::Error> {
        ZpSubgroup::new(
            decode_biguint(&repr.p)?,
            decode_biguint(&repr.q)?,
            decode_biguint(&repr.g)?,
        )
    }
}
