use crate::*;

/// An ElGamal ciphertext `{gamma, phis}` over any group element type
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Ciphertext<E> {
    pub gamma: E,
    pub phis: Vec<E>,
}

impl<E> Ciphertext<E> {
    pub fn new(gamma: E, phis: Vec<E>) -> Self {
        Ciphertext { gamma, phis }
    }

    /// Number of elements including gamma
    pub fn size(&self) -> usize {
        self.phis.len() + 1
    }

    /// All elements in order: gamma first, then the phis
    pub fn elements(&self) -> impl Iterator<Item = &E> {
        std::iter::once(&self.gamma).chain(self.phis.iter())
    }
}

/// A (possibly multi-element) ElGamal public key
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ElGamalPublicKey<E> {
    pub elements: Vec<E>,
}

impl<E: Clone> ElGamalPublicKey<E> {
    pub fn new(elements: Vec<E>) -> Self {
        ElGamalPublicKey { elements }
    }

    /// Derive the public key `g^x_i` for each secret `x_i`
    pub fn from_secrets<G: Group<Element = E>>(
        group: &G,
        secrets: &[Exponent],
    ) -> Result<Self, Error> {
        if secrets.is_empty() {
            return Err(Error::EmptyInput("secret keys"));
        }

        let elements = secrets
            .iter()
            .map(|x| group.exponentiate(group.generator(), x))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ElGamalPublicKey { elements })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Encrypt one message element per key element with the given randomness:
    /// `gamma = g^r`, `phi_i = pk_i^r * m_i`
    pub fn encrypt<G: Group<Element = E>>(
        &self,
        group: &G,
        messages: &[E],
        randomness: &Exponent,
    ) -> Result<Ciphertext<E>, Error> {
        if messages.is_empty() {
            return Err(Error::EmptyInput("messages"));
        }
        if messages.len() != self.elements.len() {
            return Err(Error::InvalidInput(format!(
                "{} messages for a public key of {} elements",
                messages.len(),
                self.elements.len()
            )));
        }
        group.check_members(messages, "message")?;
        group.check_members(&self.elements, "public key element")?;

        let gamma = group.exponentiate(group.generator(), randomness)?;
        let mut phis = Vec::with_capacity(messages.len());
        for (key, message) in self.elements.iter().zip(messages) {
            let mask = group.exponentiate(key, randomness)?;
            phis.push(group.multiply(&mask, message));
        }

        Ok(Ciphertext { gamma, phis })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::zp::test::toy_group;
    use num_bigint::BigUint;

    #[test]
    fn test_encrypt() {
        let group = toy_group();
        let q = group.q().clone();

        let secret = Exponent::from_u64(3, &q).unwrap();
        let public_key = ElGamalPublicKey::from_secrets(&group, &[secret.clone()]).unwrap();
        assert_eq!(public_key.elements[0].value(), &BigUint::from(8u32));

        let message = group.element_from_u64(9).unwrap();
        let r = Exponent::from_u64(5, &q).unwrap();
        let ciphertext = public_key
            .encrypt(&group, &[message.clone()], &r)
            .unwrap();

        // gamma = 2^5 = 9, phi = 8^5 * 9 = 16 * 9 = 6
        assert_eq!(ciphertext.gamma.value(), &BigUint::from(9u32));
        assert_eq!(ciphertext.phis[0].value(), &BigUint::from(6u32));
        assert_eq!(ciphertext.size(), 2);
        assert_eq!(ciphertext.elements().count(), 2);

        // Decrypt: phi * gamma^-x
        let shared = group.exponentiate(&ciphertext.gamma, &secret).unwrap();
        let decrypted = group.multiply(&ciphertext.phis[0], &group.invert(&shared));
        assert_eq!(decrypted, message);
    }

    #[test]
    fn test_encrypt_rejects_bad_input() {
        let group = toy_group();
        let q = group.q().clone();
        let public_key =
            ElGamalPublicKey::from_secrets(&group, &[Exponent::from_u64(3, &q).unwrap()]).unwrap();
        let r = Exponent::from_u64(5, &q).unwrap();

        assert!(matches!(
            public_key.encrypt(&group, &[], &r),
            Err(Error::EmptyInput(_))
        ));

        let m = group.element_from_u64(9).unwrap();
        assert!(matches!(
            public_key.encrypt(&group, &[m.clone(), m], &r),
            Err(Error::InvalidInput(_))
        ));

        let outsider = ZpGroupElement::from_value(BigUint::from(5u32));
        assert!(matches!(
            public_key.encrypt(&group, &[outsider], &r),
            Err(Error::GroupMismatch(_))
        ));
    }
}
