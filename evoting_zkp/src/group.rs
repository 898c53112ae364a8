use crate::*;
use num_bigint::BigUint;
use std::fmt::Debug;

/// A prime-order cyclic group.
///
/// The proof engine only needs the group order, a generator, the group operation,
/// exponentiation by an `Exponent`, inversion, membership and a canonical byte encoding
/// used for challenge hashing.
pub trait Group: Clone + Debug + Send + Sync {
    type Element: Clone + Debug + PartialEq + Send + Sync;

    /// The group order `q`
    fn order(&self) -> &BigUint;

    fn generator(&self) -> &Self::Element;

    fn identity(&self) -> Self::Element;

    fn is_member(&self, element: &Self::Element) -> bool;

    fn multiply(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    /// Raise `base` to `exponent`. Fails with `ModulusMismatch` if the exponent is not
    /// reduced modulo this group's order.
    fn exponentiate(&self, base: &Self::Element, exponent: &Exponent)
        -> Result<Self::Element, Error>;

    fn invert(&self, element: &Self::Element) -> Self::Element;

    /// Canonical, fixed-width encoding of an element
    fn element_bytes(&self, element: &Self::Element) -> Vec<u8>;

    /// Check that an exponent belongs to this group's exponent ring
    fn check_exponent(&self, exponent: &Exponent) -> Result<(), Error> {
        if exponent.q() != self.order() {
            return Err(Error::ModulusMismatch);
        }
        Ok(())
    }

    /// Check every element for membership, naming the offending collection on failure
    fn check_members(&self, elements: &[Self::Element], what: &str) -> Result<(), Error> {
        for (i, element) in elements.iter().enumerate() {
            if !self.is_member(element) {
                return Err(Error::GroupMismatch(format!("{} {}", what, i)));
            }
        }
        Ok(())
    }
}
