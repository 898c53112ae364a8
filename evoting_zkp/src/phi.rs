use crate::*;

/// One factor of a computation rule: `baseElements[base] ^ witness[witness]`.
///
/// Both indices are 1-based, the way rules are authored.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RuleTerm {
    pub base: usize,
    pub witness: usize,
}

/// The rule for one output position: the group product of all its terms
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ComputationRule {
    pub terms: Vec<RuleTerm>,
}

impl ComputationRule {
    pub fn new(terms: Vec<RuleTerm>) -> Self {
        ComputationRule { terms }
    }

    /// A rule with a single `(base, witness)` term
    pub fn single(base: usize, witness: usize) -> Self {
        ComputationRule {
            terms: vec![RuleTerm { base, witness }],
        }
    }

    /// Build a rule from `(base, witness)` pairs
    pub fn from_pairs(pairs: &[(usize, usize)]) -> Self {
        ComputationRule {
            terms: pairs
                .iter()
                .map(|&(base, witness)| RuleTerm { base, witness })
                .collect(),
        }
    }

    fn check(&self, output: usize, num_base_elements: usize, num_inputs: usize) -> Result<(), String> {
        if self.terms.is_empty() {
            return Err(format!("rule for output {} has no terms", output));
        }
        for term in &self.terms {
            if term.base < 1 || term.base > num_base_elements {
                return Err(format!(
                    "rule for output {} references base element {} of {}",
                    output, term.base, num_base_elements
                ));
            }
            if term.witness < 1 || term.witness > num_inputs {
                return Err(format!(
                    "rule for output {} references witness {} of {}",
                    output, term.witness, num_inputs
                ));
            }
        }
        Ok(())
    }
}

/// A declarative linear map from witness exponents to group elements.
///
/// Output `j` is the product over the terms of `rules[j]` of
/// `base_elements[term.base] ^ witness[term.witness]`. Construction validates every rule, so
/// an evaluation can only fail on a bad witness.
#[derive(Clone, Debug)]
pub struct PhiFunction<G: Group> {
    group: G,
    num_inputs: usize,
    base_elements: Vec<G::Element>,
    rules: Vec<ComputationRule>,
}

impl<G: Group> PhiFunction<G> {
    pub fn new(
        group: G,
        num_inputs: usize,
        num_outputs: usize,
        base_elements: Vec<G::Element>,
        rules: Vec<ComputationRule>,
    ) -> Result<Self, Error> {
        if num_inputs < 1 {
            return Err(Error::InvalidPhiFunction(
                "the number of inputs must be at least 1".to_owned(),
            ));
        }
        if num_outputs < 1 {
            return Err(Error::InvalidPhiFunction(
                "the number of outputs must be at least 1".to_owned(),
            ));
        }
        if base_elements.is_empty() {
            return Err(Error::InvalidPhiFunction(
                "the list of base elements is empty".to_owned(),
            ));
        }
        if rules.len() != num_outputs {
            return Err(Error::InvalidPhiFunction(format!(
                "{} computation rules for {} outputs",
                rules.len(),
                num_outputs
            )));
        }
        for (output, rule) in rules.iter().enumerate() {
            rule.check(output, base_elements.len(), num_inputs)
                .map_err(Error::InvalidPhiFunction)?;
        }
        group.check_members(&base_elements, "base element")?;

        Ok(PhiFunction {
            group,
            num_inputs,
            base_elements,
            rules,
        })
    }

    pub fn group(&self) -> &G {
        &self.group
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.rules.len()
    }

    pub fn base_elements(&self) -> &[G::Element] {
        &self.base_elements
    }

    pub fn rules(&self) -> &[ComputationRule] {
        &self.rules
    }

    /// Evaluate the function on a witness vector.
    ///
    /// The witness must have exactly `num_inputs` exponents, all reduced modulo the group
    /// order.
    pub fn evaluate(&self, witness: &[Exponent]) -> Result<Vec<G::Element>, Error> {
        if witness.len() != self.num_inputs {
            return Err(Error::InvalidWitness(format!(
                "expected {} exponents, found {}",
                self.num_inputs,
                witness.len()
            )));
        }
        for (i, exponent) in witness.iter().enumerate() {
            if exponent.q() != self.group.order() {
                return Err(Error::InvalidWitness(format!(
                    "exponent {} is not reduced modulo the group order",
                    i
                )));
            }
        }

        let mut outputs = Vec::with_capacity(self.rules.len());
        for (output, rule) in self.rules.iter().enumerate() {
            let mut product: Option<G::Element> = None;
            for term in &rule.terms {
                let base = self
                    .base_elements
                    .get(term.base.wrapping_sub(1))
                    .ok_or_else(|| {
                        Error::MalformedComputationRule(format!(
                            "output {} references base element {}",
                            output, term.base
                        ))
                    })?;
                let exponent = witness.get(term.witness.wrapping_sub(1)).ok_or_else(|| {
                    Error::MalformedComputationRule(format!(
                        "output {} references witness {}",
                        output, term.witness
                    ))
                })?;

                let factor = self.group.exponentiate(base, exponent)?;
                product = Some(match product {
                    Some(acc) => self.group.multiply(&acc, &factor),
                    None => factor,
                });
            }

            let value = product.ok_or_else(|| {
                Error::MalformedComputationRule(format!("rule for output {} is empty", output))
            })?;
            outputs.push(value);
        }

        Ok(outputs)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::zp::test::toy_group;
    use num_bigint::BigUint;

    fn elements(group: &ZpSubgroup, values: &[u64]) -> Vec<ZpGroupElement> {
        values
            .iter()
            .map(|v| group.element_from_u64(*v).unwrap())
            .collect()
    }

    #[test]
    fn test_evaluate() {
        let group = toy_group();
        let q = group.q().clone();
        let bases = elements(&group, &[2, 4, 3]);

        // out0 = b1^w1, out1 = b2^w1 * b3^w2
        let rules = vec![
            ComputationRule::single(1, 1),
            ComputationRule::from_pairs(&[(2, 1), (3, 2)]),
        ];
        let phi = PhiFunction::new(group.clone(), 2, 2, bases, rules).unwrap();
        assert_eq!(phi.num_inputs(), 2);
        assert_eq!(phi.num_outputs(), 2);

        let witness = vec![
            Exponent::from_u64(10, &q).unwrap(),
            Exponent::from_u64(2, &q).unwrap(),
        ];
        let outputs = phi.evaluate(&witness).unwrap();

        // 2^10 = 12; 4^10 * 3^2 = 6 * 9 = 54 = 8 (mod 23)
        assert_eq!(outputs[0].value(), &BigUint::from(12u32));
        assert_eq!(outputs[1].value(), &BigUint::from(8u32));

        // Deterministic
        assert_eq!(phi.evaluate(&witness).unwrap(), outputs);
    }

    #[test]
    fn test_evaluate_rejects_corrupted_rules() {
        let group = toy_group();
        let q = group.q().clone();
        let witness = vec![Exponent::from_u64(3, &q).unwrap()];

        // Bypasses the checks in `new`
        let phi = PhiFunction {
            group: group.clone(),
            num_inputs: 1,
            base_elements: elements(&group, &[2]),
            rules: vec![ComputationRule::single(5, 1)],
        };
        assert!(matches!(
            phi.evaluate(&witness),
            Err(Error::MalformedComputationRule(_))
        ));

        let phi = PhiFunction {
            group: group.clone(),
            num_inputs: 1,
            base_elements: elements(&group, &[2]),
            rules: vec![ComputationRule::single(1, 2)],
        };
        assert!(matches!(
            phi.evaluate(&witness),
            Err(Error::MalformedComputationRule(_))
        ));

        let phi = PhiFunction {
            group: group.clone(),
            num_inputs: 1,
            base_elements: elements(&group, &[2]),
            rules: vec![ComputationRule::new(vec![])],
        };
        assert!(matches!(
            phi.evaluate(&witness),
            Err(Error::MalformedComputationRule(_))
        ));
    }

    #[test]
    fn test_evaluate_concurrently() {
        let group = toy_group();
        let q = group.q().clone();
        let phi = std::sync::Arc::new(
            PhiFunction::new(
                group.clone(),
                1,
                2,
                elements(&group, &[2, 16]),
                vec![ComputationRule::single(1, 1), ComputationRule::single(2, 1)],
            )
            .unwrap(),
        );
        let witness = vec![Exponent::from_u64(7, &q).unwrap()];
        let expected = phi.evaluate(&witness).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let phi = phi.clone();
                let witness = witness.clone();
                std::thread::spawn(move || phi.evaluate(&witness).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_invalid_witness() {
        let group = toy_group();
        let q = group.q().clone();
        let phi = PhiFunction::new(
            group.clone(),
            1,
            1,
            elements(&group, &[2]),
            vec![ComputationRule::single(1, 1)],
        )
        .unwrap();

        assert!(matches!(phi.evaluate(&[]), Err(Error::InvalidWitness(_))));

        let two = vec![
            Exponent::from_u64(1, &q).unwrap(),
            Exponent::from_u64(1, &q).unwrap(),
        ];
        assert!(matches!(phi.evaluate(&two), Err(Error::InvalidWitness(_))));

        let foreign = vec![Exponent::from_u64(1, &BigUint::from(13u32)).unwrap()];
        assert!(matches!(
            phi.evaluate(&foreign),
            Err(Error::InvalidWitness(_))
        ));
    }

    #[test]
    fn test_construction_boundaries() {
        let group = toy_group();
        let bases = elements(&group, &[2, 4]);
        let rule = || vec![ComputationRule::single(1, 1)];

        let invalid = |result: Result<PhiFunction<ZpSubgroup>, Error>| {
            matches!(result, Err(Error::InvalidPhiFunction(_)))
        };

        // Zero inputs or outputs
        assert!(invalid(PhiFunction::new(group.clone(), 0, 1, bases.clone(), rule())));
        assert!(invalid(PhiFunction::new(group.clone(), 1, 0, bases.clone(), vec![])));

        // Empty bases
        assert!(invalid(PhiFunction::new(group.clone(), 1, 1, vec![], rule())));

        // Rule count mismatch
        assert!(invalid(PhiFunction::new(group.clone(), 1, 2, bases.clone(), rule())));

        // Indices outside [1, n]
        for &(base, witness) in &[(0, 1), (3, 1), (1, 0), (1, 2)] {
            assert!(invalid(PhiFunction::new(
                group.clone(),
                1,
                1,
                bases.clone(),
                vec![ComputationRule::single(base, witness)],
            )));
        }

        // A rule without terms
        assert!(invalid(PhiFunction::new(
            group.clone(),
            1,
            1,
            bases.clone(),
            vec![ComputationRule::new(vec![])],
        )));

        // Base elements outside the group
        let outsider = vec![ZpGroupElement::from_value(BigUint::from(5u32))];
        assert!(matches!(
            PhiFunction::new(group.clone(), 1, 1, outsider, rule()),
            Err(Error::GroupMismatch(_))
        ));
    }

    #[test]
    fn test_rule_serde() {
        let rule = ComputationRule::from_pairs(&[(2, 1), (3, 2)]);
        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(
            json,
            r#"{"terms":[{"base":2,"witness":1},{"base":3,"witness":2}]}"#
        );
    }
}
