use anyhow::Error;
use std::str::FromStr;

use super::wronskian::Matrix;
use crate::errors::IdentError;
use crate::membership::data_structures::GeneratorGroup;
use crate::poly::{MultiPoly, Rational, Ring};

/// Whether the IO-equation provider may change variables to obtain
/// simpler equations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VariableChangePolicy {
    #[default]
    Default,
    Yes,
    No,
}

impl FromStr for VariableChangePolicy {
    type Err = IdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(VariableChangePolicy::Default),
            "yes" | "true" => Ok(VariableChangePolicy::Yes),
            "no" | "false" => Ok(VariableChangePolicy::No),
            other => Err(IdentError::Parse {
                input: other.to_string(),
                reason: "expected one of default, yes, no".to_string(),
            }),
        }
    }
}

/// Input-output equations of a model, polynomials over a ring holding the
/// parameters and the jets `y_k`, `u_k` of outputs and inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct IoEquations {
    ring: Ring,
    equations: Vec<MultiPoly<Rational>>,
}

impl IoEquations {
    pub fn new(ring: Ring, equations: Vec<MultiPoly<Rational>>) -> Self {
        IoEquations { ring, equations }
    }

    /// Parses every equation over `ring`; each must be a polynomial.
    pub fn parse<S: AsRef<str>>(ring: Ring, equations: &[S]) -> Result<Self, Error> {
        let equations = equations
            .iter()
            .map(|e| ring.parse_poly(e.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(IoEquations { ring, equations })
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    pub fn equations(&self) -> &[MultiPoly<Rational>] {
        &self.equations
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }
}

/// What the identifiability pipeline needs to know about an ODE model.
pub trait OdeModel {
    /// Parameters, states and input jets; candidate functions and known
    /// quantities are written over this ring.
    fn ring(&self) -> &Ring;

    fn parameters(&self) -> Vec<String>;

    fn io_equations(&self, policy: VariableChangePolicy) -> Result<IoEquations, Error>;

    /// Generator groups `[den, num]` of functions of the states that are
    /// determined by the outputs, written over `ring`.
    fn state_generators(&self, ring: &Ring) -> Result<Vec<GeneratorGroup>, Error> {
        let _ = ring;
        Ok(Vec::new())
    }

    /// One Wronskian per IO equation.
    fn wronskians(&self, io: &IoEquations) -> Result<Vec<Matrix>, Error> {
        let _ = io;
        Ok(Vec::new())
    }

    /// Sets of parameters that form non-trivial submodels.
    fn nontrivial_submodels(&self) -> Vec<Vec<String>> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Yes".parse::<VariableChangePolicy>(), Ok(VariableChangePolicy::Yes));
        assert_eq!("default".parse::<VariableChangePolicy>(), Ok(VariableChangePolicy::Default));
        assert!("maybe".parse::<VariableChangePolicy>().is_err());
    }

    #[test]
    fn test_parse_io_equations() {
        let ring = Ring::new(["a", "y_0", "y_1"]);
        let io = IoEquations::parse(ring.clone(), &["y_1 + a*y_0"]).unwrap();
        assert_eq!(io.len(), 1);
        assert_eq!(io.equations()[0].total_degree(), 2);
        assert!(IoEquations::parse(ring, &["y_1 / a"]).is_err());
    }
}
