use anyhow::Error;
use ark_std::rand::{rngs::StdRng, Rng, SeedableRng};
use num_traits::{One, Zero};
use regex::Regex;

use super::model::{IoEquations, OdeModel, VariableChangePolicy};
use super::wronskian::{wronskian_at_zero, Matrix};
use crate::errors::IdentError;
use crate::membership::data_structures::GeneratorGroup;
use crate::poly::parser::extract_variable_names;
use crate::poly::series::Series;
use crate::poly::{MultiPoly, Rational, RationalFunction, Ring};

/// Rational ODE model `x' = f(x, u, mu)`, `y = h(x, u, mu)` whose
/// input-output equations are supplied by the caller.
///
/// Three rings are involved:
/// - the base ring (parameters, states, inputs) the dynamics and outputs
///   are written in,
/// - the model ring (parameters, states, input jets `u_0..u_n`, `n` the
///   number of states) used for candidates and known quantities,
/// - the IO ring (parameters and the jets `y_k`, `u_k` used by the
///   supplied equations).
#[derive(Clone, Debug)]
pub struct OdeSystem {
    parameters: Vec<String>,
    states: Vec<String>,
    inputs: Vec<String>,
    base_ring: Ring,
    ring: Ring,
    dynamics: Vec<Option<RationalFunction>>,
    outputs: Vec<(String, RationalFunction)>,
    io_equations: Vec<String>,
    wronskians: Vec<Matrix>,
    submodels: Vec<Vec<String>>,
    seed: u64,
}

fn owned<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().map(|s| s.as_ref().to_string()).collect()
}

fn jet_name(base: &str, order: usize) -> String {
    format!("{}_{}", base, order)
}

impl OdeSystem {
    pub fn new<S: AsRef<str>>(parameters: &[S], states: &[S], inputs: &[S]) -> Self {
        let (parameters, states, inputs) = (owned(parameters), owned(states), owned(inputs));
        let n = states.len();

        let base_ring = Ring::new(parameters.iter().chain(states.iter()).chain(inputs.iter()).cloned());
        let jets = inputs
            .iter()
            .flat_map(|u| (0..=n).map(move |k| jet_name(u, k)));
        let ring = Ring::new(
            parameters
                .iter()
                .chain(states.iter())
                .cloned()
                .chain(jets),
        );

        OdeSystem {
            dynamics: vec![None; n],
            parameters,
            states,
            inputs,
            base_ring,
            ring,
            outputs: Vec::new(),
            io_equations: Vec::new(),
            wronskians: Vec::new(),
            submodels: Vec::new(),
            seed: 1,
        }
    }

    /// Sets `state' = rhs`, `rhs` over parameters, states and inputs.
    pub fn with_dynamics(mut self, state: &str, rhs: &str) -> Result<Self, Error> {
        let i = self
            .states
            .iter()
            .position(|s| s == state)
            .ok_or_else(|| IdentError::UnknownVariable(state.to_string()))?;
        self.dynamics[i] = Some(self.base_ring.parse(rhs)?);
        Ok(self)
    }

    pub fn with_output(mut self, name: &str, expr: &str) -> Result<Self, Error> {
        let h = self.base_ring.parse(expr)?;
        self.outputs.push((name.to_string(), h));
        Ok(self)
    }

    /// Adds an input-output equation over parameters and the jets
    /// `y_k` / `u_k` of outputs and inputs.
    pub fn with_io_equation(mut self, equation: &str) -> Self {
        self.io_equations.push(equation.to_string());
        self
    }

    /// Uses explicit Wronskians instead of computing them from a solution.
    pub fn with_wronskian(mut self, matrix: Matrix) -> Self {
        self.wronskians.push(matrix);
        self
    }

    pub fn with_submodel<S: AsRef<str>>(mut self, parameters: &[S]) -> Self {
        self.submodels.push(owned(parameters));
        self
    }

    /// Seed of the random solution the Wronskians are computed along.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn num_params(&self) -> usize {
        self.parameters.len()
    }

    fn jet_index(&self, input: usize, order: usize) -> usize {
        self.num_params() + self.states.len() + input * (self.states.len() + 1) + order
    }

    fn dynamics_of(&self, i: usize) -> Result<&RationalFunction, Error> {
        self.dynamics[i]
            .as_ref()
            .ok_or_else(|| IdentError::MissingDynamics(self.states[i].clone()).into())
    }

    // Base ring -> model ring: every input becomes its jet of order zero.
    fn lift(&self, f: &RationalFunction) -> Result<RationalFunction, Error> {
        let offset = self.num_params() + self.states.len();
        let map = |i: usize| {
            if i < offset {
                Some(i)
            } else {
                Some(self.jet_index(i - offset, 0))
            }
        };
        let order = self.ring.order();
        let (Some(num), Some(den)) = (f.numerator().remap(map, order), f.denominator().remap(map, order)) else {
            return Err(IdentError::UnknownVariable(f.to_string()).into());
        };
        RationalFunction::new(num, den)
    }

    /// Derivative of `h` along the dynamics, `h` over the model ring.
    pub fn lie_derivative(&self, h: &RationalFunction) -> Result<RationalFunction, Error> {
        let offset = self.num_params();
        let mut acc = RationalFunction::zero();
        for i in 0..self.states.len() {
            let dh = h.partial_derivative(offset + i);
            if dh.is_zero() {
                continue;
            }
            acc = acc + dh * self.lift(self.dynamics_of(i)?)?;
        }
        let n = self.states.len();
        for u in 0..self.inputs.len() {
            for k in 0..n {
                let dh = h.partial_derivative(self.jet_index(u, k));
                if dh.is_zero() {
                    continue;
                }
                let next = RationalFunction::from_poly(self.ring.gen(self.jet_index(u, k + 1)));
                acc = acc + dh * next;
            }
        }
        Ok(acc)
    }

    // Names of the IO ring, in a fixed order: parameters, output jets,
    // input jets.
    fn io_ring(&self) -> Result<Ring, Error> {
        let jet = Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)_(\d+)$")?;
        let mut jets: Vec<(usize, usize, String)> = Vec::new();
        for equation in self.io_equations.iter() {
            for name in extract_variable_names(equation) {
                if self.parameters.contains(&name) || jets.iter().any(|(_, _, n)| *n == name) {
                    continue;
                }
                let caps = jet
                    .captures(&name)
                    .ok_or_else(|| IdentError::UnknownVariable(name.clone()))?;
                let base = &caps[1];
                let order: usize = caps[2]
                    .parse()
                    .map_err(|_| IdentError::UnknownVariable(name.clone()))?;
                let rank = match self.outputs.iter().position(|(y, _)| y == base) {
                    Some(j) => j,
                    None => match self.inputs.iter().position(|u| u == base) {
                        Some(j) => self.outputs.len() + j,
                        None => return Err(IdentError::UnknownVariable(name.clone()).into()),
                    },
                };
                jets.push((rank, order, name));
            }
        }
        jets.sort();
        Ok(Ring::new(
            self.parameters
                .iter()
                .cloned()
                .chain(jets.into_iter().map(|(_, _, n)| n)),
        ))
    }

    /// Power series of states, outputs and inputs along one solution with
    /// random integer parameters, initial conditions and input.
    fn solution(&self, precision: usize) -> Result<(Vec<Rational>, Vec<Series>, Vec<Series>), Error> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let params: Vec<Rational> = (0..self.num_params())
            .map(|_| Rational::from_integer(rng.gen_range(1i64..=20).into()))
            .collect();
        let initial: Vec<Rational> = (0..self.states.len())
            .map(|_| Rational::from_integer(rng.gen_range(1i64..=20).into()))
            .collect();
        let inputs: Vec<Series> = (0..self.inputs.len())
            .map(|_| {
                let coeffs = (0..precision)
                    .map(|_| Rational::from_integer(rng.gen_range(-5i64..=5).into()))
                    .collect();
                Series::new(coeffs, precision)
            })
            .collect();

        let constants: Vec<Series> = params.iter().map(|c| Series::constant(c.clone(), precision)).collect();
        let mut states: Vec<Series> = initial.iter().map(|c| Series::constant(c.clone(), precision)).collect();

        let base_args = |states: &[Series]| -> Vec<Series> {
            constants
                .iter()
                .chain(states.iter())
                .chain(inputs.iter())
                .cloned()
                .collect()
        };

        // Picard iteration, one more exact coefficient per round
        for _ in 0..=precision {
            let args = base_args(&states);
            let mut next = Vec::with_capacity(states.len());
            for (i, x0) in initial.iter().enumerate() {
                let f = self.dynamics_of(i)?;
                let rate = evaluate_function(f, &args, precision)?;
                next.push(&Series::constant(x0.clone(), precision) + &rate.integral().truncate(precision));
            }
            states = next;
        }

        let args = base_args(&states);
        let outputs = self
            .outputs
            .iter()
            .map(|(_, h)| evaluate_function(h, &args, precision))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((params, outputs, inputs))
    }
}

fn evaluate_function(f: &RationalFunction, args: &[Series], precision: usize) -> Result<Series, Error> {
    let num = Series::evaluate_poly(f.numerator(), args, precision);
    let den = Series::evaluate_poly(f.denominator(), args, precision);
    let inv = den
        .inverse()
        .ok_or_else(|| IdentError::ZeroDenominator(f.to_string()))?;
    Ok(&num * &inv)
}

fn nth_derivative(s: &Series, k: usize) -> Series {
    (0..k).fold(s.clone(), |acc, _| acc.derivative())
}

impl OdeModel for OdeSystem {
    fn ring(&self) -> &Ring {
        &self.ring
    }

    fn parameters(&self) -> Vec<String> {
        self.parameters.clone()
    }

    fn io_equations(&self, policy: VariableChangePolicy) -> Result<IoEquations, Error> {
        if policy == VariableChangePolicy::Yes {
            log::info!("variable change requested, supplied IO equations are used as given");
        }
        IoEquations::parse(self.io_ring()?, &self.io_equations)
    }

    fn state_generators(&self, ring: &Ring) -> Result<Vec<GeneratorGroup>, Error> {
        let mut groups = Vec::new();
        for (_, h) in self.outputs.iter() {
            let mut derivative = self.lift(h)?;
            for k in 0..=self.states.len() {
                let (num, den) = ring.cast_function(&derivative, &self.ring)?.into_parts();
                groups.push(vec![den, num]);
                if k < self.states.len() {
                    derivative = self.lie_derivative(&derivative)?;
                }
            }
        }
        for u in self.inputs.iter() {
            for k in 0..=self.states.len() {
                if let Ok(jet) = ring.var(&jet_name(u, k)) {
                    groups.push(vec![ring.constant(Rational::one()), jet]);
                }
            }
        }
        Ok(groups)
    }

    fn wronskians(&self, io: &IoEquations) -> Result<Vec<Matrix>, Error> {
        if !self.wronskians.is_empty() {
            return Ok(self.wronskians.clone());
        }
        let ring = io.ring();
        let is_param = |i: usize| self.parameters.contains(&ring.names()[i]);
        let monomials: Vec<Vec<MultiPoly<Rational>>> = io
            .equations()
            .iter()
            .map(|e| {
                e.collect_coefficients(is_param)
                    .into_iter()
                    .map(|(m, _)| MultiPoly::monomial(m, Rational::one(), ring.order()))
                    .collect()
            })
            .collect();

        let jet = Regex::new(r"_(\d+)$")?;
        let max_order = ring
            .names()
            .iter()
            .filter_map(|n| jet.captures(n).and_then(|c| c[1].parse::<usize>().ok()))
            .max()
            .unwrap_or(0);
        let size = monomials.iter().map(|m| m.len()).max().unwrap_or(0);
        let precision = max_order + size + 2;

        let (params, outputs, inputs) = self.solution(precision)?;

        // one series per IO ring variable
        let mut args = Vec::with_capacity(ring.num_vars());
        for name in ring.names() {
            if let Some(i) = self.parameters.iter().position(|p| p == name) {
                args.push(Series::constant(params[i].clone(), size + 1));
                continue;
            }
            let caps = jet
                .captures(name)
                .ok_or_else(|| IdentError::UnknownVariable(name.clone()))?;
            let order: usize = caps[1]
                .parse()
                .map_err(|_| IdentError::UnknownVariable(name.clone()))?;
            let base = &name[..name.len() - caps[0].len()];
            let series = match self.outputs.iter().position(|(y, _)| y == base) {
                Some(j) => &outputs[j],
                None => match self.inputs.iter().position(|u| u == base) {
                    Some(j) => &inputs[j],
                    None => return Err(IdentError::UnknownVariable(name.clone()).into()),
                },
            };
            args.push(nth_derivative(series, order));
        }

        Ok(monomials
            .iter()
            .map(|ms| {
                let series: Vec<Series> = ms
                    .iter()
                    .map(|m| Series::evaluate_poly(m, &args, ms.len() + 1))
                    .collect();
                wronskian_at_zero(&series)
            })
            .collect())
    }

    fn nontrivial_submodels(&self) -> Vec<Vec<String>> {
        self.submodels.clone()
    }
}
