use anyhow::Error;
use ark_std::rand::Rng;
use ark_std::{end_timer, start_timer};
use std::collections::BTreeMap;

use crate::diagnostics::Diagnostics;
use crate::errors::IdentError;
use crate::groebner::GroebnerEngine;
use crate::membership::check_field_membership_in;
use crate::membership::data_structures::{validate_probability, GeneratorGroup};
use crate::poly::{Rational, RationalFunction, Ring};

pub mod generators;
pub mod model;
pub mod ode;
pub mod simplify;
pub mod wronskian;

pub use generators::{extract_generators, GeneratorBuckets};
pub use model::{IoEquations, OdeModel, VariableChangePolicy};
pub use ode::OdeSystem;
pub use simplify::simplify_generators;
pub use wronskian::{corank, matrix_rank, Matrix};

/// Answer of [`assess_global_identifiability`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Assessment {
    /// one entry per requested function
    Functions(Vec<bool>),
    /// one entry per model parameter
    Parameters(BTreeMap<String, bool>),
}

/// Confidence of the membership stage when it follows a second
/// probabilistic stage.
pub fn half_probability(p: f64) -> f64 {
    0.5 + p / 2.0
}

// The field Q stands in for an empty generator set.
fn non_empty(mut groups: Vec<GeneratorGroup>, ring: &Ring) -> Vec<GeneratorGroup> {
    if groups.is_empty() {
        groups.push(generators::ground_field(ring));
    }
    groups
}

fn cast_all(ring: &Ring, functions: &[RationalFunction], from: &Ring) -> Result<Vec<RationalFunction>, Error> {
    functions.iter().map(|f| ring.cast_function(f, from)).collect()
}

/// Identifiability of functions of the parameters, from the IO equations.
///
/// Attributes:
/// io - input-output equations
/// parameters - names of the parameters in the IO ring
/// candidates - functions over the IO ring to test
/// p - required probability of correctness
///
/// Returns
/// one bool per candidate, jointly correct with probability at least `p`
pub fn check_identifiability_io<E, R>(
    io: &IoEquations,
    parameters: &[String],
    candidates: &[RationalFunction],
    p: f64,
    engine: &E,
    rng: &mut R,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<bool>, Error>
where
    E: GroebnerEngine,
    R: Rng + ?Sized,
{
    validate_probability(p)?;
    let stage = diagnostics.start("extract_generators");
    let buckets = extract_generators::<OdeSystem, &str>(io, parameters, &[], false, None)?;
    diagnostics.stop(stage);

    let candidates = cast_all(&buckets.ring, candidates, io.ring())?;
    let groups = non_empty(buckets.no_states, &buckets.ring);
    check_field_membership_in(&groups, &candidates, buckets.ring.num_vars(), p, engine, rng, diagnostics)
}

/// Identifiability of rational functions of a model's parameters and,
/// possibly, states.
///
/// Attributes:
/// model - the model; candidates are written over `model.ring()`
/// candidates - functions to test
/// known - quantities known a priori, over `model.ring()`
/// p - required probability of correctness
/// policy - variable change policy for the IO equations
///
/// Returns
/// one bool per candidate
#[allow(clippy::too_many_arguments)]
pub fn check_identifiability<M, E, R, S>(
    model: &M,
    candidates: &[RationalFunction],
    known: &[S],
    p: f64,
    policy: VariableChangePolicy,
    engine: &E,
    rng: &mut R,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<bool>, Error>
where
    M: OdeModel + ?Sized,
    E: GroebnerEngine,
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    validate_probability(p)?;
    let check_timer = start_timer!(|| format!(
        "check_identifiability, with {} candidates",
        candidates.len()
    ));

    let model_ring = model.ring();
    let parameters = model.parameters();
    let states_needed = candidates.iter().any(|f| {
        model_ring
            .variable_names(f.numerator())
            .into_iter()
            .chain(model_ring.variable_names(f.denominator()))
            .any(|name| !parameters.contains(&name))
    });

    let io_timer = start_timer!(|| "Computing IO equations");
    let stage = diagnostics.start("io_equations");
    let io = model.io_equations(policy)?;
    diagnostics.stop(stage);
    end_timer!(io_timer);

    let stage = diagnostics.start("wronskian");
    for (i, w) in model.wronskians(&io)?.iter().enumerate() {
        let corank = corank(w);
        if corank > 1 {
            log::warn!(
                "Wronskian of IO equation {} has corank {}, the result holds for multi-experiment identifiability only",
                i,
                corank
            );
        }
    }
    diagnostics.stop(stage);

    let submodels = model.nontrivial_submodels();
    if !submodels.is_empty() {
        log::info!("the model has {} non-trivial submodels: {:?}", submodels.len(), submodels);
    }

    let stage = diagnostics.start("extract_generators");
    let buckets = extract_generators(&io, &parameters, known, states_needed, Some(model))?;
    diagnostics.stop(stage);

    let groups = if states_needed {
        let stage = diagnostics.start("simplify");
        let simplified = simplify_generators(&non_empty(buckets.no_states, &buckets.ring), engine)?;
        diagnostics.stop(stage);
        let mut groups = simplified;
        groups.extend(buckets.with_states);
        groups
    } else {
        if !buckets.with_states.is_empty() {
            let unused: Vec<String> = buckets
                .with_states
                .iter()
                .filter_map(|group| group.last().map(|q| buckets.ring.format(q)))
                .collect();
            log::info!(
                "no candidate involves states, known quantities over non-parameters are unused: {}",
                unused.join(", ")
            );
        }
        buckets.no_states
    };
    let groups = non_empty(groups, &buckets.ring);
    diagnostics.set_counter("generator_groups", groups.len() as u64);

    let candidates = cast_all(&buckets.ring, candidates, model_ring)?;
    let result = check_field_membership_in(
        &groups,
        &candidates,
        buckets.ring.num_vars(),
        half_probability(p),
        engine,
        rng,
        diagnostics,
    );
    end_timer!(check_timer);
    result
}

/// Identifiability of the given functions, or of every parameter when
/// none are given.
#[allow(clippy::too_many_arguments)]
pub fn assess_global_identifiability<M, E, R, S>(
    model: &M,
    candidates: Option<&[RationalFunction]>,
    known: &[S],
    p: f64,
    policy: VariableChangePolicy,
    engine: &E,
    rng: &mut R,
    diagnostics: &mut Diagnostics,
) -> Result<Assessment, Error>
where
    M: OdeModel + ?Sized,
    E: GroebnerEngine,
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    if let Some(candidates) = candidates {
        let result = check_identifiability(model, candidates, known, p, policy, engine, rng, diagnostics)?;
        return Ok(Assessment::Functions(result));
    }

    let parameters = model.parameters();
    let ring = model.ring();
    let functions = parameters
        .iter()
        .map(|name| ring.var::<Rational>(name).map(RationalFunction::from_poly))
        .collect::<Result<Vec<_>, _>>()?;
    let result = check_identifiability(model, &functions, known, p, policy, engine, rng, diagnostics)?;
    Ok(Assessment::Parameters(parameters.into_iter().zip(result).collect()))
}

/// Simplified generators of the field of identifiable functions of the
/// parameters, as functions over the IO ring.
///
/// Each generator is a ratio of polynomials with common monomial factors,
/// rational content and exact divisors cancelled. Common non-monomial
/// factors of numerator and denominator are not removed, so a generator
/// may be returned as an unreduced quotient such as
/// `((a + b)*(a + 1)) / ((a + b)*(b + 1))`. Compare generators with `==`,
/// which tests equality in the field.
pub fn extract_identifiable_functions<E: GroebnerEngine>(
    io: &IoEquations,
    parameters: &[String],
    engine: &E,
) -> Result<Vec<RationalFunction>, Error> {
    let buckets = extract_generators::<OdeSystem, &str>(io, parameters, &[], false, None)?;
    let simplified = simplify_generators(&non_empty(buckets.no_states, &buckets.ring), engine)?;
    // members over the first one generate the same field as over the pivot
    let mut functions = Vec::new();
    for group in simplified {
        let Some((den, members)) = group.split_first() else {
            return Err(IdentError::EmptyGenerators.into());
        };
        for num in members {
            functions.push(RationalFunction::new(num.clone(), den.clone())?);
        }
    }
    Ok(functions)
}
