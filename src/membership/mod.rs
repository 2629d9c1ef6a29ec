use anyhow::Error;
use ark_std::rand::Rng;
use ark_std::{end_timer, start_timer};
use num_traits::Zero;

use crate::diagnostics::Diagnostics;
use crate::errors::IdentError;
use crate::groebner::GroebnerEngine;
use crate::poly::{Monomial, MonomialOrder, Rational, RationalFunction};

pub mod bounds;
pub mod data_structures;
pub mod sampler;
pub mod saturation;

use bounds::degree_bound;
use data_structures::*;
use sampler::sample_point;
use saturation::saturation_ideal;

/// Number of points drawn before a degenerate sample is reported.
pub const MAX_SAMPLE_ATTEMPTS: usize = 16;

/// Randomized test of field membership.
///
/// Decides for each candidate whether it lies in the field generated by
/// the ratios of every group's members to the group's pivot. All answers
/// are jointly correct with probability at least `p`.
///
/// Attributes:
/// groups - generator groups; none may be empty
/// candidates - functions to test
/// p - required probability of correctness, in (0, 1)
/// engine - Groebner backend
/// rng - source of the evaluation point
/// diagnostics - caller-owned record of timings and counters
///
/// Returns
/// one bool per candidate
pub fn check_field_membership<E, R>(
    groups: &[GeneratorGroup],
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
    let num_vars = ambient_width(groups, candidates);
    check_field_membership_in(groups, candidates, num_vars, p, engine, rng, diagnostics)
}

/// [`check_field_membership`] over a ring of `num_vars` variables.
///
/// The sampling box is sized for the whole ring, so `num_vars` is the
/// variable count of the ring the groups and candidates live in, not the
/// number of variables they happen to use. It may not be smaller than the
/// latter.
#[allow(clippy::too_many_arguments)]
pub fn check_field_membership_in<E, R>(
    groups: &[GeneratorGroup],
    candidates: &[RationalFunction],
    num_vars: usize,
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
    let pivots = pivots(groups)?;
    let num_vars = variable_count(groups, candidates, num_vars)?;
    diagnostics.set_counter("num_vars", num_vars as u64);

    let membership_timer = start_timer!(|| format!(
        "check_field_membership, with {} groups and {} candidates",
        groups.len(),
        candidates.len()
    ));

    let d = degree_bound(groups, &pivots, candidates);
    log::debug!("degree bound {} over {} variables", d, num_vars);

    let sample_timer = start_timer!(|| "Sampling evaluation point");
    let stage = diagnostics.start("sample");
    let mut point = None;
    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        diagnostics.append_counter("sample_attempts", 1);
        let candidate_point: Vec<Rational> = sample_point(d, num_vars, candidates.len(), p, rng)?
            .into_iter()
            .map(Rational::from_integer)
            .collect();
        if degenerate_at(groups, &pivots, candidates, &candidate_point).is_none() {
            point = Some(candidate_point);
            break;
        }
        log::debug!("sampled point hits a vanishing pivot or denominator, drawing again");
    }
    diagnostics.stop(stage);
    end_timer!(sample_timer);

    let point = point.ok_or(IdentError::DegenerateSample(MAX_SAMPLE_ATTEMPTS))?;
    let result = membership_at(groups, &pivots, candidates, &point, engine, diagnostics);
    end_timer!(membership_timer);
    result
}

/// Field membership at a caller-chosen evaluation point.
///
/// Deterministic: the same inputs always give the same answer. Fails if
/// a pivot or a candidate denominator vanishes at `point`.
pub fn check_field_membership_at<E: GroebnerEngine>(
    groups: &[GeneratorGroup],
    candidates: &[RationalFunction],
    point: &[Rational],
    engine: &E,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<bool>, Error> {
    let pivots = pivots(groups)?;
    variable_count(groups, candidates, point.len())?;
    if let Some(vanishing) = degenerate_at(groups, &pivots, candidates, point) {
        return Err(IdentError::ZeroDenominator(vanishing).into());
    }
    membership_at(groups, &pivots, candidates, point, engine, diagnostics)
}

// First pivot or candidate denominator vanishing at `point`.
fn degenerate_at(
    groups: &[GeneratorGroup],
    pivots: &[usize],
    candidates: &[RationalFunction],
    point: &[Rational],
) -> Option<String> {
    let pivot = groups
        .iter()
        .zip(pivots.iter())
        .map(|(group, &k)| &group[k])
        .find(|g| g.evaluate(point).is_zero());
    if let Some(g) = pivot {
        return Some(g.format_with(&[]));
    }
    candidates
        .iter()
        .find(|f| f.denominator().evaluate(point).is_zero())
        .map(|f| f.denominator().format_with(&[]))
}

fn membership_at<E: GroebnerEngine>(
    groups: &[GeneratorGroup],
    pivots: &[usize],
    candidates: &[RationalFunction],
    point: &[Rational],
    engine: &E,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<bool>, Error> {
    let num_vars = point.len();
    let order = MonomialOrder::DegRevLex;

    let stage = diagnostics.start("saturation_ideal");
    let ideal = saturation_ideal(groups, pivots, point, num_vars, order);
    diagnostics.stop(stage);

    let groebner_timer = start_timer!(|| format!("Groebner basis of {} generators", ideal.len()));
    let stage = diagnostics.start("groebner");
    let basis = engine.basis(&ideal)?;
    diagnostics.stop(stage);
    diagnostics.set_counter("basis_size", basis.len() as u64);
    end_timer!(groebner_timer);

    let stage = diagnostics.start("reduce");
    let mut result = Vec::with_capacity(candidates.len());
    for f in candidates {
        let num_at = f.numerator().evaluate(point);
        let den_at = f.denominator().evaluate(point);
        // num * den(pt) - den * num(pt)
        let probe = f
            .numerator()
            .with_order(order)
            .scale(&den_at)
            .add_scaled_term(&(-num_at), &Monomial::one(), &f.denominator().with_order(order));
        result.push(engine.reduce(&probe, &basis)?.is_zero());
    }
    diagnostics.stop(stage);
    Ok(result)
}
