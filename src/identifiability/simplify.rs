use anyhow::Error;
use ark_std::{end_timer, start_timer};

use crate::groebner::GroebnerEngine;
use crate::membership::data_structures::{pivots, GeneratorGroup};
use crate::membership::saturation::saturation_ideal;
use crate::poly::{MonomialOrder, MultiPoly, RationalFunction};

/// Exact reduction of a generating set of a field of rational functions.
///
/// Builds the saturation ideal of `groups` over `Q(x̂)`, with the generic
/// point `x̂` in place of a sampled one, eliminates the saturation variables
/// and reads the generators off the coefficients of the reduced basis:
/// every non-leading coefficient over the leading one, constants and
/// duplicates up to sign skipped. Each generator `a/b` comes back as the
/// group `[b, a]`.
///
/// Deterministic. Returns no groups when the field is Q itself, and the
/// input unchanged when the basis yields more generators than the input
/// has ratios.
pub fn simplify_generators<E: GroebnerEngine>(
    groups: &[GeneratorGroup],
    engine: &E,
) -> Result<Vec<GeneratorGroup>, Error> {
    let pivots = pivots(groups)?;
    let num_vars = groups.iter().flatten().map(|g| g.width()).max().unwrap_or(0);
    let simplify_timer = start_timer!(|| format!(
        "simplify_generators, with {} groups over {} variables",
        groups.len(),
        num_vars
    ));

    let base_order = MonomialOrder::DegRevLex;
    let symbols: Vec<RationalFunction> = (0..num_vars)
        .map(|i| RationalFunction::from_poly(MultiPoly::var(i, base_order)))
        .collect();
    let lifted: Vec<GeneratorGroup<RationalFunction>> = groups
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|p| p.map_coefficients(|c| RationalFunction::constant(c.clone())))
                .collect()
        })
        .collect();

    let order = MonomialOrder::Elimination { keep: num_vars };
    let ideal = saturation_ideal(&lifted, &pivots, &symbols, num_vars, order);
    let basis = engine.basis(&ideal)?;

    let mut generators: Vec<RationalFunction> = Vec::new();
    // elements free of saturation variables
    for g in basis.polys().iter().filter(|g| g.width() <= num_vars) {
        let Some(lc) = g.leading_coefficient() else {
            continue;
        };
        for (_, c) in g.terms().iter().skip(1) {
            let ratio = c.clone() / lc.clone();
            if ratio.is_constant() {
                continue;
            }
            let negated = -ratio.clone();
            if generators.iter().any(|q| *q == ratio || *q == negated) {
                continue;
            }
            generators.push(ratio);
        }
    }

    let input_ratios: usize = groups.iter().map(|g| g.len().saturating_sub(1)).sum();
    if generators.len() > input_ratios {
        log::debug!(
            "reading off the basis gave {} generators for {} input ratios, keeping the input",
            generators.len(),
            input_ratios
        );
        end_timer!(simplify_timer);
        return Ok(groups.to_vec());
    }

    log::debug!(
        "simplified {} generator groups to {}",
        groups.len(),
        generators.len()
    );
    end_timer!(simplify_timer);
    Ok(generators
        .into_iter()
        .map(|f| {
            let (num, den) = f.into_parts();
            vec![den.with_order(base_order), num.with_order(base_order)]
        })
        .collect())
}
