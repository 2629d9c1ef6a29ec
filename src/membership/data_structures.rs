use anyhow::Error;

use crate::errors::IdentError;
use crate::poly::{Coefficient, MultiPoly, Rational, RationalFunction};

/// A list of polynomials whose ratios to the group's pivot generate a field.
pub type GeneratorGroup<C = Rational> = Vec<MultiPoly<C>>;

/// Index of the pivot of `group`: the non-zero member of minimal total
/// degree, the first one on ties. `None` if every member is zero.
pub fn pivot_index<C: Coefficient>(group: &[MultiPoly<C>]) -> Option<usize> {
    group
        .iter()
        .enumerate()
        .filter(|(_, g)| !g.is_zero())
        .min_by_key(|(i, g)| (g.total_degree(), *i))
        .map(|(i, _)| i)
}

/// Pivots of every group, validated.
///
/// Attributes:
/// groups - generator groups of the field
///
/// Returns
/// one pivot index per group, or an error if there are no groups or a
/// group has no non-zero member
pub fn pivots<C: Coefficient>(groups: &[GeneratorGroup<C>]) -> Result<Vec<usize>, Error> {
    if groups.is_empty() {
        return Err(IdentError::EmptyGenerators.into());
    }
    groups
        .iter()
        .enumerate()
        .map(|(i, group)| pivot_index(group).ok_or_else(|| IdentError::EmptyGroup(i).into()))
        .collect()
}

pub fn validate_probability(p: f64) -> Result<(), Error> {
    if p.is_finite() && p > 0.0 && p < 1.0 {
        Ok(())
    } else {
        Err(IdentError::InvalidProbability(p).into())
    }
}

/// Number of variables the groups and candidates are written in.
pub fn ambient_width(groups: &[GeneratorGroup], candidates: &[RationalFunction]) -> usize {
    let groups_width = groups.iter().flatten().map(|g| g.width()).max().unwrap_or(0);
    let candidates_width = candidates
        .iter()
        .map(|f| f.numerator().width().max(f.denominator().width()))
        .max()
        .unwrap_or(0);
    groups_width.max(candidates_width)
}

/// Checks that a ring of `num_vars` variables holds every group and
/// candidate, and returns `num_vars`.
pub fn variable_count(groups: &[GeneratorGroup], candidates: &[RationalFunction], num_vars: usize) -> Result<usize, Error> {
    let used = ambient_width(groups, candidates);
    if num_vars < used {
        return Err(IdentError::DimensionMismatch {
            expected: used,
            found: num_vars,
        }
        .into());
    }
    Ok(num_vars)
}
