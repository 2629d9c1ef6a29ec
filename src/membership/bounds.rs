use super::data_structures::GeneratorGroup;
use crate::poly::RationalFunction;

/// Upper bound `D` on the degree of every polynomial the membership test
/// constructs.
///
/// With `L` the sum of the pivot degrees and of the candidate denominator
/// degrees,
/// `D = max(L + 1, max_i (L - deg pivot_i + maxdeg group_i), max_j (L - deg den_j + deg num_j))`.
///
/// `pivots[i]` indexes the pivot of `groups[i]`.
pub fn degree_bound(groups: &[GeneratorGroup], pivots: &[usize], candidates: &[RationalFunction]) -> u64 {
    let pivot_degrees: Vec<u64> = groups
        .iter()
        .zip(pivots.iter())
        .map(|(group, &k)| group.get(k).map(|g| g.total_degree() as u64).unwrap_or(0))
        .collect();

    let l: u64 = pivot_degrees.iter().sum::<u64>()
        + candidates
            .iter()
            .map(|f| f.denominator().total_degree() as u64)
            .sum::<u64>();

    let from_groups = groups
        .iter()
        .zip(pivot_degrees.iter())
        .map(|(group, pd)| {
            let max_deg = group.iter().map(|g| g.total_degree() as u64).max().unwrap_or(0);
            l - pd + max_deg
        })
        .max()
        .unwrap_or(0);

    let from_candidates = candidates
        .iter()
        .map(|f| l - f.denominator().total_degree() as u64 + f.numerator().total_degree() as u64)
        .max()
        .unwrap_or(0);

    (l + 1).max(from_groups).max(from_candidates)
}
