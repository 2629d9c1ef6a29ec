use anyhow::Error;
use ark_std::{end_timer, start_timer};
use itertools::Itertools;
use std::collections::VecDeque;

use super::{common_order, normal_form, reduce_basis, s_polynomial, GroebnerBasis, GroebnerEngine};
use crate::poly::{Coefficient, MultiPoly};

/// Textbook Buchberger algorithm.
///
/// Every pair of basis elements is queued (FIFO) and its S-polynomial is
/// reduced against the current basis; a non-zero remainder joins the
/// basis and spawns new pairs. No pair criteria are applied, which keeps
/// the engine small and makes it the reference the optimized engine is
/// tested against.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaiveBuchberger;

impl GroebnerEngine for NaiveBuchberger {
    /// function to compute the reduced Groebner basis of an ideal
    ///
    /// Attributes:
    /// generators - generators of the ideal, all sharing one monomial order
    ///
    /// Returns
    /// GroebnerBasis - the reduced Groebner basis w.r.t. that order
    fn basis<C: Coefficient>(
        &self,
        generators: &[MultiPoly<C>],
    ) -> Result<GroebnerBasis<C>, Error> {
        let order = common_order(generators)?;
        let basis_timer = start_timer!(|| format!(
            "NaiveBuchberger::basis, with {} generators",
            generators.len()
        ));

        let mut basis: Vec<MultiPoly<C>> = generators
            .iter()
            .filter(|g| !g.is_zero())
            .map(|g| g.with_order(order).make_monic())
            .collect();

        if basis.iter().any(|g| g.is_constant()) {
            end_timer!(basis_timer);
            return Ok(GroebnerBasis::from_reduced(reduce_basis(basis, order), order));
        }

        let mut pairs: VecDeque<(usize, usize)> = (0..basis.len()).tuple_combinations().collect();
        let mut reductions = 0usize;

        while let Some((i, j)) = pairs.pop_front() {
            let s = s_polynomial(&basis[i], &basis[j]);
            let r = normal_form(&s, &basis);
            reductions += 1;
            if r.is_zero() {
                continue;
            }
            let r = r.make_monic();
            if r.is_constant() {
                basis = vec![r];
                break;
            }
            let k = basis.len();
            pairs.extend((0..k).map(|i| (i, k)));
            basis.push(r);
        }

        log::debug!(
            "naive buchberger: {} reductions, {} elements before reduction",
            reductions,
            basis.len()
        );
        let reduced = reduce_basis(basis, order);
        end_timer!(basis_timer);
        Ok(GroebnerBasis::from_reduced(reduced, order))
    }
}
