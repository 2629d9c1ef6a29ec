use anyhow::Error;
use ark_std::{end_timer, start_timer};

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use super::{common_order, normal_form, reduce_basis, s_polynomial, GroebnerBasis, GroebnerEngine};
use crate::poly::{Coefficient, MonomialOrder, MultiPoly};

pub mod data_structures;
use data_structures::*;

/// Buchberger algorithm with the Gebauer-Moller installation of the
/// product and chain criteria.
///
/// Pairs are processed in batches of minimal lcm degree (normal
/// strategy). The S-polynomials of one batch are reduced against a
/// snapshot of the basis in parallel, then re-reduced sequentially
/// against the basis as it grows, so the result does not depend on the
/// thread schedule.
#[derive(Clone, Copy, Debug, Default)]
pub struct OptimizedBuchberger {
    /// size of the dedicated rayon pool; `None` uses the global pool
    pub threads: Option<usize>,
}

impl OptimizedBuchberger {
    pub fn with_threads(threads: usize) -> Self {
        OptimizedBuchberger {
            threads: Some(threads),
        }
    }

    fn run<C: Coefficient>(
        &self,
        generators: &[MultiPoly<C>],
        order: MonomialOrder,
    ) -> Vec<MultiPoly<C>> {
        let mut polys: Vec<MultiPoly<C>> = Vec::new();
        let mut pairs = PairSet::new();

        let mut input: Vec<MultiPoly<C>> = generators
            .iter()
            .filter(|g| !g.is_zero())
            .map(|g| g.with_order(order).make_monic())
            .collect();
        input.sort_by(|a, b| match (a.leading_monomial(), b.leading_monomial()) {
            (Some(am), Some(bm)) => order.cmp(am, bm),
            _ => std::cmp::Ordering::Equal,
        });

        for g in input {
            let g = normal_form(&g, &active_polys(&polys, &pairs));
            if g.is_zero() {
                continue;
            }
            let g = g.make_monic();
            if g.is_constant() {
                return vec![g];
            }
            if let Some(lm) = g.leading_monomial().cloned() {
                pairs.update(lm);
                polys.push(g);
            }
        }

        let mut rounds = 0usize;
        let mut reductions = 0usize;
        while !pairs.is_empty() {
            rounds += 1;
            let batch = pairs.select_batch();
            let snapshot = active_polys(&polys, &pairs);
            reductions += batch.len();

            let reduce = |p: &CriticalPair| normal_form(&s_polynomial(&polys[p.i], &polys[p.j]), &snapshot);

            #[cfg(feature = "parallel")]
            let remainders: Vec<MultiPoly<C>> = batch.par_iter().map(reduce).collect();
            #[cfg(not(feature = "parallel"))]
            let remainders: Vec<MultiPoly<C>> = batch.iter().map(reduce).collect();

            let mut lost_elements = false;
            for (pair, r) in batch.iter().zip(remainders) {
                if r.is_zero() && !lost_elements {
                    continue;
                }
                let current = active_polys(&polys, &pairs);
                // a snapshot element used in the reduction may be gone
                let r = if lost_elements {
                    normal_form(&s_polynomial(&polys[pair.i], &polys[pair.j]), &current)
                } else {
                    normal_form(&r, &current)
                };
                if r.is_zero() {
                    continue;
                }
                let r = r.make_monic();
                if r.is_constant() {
                    return vec![r];
                }
                if let Some(lm) = r.leading_monomial().cloned() {
                    if pairs.update(lm) > 0 {
                        lost_elements = true;
                    }
                    polys.push(r);
                }
            }
        }

        log::debug!(
            "gebauer-moller buchberger: {} rounds, {} reductions, {} elements",
            rounds,
            reductions,
            polys.len()
        );
        active_polys(&polys, &pairs)
    }
}

fn active_polys<C: Coefficient>(polys: &[MultiPoly<C>], pairs: &PairSet) -> Vec<MultiPoly<C>> {
    pairs
        .active_indices()
        .into_iter()
        .map(|k| polys[k].clone())
        .collect()
}

impl GroebnerEngine for OptimizedBuchberger {
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
            "OptimizedBuchberger::basis, with {} generators",
            generators.len()
        ));

        #[cfg(feature = "parallel")]
        let raw = match self.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
                pool.install(|| self.run(generators, order))
            }
            None => self.run(generators, order),
        };
        #[cfg(not(feature = "parallel"))]
        let raw = self.run(generators, order);

        let reduced = reduce_basis(raw, order);

        #[cfg(feature = "extensive_sanity_checks")]
        assert!(super::is_groebner_basis(&reduced), "result is not a Groebner basis");

        end_timer!(basis_timer);
        Ok(GroebnerBasis::from_reduced(reduced, order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groebner::{is_groebner_basis, NaiveBuchberger};
    use crate::poly::{Rational, Ring};
    use ark_std::{end_timer, start_timer};

    fn parse_all(ring: &Ring, polys: &[&str]) -> Vec<MultiPoly<Rational>> {
        polys.iter().map(|s| ring.parse_poly(s).unwrap()).collect()
    }

    #[test]
    fn test_agrees_with_naive() {
        let test_timer = start_timer!(|| "Gebauer-Moller vs naive on katsura-3");
        let ring = Ring::new(["x", "y", "z"]);
        let gens = parse_all(
            &ring,
            &[
                "x + 2*y + 2*z - 1",
                "x^2 + 2*y^2 + 2*z^2 - x",
                "2*x*y + 2*y*z - y",
            ],
        );
        let naive = NaiveBuchberger.basis(&gens).unwrap();
        let opt = OptimizedBuchberger::default().basis(&gens).unwrap();
        assert_eq!(naive, opt);
        assert!(is_groebner_basis(opt.polys()));
        end_timer!(test_timer);
    }

    #[test]
    fn test_dedicated_pool() {
        let ring = Ring::new(["a", "b", "s0"]).with_order(MonomialOrder::Elimination { keep: 2 });
        let gens = parse_all(&ring, &["a*b - 6", "b*s0 - 1", "a + b - 5"]);
        let gb = OptimizedBuchberger::with_threads(2).basis(&gens).unwrap();
        assert_eq!(gb, NaiveBuchberger.basis(&gens).unwrap());
        // a = 2, b = 3 or a = 3, b = 2
        assert!(gb.contains(&ring.parse_poly("b^2 - 5*b + 6").unwrap()));
    }

    #[test]
    fn test_redundant_generators() {
        let ring = Ring::new(["x", "y"]);
        let gens = parse_all(&ring, &["x^2*y - 1", "x*y^2 - 1", "x - y", "x^3 - 1"]);
        let gb = OptimizedBuchberger::default().basis(&gens).unwrap();
        assert_eq!(gb.polys(), NaiveBuchberger.basis(&gens).unwrap().polys());
    }
}
