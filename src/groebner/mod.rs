use anyhow::Error;
use std::str::FromStr;

use crate::errors::IdentError;
use crate::poly::{Coefficient, MonomialOrder, MultiPoly};

/// Plain Buchberger algorithm, every pair in FIFO order
pub mod naive;

/// Buchberger algorithm with Gebauer-Moller pair criteria and
/// batched (optionally parallel) S-polynomial reduction
pub mod optimized;

pub use naive::NaiveBuchberger;
pub use optimized::OptimizedBuchberger;

/// Exact Groebner basis backend.
///
/// Both methods are generic over the coefficient field so that one engine
/// value serves the numeric (`Q`) and the symbolic (`Q(x̂)`) constructions.
/// Implementations must return the reduced basis, which makes the choice of
/// engine a pure performance decision.
pub trait GroebnerEngine: Clone + Send + Sync {
    fn basis<C: Coefficient>(
        &self,
        generators: &[MultiPoly<C>],
    ) -> Result<GroebnerBasis<C>, Error>;

    fn reduce<C: Coefficient>(
        &self,
        poly: &MultiPoly<C>,
        basis: &GroebnerBasis<C>,
    ) -> Result<MultiPoly<C>, Error> {
        Ok(normal_form(poly, basis.polys()))
    }
}

/// Reduced Groebner basis of an ideal, together with the order it is
/// reduced for.
#[derive(Clone, Debug, PartialEq)]
pub struct GroebnerBasis<C: Coefficient> {
    polys: Vec<MultiPoly<C>>,
    order: MonomialOrder,
}

impl<C: Coefficient> GroebnerBasis<C> {
    pub fn polys(&self) -> &[MultiPoly<C>] {
        &self.polys
    }

    pub fn order(&self) -> MonomialOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.polys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polys.is_empty()
    }

    /// The ideal is the whole ring.
    pub fn is_unit(&self) -> bool {
        self.polys.iter().any(|p| p.is_constant() && !p.is_zero())
    }

    /// Ideal membership by reduction to zero.
    pub fn contains(&self, poly: &MultiPoly<C>) -> bool {
        normal_form(poly, &self.polys).is_zero()
    }
}

/// Strategy selector for callers that pick the engine by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EngineChoice {
    Naive,
    #[default]
    Optimized,
}

impl FromStr for EngineChoice {
    type Err = IdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "naive" | "buchberger" => Ok(EngineChoice::Naive),
            "optimized" | "gebauer-moller" | "default" => Ok(EngineChoice::Optimized),
            other => Err(IdentError::UnknownEngine(other.to_string())),
        }
    }
}

impl GroebnerEngine for EngineChoice {
    fn basis<C: Coefficient>(
        &self,
        generators: &[MultiPoly<C>],
    ) -> Result<GroebnerBasis<C>, Error> {
        match self {
            EngineChoice::Naive => NaiveBuchberger.basis(generators),
            EngineChoice::Optimized => OptimizedBuchberger::default().basis(generators),
        }
    }
}

/// Common order of a generator list; an empty list defaults to degrevlex.
pub(crate) fn common_order<C: Coefficient>(
    generators: &[MultiPoly<C>],
) -> Result<MonomialOrder, Error> {
    // constants carry no order information
    let mut orders = generators
        .iter()
        .filter(|g| !g.is_constant())
        .map(|g| g.order());
    let first = match orders.next() {
        Some(o) => o,
        None => return Ok(generators.first().map(|g| g.order()).unwrap_or_default()),
    };
    if orders.any(|o| o != first) {
        return Err(IdentError::MixedOrders.into());
    }
    Ok(first)
}

/// Fully reduces `f` modulo `basis`; the remainder has no term divisible by
/// a leading monomial of `basis`.
pub fn normal_form<C: Coefficient>(f: &MultiPoly<C>, basis: &[MultiPoly<C>]) -> MultiPoly<C> {
    let order = basis.first().map(|g| g.order()).unwrap_or(f.order());
    let mut p = f.with_order(order);
    let mut remainder = Vec::new();

    while let Some((m, c)) = p.leading_term().cloned() {
        let divisor = basis.iter().find_map(|g| {
            let (gm, gc) = g.leading_term()?;
            m.div(gm).map(|q| (q, gc, g))
        });
        match divisor {
            Some((q, gc, g)) => {
                let factor = -(c / gc.clone());
                p = p.add_scaled_term(&factor, &q, g);
            }
            None => {
                remainder.push((m, c));
                p = p.tail();
            }
        }
    }

    MultiPoly::from_terms(remainder, order)
}

/// `S(f, g) = lcm/LT(f) * f - lcm/LT(g) * g`
pub fn s_polynomial<C: Coefficient>(f: &MultiPoly<C>, g: &MultiPoly<C>) -> MultiPoly<C> {
    let (Some((fm, fc)), Some((gm, gc))) = (f.leading_term(), g.leading_term()) else {
        return MultiPoly::zero_with(f.order());
    };
    let lcm = fm.lcm(gm);
    let (Some(uf), Some(ug)) = (lcm.div(fm), lcm.div(gm)) else {
        return MultiPoly::zero_with(f.order());
    };
    let left = MultiPoly::zero_with(f.order()).add_scaled_term(&(C::one() / fc.clone()), &uf, f);
    left.add_scaled_term(&(-(C::one() / gc.clone())), &ug, g)
}

/// Turns any Groebner basis into the reduced one: minimal leading
/// monomials, inter-reduced, monic, sorted by decreasing leading monomial.
pub fn reduce_basis<C: Coefficient>(polys: Vec<MultiPoly<C>>, order: MonomialOrder) -> Vec<MultiPoly<C>> {
    let mut polys: Vec<MultiPoly<C>> = polys
        .into_iter()
        .filter(|p| !p.is_zero())
        .map(|p| p.with_order(order).make_monic())
        .collect();
    if let Some(unit) = polys.iter().find(|p| p.is_constant()) {
        return vec![unit.make_monic()];
    }

    polys.sort_by(|a, b| lm_cmp(order, a, b));
    let mut minimal: Vec<MultiPoly<C>> = Vec::new();
    for p in polys {
        let redundant = minimal.iter().any(|q| match (q.leading_monomial(), p.leading_monomial()) {
            (Some(qm), Some(pm)) => qm.divides(pm),
            _ => false,
        });
        if !redundant {
            minimal.push(p);
        }
    }

    let mut reduced = Vec::with_capacity(minimal.len());
    for i in 0..minimal.len() {
        let others: Vec<MultiPoly<C>> = minimal
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, q)| q.clone())
            .collect();
        reduced.push(normal_form(&minimal[i], &others).make_monic());
    }
    reduced.sort_by(|a, b| lm_cmp(order, b, a));
    reduced
}

fn lm_cmp<C: Coefficient>(order: MonomialOrder, a: &MultiPoly<C>, b: &MultiPoly<C>) -> std::cmp::Ordering {
    match (a.leading_monomial(), b.leading_monomial()) {
        (Some(am), Some(bm)) => order.cmp(am, bm),
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
    }
}

/// Buchberger's criterion: every S-polynomial reduces to zero.
pub fn is_groebner_basis<C: Coefficient>(polys: &[MultiPoly<C>]) -> bool {
    for i in 0..polys.len() {
        for j in (i + 1)..polys.len() {
            if !normal_form(&s_polynomial(&polys[i], &polys[j]), polys).is_zero() {
                return false;
            }
        }
    }
    true
}

impl<C: Coefficient> GroebnerBasis<C> {
    pub(crate) fn from_reduced(polys: Vec<MultiPoly<C>>, order: MonomialOrder) -> Self {
        GroebnerBasis { polys, order }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::{Rational, Ring};

    fn cyclic3() -> (Ring, Vec<MultiPoly<Rational>>) {
        let ring = Ring::new(["x", "y", "z"]);
        let gens = ["x + y + z", "x*y + y*z + z*x", "x*y*z - 1"]
            .iter()
            .map(|s| ring.parse_poly(s).unwrap())
            .collect();
        (ring, gens)
    }

    #[test]
    fn test_engines_agree_on_cyclic3() {
        let (_, gens) = cyclic3();
        let naive = NaiveBuchberger.basis(&gens).unwrap();
        let opt = OptimizedBuchberger::default().basis(&gens).unwrap();
        assert_eq!(naive, opt);
        assert!(is_groebner_basis(naive.polys()));
        for g in gens.iter() {
            assert!(naive.contains(g));
        }
    }

    #[test]
    fn test_unit_ideal() {
        let ring = Ring::new(["x"]);
        let gens = vec![ring.parse_poly("x").unwrap(), ring.parse_poly("x - 1").unwrap()];
        let gb = EngineChoice::Naive.basis(&gens).unwrap();
        assert!(gb.is_unit());
        assert_eq!(gb.len(), 1);
    }

    #[test]
    fn test_engine_choice_by_name() {
        assert_eq!("naive".parse::<EngineChoice>(), Ok(EngineChoice::Naive));
        assert_eq!("Gebauer-Moller".parse::<EngineChoice>(), Ok(EngineChoice::Optimized));
        assert_eq!(
            "f5".parse::<EngineChoice>(),
            Err(IdentError::UnknownEngine("f5".to_string()))
        );
    }

    #[test]
    fn test_mixed_orders_rejected() {
        let ring = Ring::new(["x", "y"]);
        let elim = ring.clone().with_order(MonomialOrder::Elimination { keep: 1 });
        let gens = vec![ring.parse_poly("x + y").unwrap(), elim.parse_poly("x - y").unwrap()];
        let err = EngineChoice::Optimized.basis(&gens).unwrap_err();
        assert_eq!(err.downcast_ref::<IdentError>(), Some(&IdentError::MixedOrders));
    }

    #[test]
    fn test_normal_form_remainder() {
        let ring = Ring::new(["x", "y"]);
        let basis = vec![ring.parse_poly("x*y - 1").unwrap()];
        let f = ring.parse_poly("x^2*y + y").unwrap();
        // x^2 y + y = x (xy - 1) + x + y
        assert_eq!(normal_form(&f, &basis), ring.parse_poly("x + y").unwrap());
    }
}
