use crate::poly::{Coefficient, Monomial, MonomialOrder, MultiPoly};

use super::data_structures::GeneratorGroup;

/// Names of the saturation variables appended after `num_vars` ring variables.
pub fn saturation_names(num_groups: usize) -> Vec<String> {
    (0..num_groups).map(|i| format!("sat_{}", i)).collect()
}

/// Generators of the ideal whose membership test decides field membership.
///
/// For group `i` with pivot `g` and every member `f` this emits
/// `f * g(pt) - f(pt) * g`, then `g * s_i - 1` where `s_i` is variable
/// `num_vars + i` of the extended ring. `point` holds the values of the
/// first `num_vars` variables in the coefficient field `C`, so the same
/// construction serves a sampled rational point and the symbolic generic
/// point. Trivially zero polynomials are skipped.
pub fn saturation_ideal<C: Coefficient>(
    groups: &[GeneratorGroup<C>],
    pivots: &[usize],
    point: &[C],
    num_vars: usize,
    order: MonomialOrder,
) -> Vec<MultiPoly<C>> {
    let mut ideal = Vec::new();
    for (i, (group, &k)) in groups.iter().zip(pivots.iter()).enumerate() {
        let g = group[k].with_order(order);
        let g_at = g.evaluate(point);

        for f in group.iter() {
            let f = f.with_order(order);
            let f_at = f.evaluate(point);
            let h = f.scale(&g_at).add_scaled_term(&(-f_at), &Monomial::one(), &g);
            if !h.is_zero() {
                ideal.push(h);
            }
        }

        let s = MultiPoly::var(num_vars + i, order);
        ideal.push(&(&g * &s) - &MultiPoly::one().with_order(order));
    }
    ideal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groebner::{EngineChoice, GroebnerEngine};
    use crate::poly::{rational, Rational, Ring};

    #[test]
    fn test_ideal_shape() {
        let ring = Ring::new(["x", "y"]);
        let groups = vec![vec![ring.parse_poly("x").unwrap(), ring.parse_poly("x*y").unwrap()]];
        let point = [rational(2), rational(5)];
        let ideal = saturation_ideal(&groups, &[0], &point, 2, MonomialOrder::DegRevLex);

        // the pivot against itself vanishes
        assert_eq!(ideal.len(), 2);
        let ext = ring.extend(&saturation_names(1), MonomialOrder::DegRevLex);
        assert_eq!(ideal[0], ext.parse_poly("2*x*y - 10*x").unwrap());
        assert_eq!(ideal[1], ext.parse_poly("x*sat_0 - 1").unwrap());
    }

    #[test]
    fn test_point_lies_on_the_variety() {
        let ring = Ring::new(["a", "b"]);
        let groups = vec![vec![
            ring.parse_poly("a + b").unwrap(),
            ring.parse_poly("a*b").unwrap(),
            ring.parse_poly("a^2").unwrap(),
        ]];
        let point = [rational(3), rational(-7)];
        let ideal = saturation_ideal(&groups, &[0], &point, 2, MonomialOrder::DegRevLex);
        // s = 1 / g(pt)
        let full = [rational(3), rational(-7), Rational::new((-1).into(), 4.into())];
        assert!(ideal.iter().all(|h| h.evaluate(&full) == rational(0)));

        let gb = EngineChoice::Optimized.basis(&ideal).unwrap();
        assert!(!gb.is_unit());
    }
}
