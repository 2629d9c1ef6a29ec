use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Add, Mul, Neg, Sub};

use super::{pow_coefficient, Coefficient, Monomial, MonomialOrder};

/// Sparse multivariate polynomial.
///
/// Terms are kept strictly descending with respect to `order` and never
/// carry a zero coefficient, so the leading term is always `terms[0]`.
/// Variables are addressed by index; names live in a [`super::Ring`].
#[derive(Clone, Debug)]
pub struct MultiPoly<C: Coefficient> {
    terms: Vec<(Monomial, C)>,
    order: MonomialOrder,
}

impl<C: Coefficient> MultiPoly<C> {
    pub fn zero() -> Self {
        Self::zero_with(MonomialOrder::default())
    }

    pub fn zero_with(order: MonomialOrder) -> Self {
        MultiPoly {
            terms: Vec::new(),
            order,
        }
    }

    pub fn one() -> Self {
        Self::constant(C::one())
    }

    pub fn constant(c: C) -> Self {
        Self::monomial(Monomial::one(), c, MonomialOrder::default())
    }

    pub fn monomial(m: Monomial, c: C, order: MonomialOrder) -> Self {
        if c.is_zero() {
            return Self::zero_with(order);
        }
        MultiPoly {
            terms: vec![(m, c)],
            order,
        }
    }

    /// The variable `x_index`.
    pub fn var(index: usize, order: MonomialOrder) -> Self {
        Self::monomial(Monomial::var(index, 1), C::one(), order)
    }

    /// Collects terms, merging equal monomials and dropping zeros.
    pub fn from_terms(terms: impl IntoIterator<Item = (Monomial, C)>, order: MonomialOrder) -> Self {
        let mut acc: BTreeMap<Monomial, C> = BTreeMap::new();
        for (m, c) in terms {
            match acc.remove(&m) {
                Some(prev) => {
                    let sum = prev + c;
                    if !sum.is_zero() {
                        acc.insert(m, sum);
                    }
                }
                None => {
                    if !c.is_zero() {
                        acc.insert(m, c);
                    }
                }
            }
        }
        let mut terms: Vec<(Monomial, C)> = acc.into_iter().collect();
        terms.sort_by(|a, b| order.cmp(&b.0, &a.0));
        MultiPoly { terms, order }
    }

    pub fn terms(&self) -> &[(Monomial, C)] {
        &self.terms
    }

    pub fn order(&self) -> MonomialOrder {
        self.order
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty() || (self.terms.len() == 1 && self.terms[0].0.is_one())
    }

    pub fn is_one(&self) -> bool {
        matches!(self.as_constant(), Some(c) if c.is_one())
    }

    /// Constant coefficient, `None` for non-constant polynomials.
    pub fn as_constant(&self) -> Option<C> {
        match self.terms.as_slice() {
            [] => Some(C::zero()),
            [(m, c)] if m.is_one() => Some(c.clone()),
            _ => None,
        }
    }

    pub fn leading_term(&self) -> Option<&(Monomial, C)> {
        self.terms.first()
    }

    pub fn leading_monomial(&self) -> Option<&Monomial> {
        self.terms.first().map(|(m, _)| m)
    }

    pub fn leading_coefficient(&self) -> Option<&C> {
        self.terms.first().map(|(_, c)| c)
    }

    /// Total degree; the zero polynomial has degree 0.
    pub fn total_degree(&self) -> u32 {
        self.terms.iter().map(|(m, _)| m.degree()).max().unwrap_or(0)
    }

    /// Indices of all variables occurring in the polynomial.
    pub fn variables(&self) -> BTreeSet<usize> {
        self.terms
            .iter()
            .flat_map(|(m, _)| m.support().collect::<Vec<_>>())
            .collect()
    }

    /// Largest variable index plus one.
    pub fn width(&self) -> usize {
        self.terms.iter().map(|(m, _)| m.len()).max().unwrap_or(0)
    }

    /// Same polynomial, terms re-sorted for `order`.
    pub fn with_order(&self, order: MonomialOrder) -> Self {
        if order == self.order {
            return self.clone();
        }
        let mut terms = self.terms.clone();
        terms.sort_by(|a, b| order.cmp(&b.0, &a.0));
        MultiPoly { terms, order }
    }

    // A constant adopts the order of the polynomial it is combined with.
    fn combined_order(&self, other: &Self) -> MonomialOrder {
        if self.is_constant() {
            other.order
        } else {
            self.order
        }
    }

    /// `self + c * m * other`, merging the two sorted term lists.
    pub fn add_scaled_term(&self, c: &C, m: &Monomial, other: &Self) -> Self {
        let order = self.combined_order(other);
        let lhs = self.with_order(order);
        if c.is_zero() || other.is_zero() {
            return lhs;
        }
        let rhs = other.with_order(order);

        let mut out = Vec::with_capacity(lhs.terms.len() + rhs.terms.len());
        let mut left = lhs.terms.into_iter().peekable();
        let mut right = rhs
            .terms
            .iter()
            .map(|(om, oc)| (m.mul(om), c.clone() * oc.clone()))
            .peekable();

        loop {
            let ord = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) => order.cmp(&l.0, &r.0),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => break,
            };
            match ord {
                Ordering::Greater => out.extend(left.next()),
                Ordering::Less => out.extend(right.next()),
                Ordering::Equal => {
                    if let (Some((lm, lc)), Some((_, rc))) = (left.next(), right.next()) {
                        let sum = lc + rc;
                        if !sum.is_zero() {
                            out.push((lm, sum));
                        }
                    }
                }
            }
        }

        MultiPoly { terms: out, order }
    }

    /// Everything but the leading term.
    pub fn tail(&self) -> Self {
        MultiPoly {
            terms: self.terms.iter().skip(1).cloned().collect(),
            order: self.order,
        }
    }

    pub fn scale(&self, c: &C) -> Self {
        if c.is_zero() {
            return Self::zero_with(self.order);
        }
        MultiPoly {
            terms: self
                .terms
                .iter()
                .map(|(m, k)| (m.clone(), k.clone() * c.clone()))
                .collect(),
            order: self.order,
        }
    }

    /// Divides every coefficient by the leading one.
    pub fn make_monic(&self) -> Self {
        match self.leading_coefficient() {
            Some(lc) if !lc.is_one() => self.scale(&(C::one() / lc.clone())),
            _ => self.clone(),
        }
    }

    pub fn mul_monomial(&self, m: &Monomial) -> Self {
        MultiPoly {
            terms: self
                .terms
                .iter()
                .map(|(tm, c)| (tm.mul(m), c.clone()))
                .collect(),
            order: self.order,
        }
    }

    pub fn pow(&self, exp: u32) -> Self {
        let mut acc = Self::one();
        let mut base = self.clone();
        let mut e = exp;
        while e > 0 {
            if (e & 1) == 1 {
                acc = &acc * &base;
            }
            e >>= 1;
            if e > 0 {
                base = &base * &base;
            }
        }
        acc.with_order(self.order)
    }

    pub fn evaluate(&self, point: &[C]) -> C {
        self.evaluate_with(point, |c| c.clone())
    }

    /// Evaluates at a point of another coefficient domain, mapping each
    /// coefficient through `embed`.
    ///
    /// Panics if a variable index is outside `point`; callers cast into a
    /// ring of matching width first.
    pub fn evaluate_with<D: Coefficient>(&self, point: &[D], embed: impl Fn(&C) -> D) -> D {
        let mut acc = D::zero();
        for (m, c) in self.terms.iter() {
            let mut term = embed(c);
            for (i, e) in m.exponents().iter().enumerate() {
                if *e > 0 {
                    term = term * pow_coefficient(&point[i], *e);
                }
            }
            acc = acc + term;
        }
        acc
    }

    pub fn map_coefficients<D: Coefficient>(&self, f: impl Fn(&C) -> D) -> MultiPoly<D> {
        MultiPoly::from_terms(
            self.terms.iter().map(|(m, c)| (m.clone(), f(c))),
            self.order,
        )
    }

    /// Renames variables through `f`; `None` if a used variable has no image.
    pub fn remap(&self, f: impl Fn(usize) -> Option<usize>, order: MonomialOrder) -> Option<Self> {
        let mut terms = Vec::with_capacity(self.terms.len());
        for (m, c) in self.terms.iter() {
            let mut exps: Vec<u32> = Vec::new();
            for i in m.support() {
                let j = f(i)?;
                if exps.len() <= j {
                    exps.resize(j + 1, 0);
                }
                exps[j] += m.exponent(i);
            }
            terms.push((Monomial::new(exps), c.clone()));
        }
        Some(Self::from_terms(terms, order))
    }

    pub fn partial_derivative(&self, index: usize) -> Self {
        let terms = self.terms.iter().filter_map(|(m, c)| {
            let e = m.exponent(index);
            if e == 0 {
                return None;
            }
            let mut exps = m.exponents().to_vec();
            exps[index] -= 1;
            Some((Monomial::new(exps), c.clone() * C::from_int(e as i64)))
        });
        Self::from_terms(terms, self.order)
    }

    /// Views `self` as a polynomial in the variables rejected by
    /// `is_coefficient_var`, with coefficients in the accepted ones.
    /// Returns `(monomial, coefficient)` pairs sorted by monomial.
    pub fn collect_coefficients(&self, is_coefficient_var: impl Fn(usize) -> bool) -> Vec<(Monomial, Self)> {
        let mut groups: BTreeMap<Monomial, Vec<(Monomial, C)>> = BTreeMap::new();
        for (m, c) in self.terms.iter() {
            let width = m.len();
            let outer = Monomial::new(
                (0..width)
                    .map(|i| if is_coefficient_var(i) { 0 } else { m.exponent(i) })
                    .collect(),
            );
            let inner = Monomial::new(
                (0..width)
                    .map(|i| if is_coefficient_var(i) { m.exponent(i) } else { 0 })
                    .collect(),
            );
            groups.entry(outer).or_default().push((inner, c.clone()));
        }
        groups
            .into_iter()
            .map(|(outer, inner)| (outer, Self::from_terms(inner, self.order)))
            .collect()
    }

    /// Largest monomial dividing every term.
    pub fn monomial_content(&self) -> Monomial {
        let mut it = self.terms.iter();
        match it.next() {
            None => Monomial::one(),
            Some((first, _)) => it.fold(first.clone(), |acc, (m, _)| acc.gcd(m)),
        }
    }

    /// Divides every term by `m`; `None` unless `m` divides all of them.
    pub fn div_monomial(&self, m: &Monomial) -> Option<Self> {
        let mut terms = Vec::with_capacity(self.terms.len());
        for (tm, c) in self.terms.iter() {
            terms.push((tm.div(m)?, c.clone()));
        }
        Some(MultiPoly {
            terms,
            order: self.order,
        })
    }

    /// Exact quotient `self / divisor`, or `None` if the division leaves a
    /// remainder. A single polynomial is a Groebner basis of its ideal, so
    /// the division algorithm decides divisibility.
    pub fn div_exact(&self, divisor: &Self) -> Option<Self> {
        let divisor = divisor.with_order(self.order);
        let (lm, lc) = divisor.leading_term()?.clone();
        let mut rem = self.clone();
        let mut quot = Self::zero_with(self.order);
        while let Some((m, c)) = rem.leading_term().cloned() {
            let q_m = m.div(&lm)?;
            let q_c = c / lc.clone();
            quot = quot.add_scaled_term(&q_c, &q_m, &Self::one());
            rem = rem.add_scaled_term(&(-q_c), &q_m, &divisor);
        }
        Some(quot)
    }

    /// Renders the polynomial with the given variable names.
    pub fn format_with(&self, names: &[String]) -> String {
        if self.terms.is_empty() {
            return "0".to_string();
        }
        let rendered: Vec<String> = self
            .terms
            .iter()
            .map(|(m, c)| {
                let mut factors: Vec<String> = Vec::new();
                if !c.is_one() || m.is_one() {
                    factors.push(format!("({})", c));
                }
                for i in m.support() {
                    let name = names.get(i).cloned().unwrap_or_else(|| format!("x{}", i));
                    match m.exponent(i) {
                        1 => factors.push(name),
                        e => factors.push(format!("{}^{}", name, e)),
                    }
                }
                factors.join("*")
            })
            .collect();
        rendered.join(" + ")
    }
}

impl<C: Coefficient> PartialEq for MultiPoly<C> {
    fn eq(&self, other: &Self) -> bool {
        if self.order == other.order {
            self.terms == other.terms
        } else {
            self.terms == other.with_order(self.order).terms
        }
    }
}

impl<'a, C: Coefficient> Add<&'a MultiPoly<C>> for &'a MultiPoly<C> {
    type Output = MultiPoly<C>;

    fn add(self, other: &'a MultiPoly<C>) -> MultiPoly<C> {
        self.add_scaled_term(&C::one(), &Monomial::one(), other)
    }
}

impl<'a, C: Coefficient> Sub<&'a MultiPoly<C>> for &'a MultiPoly<C> {
    type Output = MultiPoly<C>;

    fn sub(self, other: &'a MultiPoly<C>) -> MultiPoly<C> {
        self.add_scaled_term(&(-C::one()), &Monomial::one(), other)
    }
}

impl<'a, C: Coefficient> Mul<&'a MultiPoly<C>> for &'a MultiPoly<C> {
    type Output = MultiPoly<C>;

    fn mul(self, other: &'a MultiPoly<C>) -> MultiPoly<C> {
        let order = self.combined_order(other);
        // iterate over the shorter operand
        let (outer, inner) = if self.terms.len() <= other.terms.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut acc = MultiPoly::zero_with(order);
        for (m, c) in outer.terms.iter() {
            acc = acc.add_scaled_term(c, m, inner);
        }
        acc.with_order(order)
    }
}

impl<'a, C: Coefficient> Neg for &'a MultiPoly<C> {
    type Output = MultiPoly<C>;

    fn neg(self) -> MultiPoly<C> {
        self.scale(&(-C::one()))
    }
}

impl<C: Coefficient> Add for MultiPoly<C> {
    type Output = MultiPoly<C>;

    fn add(self, other: MultiPoly<C>) -> MultiPoly<C> {
        &self + &other
    }
}

impl<C: Coefficient> Sub for MultiPoly<C> {
    type Output = MultiPoly<C>;

    fn sub(self, other: MultiPoly<C>) -> MultiPoly<C> {
        &self - &other
    }
}

impl<C: Coefficient> Mul for MultiPoly<C> {
    type Output = MultiPoly<C>;

    fn mul(self, other: MultiPoly<C>) -> MultiPoly<C> {
        &self * &other
    }
}

impl<C: Coefficient> Neg for MultiPoly<C> {
    type Output = MultiPoly<C>;

    fn neg(self) -> MultiPoly<C> {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::{rational, Rational};

    type P = MultiPoly<Rational>;

    fn x(i: usize) -> P {
        P::var(i, MonomialOrder::DegRevLex)
    }

    fn c(n: i64) -> P {
        P::constant(rational(n))
    }

    #[test]
    fn test_arithmetic_cancels() {
        let p = &(&x(0) + &x(1)) * &(&x(0) - &x(1));
        let q = &(&x(0) * &x(0)) - &(&x(1) * &x(1));
        assert_eq!(p, q);
        assert!((&p - &q).is_zero());
        assert_eq!(p.total_degree(), 2);
        assert_eq!(p.leading_monomial(), Some(&Monomial::new(vec![2])));
    }

    #[test]
    fn test_evaluate_and_derivative() {
        // 3*x^2*y - 2
        let p = &(&c(3) * &(&x(0).pow(2) * &x(1))) - &c(2);
        let v = p.evaluate(&[rational(2), rational(5)]);
        assert_eq!(v, rational(58));
        let dx = p.partial_derivative(0);
        assert_eq!(dx, &c(6) * &(&x(0) * &x(1)));
        assert!(p.partial_derivative(3).is_zero());
    }

    #[test]
    fn test_div_exact() {
        let a = &x(0) + &c(1);
        let b = &x(1) - &x(2);
        let prod = &a * &b;
        assert_eq!(prod.div_exact(&a), Some(b.clone()));
        assert_eq!((&prod + &c(1)).div_exact(&a), None);
    }

    #[test]
    fn test_collect_coefficients() {
        // (a*b + 1) * y1 + a*b*y0 with a = 0, b = 1, y0 = 2, y1 = 3
        let ab = &x(0) * &x(1);
        let p = &(&(&ab + &c(1)) * &x(3)) + &(&ab * &x(2));
        let coeffs = p.collect_coefficients(|i| i < 2);
        assert_eq!(coeffs.len(), 2);
        assert!(coeffs.iter().any(|(_, k)| *k == ab));
        assert!(coeffs.iter().any(|(_, k)| *k == &ab + &c(1)));
    }

    #[test]
    fn test_remap_and_content() {
        let p = &(&x(0) * &x(2)) + &x(2).pow(2);
        assert_eq!(p.monomial_content(), Monomial::var(2, 1));
        let q = p.remap(|i| if i == 2 { Some(1) } else { Some(0) }, MonomialOrder::DegRevLex);
        assert_eq!(q, Some(&(&x(0) * &x(1)) + &x(1).pow(2)));
        assert_eq!(p.remap(|i| if i == 2 { None } else { Some(i) }, MonomialOrder::DegRevLex), None);
    }
}
