use anyhow::Error;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use super::{Coefficient, MultiPoly, Rational};
use crate::errors::IdentError;

/// Quotient of two polynomials over Q.
///
/// Serves both as the closed `(numerator, denominator)` type of candidate
/// functions and as the coefficient field `Q(x̂)` of the symbolic
/// simplification. The denominator is never zero and always has leading
/// coefficient one; common monomial factors and exact divisors are
/// cancelled, other common factors may remain.
#[derive(Clone, Debug)]
pub struct RationalFunction {
    num: MultiPoly<Rational>,
    den: MultiPoly<Rational>,
}

impl RationalFunction {
    /// `num / den` with common monomials, exact divisors and the leading
    /// coefficient of `den` cancelled. Other common factors are kept.
    pub fn new(num: MultiPoly<Rational>, den: MultiPoly<Rational>) -> Result<Self, Error> {
        if den.is_zero() {
            return Err(IdentError::ZeroDenominator(num.format_with(&[])).into());
        }
        Ok(Self::normalized(num, den))
    }

    pub fn from_poly(p: MultiPoly<Rational>) -> Self {
        let den = MultiPoly::one().with_order(p.order());
        RationalFunction { num: p, den }
    }

    pub fn constant(c: Rational) -> Self {
        Self::from_poly(MultiPoly::constant(c))
    }

    pub fn numerator(&self) -> &MultiPoly<Rational> {
        &self.num
    }

    pub fn denominator(&self) -> &MultiPoly<Rational> {
        &self.den
    }

    pub fn into_parts(self) -> (MultiPoly<Rational>, MultiPoly<Rational>) {
        (self.num, self.den)
    }

    pub fn is_constant(&self) -> bool {
        self.num.is_constant() && self.den.is_constant()
    }

    /// The function as a polynomial if its denominator is constant.
    pub fn as_polynomial(&self) -> Option<MultiPoly<Rational>> {
        let d = self.den.as_constant()?;
        Some(self.num.scale(&(Rational::one() / d)))
    }

    pub fn total_degree(&self) -> u32 {
        self.num.total_degree().max(self.den.total_degree())
    }

    /// Value at an integer/rational point; fails on a pole.
    pub fn evaluate(&self, point: &[Rational]) -> Result<Rational, Error> {
        let d = self.den.evaluate(point);
        if d.is_zero() {
            return Err(IdentError::ZeroDenominator(self.to_string()).into());
        }
        Ok(self.num.evaluate(point) / d)
    }

    pub fn partial_derivative(&self, index: usize) -> Self {
        // (n/d)' = (n' d - n d') / d^2
        let dn = self.num.partial_derivative(index);
        let dd = self.den.partial_derivative(index);
        if dd.is_zero() {
            return Self::normalized(dn, self.den.clone());
        }
        let num = &(&dn * &self.den) - &(&self.num * &dd);
        Self::normalized(num, &self.den * &self.den)
    }

    fn normalized(num: MultiPoly<Rational>, den: MultiPoly<Rational>) -> Self {
        if num.is_zero() {
            return Self::zero();
        }
        let (mut num, mut den) = (num, den);

        let common = num.monomial_content().gcd(&den.monomial_content());
        if !common.is_one() {
            if let (Some(n), Some(d)) = (num.div_monomial(&common), den.div_monomial(&common)) {
                num = n;
                den = d;
            }
        }

        if !den.is_constant() {
            if let Some(q) = num.div_exact(&den) {
                num = q;
                den = MultiPoly::one().with_order(num.order());
            } else if !num.is_constant() {
                if let Some(q) = den.div_exact(&num) {
                    den = q;
                    num = MultiPoly::one().with_order(den.order());
                }
            }
        }

        if let Some(lc) = den.leading_coefficient().cloned() {
            if !lc.is_one() {
                let inv = Rational::one() / lc;
                num = num.scale(&inv);
                den = den.scale(&inv);
            }
        }
        RationalFunction { num, den }
    }

    fn add_fractions(&self, other: &Self, negate: bool) -> Self {
        let c = if negate { -&other.num } else { other.num.clone() };
        if self.den == other.den {
            return Self::normalized(&self.num + &c, self.den.clone());
        }
        if let Some(q) = other.den.div_exact(&self.den) {
            return Self::normalized(&(&self.num * &q) + &c, other.den.clone());
        }
        if let Some(q) = self.den.div_exact(&other.den) {
            return Self::normalized(&self.num + &(&c * &q), self.den.clone());
        }
        let num = &(&self.num * &other.den) + &(&c * &self.den);
        Self::normalized(num, &self.den * &other.den)
    }
}

impl PartialEq for RationalFunction {
    fn eq(&self, other: &Self) -> bool {
        (&(&self.num * &other.den) - &(&other.num * &self.den)).is_zero()
    }
}

impl fmt::Display for RationalFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den.is_one() {
            write!(f, "{}", self.num.format_with(&[]))
        } else {
            write!(f, "({}) / ({})", self.num.format_with(&[]), self.den.format_with(&[]))
        }
    }
}

impl Zero for RationalFunction {
    fn zero() -> Self {
        RationalFunction {
            num: MultiPoly::zero(),
            den: MultiPoly::one(),
        }
    }

    fn is_zero(&self) -> bool {
        self.num.is_zero()
    }
}

impl One for RationalFunction {
    fn one() -> Self {
        Self::constant(Rational::one())
    }
}

impl Add for RationalFunction {
    type Output = RationalFunction;

    fn add(self, other: RationalFunction) -> RationalFunction {
        self.add_fractions(&other, false)
    }
}

impl Sub for RationalFunction {
    type Output = RationalFunction;

    fn sub(self, other: RationalFunction) -> RationalFunction {
        self.add_fractions(&other, true)
    }
}

impl Mul for RationalFunction {
    type Output = RationalFunction;

    fn mul(self, other: RationalFunction) -> RationalFunction {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        Self::normalized(&self.num * &other.num, &self.den * &other.den)
    }
}

impl Div for RationalFunction {
    type Output = RationalFunction;

    /// Panics on division by zero, like the ground field.
    fn div(self, other: RationalFunction) -> RationalFunction {
        assert!(!other.is_zero(), "division by zero rational function");
        Self::normalized(&self.num * &other.den, &self.den * &other.num)
    }
}

impl Neg for RationalFunction {
    type Output = RationalFunction;

    fn neg(self) -> RationalFunction {
        RationalFunction {
            num: -self.num,
            den: self.den,
        }
    }
}

impl Coefficient for RationalFunction {
    fn from_int(n: i64) -> Self {
        Self::constant(Rational::from_int(n))
    }
}
