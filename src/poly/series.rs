//! Truncated power series over Q, used to expand ODE solutions around `t = 0`.

use num_bigint::BigInt;
use num_traits::{One, Zero};
use std::ops::{Add, Mul, Sub};

use super::{MultiPoly, Rational};

/// `c_0 + c_1 t + ... + c_{precision-1} t^{precision-1} + O(t^precision)`
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    coeffs: Vec<Rational>,
}

impl Series {
    pub fn new(mut coeffs: Vec<Rational>, precision: usize) -> Self {
        coeffs.resize(precision, Rational::zero());
        Series { coeffs }
    }

    pub fn zero(precision: usize) -> Self {
        Self::new(Vec::new(), precision)
    }

    pub fn constant(c: Rational, precision: usize) -> Self {
        Self::new(vec![c], precision)
    }

    pub fn precision(&self) -> usize {
        self.coeffs.len()
    }

    pub fn coeffs(&self) -> &[Rational] {
        &self.coeffs
    }

    /// Coefficient of `t^k`; zero beyond the precision.
    pub fn coeff(&self, k: usize) -> Rational {
        self.coeffs.get(k).cloned().unwrap_or_else(Rational::zero)
    }

    pub fn set_coeff(&mut self, k: usize, c: Rational) {
        if k < self.coeffs.len() {
            self.coeffs[k] = c;
        }
    }

    pub fn truncate(&self, precision: usize) -> Self {
        Self::new(self.coeffs.iter().take(precision).cloned().collect(), precision)
    }

    pub fn scale(&self, c: &Rational) -> Self {
        Series {
            coeffs: self.coeffs.iter().map(|x| x * c).collect(),
        }
    }

    /// Multiplicative inverse, `None` if the constant term vanishes.
    pub fn inverse(&self) -> Option<Self> {
        let c0 = self.coeffs.first()?;
        if c0.is_zero() {
            return None;
        }
        let n = self.precision();
        let inv0 = Rational::one() / c0;
        let mut out = vec![Rational::zero(); n];
        out[0] = inv0.clone();
        for k in 1..n {
            let mut acc = Rational::zero();
            for j in 1..=k {
                acc += &self.coeffs[j] * &out[k - j];
            }
            out[k] = -(acc * &inv0);
        }
        Some(Series { coeffs: out })
    }

    /// Formal derivative; the precision drops by one.
    pub fn derivative(&self) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, c)| c * Rational::from_integer(BigInt::from(k)))
            .collect();
        Series { coeffs }
    }

    /// Formal antiderivative with zero constant term; the precision grows by one.
    pub fn integral(&self) -> Self {
        let mut coeffs = vec![Rational::zero()];
        coeffs.extend(
            self.coeffs
                .iter()
                .enumerate()
                .map(|(k, c)| c / Rational::from_integer(BigInt::from(k + 1))),
        );
        Series { coeffs }
    }

    /// `k`-th derivative at `t = 0`, i.e. `k! * c_k`.
    pub fn derivative_at_zero(&self, k: usize) -> Rational {
        let factorial: BigInt = (1..=k).map(BigInt::from).product();
        self.coeff(k) * Rational::from_integer(factorial)
    }

    fn pow(&self, exp: u32) -> Self {
        let mut acc = Series::constant(Rational::one(), self.precision());
        for _ in 0..exp {
            acc = &acc * self;
        }
        acc
    }

    /// Substitutes series for the variables of `poly`.
    pub fn evaluate_poly(poly: &MultiPoly<Rational>, args: &[Series], precision: usize) -> Series {
        let mut acc = Series::zero(precision);
        for (m, c) in poly.terms() {
            let mut term = Series::constant(c.clone(), precision);
            for (i, e) in m.exponents().iter().enumerate() {
                if *e > 0 {
                    term = &term * &args[i].truncate(precision).pow(*e);
                }
            }
            acc = &acc + &term;
        }
        acc
    }
}

impl<'a> Add<&'a Series> for &'a Series {
    type Output = Series;

    fn add(self, other: &'a Series) -> Series {
        let n = self.precision().min(other.precision());
        Series {
            coeffs: (0..n).map(|k| &self.coeffs[k] + &other.coeffs[k]).collect(),
        }
    }
}

impl<'a> Sub<&'a Series> for &'a Series {
    type Output = Series;

    fn sub(self, other: &'a Series) -> Series {
        let n = self.precision().min(other.precision());
        Series {
            coeffs: (0..n).map(|k| &self.coeffs[k] - &other.coeffs[k]).collect(),
        }
    }
}

impl<'a> Mul<&'a Series> for &'a Series {
    type Output = Series;

    fn mul(self, other: &'a Series) -> Series {
        let n = self.precision().min(other.precision());
        let mut coeffs = vec![Rational::zero(); n];
        for (i, a) in self.coeffs.iter().enumerate().take(n) {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate().take(n - i) {
                coeffs[i + j] += a * b;
            }
        }
        Series { coeffs }
    }
}
