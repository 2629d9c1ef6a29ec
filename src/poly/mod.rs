//! Exact multivariate polynomial arithmetic over Q and over fields of
//! rational functions, plus the ring context used to name variables.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Neg, Sub};

mod monomial;
pub use monomial::*;

mod multipoly;
pub use multipoly::*;

mod ring;
pub use ring::*;

mod rational_function;
pub use rational_function::*;

pub mod parser;
pub mod series;

/// Exact rationals, the ground field of every ring in this crate.
pub type Rational = BigRational;

/// Field elements usable as polynomial coefficients.
///
/// Arithmetic must be exact: zero-testing of reductions decides membership.
pub trait Coefficient:
    Clone
    + Debug
    + Display
    + PartialEq
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
{
    fn from_int(n: i64) -> Self;
}

impl Coefficient for Rational {
    fn from_int(n: i64) -> Self {
        BigRational::from_integer(BigInt::from(n))
    }
}

/// `base ^ exp` by repeated squaring.
pub fn pow_coefficient<C: Coefficient>(base: &C, exp: u32) -> C {
    let mut acc = C::one();
    let mut b = base.clone();
    let mut e = exp;
    while e > 0 {
        if (e & 1) == 1 {
            acc = acc * b.clone();
        }
        e >>= 1;
        if e > 0 {
            b = b.clone() * b;
        }
    }
    acc
}

/// Rational constant from an integer.
pub fn rational(n: i64) -> Rational {
    BigRational::from_integer(BigInt::from(n))
}
