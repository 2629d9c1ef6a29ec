use std::cmp::{max, Ordering};
use std::ops::Range;

/// Exponent vector of a power product. Trailing zero exponents are trimmed,
/// so two monomials compare equal regardless of the ring they were built in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Monomial(Vec<u32>);

impl Monomial {
    pub fn new(mut exponents: Vec<u32>) -> Self {
        while exponents.last() == Some(&0) {
            exponents.pop();
        }
        Monomial(exponents)
    }

    /// The empty power product.
    pub fn one() -> Self {
        Monomial(Vec::new())
    }

    /// `x_index ^ exponent`
    pub fn var(index: usize, exponent: u32) -> Self {
        let mut exps = vec![0; index + 1];
        exps[index] = exponent;
        Self::new(exps)
    }

    pub fn exponents(&self) -> &[u32] {
        &self.0
    }

    pub fn exponent(&self, index: usize) -> u32 {
        self.0.get(index).copied().unwrap_or(0)
    }

    /// Number of stored exponents; every variable index `>= len()` has exponent 0.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    pub fn degree(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Total degree restricted to the variables in `range`.
    pub fn degree_in(&self, range: Range<usize>) -> u32 {
        range.map(|i| self.exponent(i)).sum()
    }

    pub fn mul(&self, other: &Monomial) -> Monomial {
        let n = max(self.len(), other.len());
        Monomial::new((0..n).map(|i| self.exponent(i) + other.exponent(i)).collect())
    }

    /// `true` if `self` divides `other`.
    pub fn divides(&self, other: &Monomial) -> bool {
        self.len() <= other.len()
            && self.0.iter().zip(other.0.iter()).all(|(a, b)| a <= b)
    }

    /// `self / other`, or `None` when `other` does not divide `self`.
    pub fn div(&self, other: &Monomial) -> Option<Monomial> {
        if !other.divides(self) {
            return None;
        }
        Some(Monomial::new(
            (0..self.len())
                .map(|i| self.exponent(i) - other.exponent(i))
                .collect(),
        ))
    }

    pub fn lcm(&self, other: &Monomial) -> Monomial {
        let n = max(self.len(), other.len());
        Monomial::new((0..n).map(|i| max(self.exponent(i), other.exponent(i))).collect())
    }

    pub fn gcd(&self, other: &Monomial) -> Monomial {
        let n = max(self.len(), other.len());
        Monomial::new(
            (0..n)
                .map(|i| self.exponent(i).min(other.exponent(i)))
                .collect(),
        )
    }

    /// No variable occurs in both monomials.
    pub fn is_coprime(&self, other: &Monomial) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| *a == 0 || *b == 0)
    }

    /// Indices of variables with a non-zero exponent.
    pub fn support(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, e)| **e > 0)
            .map(|(i, _)| i)
    }
}

/// Admissible orders on power products.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MonomialOrder {
    /// Graded reverse lexicographic order.
    #[default]
    DegRevLex,
    /// Block order eliminating every variable with index `>= keep`:
    /// the eliminated block is compared first (degrevlex), then the kept block.
    Elimination { keep: usize },
}

impl MonomialOrder {
    pub fn cmp(&self, a: &Monomial, b: &Monomial) -> Ordering {
        match *self {
            MonomialOrder::DegRevLex => {
                let n = max(a.len(), b.len());
                degrevlex_on(a, b, 0..n)
            }
            MonomialOrder::Elimination { keep } => {
                let n = max(max(a.len(), b.len()), keep);
                degrevlex_on(a, b, keep..n).then_with(|| degrevlex_on(a, b, 0..keep))
            }
        }
    }
}

fn degrevlex_on(a: &Monomial, b: &Monomial, range: Range<usize>) -> Ordering {
    let da = a.degree_in(range.clone());
    let db = b.degree_in(range.clone());
    if da != db {
        return da.cmp(&db);
    }
    // larger monomial has the smaller exponent in the last differing variable
    for i in range.rev() {
        let (ea, eb) = (a.exponent(i), b.exponent(i));
        if ea != eb {
            return eb.cmp(&ea);
        }
    }
    Ordering::Equal
}
