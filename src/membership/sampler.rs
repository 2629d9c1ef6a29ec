use anyhow::Error;
use ark_std::rand::Rng;
use num_bigint::{BigInt, RandBigInt};
use num_rational::BigRational;
use num_traits::{One, Pow};

use super::data_structures::validate_probability;
use crate::errors::IdentError;

/// Half-width of the sampling box, `ceil(3 * D^(k+3) * m / (1 - p))`.
///
/// Attributes:
/// degree_bound - the bound `D` on every constructed degree
/// num_vars - number of ring variables `k`
/// num_candidates - number of membership queries `m`; zero is counted as one
/// p - required probability of a correct answer
///
/// Returns
/// the exact integer bound
pub fn sampling_bound(degree_bound: u64, num_vars: usize, num_candidates: usize, p: f64) -> Result<BigInt, Error> {
    validate_probability(p)?;
    let p = BigRational::from_float(p).ok_or(IdentError::InvalidProbability(p))?;
    let failure = BigRational::one() - p;

    let m = num_candidates.max(1);
    let numerator = BigInt::from(3u32) * Pow::pow(BigInt::from(degree_bound), (num_vars + 3) as u64) * BigInt::from(m);
    let bound = (BigRational::from_integer(numerator) / failure).ceil();
    Ok(bound.to_integer())
}

/// Draws every coordinate uniformly from `[-bound, bound]`.
pub fn sample_point<R: Rng + ?Sized>(
    degree_bound: u64,
    num_vars: usize,
    num_candidates: usize,
    p: f64,
    rng: &mut R,
) -> Result<Vec<BigInt>, Error> {
    let bound = sampling_bound(degree_bound, num_vars, num_candidates, p)?;
    let low = -bound.clone();
    let high = bound + BigInt::one();
    Ok((0..num_vars).map(|_| rng.gen_bigint_range(&low, &high)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::test_rng;

    #[test]
    fn test_bound_formula() {
        // 3 * 2^(1 + 3) * 1 / (1 - 1/2) = 96
        assert_eq!(sampling_bound(2, 1, 1, 0.5).unwrap(), BigInt::from(96));
        // 3 * 3^5 * 3 / 0.25 = 8748
        assert_eq!(sampling_bound(3, 2, 3, 0.75).unwrap(), BigInt::from(8748));
        // 0.99 is not exactly representable, the bound rounds up
        let b = sampling_bound(1, 0, 1, 0.99).unwrap();
        assert!(b >= BigInt::from(300) && b <= BigInt::from(301));
    }

    #[test]
    fn test_bound_is_monotone() {
        let base = sampling_bound(3, 2, 2, 0.9).unwrap();
        assert!(sampling_bound(4, 2, 2, 0.9).unwrap() >= base);
        assert!(sampling_bound(3, 3, 2, 0.9).unwrap() >= base);
        assert!(sampling_bound(3, 2, 5, 0.9).unwrap() >= base);
        assert!(sampling_bound(3, 2, 2, 0.99).unwrap() >= base);
    }

    #[test]
    fn test_points_stay_in_box() {
        let mut rng = test_rng();
        let bound = sampling_bound(2, 3, 1, 0.5).unwrap();
        for _ in 0..20 {
            let point = sample_point(2, 3, 1, 0.5, &mut rng).unwrap();
            assert_eq!(point.len(), 3);
            assert!(point.iter().all(|c| *c >= -bound.clone() && *c <= bound));
        }
    }

    #[test]
    fn test_invalid_probability() {
        let mut rng = test_rng();
        for p in [0.0, 1.0, 1.5] {
            let err = sample_point(2, 2, 1, p, &mut rng).unwrap_err();
            assert_eq!(err.downcast_ref::<IdentError>(), Some(&IdentError::InvalidProbability(p)));
        }
    }
}
