use num_traits::{One, Zero};

use crate::poly::series::Series;
use crate::poly::Rational;

/// Dense matrix over Q, row major.
pub type Matrix = Vec<Vec<Rational>>;

/// Exact rank by Gaussian elimination.
pub fn matrix_rank(matrix: &[Vec<Rational>]) -> usize {
    let mut rows: Matrix = matrix.to_vec();
    let num_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    for row in rows.iter_mut() {
        row.resize(num_cols, Rational::zero());
    }

    let mut rank = 0;
    for col in 0..num_cols {
        let Some(pivot) = (rank..rows.len()).find(|&r| !rows[r][col].is_zero()) else {
            continue;
        };
        rows.swap(rank, pivot);
        let inv = Rational::one() / &rows[rank][col];
        for r in (rank + 1)..rows.len() {
            if rows[r][col].is_zero() {
                continue;
            }
            let factor = &rows[r][col] * &inv;
            for c in col..num_cols {
                let delta = &factor * &rows[rank][c];
                rows[r][c] -= delta;
            }
        }
        rank += 1;
        if rank == rows.len() {
            break;
        }
    }
    rank
}

/// Columns minus rank; an IO equation's Wronskian has corank one when its
/// monomials satisfy exactly one linear relation.
pub fn corank(matrix: &[Vec<Rational>]) -> usize {
    let num_cols = matrix.iter().map(|r| r.len()).max().unwrap_or(0);
    num_cols - matrix_rank(matrix)
}

/// Wronskian of the given series at `t = 0`: `W[i][j] = f_j^(i)(0)` for
/// `i < functions.len()`.
pub fn wronskian_at_zero(functions: &[Series]) -> Matrix {
    let n = functions.len();
    (0..n)
        .map(|i| functions.iter().map(|f| f.derivative_at_zero(i)).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::rational;

    fn m(rows: &[&[i64]]) -> Matrix {
        rows.iter()
            .map(|r| r.iter().map(|v| rational(*v)).collect())
            .collect()
    }

    #[test]
    fn test_rank() {
        assert_eq!(matrix_rank(&m(&[&[1, 2], &[2, 4]])), 1);
        assert_eq!(matrix_rank(&m(&[&[0, 1, 2], &[1, 0, 0], &[1, 1, 2]])), 2);
        assert_eq!(matrix_rank(&m(&[&[1, 0, 0], &[0, 1, 0], &[0, 0, 1]])), 3);
        assert_eq!(matrix_rank(&m(&[&[0, 0], &[0, 0]])), 0);
        assert_eq!(corank(&m(&[&[1, 1, 1], &[2, 2, 2], &[0, 0, 0]])), 2);
    }

    #[test]
    fn test_wronskian_of_dependent_functions() {
        // e^t, 2 e^t, t
        let precision = 6;
        let exp = Series::new(
            vec![
                rational(1),
                rational(1),
                Rational::new(1.into(), 2.into()),
                Rational::new(1.into(), 6.into()),
                Rational::new(1.into(), 24.into()),
            ],
            precision,
        );
        let twice = exp.scale(&rational(2));
        let t = Series::new(vec![rational(0), rational(1)], precision);
        let w = wronskian_at_zero(&[exp, twice, t]);
        assert_eq!(w.len(), 3);
        assert_eq!(corank(&w), 1);
    }
}
