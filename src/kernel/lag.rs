use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;

/// Pairwise differences `xi[a] - xj[b]`
///
/// # Example
///
/// ```
/// use mtgp::kernel::lag_matrix;
/// use nalgebra::DVector;
///
/// let xi = DVector::from_vec(vec![0.0, 1.0]);
/// let xj = DVector::from_vec(vec![0.5, 2.0, 4.0]);
/// let lags = lag_matrix(&xi, &xj);
///
/// assert_eq!(lags.shape(), (2, 3));
/// assert_eq!(lags[(1, 0)], 0.5);
/// assert_eq!(lags[(0, 2)], -4.0);
/// ```
pub fn lag_matrix(xi: &DVector<f64>, xj: &DVector<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(xi.len(), xj.len(), |a, b| xi[a] - xj[b])
}

/// Lag matrices of every ordered task pair.
///
/// Only the pairs (i, j) with i ≤ j are computed; (j, i) is the negated
/// transpose of (i, j).
pub fn lag_matrices(
    data: &[DVector<f64>],
) -> BTreeMap<(usize, usize), DMatrix<f64>> {
    let mut lags = BTreeMap::new();
    for (i, xi) in data.iter().enumerate() {
        for (j, xj) in data.iter().enumerate().skip(i) {
            let lij = lag_matrix(xi, xj);
            if i != j {
                lags.insert((j, i), -lij.transpose());
            }
            lags.insert((i, j), lij);
        }
    }
    lags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Vec<DVector<f64>> {
        vec![
            DVector::from_vec(vec![0.0, 0.3, 1.1]),
            DVector::from_vec(vec![-2.0, 0.7]),
            DVector::from_vec(vec![5.0]),
        ]
    }

    #[test]
    fn every_ordered_pair_is_present() {
        let lags = lag_matrices(&data());
        assert_eq!(lags.len(), 9);
        assert_eq!(lags[&(0, 1)].shape(), (3, 2));
        assert_eq!(lags[&(1, 0)].shape(), (2, 3));
        assert_eq!(lags[&(2, 2)].shape(), (1, 1));
    }

    #[test]
    fn reversed_pairs_are_negated_transposes() {
        let lags = lag_matrices(&data());
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(lags[&(j, i)], -lags[&(i, j)].transpose());
            }
        }
    }

    #[test]
    fn diagonal_blocks_are_antisymmetric_with_zero_diagonal() {
        let lags = lag_matrices(&data());
        let l00 = &lags[&(0, 0)];
        assert!(l00.diagonal().iter().all(|&x| x == 0.0));
        assert_eq!(*l00, -l00.transpose());
    }

    #[test]
    fn entries_are_row_minus_column() {
        let lags = lag_matrices(&data());
        assert::close(lags[&(0, 1)][(2, 0)], 3.1, 1E-14);
        assert::close(lags[&(1, 0)][(0, 2)], -3.1, 1E-14);
    }
}
