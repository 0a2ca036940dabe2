//! Multilinear interpolation on a rectilinear grid
use std::fmt;

/// Errors from building a grid interpolator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InterpError {
    /// The axis at the given position has no nodes
    EmptyAxis(usize),
    /// The axis at the given position is not strictly increasing
    NonIncreasingAxis(usize),
    /// The number of values does not match the product of the axis lengths
    ShapeMismatch { expected: usize, given: usize },
}

impl std::error::Error for InterpError {}

impl fmt::Display for InterpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAxis(ix) => write!(f, "axis {} is empty", ix),
            Self::NonIncreasingAxis(ix) => {
                write!(f, "axis {} is not strictly increasing", ix)
            }
            Self::ShapeMismatch { expected, given } => write!(
                f,
                "grid expects {} values but {} were given",
                expected, given
            ),
        }
    }
}

/// Find the cell of `axis` used to interpolate at `x`.
///
/// Returns the index of the lower node and the fractional position of `x`
/// within the cell. Outside the axis the edge cell is used and the fraction
/// falls outside [0, 1], which extends the edge cell's linear trend.
///
/// # Example
///
/// ```
/// use mtgp::misc::locate;
///
/// let axis = [0.0, 1.0, 2.0];
/// assert_eq!(locate(&axis, 1.5), (1, 0.5));
/// assert_eq!(locate(&axis, -1.0), (0, -1.0));
/// assert_eq!(locate(&axis, 3.0), (1, 2.0));
/// ```
#[inline]
pub fn locate(axis: &[f64], x: f64) -> (usize, f64) {
    let n = axis.len();
    if n < 2 {
        return (0, 0.0);
    }
    let ix = axis
        .partition_point(|&node| node <= x)
        .saturating_sub(1)
        .min(n - 2);
    let t = (x - axis[ix]) / (axis[ix + 1] - axis[ix]);
    (ix, t)
}

/// Linear interpolation along a single axis with linear extrapolation.
#[inline]
pub fn interp1(axis: &[f64], values: &[f64], x: f64) -> f64 {
    if values.len() < 2 {
        return values.first().copied().unwrap_or(f64::NAN);
    }
    let (ix, t) = locate(axis, x);
    (1.0 - t) * values[ix] + t * values[ix + 1]
}

/// Multilinear interpolator over a `D`-dimensional rectilinear grid.
///
/// Values are stored row-major: the last axis varies fastest. Queries
/// outside the grid are extrapolated from the nearest edge cell rather than
/// rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct RegularGridInterpolator<const D: usize> {
    axes: [Vec<f64>; D],
    values: Vec<f64>,
    strides: [usize; D],
}

impl<const D: usize> RegularGridInterpolator<D> {
    /// Create an interpolator from the node coordinates along each axis and
    /// the row-major values at every node.
    pub fn new(
        axes: [Vec<f64>; D],
        values: Vec<f64>,
    ) -> Result<Self, InterpError> {
        for (ix, axis) in axes.iter().enumerate() {
            if axis.is_empty() {
                return Err(InterpError::EmptyAxis(ix));
            }
            if axis.windows(2).any(|w| !(w[0] < w[1])) {
                return Err(InterpError::NonIncreasingAxis(ix));
            }
        }

        let expected: usize = axes.iter().map(Vec::len).product();
        if expected != values.len() {
            return Err(InterpError::ShapeMismatch {
                expected,
                given: values.len(),
            });
        }

        let mut strides = [1; D];
        for d in (0..D.saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * axes[d + 1].len();
        }

        Ok(Self {
            axes,
            values,
            strides,
        })
    }

    /// Node coordinates of every axis
    pub fn axes(&self) -> &[Vec<f64>; D] {
        &self.axes
    }

    /// Row-major node values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Row-major offset of a multi-index
    pub fn offset(&self, index: &[usize; D]) -> usize {
        index
            .iter()
            .zip(self.strides.iter())
            .map(|(i, s)| i * s)
            .sum()
    }

    /// Interpolate at `x`
    pub fn eval(&self, x: &[f64; D]) -> f64 {
        let mut lower = [0_usize; D];
        let mut frac = [0.0; D];
        for d in 0..D {
            let (ix, t) = locate(&self.axes[d], x[d]);
            lower[d] = ix;
            frac[d] = t;
        }

        let mut acc = 0.0;
        'corners: for corner in 0..(1_usize << D) {
            let mut weight = 1.0;
            let mut offset = 0;
            for d in 0..D {
                let upper = (corner >> d) & 1 == 1;
                if upper && self.axes[d].len() < 2 {
                    continue 'corners;
                }
                weight *= if upper { frac[d] } else { 1.0 - frac[d] };
                offset += (lower[d] + upper as usize) * self.strides[d];
            }
            acc += weight * self.values[offset];
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1E-12;

    fn plane_3d() -> RegularGridInterpolator<3> {
        let xs = vec![-1.0, 0.0, 2.0];
        let ys = vec![0.0, 1.0];
        let zs = vec![0.5, 1.0, 1.5, 3.0];
        let mut values = Vec::new();
        for x in &xs {
            for y in &ys {
                for z in &zs {
                    values.push(2.0 * x - y + 0.5 * z + 1.0);
                }
            }
        }
        RegularGridInterpolator::new([xs, ys, zs], values).unwrap()
    }

    #[test]
    fn reproduces_linear_functions_everywhere() {
        let interp = plane_3d();
        for &(x, y, z) in &[
            (0.3, 0.2, 0.7),
            (-1.0, 0.0, 0.5),
            (1.9, 0.99, 2.9),
            // outside the grid
            (-3.0, 2.0, 5.0),
            (4.0, -1.0, -0.5),
        ] {
            let expected = 2.0 * x - y + 0.5 * z + 1.0;
            assert::close(interp.eval(&[x, y, z]), expected, TOL);
        }
    }

    #[test]
    fn nodes_are_reproduced_exactly() {
        let interp = plane_3d();
        let axes = interp.axes().clone();
        for (i, x) in axes[0].iter().enumerate() {
            for (j, y) in axes[1].iter().enumerate() {
                for (k, z) in axes[2].iter().enumerate() {
                    let ix = interp.offset(&[i, j, k]);
                    assert_eq!(interp.eval(&[*x, *y, *z]), interp.values()[ix]);
                }
            }
        }
    }

    #[test]
    fn bilinear_term_is_blended() {
        let interp = RegularGridInterpolator::new(
            [vec![0.0, 1.0], vec![0.0, 1.0]],
            vec![0.0, 0.0, 0.0, 1.0],
        )
        .unwrap();
        assert::close(interp.eval(&[0.5, 0.5]), 0.25, TOL);
        assert::close(interp.eval(&[1.0, 0.25]), 0.25, TOL);
    }

    #[test]
    fn single_node_axis_is_constant() {
        let interp = RegularGridInterpolator::new(
            [vec![3.0], vec![0.0, 1.0]],
            vec![1.0, 3.0],
        )
        .unwrap();
        assert::close(interp.eval(&[100.0, 0.5]), 2.0, TOL);
    }

    #[test]
    fn interp1_extrapolates() {
        let axis = [0.0, 1.0, 2.0];
        let values = [0.0, 1.0, 4.0];
        assert::close(interp1(&axis, &values, 1.5), 2.5, TOL);
        assert::close(interp1(&axis, &values, 3.0), 7.0, TOL);
        assert::close(interp1(&axis, &values, -1.0), -1.0, TOL);
    }

    #[test]
    fn construction_errors() {
        assert_eq!(
            RegularGridInterpolator::new([vec![], vec![1.0]], vec![]),
            Err(InterpError::EmptyAxis(0))
        );
        assert_eq!(
            RegularGridInterpolator::new([vec![0.0, 1.0], vec![1.0, 1.0]], vec![0.0; 4]),
            Err(InterpError::NonIncreasingAxis(1))
        );
        assert_eq!(
            RegularGridInterpolator::new([vec![0.0, 1.0]], vec![0.0; 3]),
            Err(InterpError::ShapeMismatch {
                expected: 2,
                given: 3
            })
        );
    }
}
