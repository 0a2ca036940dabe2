use super::{GridDiagnostics, KernelError, PairGrid};
use crate::misc::{interp1, locate, RegularGridInterpolator};

/// Multilinear interpolation of a pair grid
///
/// Queries are keyed on (lag, l1, l2) where l1 is the length scale of the
/// pair's first task and l2 of its second. Queries outside the grid are
/// extrapolated linearly from the nearest edge cell.
#[derive(Clone, Debug, PartialEq)]
pub struct InterpolatedKernel {
    pair: (usize, usize),
    /// Axes in storage order: (lag, l2, l1)
    interp: RegularGridInterpolator<3>,
    diagnostics: GridDiagnostics,
}

impl InterpolatedKernel {
    pub fn from_grid(grid: PairGrid) -> Result<Self, KernelError> {
        let pair = grid.pair();
        let (axes, values, diagnostics) = grid.into_parts();
        let interp =
            RegularGridInterpolator::new([axes.lags, axes.l2s, axes.l1s], values)?;
        Ok(Self {
            pair,
            interp,
            diagnostics,
        })
    }

    pub fn pair(&self) -> (usize, usize) {
        self.pair
    }

    pub fn diagnostics(&self) -> &GridDiagnostics {
        &self.diagnostics
    }

    /// Lag nodes of the underlying grid
    pub fn lags(&self) -> &[f64] {
        &self.interp.axes()[0]
    }

    /// Interpolated cross-covariance at a single point
    ///
    /// # Example
    ///
    /// ```
    /// use mtgp::prelude::*;
    /// use mtgp::kernel::{GridAxes, InterpolatedKernel, KernelGridBuilder};
    /// use mtgp::misc::{build_pool, QuadTolerance};
    ///
    /// let task = TaskDescriptor::squared_exponential(0.5, 2.0);
    /// let pool = build_pool(Some(2)).unwrap();
    /// let axes = GridAxes::for_pair(&task, &task, 21).unwrap();
    /// let grid = KernelGridBuilder::new(&pool, QuadTolerance::default())
    ///     .build((0, 0), &task, &task, axes)
    ///     .unwrap();
    /// let kernel = InterpolatedKernel::from_grid(grid).unwrap();
    ///
    /// // Unit variance at zero lag
    /// assert!((kernel.eval(0.0, 1.25, 1.25) - 1.0).abs() < 1E-3);
    /// ```
    pub fn eval(&self, lag: f64, l1: f64, l2: f64) -> f64 {
        self.interp.eval(&[lag, l2, l1])
    }

    /// The kernel at fixed length scales as a function of lag only.
    ///
    /// Equivalent to calling [`eval`](Self::eval) with the same `l1` and
    /// `l2`, but interpolates over the length-scale axes once instead of
    /// once per lag.
    pub fn profile(&self, l1: f64, l2: f64) -> LagProfile<'_> {
        let [lags, l2s, l1s] = self.interp.axes();
        let (i2, t2) = locate(l2s, l2);
        let (i1, t1) = locate(l1s, l1);

        let mut corners: Vec<(usize, usize, f64)> = Vec::with_capacity(4);
        for (d2, w2) in [(0, 1.0 - t2), (1, t2)] {
            if d2 == 1 && l2s.len() < 2 {
                continue;
            }
            for (d1, w1) in [(0, 1.0 - t1), (1, t1)] {
                if d1 == 1 && l1s.len() < 2 {
                    continue;
                }
                corners.push((i2 + d2, i1 + d1, w2 * w1));
            }
        }

        let values = self.interp.values();
        let profile = (0..lags.len())
            .map(|k| {
                corners
                    .iter()
                    .map(|&(j2, j1, w)| {
                        w * values[self.interp.offset(&[k, j2, j1])]
                    })
                    .sum::<f64>()
            })
            .collect();

        LagProfile {
            lags,
            values: profile,
            sign: 1.0,
        }
    }

    /// View this kernel from task `pair.0` to `pair.1`, or the reverse
    pub fn oriented(&self, transposed: bool) -> OrientedKernel<'_> {
        OrientedKernel {
            kernel: self,
            transposed,
        }
    }
}

/// Kernel values along the lag axis at fixed length scales
#[derive(Clone, Debug, PartialEq)]
pub struct LagProfile<'a> {
    lags: &'a [f64],
    values: Vec<f64>,
    sign: f64,
}

impl<'a> LagProfile<'a> {
    /// Interpolated value at `lag`
    #[inline]
    pub fn eval(&self, lag: f64) -> f64 {
        interp1(self.lags, &self.values, self.sign * lag)
    }

    fn reversed(mut self) -> Self {
        self.sign = -self.sign;
        self
    }
}

/// A pair kernel seen from either of its tasks
///
/// The kernel of the pair (i, j) gives Cov(f_i(x), f_j(x')) as a function of
/// the lag x - x'. Viewed from (j, i) the lag changes sign and the length
/// scales swap.
#[derive(Clone, Copy, Debug)]
pub struct OrientedKernel<'a> {
    kernel: &'a InterpolatedKernel,
    transposed: bool,
}

impl<'a> OrientedKernel<'a> {
    pub fn is_transposed(&self) -> bool {
        self.transposed
    }

    /// Cov(f_row(x), f_col(x')) at lag x - x' with the row and column
    /// tasks' length scales
    pub fn eval(&self, lag: f64, l_row: f64, l_col: f64) -> f64 {
        if self.transposed {
            self.kernel.eval(-lag, l_col, l_row)
        } else {
            self.kernel.eval(lag, l_row, l_col)
        }
    }

    pub fn profile(&self, l_row: f64, l_col: f64) -> LagProfile<'a> {
        if self.transposed {
            self.kernel.profile(l_col, l_row).reversed()
        } else {
            self.kernel.profile(l_row, l_col)
        }
    }
}
