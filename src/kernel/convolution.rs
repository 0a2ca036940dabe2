use super::{BasisFunction, KernelError, Smoothness};
use crate::misc::{try_quad_gk_infinite, QuadEstimate, QuadTolerance};
use log::trace;

/// Numerically convolves the basis functions of two tasks
///
/// ```math
///   k(\tau; l_1, l_2) = \int_{-\infty}^{\infty} g(u; \nu_1, l_1) g(\tau - u; \nu_2, l_2) du
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvolutionIntegrator {
    first: Smoothness,
    second: Smoothness,
    tolerance: QuadTolerance,
}

impl ConvolutionIntegrator {
    pub fn new(
        first: Smoothness,
        second: Smoothness,
        tolerance: QuadTolerance,
    ) -> Self {
        Self {
            first,
            second,
            tolerance,
        }
    }

    pub fn tolerance(&self) -> &QuadTolerance {
        &self.tolerance
    }

    /// Integrate at a single (lag, l1, l2) coordinate.
    ///
    /// Non-convergence is not an error: the best estimate is returned with
    /// `converged == false` and its error estimate.
    pub fn integrate(
        &self,
        lag: f64,
        l1: f64,
        l2: f64,
    ) -> Result<QuadEstimate, KernelError> {
        let g1 = BasisFunction::new(self.first, l1)?;
        let g2 = BasisFunction::new(self.second, l2)?;

        // Both factors peak (and may have a cusp) at their centers, 0 and
        // lag; flank points keep narrow peaks from hiding between nodes.
        let (w1, w2) = (g1.width(), g2.width());
        let points = [
            -3.0 * w1,
            -w1,
            0.0,
            w1,
            3.0 * w1,
            lag - 3.0 * w2,
            lag - w2,
            lag,
            lag + w2,
            lag + 3.0 * w2,
        ];

        let q = try_quad_gk_infinite(
            |u| -> Result<f64, KernelError> {
                Ok(g1.value(u)? * g2.value(lag - u)?)
            },
            &points,
            &self.tolerance,
        )?;

        if !q.converged {
            trace!(
                "quadrature did not converge at lag = {}, l1 = {}, l2 = {}: \
                 value = {}, abs_err = {:e}",
                lag,
                l1,
                l2,
                q.value,
                q.abs_err
            );
        }
        Ok(q)
    }
}
