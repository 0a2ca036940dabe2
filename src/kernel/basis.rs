//! Generalized Matérn basis functions
//!
//! A basis function g is a convolution square root of a stationary kernel:
//! the cross-covariance of tasks i and j is
//!
//! ```math
//!   k_{ij}(\tau) = \int_{-\infty}^{\infty} g_i(u) g_j(\tau - u) du.
//! ```
//!
//! Each g is normalized so that ∫ g² = 1, which makes the auto-covariance
//! of every task equal to one at zero lag; amplitudes are applied
//! separately.
//!
//! For the Matérn family with smoothness ν and length scale l the basis is
//!
//! ```math
//!   g(\tau) = N z^p K_p(z), \quad z = \sqrt{2\nu} |\tau| / l, \quad p = \nu/2 - 1/4,
//! ```
//!
//! where K is the modified Bessel function of the second kind, and its self
//! convolution is the usual Matérn kernel of smoothness ν and length scale l.
//! For ν <= 1/2 the order p is not positive and g has an integrable
//! singularity at τ = 0; evaluating it exactly there is a `NonFinite` error.
//! The squared-exponential basis is a Gaussian of width l / √2 whose self
//! convolution is exp(-τ² / 2l²).
use super::{KernelError, Smoothness};
use crate::consts::SQRT_PI;
use crate::misc::bessel::bessel_kv;
use special::Gamma;
use std::f64::consts::{LN_2, PI};

/// A basis function with its normalization precomputed
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BasisFunction {
    smoothness: Smoothness,
    length_scale: f64,
    /// Inverse width: z = alpha * |tau|
    alpha: f64,
    /// ln N
    ln_norm: f64,
}

impl BasisFunction {
    /// Create the basis function of the given smoothness and length scale
    pub fn new(
        smoothness: Smoothness,
        length_scale: f64,
    ) -> Result<Self, KernelError> {
        if !(length_scale.is_finite() && length_scale > 0.0) {
            return Err(KernelError::InvalidLengthScale(length_scale));
        }
        smoothness.validate()?;

        let (alpha, ln_norm) = match smoothness {
            Smoothness::SquaredExponential => {
                let alpha = length_scale.recip();
                // (2 / (π l²))^(1/4)
                let ln_norm = 0.25 * (2.0 * alpha * alpha / PI).ln();
                (alpha, ln_norm)
            }
            Smoothness::Matern52 => {
                let alpha = 5.0_f64.sqrt() / length_scale;
                // 4 √α / (√3 π)
                let ln_norm =
                    (4.0 / (3.0_f64.sqrt() * PI)).ln() + 0.5 * alpha.ln();
                (alpha, ln_norm)
            }
            Smoothness::Matern72 => {
                let alpha = 7.0_f64.sqrt() / length_scale;
                // √α √(2/5), with the √(π/2) of K_{3/2} folded in
                let ln_norm = 0.5 * (0.4 * alpha).ln();
                (alpha, ln_norm)
            }
            Smoothness::GeneralMatern(nu) => {
                let alpha = (2.0 * nu).sqrt() / length_scale;
                let p = order(nu);
                let ln_norm = 0.5 * alpha.ln() + (1.0 - p) * LN_2
                    - (0.5 * nu + 0.25).ln_gamma().0
                    + 0.5
                        * ((nu + 0.5).ln_gamma().0
                            - nu.ln_gamma().0
                            - (2.0 * SQRT_PI).ln());
                (alpha, ln_norm)
            }
        };

        Ok(Self {
            smoothness,
            length_scale,
            alpha,
            ln_norm,
        })
    }

    pub fn smoothness(&self) -> Smoothness {
        self.smoothness
    }

    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    /// Distance over which the basis decays by roughly a factor of e
    pub fn width(&self) -> f64 {
        self.alpha.recip()
    }

    /// g(τ)
    pub fn value(&self, tau: f64) -> Result<f64, KernelError> {
        let z = self.alpha * tau.abs();
        let shape = match self.smoothness {
            Smoothness::SquaredExponential => (-z * z).exp(),
            Smoothness::Matern52 => z_pow_kv(1.0, z)?,
            Smoothness::Matern72 => (1.0 + z) * (-z).exp(),
            Smoothness::GeneralMatern(nu) => z_pow_kv(order(nu), z)?,
        };
        self.finite(self.ln_norm.exp() * shape, tau)
    }

    /// ∂g/∂τ
    pub fn derivative(&self, tau: f64) -> Result<f64, KernelError> {
        let z = self.alpha * tau.abs();
        let norm = self.ln_norm.exp();
        let slope = match self.smoothness {
            Smoothness::SquaredExponential => {
                -2.0 * self.alpha * self.alpha * tau * norm * (-z * z).exp()
            }
            Smoothness::GeneralMatern(nu) if z == 0.0 && order(nu) <= 0.0 => {
                f64::INFINITY
            }
            _ if z == 0.0 => 0.0,
            // d/dz z^p K_p(z) = -z^p K_{p-1}(z) and K_{p-1} = K_{1-p}
            Smoothness::Matern52 => {
                -norm * self.alpha * tau.signum() * z * bessel_kv(0.0, z)?
            }
            Smoothness::Matern72 => {
                -norm * self.alpha * tau.signum() * z * (-z).exp()
            }
            Smoothness::GeneralMatern(nu) => {
                let p = order(nu);
                -norm
                    * self.alpha
                    * tau.signum()
                    * z_pow_times(p, z, bessel_kv(1.0 - p, z)?)
            }
        };
        self.finite(slope, tau)
    }

    fn finite(&self, x: f64, tau: f64) -> Result<f64, KernelError> {
        if x.is_finite() {
            Ok(x)
        } else {
            Err(KernelError::NonFinite {
                lag: tau,
                length_scale: self.length_scale,
            })
        }
    }
}

/// Bessel order of the basis of smoothness ν
#[inline]
fn order(nu: f64) -> f64 {
    0.5 * nu - 0.25
}

/// z^p K_|p|(z), with K_p = K_-p.
///
/// For p > 0 this is continuous at z = 0 where it equals Γ(p) 2^(p-1); for
/// p <= 0 it is unbounded there and the value at z = 0 is infinite.
fn z_pow_kv(p: f64, z: f64) -> Result<f64, KernelError> {
    if z.is_nan() {
        return Ok(f64::NAN);
    }
    let kv = if z == 0.0 {
        f64::INFINITY
    } else {
        bessel_kv(p, z)?
    };

    if kv.is_infinite() {
        // K_p overflows only where z^p K_p has settled to its limit
        Ok(if p > 0.0 {
            ((p - 1.0) * LN_2 + p.ln_gamma().0).exp()
        } else {
            f64::INFINITY
        })
    } else {
        Ok(z_pow_times(p, z, kv))
    }
}

/// z^p k for finite k >= 0, without forming inf * 0 in the far tail
#[inline]
fn z_pow_times(p: f64, z: f64, k: f64) -> f64 {
    if k == 0.0 {
        return 0.0;
    }
    let direct = z.powf(p) * k;
    if direct.is_finite() {
        direct
    } else {
        (p * z.ln() + k.ln()).exp()
    }
}

/// The basis function value gMdef(τ; ν, l)
///
/// # Example
///
/// ```
/// use mtgp::kernel::{basis, Smoothness};
///
/// let g0 = basis(0.0, Smoothness::SquaredExponential, 1.0).unwrap();
/// assert!((g0 - (2.0 / std::f64::consts::PI).powf(0.25)).abs() < 1E-12);
/// ```
pub fn basis(
    tau: f64,
    smoothness: Smoothness,
    length_scale: f64,
) -> Result<f64, KernelError> {
    BasisFunction::new(smoothness, length_scale)?.value(tau)
}

/// The basis function evaluated at every lag in `taus`
pub fn basis_values(
    taus: &[f64],
    smoothness: Smoothness,
    length_scale: f64,
) -> Result<Vec<f64>, KernelError> {
    let g = BasisFunction::new(smoothness, length_scale)?;
    taus.iter().map(|&tau| g.value(tau)).collect()
}

/// The derivative of the basis function, gdMdef(τ; ν, l)
pub fn basis_derivative(
    tau: f64,
    smoothness: Smoothness,
    length_scale: f64,
) -> Result<f64, KernelError> {
    BasisFunction::new(smoothness, length_scale)?.derivative(tau)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::misc::{quad_gk, QuadTolerance};

    const TOL: f64 = 1E-10;

    fn all_regimes() -> Vec<Smoothness> {
        vec![
            Smoothness::SquaredExponential,
            Smoothness::Matern52,
            Smoothness::Matern72,
            Smoothness::GeneralMatern(1.5),
            Smoothness::GeneralMatern(4.5),
            Smoothness::GeneralMatern(0.8),
        ]
    }

    #[test]
    fn basis_is_finite_and_even() {
        for s in all_regimes() {
            for &l in &[0.1, 1.0, 4.0] {
                let g = BasisFunction::new(s, l).unwrap();
                for &tau in &[0.0, 1E-12, 0.3, 2.0, 9.0] {
                    let pos = g.value(tau).unwrap();
                    let neg = g.value(-tau).unwrap();
                    assert!(pos.is_finite() && pos >= 0.0, "{} {}", s, tau);
                    assert_eq!(pos, neg);
                }
            }
        }
    }

    #[test]
    fn basis_is_continuous_at_zero() {
        for s in all_regimes() {
            let g = BasisFunction::new(s, 0.7).unwrap();
            let at_zero = g.value(0.0).unwrap();
            let near_zero = g.value(1E-12).unwrap();
            assert::close(at_zero, near_zero, 1E-3 * at_zero);
        }
    }

    #[test]
    fn basis_has_unit_norm() {
        let tol = QuadTolerance::default();
        for s in all_regimes() {
            for &l in &[0.5, 2.0] {
                let g = BasisFunction::new(s, l).unwrap();
                let half_width = 60.0 * g.width();
                let sq = quad_gk(
                    |t| g.value(t).unwrap().powi(2),
                    0.0,
                    half_width,
                    &tol,
                );
                assert::close(2.0 * sq.value, 1.0, 1E-6);
            }
        }
    }

    #[test]
    fn matern_closed_forms_match_general_form() {
        // The dedicated 5/2 and 7/2 branches agree with the Bessel form
        for (special, nu) in
            [(Smoothness::Matern52, 2.5), (Smoothness::Matern72, 3.5)]
        {
            let closed = BasisFunction::new(special, 1.3).unwrap();
            let general =
                BasisFunction::new(Smoothness::GeneralMatern(nu), 1.3).unwrap();
            for &tau in &[0.0, 0.01, 0.5, 1.7, 6.0] {
                let a = closed.value(tau).unwrap();
                let b = general.value(tau).unwrap();
                assert::close(a, b, TOL);
                let da = closed.derivative(tau).unwrap();
                let db = general.derivative(tau).unwrap();
                assert::close(da, db, TOL);
            }
        }
    }

    #[test]
    fn derivative_matches_finite_differences() {
        const H: f64 = 1E-6;
        for s in all_regimes() {
            let g = BasisFunction::new(s, 1.1).unwrap();
            for &tau in &[-2.5, -0.4, 0.3, 1.0, 3.3] {
                let fd = (g.value(tau + H).unwrap() - g.value(tau - H).unwrap())
                    / (2.0 * H);
                assert::close(g.derivative(tau).unwrap(), fd, 1E-6);
            }
        }
    }

    #[test]
    fn derivative_vanishes_at_zero() {
        for s in all_regimes() {
            assert_eq!(basis_derivative(0.0, s, 1.0).unwrap(), 0.0);
        }
    }

    #[test]
    fn squared_exponential_shape() {
        let l = 2.0;
        let g0 = basis(0.0, Smoothness::SquaredExponential, l).unwrap();
        let g1 = basis(l, Smoothness::SquaredExponential, l).unwrap();
        assert::close(g1 / g0, (-1.0_f64).exp(), 1E-14);
    }

    #[test]
    fn basis_values_matches_pointwise() {
        let taus = [-1.0, 0.0, 0.5, 3.0];
        let vals = basis_values(&taus, Smoothness::Matern52, 0.9).unwrap();
        for (tau, v) in taus.iter().zip(vals.iter()) {
            assert_eq!(*v, basis(*tau, Smoothness::Matern52, 0.9).unwrap());
        }
    }

    #[test]
    fn invalid_inputs_are_errors() {
        assert_eq!(
            basis(0.0, Smoothness::Matern52, 0.0),
            Err(KernelError::InvalidLengthScale(0.0))
        );
        assert!(basis(0.0, Smoothness::GeneralMatern(0.0), 1.0).is_err());
        assert!(matches!(
            basis(f64::NAN, Smoothness::Matern72, 1.0),
            Err(KernelError::NonFinite { .. })
        ));
    }

    #[test]
    fn rough_basis_is_singular_only_at_zero() {
        for nu in [0.5, 0.3] {
            let s = Smoothness::GeneralMatern(nu);
            let g = BasisFunction::new(s, 0.8).unwrap();
            assert!(matches!(g.value(0.0), Err(KernelError::NonFinite { .. })));
            assert!(matches!(
                g.derivative(0.0),
                Err(KernelError::NonFinite { .. })
            ));

            let mut prev = f64::INFINITY;
            for &tau in &[1E-12, 1E-6, 0.01, 0.5, 2.0, 9.0] {
                let v = g.value(tau).unwrap();
                assert!(v.is_finite() && v > 0.0 && v < prev, "{} {}", nu, tau);
                assert_eq!(v, g.value(-tau).unwrap());
                prev = v;
            }
        }
    }

    #[test]
    fn exponential_basis_is_bessel_k0() {
        // ν = 1/2: g(τ) = √(2α) / π K_0(α|τ|) with α = 1 / l
        let l: f64 = 1.4;
        let alpha = l.recip();
        let norm = (2.0 * alpha).sqrt() / PI;
        for &tau in &[0.05, 0.7, 3.0] {
            let expected = norm * bessel_kv(0.0, alpha * tau).unwrap();
            let g = basis(tau, Smoothness::GeneralMatern(0.5), l).unwrap();
            assert::close(g / expected, 1.0, 1E-12);
        }
    }

    #[test]
    fn smooth_basis_tail_vanishes() {
        let s = Smoothness::GeneralMatern(60.0);
        let g = BasisFunction::new(s, 1.0).unwrap();
        let peak = g.value(0.0).unwrap();
        assert!(peak > 0.0);
        for &tau in &[50.0, 1E3, 1E6, 1E13, 1E15] {
            let v = g.value(tau).unwrap();
            assert!(v >= 0.0 && v < 1E-12 * peak, "g({}) = {}", tau, v);
            assert!(g.derivative(tau).unwrap().abs() < 1E-12);
        }
        assert_eq!(g.value(1E13).unwrap(), 0.0);
    }

    #[test]
    fn z_pow_kv_limits() {
        assert::close(z_pow_kv(1.0, 0.0).unwrap(), 1.0, 1E-14);
        assert::close(z_pow_kv(1.0, 1E-300).unwrap(), 1.0, 1E-14);
        assert_eq!(z_pow_kv(0.0, 0.0).unwrap(), f64::INFINITY);
        assert_eq!(z_pow_kv(-0.1, 0.0).unwrap(), f64::INFINITY);
        assert_eq!(z_pow_kv(29.75, 1E13).unwrap(), 0.0);
    }
}
