//! Modified Bessel function of the second kind, K<sub>v</sub>(x), of real
//! order.
use crate::consts::EULER_MASCERONI;
use special::Gamma;
use std::f64::consts::PI;
use std::f64::EPSILON;
use std::fmt;

const MAX_ITER: usize = 500;

/// An encounterable error when computing Bessel's K function
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BesselError {
    /// K is only defined for non-negative real arguments
    DomainError,
    /// K(v, 0) is infinite
    OverflowError,
    /// Failed to converge
    FailedToConvergeError,
}

impl std::error::Error for BesselError {}

impl fmt::Display for BesselError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomainError => write!(f, "argument outside of the domain"),
            Self::OverflowError => write!(f, "result overflows"),
            Self::FailedToConvergeError => {
                write!(f, "series failed to converge")
            }
        }
    }
}

/// Modified Bessel function of the second kind of real order, K<sub>v</sub>(x)
///
/// # Example
///
/// ```
/// use mtgp::misc::bessel::bessel_kv;
///
/// // K_{1/2}(x) = sqrt(π / 2x) e^{-x}
/// let x = 1.3_f64;
/// let expected = (std::f64::consts::PI / (2.0 * x)).sqrt() * (-x).exp();
/// assert!((bessel_kv(0.5, x).unwrap() - expected).abs() < 1E-12);
/// ```
pub fn bessel_kv(v: f64, x: f64) -> Result<f64, BesselError> {
    if v.is_nan() || x.is_nan() {
        return Ok(f64::NAN);
    }
    if x < 0.0 {
        return Err(BesselError::DomainError);
    } else if x == 0.0 {
        return Err(BesselError::OverflowError);
    }

    // K_{-v} = K_v
    let v = v.abs();
    let n = v.round();
    let u = v - n;
    let n = n as usize;

    let (ku, ku_1) = if x <= 2.0 {
        temme_series(u, x)?
    } else {
        steed_continued_fraction(u, x)?
    };

    // Forward recurrence is stable for K
    let mut prev = ku;
    let mut current = ku_1;
    for k in 1..=n {
        let kf = k as f64;
        let next = 2.0 * (u + kf) * current / x + prev;
        prev = current;
        current = next;
    }

    Ok(prev)
}

/// K_u(x) and K_{u+1}(x) from Temme's series, for x <= 2 and |u| <= 1/2.
///
/// N. M. Temme, J. Comput. Phys. 19, 324 (1975).
fn temme_series(u: f64, x: f64) -> Result<(f64, f64), BesselError> {
    debug_assert!(x <= 2.0 && u.abs() <= 0.5);

    let ln_half_x = (0.5 * x).ln();
    let pow_half_x = (u * ln_half_x).exp();
    let mu = -u * ln_half_x;

    let g_plus = (1.0 + u).gamma();
    let g_minus = (1.0 - u).gamma();
    let sinc_u = if u.abs() < 2.0 * EPSILON {
        1.0
    } else {
        (PI * u).sin() / (PI * u)
    };
    let sinhc_mu = if mu.abs() < EPSILON {
        1.0
    } else {
        mu.sinh() / mu
    };
    let gamma_1 = if u.abs() < EPSILON {
        -EULER_MASCERONI
    } else {
        0.5 * (g_plus - g_minus) * sinc_u / u
    };
    let gamma_2 = 0.5 * (g_plus + g_minus) * sinc_u;

    let quarter_x2 = 0.25 * x * x;
    let mut p = 0.5 * g_plus / pow_half_x;
    let mut q = 0.5 * g_minus * pow_half_x;
    let mut f = (mu.cosh() * gamma_1 - ln_half_x * sinhc_mu * gamma_2) / sinc_u;
    let mut term = 1.0;
    let mut k_u = f;
    let mut k_u1 = p;

    for k in 1..MAX_ITER {
        let kf = k as f64;
        f = (kf * f + p + q) / (kf * kf - u * u);
        p /= kf - u;
        q /= kf + u;
        term *= quarter_x2 / kf;
        k_u += term * f;
        k_u1 += term * (p - kf * f);

        if (term * f).abs() < k_u.abs() * EPSILON {
            return Ok((k_u, 2.0 * k_u1 / x));
        }
    }

    Err(BesselError::FailedToConvergeError)
}

/// K_u(x) and K_{u+1}(x) from Steed's evaluation of the continued fraction
/// for U(u + 3/2, 2u + 1, 2x) / U(u + 1/2, 2u + 1, 2x), for x > 1.
///
/// I. J. Thompson and A. R. Barnett, J. Comput. Phys. 64, 490 (1986).
fn steed_continued_fraction(
    u: f64,
    x: f64,
) -> Result<(f64, f64), BesselError> {
    debug_assert!(x > 1.0);

    let u2_quarter = u * u - 0.25;
    let mut a_n = u2_quarter;
    let mut b_n = 2.0 * (x + 1.0);
    let mut d_n = b_n.recip();
    let mut step = d_n;
    let mut ratio = d_n;

    // Three-term recurrence for the ratios of U, and the series built on it
    let (mut r_prev, mut r_cur) = (0.0, 1.0);
    let mut c_n = -a_n;
    let mut q_n = -a_n;
    let mut sum = 1.0 + q_n * step;

    for k in 2..MAX_ITER {
        let kf = k as f64;
        a_n -= 2.0 * (kf - 1.0);
        b_n += 2.0;
        d_n = (b_n + a_n * d_n).recip();
        step *= b_n * d_n - 1.0;
        ratio += step;

        let r_next = (r_prev - (b_n - 2.0) * r_cur) / a_n;
        r_prev = r_cur;
        r_cur = r_next;
        c_n *= -a_n / kf;
        q_n += c_n * r_next;
        sum += q_n * step;

        if (q_n * step).abs() < 0.5 * sum.abs() * EPSILON {
            let k_u = (PI / (2.0 * x)).sqrt() * (-x).exp() / sum;
            let k_u1 = k_u * (0.5 + u + x + u2_quarter * ratio) / x;
            return Ok((k_u, k_u1));
        }
    }

    Err(BesselError::FailedToConvergeError)
}
