//! Adaptive Gauss-Kronrod quadrature
use crate::consts::{QUAD_EPS_ABS, QUAD_EPS_REL, QUAD_MAX_SUBDIVISIONS};
use std::convert::Infallible;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Kronrod abscissae. Odd entries are also the 7-point Gauss abscissae.
#[allow(clippy::excessive_precision)]
const XGK: [f64; 8] = [
    0.991_455_371_120_812_639_206_854_697_526_329,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.586_087_235_467_691_130_294_144_845_693_013,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.0,
];

#[allow(clippy::excessive_precision)]
const WGK: [f64; 8] = [
    0.022_935_322_010_529_224_963_732_008_058_970,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.209_482_141_084_727_828_012_999_174_891_714,
];

#[allow(clippy::excessive_precision)]
const WG: [f64; 4] = [
    0.129_484_966_168_869_693_270_611_432_679_082,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.417_959_183_673_469_387_755_102_040_816_327,
];

/// Stopping rule for the adaptive quadrature
///
/// Integration stops once the summed error estimate falls below
/// `max(eps_abs, eps_rel * |value|)` or after `max_subdivisions` intervals.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct QuadTolerance {
    pub eps_abs: f64,
    pub eps_rel: f64,
    pub max_subdivisions: usize,
}

impl Default for QuadTolerance {
    fn default() -> Self {
        Self {
            eps_abs: QUAD_EPS_ABS,
            eps_rel: QUAD_EPS_REL,
            max_subdivisions: QUAD_MAX_SUBDIVISIONS,
        }
    }
}

/// The result of an adaptive integration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadEstimate {
    /// Best estimate of the integral
    pub value: f64,
    /// Estimated absolute error of `value`
    pub abs_err: f64,
    /// Number of subintervals in the final partition
    pub n_intervals: usize,
    /// Whether the requested tolerance was met
    pub converged: bool,
}

#[derive(Clone, Copy, Debug)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    err: f64,
}

/// 15-point Kronrod rule with the embedded 7-point Gauss rule as the error
/// estimate, scaled as in QUADPACK's `qk15`.
fn kronrod15<F, E>(func: &mut F, a: f64, b: f64) -> Result<Segment, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let abs_half = half.abs();

    let fc = func(center)?;
    let mut res_g = fc * WG[3];
    let mut res_k = fc * WGK[7];
    let mut res_abs = res_k.abs();

    let mut fv1 = [0.0; 7];
    let mut fv2 = [0.0; 7];
    for j in 0..7 {
        let dx = half * XGK[j];
        let f1 = func(center - dx)?;
        let f2 = func(center + dx)?;
        fv1[j] = f1;
        fv2[j] = f2;
        res_k += WGK[j] * (f1 + f2);
        res_abs += WGK[j] * (f1.abs() + f2.abs());
        if j % 2 == 1 {
            res_g += WG[j / 2] * (f1 + f2);
        }
    }

    let mean = 0.5 * res_k;
    let mut res_asc = WGK[7] * (fc - mean).abs();
    for j in 0..7 {
        res_asc += WGK[j] * ((fv1[j] - mean).abs() + (fv2[j] - mean).abs());
    }

    let value = res_k * half;
    res_abs *= abs_half;
    res_asc *= abs_half;

    let mut err = ((res_k - res_g) * half).abs();
    if res_asc != 0.0 && err != 0.0 {
        err = res_asc * (200.0 * err / res_asc).powf(1.5).min(1.0);
    }
    if res_abs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        err = err.max(50.0 * f64::EPSILON * res_abs);
    }

    Ok(Segment { a, b, value, err })
}

/// Globally adaptive bisection: the interval with the largest error is
/// always split next.
fn adaptive<F, E>(
    func: &mut F,
    breaks: &[f64],
    tol: &QuadTolerance,
) -> Result<QuadEstimate, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let cap = tol.max_subdivisions.max(breaks.len().saturating_sub(1));
    let mut segments: Vec<Segment> = Vec::with_capacity(cap + 1);
    for w in breaks.windows(2) {
        segments.push(kronrod15(func, w[0], w[1])?);
    }

    loop {
        let (value, abs_err) = segments
            .iter()
            .fold((0.0, 0.0), |(v, e), s| (v + s.value, e + s.err));
        let target = tol.eps_abs.max(tol.eps_rel * value.abs());

        let estimate = |converged| QuadEstimate {
            value,
            abs_err,
            n_intervals: segments.len(),
            converged,
        };

        if abs_err <= target {
            return Ok(estimate(true));
        }
        if segments.len() >= cap || !abs_err.is_finite() {
            return Ok(estimate(false));
        }

        let worst = segments
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| x.err.total_cmp(&y.err))
            .map(|(ix, _)| ix)
            .unwrap_or(0);

        let seg = segments[worst];
        let mid = 0.5 * (seg.a + seg.b);
        if mid <= seg.a || mid >= seg.b {
            // Interval can no longer be split in floating point
            return Ok(estimate(false));
        }

        let left = kronrod15(func, seg.a, mid)?;
        let right = kronrod15(func, mid, seg.b)?;
        segments[worst] = left;
        segments.push(right);
    }
}

/// Adaptive quadrature of a fallible integrand over [a, b]
///
/// Errors raised by `func` abort the integration and are returned as-is.
///
/// # Example
///
/// ```
/// use mtgp::misc::{try_quad_gk, QuadTolerance};
///
/// let q = try_quad_gk(
///     |x: f64| Ok::<f64, ()>(x.powi(2)),
///     0.0,
///     1.0,
///     &QuadTolerance::default(),
/// )
/// .unwrap();
///
/// assert!(q.converged);
/// assert!((q.value - 1.0 / 3.0).abs() < 1E-10);
/// ```
pub fn try_quad_gk<F, E>(
    mut func: F,
    a: f64,
    b: f64,
    tol: &QuadTolerance,
) -> Result<QuadEstimate, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    if a == b {
        return Ok(QuadEstimate {
            value: 0.0,
            abs_err: 0.0,
            n_intervals: 0,
            converged: true,
        });
    }
    let (lower, upper, sign) = if a < b { (a, b, 1.0) } else { (b, a, -1.0) };
    let mut q = adaptive(&mut func, &[lower, upper], tol)?;
    q.value *= sign;
    Ok(q)
}

/// Adaptive quadrature over [a, b]
pub fn quad_gk<F>(func: F, a: f64, b: f64, tol: &QuadTolerance) -> QuadEstimate
where
    F: Fn(f64) -> f64,
{
    match try_quad_gk(|x| Ok::<f64, Infallible>(func(x)), a, b, tol) {
        Ok(q) => q,
        Err(never) => match never {},
    }
}

/// Maps the open interval (-1, 1) onto the real line: u = t / (1 - t²)
#[inline]
fn to_real_line(t: f64) -> (f64, f64) {
    let s = 1.0 - t * t;
    let u = t / s;
    let du_dt = (1.0 + t * t) / (s * s);
    (u, du_dt)
}

/// Inverse of `to_real_line`
#[inline]
fn from_real_line(u: f64) -> f64 {
    2.0 * u / (1.0 + (1.0 + 4.0 * u * u).sqrt())
}

/// Adaptive quadrature of a fallible integrand over the whole real line
///
/// `points` are locations where the integrand is known to peak or lose
/// smoothness; the initial partition is split at each of them. A narrow
/// peak needs points on its flanks as well as its center, otherwise the
/// neighbouring intervals may sample only its tails.
///
/// # Example
///
/// ```
/// use mtgp::misc::{try_quad_gk_infinite, QuadTolerance};
///
/// let q = try_quad_gk_infinite(
///     |x: f64| Ok::<f64, ()>((-x * x).exp()),
///     &[0.0],
///     &QuadTolerance::default(),
/// )
/// .unwrap();
///
/// assert!((q.value - std::f64::consts::PI.sqrt()).abs() < 1E-8);
/// ```
pub fn try_quad_gk_infinite<F, E>(
    mut func: F,
    points: &[f64],
    tol: &QuadTolerance,
) -> Result<QuadEstimate, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let mut breaks: Vec<f64> = points
        .iter()
        .filter(|u| u.is_finite())
        .map(|&u| from_real_line(u))
        .filter(|t| t.abs() < 1.0)
        .collect();
    breaks.push(-1.0);
    breaks.push(1.0);
    breaks.sort_by(f64::total_cmp);
    breaks.dedup();

    let mut mapped = |t: f64| {
        let (u, du_dt) = to_real_line(t);
        if !u.is_finite() {
            return Ok(0.0);
        }
        let fu = func(u)?;
        Ok(if fu == 0.0 { 0.0 } else { fu * du_dt })
    };

    adaptive(&mut mapped, &breaks, tol)
}
