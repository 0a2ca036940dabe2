//! Mathematical constants

/// The square root of π
pub const SQRT_PI: f64 = 1.772_453_850_905_515_9;
/// Euler-Mascheroni Constant
pub const EULER_MASCERONI: f64 = 0.577_215_664_901_532_9;
/// The lower edge of the precomputed lag axis
pub const LAG_MIN: f64 = -10.0;
/// The upper edge of the precomputed lag axis
pub const LAG_MAX: f64 = 10.0;
/// Default absolute tolerance of the convolution quadrature
pub const QUAD_EPS_ABS: f64 = 1E-8;
/// Default relative tolerance of the convolution quadrature
pub const QUAD_EPS_REL: f64 = 1E-8;
/// Default cap on the number of quadrature subintervals
pub const QUAD_MAX_SUBDIVISIONS: usize = 100;
