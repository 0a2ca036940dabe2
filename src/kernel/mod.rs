//! Convolved generalized-Matérn kernels for multi-task Gaussian processes
//!
//! Each task has a smoothness ν and a length scale. The covariance between
//! tasks i and j is the convolution of their basis functions, which has no
//! closed form when the smoothness differs, so it is integrated once on a
//! grid over (lag, l1, l2) per task pair and interpolated afterwards.

mod error;
pub use self::error::*;

mod smoothness;
pub use self::smoothness::*;

mod basis;
pub use self::basis::*;

mod convolution;
pub use self::convolution::*;

mod grid;
pub use self::grid::*;

mod interpolated;
pub use self::interpolated::*;

mod lag;
pub use self::lag::*;

mod assembler;
pub use self::assembler::*;
