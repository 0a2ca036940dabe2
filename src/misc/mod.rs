//! Numeric utilities
pub mod bessel;
mod func;
mod interp;
mod par;
mod quad;

pub use func::*;
pub use interp::*;
pub use par::*;
pub use quad::*;
