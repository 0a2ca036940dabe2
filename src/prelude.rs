//! Re-imports for convenience
#[doc(no_inline)]
pub use crate::config::{KernelConfig, TaskDescriptor};
#[doc(no_inline)]
pub use crate::kernel::{
    KernelError, MultiTaskCovariance, MultiTaskKernel, Smoothness,
};
#[doc(no_inline)]
pub use crate::misc::QuadTolerance;
