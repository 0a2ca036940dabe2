use crate::kernel::KernelError;
use std::result;

pub type Result<T> = result::Result<T, KernelError>;
