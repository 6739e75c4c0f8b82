//! Scalar bound shared by every numeric routine in this crate

use scirs2_core::ndarray_ext::ScalarOperand;
use scirs2_core::numeric::{Float, FloatConst, FromPrimitive, NumAssign, NumCast};
use std::fmt::{Debug, Display};
use std::iter::Sum;

/// Real floating-point element type accepted by the decomposition engine
///
/// Implemented for every type meeting the bounds (`f32`, `f64`).
pub trait DfScalar:
    Float
    + FloatConst
    + FromPrimitive
    + NumAssign
    + NumCast
    + Sum
    + ScalarOperand
    + Send
    + Sync
    + Debug
    + Display
    + 'static
{
}

impl<T> DfScalar for T where
    T: Float
        + FloatConst
        + FromPrimitive
        + NumAssign
        + NumCast
        + Sum
        + ScalarOperand
        + Send
        + Sync
        + Debug
        + Display
        + 'static
{
}
