use thiserror::Error;

pub mod constant_product;
pub mod ratio;

/// Failure of an amount computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("result does not fit in 256 bits")]
    Overflow,
    #[error("reserves must be non-zero")]
    EmptyReserves,
}
