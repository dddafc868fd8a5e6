use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - underflow")]
    Underflow,
    #[error("Math error - division by zero")]
    DivisionByZero,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("State error - sqrtPrice out of bounds")]
    SqrtPriceOutOfBounds,

    #[error("State error - tick out of bounds")]
    TickOutOfBounds,

    #[error("State error - tick {0} is not initialized")]
    TickNotInitialized(i32),

    #[error("State error - tick index has no initialized tick past {tick} (rising: {rising})")]
    TickIndexExhausted { tick: i32, rising: bool },

    #[error("State error - tick index is not sorted ascending at tick {tick}")]
    UnsortedTickIndex { tick: i32 },

    #[error("State error - tick index link at {tick} is not symmetric")]
    BrokenTickLink { tick: i32 },

    #[error("State error - reinvestment token supply is 0")]
    ReinvestmentSupplyIsZero,

    #[error("State error - fee units {0} out of range")]
    InvalidFeeUnits(u32),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SwapError {
    #[error("Swap error - amount specified is 0")]
    AmountSpecifiedIsZero,

    #[error("Swap error - bad limit sqrtP")]
    InvalidPriceLimit,

    #[error("Swap error - amount at index {index} is smaller than a previous amount")]
    AmountsNotAscending { index: usize },

    #[error("Swap error - amount at index {index} does not fit in a signed 256-bit integer")]
    AmountOverflow { index: usize },

    #[error("Swap error - token leg has an unexpected sign")]
    UnexpectedSign,

    #[error("Swap error - remaining specified amount changed sign")]
    SpecifiedAmountSignFlipped,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    MathError(#[from] crate::error::MathError),

    #[error(transparent)]
    StateError(#[from] crate::error::StateError),

    #[error(transparent)]
    SwapError(#[from] crate::error::SwapError),
}
