//! Write-side strategies.
//!
//! The roll pipeline harvests rewards, sells them for the native currency,
//! pairs the proceeds into liquidity and stakes the resulting pool tokens.

mod roll;

pub use roll::*;
