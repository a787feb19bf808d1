//! Read-side aggregation of an account's holdings.

mod builder;

pub use builder::*;
