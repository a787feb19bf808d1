pub mod amount;

pub use amount::{Amount, format_units};
