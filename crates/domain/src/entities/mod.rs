pub mod pair;
pub mod position;
pub mod quote;
pub mod token;

// Re-export for easier access
pub use pair::PairState;
pub use position::PositionSnapshot;
pub use quote::Quote;
pub use token::{TokenBalance, TokenInfo};
