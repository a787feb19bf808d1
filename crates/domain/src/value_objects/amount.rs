use ethers_core::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw token amount paired with its decimal scale, for rendering.
///
/// Displays as `<integer>.<fraction>` with trailing zeros trimmed and at
/// least one fractional digit: `1.5`, `0.0`, `123.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount {
    pub raw: U256,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }
}

/// Renders `amount` at `decimals` fractional digits, e.g. `1.5` or `0.0`.
pub fn format_units(amount: U256, decimals: u8) -> String {
    Amount::new(amount, decimals).to_string()
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.raw.to_string();
        let scale = usize::from(self.decimals);

        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (integer, fraction) = padded.split_at(padded.len() - scale);
        let fraction = fraction.trim_end_matches('0');

        if fraction.is_empty() {
            write!(f, "{integer}.0")
        } else {
            write!(f, "{integer}.{fraction}")
        }
    }
}
