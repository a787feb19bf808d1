//! Identities and tolerances of the position being rolled.

use proteus_domain::Address;
use proteus_domain::math::ratio::SLIPPAGE_SCALE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ARBITRUM_SUSHI: &str = "0xd4d42F0b6DEF4CE0383636770eF773390d85c61A";
const ARBITRUM_GOHM: &str = "0x8D9bA570D6cb60C7e3e0F31343Efe75AB8E65FB1";
const ARBITRUM_WETH: &str = "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1";
const ARBITRUM_SUSHI_ROUTER: &str = "0x1b02da8cb0d097eb8d57a175b88c7d8b47997506";
const ARBITRUM_MINICHEF: &str = "0xF4d73326C13a4Fc5FD7A064217e12780e9Bd62c3";
const GOHM_WETH_POOL_ID: u64 = 12;

/// Invalid roll configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid address for {name}: {value:?} ({message})")]
    InvalidAddress {
        name: &'static str,
        value: String,
        message: String,
    },
    #[error("{name} is {value} thousandths, above the maximum of 1000")]
    ToleranceOutOfRange { name: &'static str, value: u32 },
    #[error("at least one token must be tracked")]
    NoTrackedTokens,
    #[error("transaction deadline must be at least one second")]
    ZeroDeadline,
}

/// Configuration of the roll pipeline and the balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollConfig {
    /// Uniswap-V2 compatible router used for quotes, swaps and liquidity.
    pub router: Address,
    /// MiniChefV2 reward program.
    pub chef: Address,
    /// Wrapped native token, the output of every sell.
    pub wrapped_native: Address,
    /// Reward token sold in full.
    pub reward_token: Address,
    /// Token paired with the native currency in the pool; half is sold.
    pub pair_token: Address,
    /// Pool id of the pair in the reward program.
    pub pool_id: u64,
    /// Tokens listed by the balance report, in display order.
    pub tracked_tokens: Vec<Address>,
    /// Tolerance applied to both floors of the liquidity add, in thousandths.
    #[serde(default = "default_liquidity_slippage")]
    pub liquidity_slippage_thousandths: u32,
    /// Tolerance applied to swap outputs, in thousandths.
    #[serde(default)]
    pub swap_slippage_thousandths: u32,
    /// Seconds from submission after which the router rejects a call.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    /// Symbol printed for the native currency.
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
}

fn default_liquidity_slippage() -> u32 {
    5
}

fn default_deadline_secs() -> u64 {
    100
}

fn default_native_symbol() -> String {
    "ETH".to_string()
}

fn parse_address(name: &'static str, value: &str) -> Result<Address, ConfigError> {
    value
        .parse::<Address>()
        .map_err(|e| ConfigError::InvalidAddress {
            name,
            value: value.to_string(),
            message: e.to_string(),
        })
}

impl RollConfig {
    /// The SushiSwap gOHM/WETH pool on Arbitrum, staked in MiniChef pool 12.
    pub fn sushi_gohm_arbitrum() -> Result<Self, ConfigError> {
        let reward_token = parse_address("reward_token", ARBITRUM_SUSHI)?;
        let pair_token = parse_address("pair_token", ARBITRUM_GOHM)?;
        let wrapped_native = parse_address("wrapped_native", ARBITRUM_WETH)?;

        Ok(Self {
            router: parse_address("router", ARBITRUM_SUSHI_ROUTER)?,
            chef: parse_address("chef", ARBITRUM_MINICHEF)?,
            wrapped_native,
            reward_token,
            pair_token,
            pool_id: GOHM_WETH_POOL_ID,
            tracked_tokens: vec![reward_token, pair_token],
            liquidity_slippage_thousandths: default_liquidity_slippage(),
            swap_slippage_thousandths: 0,
            deadline_secs: default_deadline_secs(),
            native_symbol: default_native_symbol(),
        })
    }

    /// Checks tolerances, the deadline and the tracked token list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("liquidity_slippage_thousandths", self.liquidity_slippage_thousandths),
            ("swap_slippage_thousandths", self.swap_slippage_thousandths),
        ] {
            if value > SLIPPAGE_SCALE {
                return Err(ConfigError::ToleranceOutOfRange { name, value });
            }
        }
        if self.tracked_tokens.is_empty() {
            return Err(ConfigError::NoTrackedTokens);
        }
        if self.deadline_secs == 0 {
            return Err(ConfigError::ZeroDeadline);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_identities() {
        let config = RollConfig::sushi_gohm_arbitrum().unwrap();

        assert_eq!(config.pool_id, 12);
        assert_eq!(config.liquidity_slippage_thousandths, 5);
        assert_eq!(config.swap_slippage_thousandths, 0);
        assert_eq!(config.deadline_secs, 100);
        assert_eq!(
            config.tracked_tokens,
            vec![config.reward_token, config.pair_token]
        );
        assert_eq!(
            format!("{:?}", config.wrapped_native),
            "0x82af49447d8a07e3bd95bd0d56f35241523fbab1"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_tolerance() {
        let mut config = RollConfig::sushi_gohm_arbitrum().unwrap();
        config.liquidity_slippage_thousandths = 1001;

        assert_eq!(
            config.validate(),
            Err(ConfigError::ToleranceOutOfRange {
                name: "liquidity_slippage_thousandths",
                value: 1001,
            })
        );
    }

    #[test]
    fn test_validate_rejects_empty_token_list_and_zero_deadline() {
        let mut config = RollConfig::sushi_gohm_arbitrum().unwrap();
        config.tracked_tokens.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoTrackedTokens));

        let mut config = RollConfig::sushi_gohm_arbitrum().unwrap();
        config.deadline_secs = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDeadline));
    }

    #[test]
    fn test_invalid_address_names_the_field() {
        let err = parse_address("router", "0xnot-an-address").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddress { name: "router", .. }));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let json = r#"{
            "router": "0x1b02da8cb0d097eb8d57a175b88c7d8b47997506",
            "chef": "0xf4d73326c13a4fc5fd7a064217e12780e9bd62c3",
            "wrapped_native": "0x82af49447d8a07e3bd95bd0d56f35241523fbab1",
            "reward_token": "0xd4d42f0b6def4ce0383636770ef773390d85c61a",
            "pair_token": "0x8d9ba570d6cb60c7e3e0f31343efe75ab8e65fb1",
            "pool_id": 12,
            "tracked_tokens": ["0x8d9ba570d6cb60c7e3e0f31343efe75ab8e65fb1"]
        }"#;
        let config: RollConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.liquidity_slippage_thousandths, 5);
        assert_eq!(config.swap_slippage_thousandths, 0);
        assert_eq!(config.deadline_secs, 100);
        assert_eq!(config.native_symbol, "ETH");
        assert_eq!(config.tracked_tokens, vec![config.pair_token]);
    }
}
