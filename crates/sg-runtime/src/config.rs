//! # Simulator Configuration
//!
//! Node addresses, order terms and the swap engine settings, with
//! environment overrides.

use anyhow::{bail, Context, Result};
use sg_swap_negotiation::{PeerAddress, SwapConfig, Ticker};
use std::env;
use std::time::Duration;

/// Settings for one simulated swap.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Address of the node that broadcasts its order last and funds first.
    pub alice: PeerAddress,
    /// Address of the node holding the complement.
    pub bob: PeerAddress,
    /// Asset Alice offers.
    pub base: Ticker,
    /// Asset Alice wants.
    pub rel: Ticker,
    /// Amount of `base` offered.
    pub base_amount: u64,
    /// Amount of `rel` wanted.
    pub rel_amount: u64,
    /// How long to wait for the handshake to finish.
    pub timeout: Duration,
    /// Engine settings shared by both nodes.
    pub swap: SwapConfig,
}

impl SimConfig {
    /// Built-in defaults: 100 LUX for 1 BTC between two loopback nodes.
    pub fn defaults() -> Result<Self> {
        Ok(Self {
            alice: "127.0.0.1:26868".parse()?,
            bob: "127.0.0.2:26868".parse()?,
            base: Ticker::new("LUX")?,
            rel: Ticker::new("BTC")?,
            base_amount: 100,
            rel_amount: 1,
            timeout: Duration::from_secs(10),
            swap: SwapConfig::default(),
        })
    }

    /// Load configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `SG_SIM_ALICE`, `SG_SIM_BOB`: node addresses
    /// - `SG_SIM_BASE`, `SG_SIM_REL`: tickers
    /// - `SG_SIM_BASE_AMOUNT`, `SG_SIM_REL_AMOUNT`: order amounts
    /// - `SG_SIM_TIMEOUT_SECS`: handshake timeout
    /// - plus everything [`SwapConfig::from_env`] reads
    pub fn from_env() -> Result<Self> {
        let defaults = Self::defaults()?;
        let config = Self {
            alice: parse_var("SG_SIM_ALICE", defaults.alice)?,
            bob: parse_var("SG_SIM_BOB", defaults.bob)?,
            base: match env::var("SG_SIM_BASE") {
                Ok(v) => Ticker::new(v)?,
                Err(_) => defaults.base,
            },
            rel: match env::var("SG_SIM_REL") {
                Ok(v) => Ticker::new(v)?,
                Err(_) => defaults.rel,
            },
            base_amount: parse_var("SG_SIM_BASE_AMOUNT", defaults.base_amount)?,
            rel_amount: parse_var("SG_SIM_REL_AMOUNT", defaults.rel_amount)?,
            timeout: Duration::from_secs(parse_var(
                "SG_SIM_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            swap: SwapConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot produce a swap.
    pub fn validate(&self) -> Result<()> {
        if self.alice == self.bob {
            bail!("alice and bob share address {}", self.alice);
        }
        if self.base == self.rel {
            bail!("base and rel are both {}", self.base);
        }
        if self.base_amount == 0 || self.rel_amount == 0 {
            bail!("order amounts must be positive");
        }
        self.swap.validate()?;
        Ok(())
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) => v.parse().with_context(|| format!("{} = {:?}", key, v)),
        Err(_) => Ok(default),
    }
}
