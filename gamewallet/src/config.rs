//! Session configuration and the supported chain set.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult, UnknownChainId};

/// Factory address value meaning "no factory configured".
pub const UNSET_FACTORY_ADDRESS: &str = "0x";

/// Default bound applied around each network-bound step.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(30);

/// Chains with first-class support.
///
/// Numeric ids follow the canonical EIP-155 chain registry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainId {
    /// Ethereum mainnet (1).
    EthereumMainnet,
    /// Ethereum Goerli testnet (5).
    EthereumGoerli,
    /// Base mainnet (8453).
    BaseMainnet,
    /// Base Sepolia testnet (84532).
    #[default]
    BaseSepolia,
    /// Arbitrum One (42161).
    ArbitrumMainnet,
    /// Arbitrum Sepolia testnet (421614).
    ArbitrumSepolia,
    /// Polygon PoS mainnet (137).
    PolygonMainnet,
    /// Polygon zkEVM (1101).
    PolygonZkEvm,
    /// Polygon zkEVM testnet (1442).
    PolygonZkEvmTestnet,
    /// OP mainnet (10).
    OpMainnet,
    /// OP Bedrock (28528).
    OpBedrock,
    /// OP Kovan (69).
    OpKovan,
    /// Dogechain mainnet (2000).
    DogechainMainnet,
    /// Dogechain testnet (568).
    DogechainTestnet,
}

impl ChainId {
    /// All supported chains.
    pub const ALL: [Self; 14] = [
        Self::EthereumMainnet,
        Self::EthereumGoerli,
        Self::BaseMainnet,
        Self::BaseSepolia,
        Self::ArbitrumMainnet,
        Self::ArbitrumSepolia,
        Self::PolygonMainnet,
        Self::PolygonZkEvm,
        Self::PolygonZkEvmTestnet,
        Self::OpMainnet,
        Self::OpBedrock,
        Self::OpKovan,
        Self::DogechainMainnet,
        Self::DogechainTestnet,
    ];

    /// The EIP-155 numeric chain id.
    #[must_use]
    pub const fn id(self) -> u64 {
        match self {
            Self::EthereumMainnet => 1,
            Self::EthereumGoerli => 5,
            Self::BaseMainnet => 8453,
            Self::BaseSepolia => 84532,
            Self::ArbitrumMainnet => 42161,
            Self::ArbitrumSepolia => 421_614,
            Self::PolygonMainnet => 137,
            Self::PolygonZkEvm => 1101,
            Self::PolygonZkEvmTestnet => 1442,
            Self::OpMainnet => 10,
            Self::OpBedrock => 28528,
            Self::OpKovan => 69,
            Self::DogechainMainnet => 2000,
            Self::DogechainTestnet => 568,
        }
    }

    /// Whether this is a test network.
    #[must_use]
    pub const fn is_testnet(self) -> bool {
        matches!(
            self,
            Self::EthereumGoerli
                | Self::BaseSepolia
                | Self::ArbitrumSepolia
                | Self::PolygonZkEvmTestnet
                | Self::OpBedrock
                | Self::OpKovan
                | Self::DogechainTestnet
        )
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", self.id())
    }
}

impl TryFrom<u64> for ChainId {
    type Error = UnknownChainId;

    fn try_from(value: u64) -> std::result::Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|chain| chain.id() == value)
            .ok_or(UnknownChainId(value))
    }
}

/// Immutable session configuration.
///
/// Owned by whoever starts a session; handed to
/// [`ClientSession::initialize`](crate::session::ClientSession::initialize)
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Target chain.
    #[serde(default)]
    pub chain: ChainId,
    /// Project client id issued by the wallet service. Required.
    pub client_id: String,
    /// Application bundle id. Required.
    pub bundle_id: String,
    /// Account factory contract address; [`UNSET_FACTORY_ADDRESS`] when unset.
    #[serde(default = "default_factory_address")]
    pub wallet_factory_address: String,
    /// Whether smart-wallet transactions are gas-sponsored.
    #[serde(default = "default_gasless")]
    pub gasless: bool,
    /// Bound applied around each network-bound step.
    #[serde(default = "default_op_timeout")]
    pub op_timeout: Duration,
}

fn default_factory_address() -> String {
    UNSET_FACTORY_ADDRESS.to_string()
}

const fn default_gasless() -> bool {
    true
}

const fn default_op_timeout() -> Duration {
    DEFAULT_OP_TIMEOUT
}

impl SessionConfig {
    /// Create a builder.
    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Check that all required fields are present.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] when `client_id` or
    /// `bundle_id` is empty.
    pub fn validate(&self) -> SessionResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(SessionError::InvalidConfig("client_id is required".into()));
        }
        if self.bundle_id.trim().is_empty() {
            return Err(SessionError::InvalidConfig("bundle_id is required".into()));
        }
        Ok(())
    }

    /// Whether a wallet factory address has been configured.
    #[must_use]
    pub fn has_factory_address(&self) -> bool {
        !self.wallet_factory_address.is_empty()
            && self.wallet_factory_address != UNSET_FACTORY_ADDRESS
    }
}

/// Builder for [`SessionConfig`].
///
/// ```rust,ignore
/// let config = SessionConfig::builder()
///     .chain(ChainId::BaseSepolia)
///     .client_id("abc")
///     .bundle_id("com.example.game")
///     .wallet_factory_address("0xFEED")
///     .gasless(true)
///     .build()?;
/// ```
#[derive(Debug, Default, Clone)]
pub struct SessionConfigBuilder {
    chain: ChainId,
    client_id: Option<String>,
    bundle_id: Option<String>,
    wallet_factory_address: Option<String>,
    gasless: Option<bool>,
    op_timeout: Option<Duration>,
}

impl SessionConfigBuilder {
    /// Set the target chain (default: Base Sepolia).
    #[must_use]
    pub const fn chain(mut self, chain: ChainId) -> Self {
        self.chain = chain;
        self
    }

    /// Set the project client id. Required.
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the application bundle id. Required.
    #[must_use]
    pub fn bundle_id(mut self, bundle_id: impl Into<String>) -> Self {
        self.bundle_id = Some(bundle_id.into());
        self
    }

    /// Set the account factory contract address.
    #[must_use]
    pub fn wallet_factory_address(mut self, address: impl Into<String>) -> Self {
        self.wallet_factory_address = Some(address.into());
        self
    }

    /// Enable or disable gas sponsoring (default: enabled).
    #[must_use]
    pub const fn gasless(mut self, gasless: bool) -> Self {
        self.gasless = Some(gasless);
        self
    }

    /// Set the per-step network timeout (default: 30 s).
    #[must_use]
    pub const fn op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = Some(timeout);
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] when `client_id` or
    /// `bundle_id` is missing or empty.
    pub fn build(self) -> SessionResult<SessionConfig> {
        let config = SessionConfig {
            chain: self.chain,
            client_id: self.client_id.unwrap_or_default(),
            bundle_id: self.bundle_id.unwrap_or_default(),
            wallet_factory_address: self
                .wallet_factory_address
                .unwrap_or_else(default_factory_address),
            gasless: self.gasless.unwrap_or(true),
            op_timeout: self.op_timeout.unwrap_or(DEFAULT_OP_TIMEOUT),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ids_round_trip_through_numeric_form() {
        for chain in ChainId::ALL {
            assert_eq!(ChainId::try_from(chain.id()), Ok(chain));
        }
        assert_eq!(ChainId::try_from(82532), Err(UnknownChainId(82532)));
    }

    #[test]
    fn builder_applies_defaults() {
        let config = SessionConfig::builder()
            .client_id("abc")
            .bundle_id("com.test")
            .build()
            .unwrap();

        assert_eq!(config.chain, ChainId::BaseSepolia);
        assert_eq!(config.wallet_factory_address, UNSET_FACTORY_ADDRESS);
        assert!(config.gasless);
        assert_eq!(config.op_timeout, DEFAULT_OP_TIMEOUT);
        assert!(!config.has_factory_address());
    }

    #[test]
    fn build_rejects_missing_required_fields() {
        let err = SessionConfig::builder().bundle_id("com.test").build();
        assert!(matches!(err, Err(SessionError::InvalidConfig(_))));

        let err = SessionConfig::builder()
            .client_id("abc")
            .bundle_id("   ")
            .build();
        assert!(matches!(err, Err(SessionError::InvalidConfig(_))));
    }

    #[test]
    fn config_deserializes_from_json_with_defaults() {
        let config: SessionConfig = serde_json::from_str(
            r#"{"chain":"base-sepolia","client_id":"abc","bundle_id":"com.test"}"#,
        )
        .unwrap();

        assert_eq!(config.chain, ChainId::BaseSepolia);
        assert!(config.gasless);
        assert_eq!(config.wallet_factory_address, UNSET_FACTORY_ADDRESS);
        config.validate().unwrap();
    }
}
