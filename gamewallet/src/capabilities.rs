//! Capability contracts for post-provisioning collaborators.
//!
//! Contract reads/writes, token queries and media storage only become
//! meaningful once a smart wallet exists; they are external collaborators,
//! not part of the session core, so this module defines their contracts and
//! nothing else. Token contracts are an explicit tagged union over the
//! capability sets that can serve media, replacing runtime type inspection
//! with a `match`.

use async_trait::async_trait;

use crate::error::BackendResult;

/// ERC721-style capability set.
#[async_trait]
pub trait Erc721Like: Send + Sync {
    /// Metadata URI for a token.
    async fn token_uri(&self, token_id: u64) -> BackendResult<String>;
    /// Number of tokens held by `owner`.
    async fn balance_of(&self, owner: &str) -> BackendResult<u64>;
    /// Total minted supply.
    async fn total_supply(&self) -> BackendResult<u64>;
}

/// ERC1155-style capability set.
#[async_trait]
pub trait Erc1155Like: Send + Sync {
    /// Metadata URI for a token id.
    async fn uri(&self, token_id: u64) -> BackendResult<String>;
    /// Balance of `owner` for a token id.
    async fn balance_of(&self, owner: &str, token_id: u64) -> BackendResult<u64>;
    /// Total supply for a token id.
    async fn total_supply(&self, token_id: u64) -> BackendResult<u64>;
}

/// A token contract tagged by its capability set.
pub enum NftContract {
    /// One-of-a-kind tokens with per-token owners.
    Erc721(Box<dyn Erc721Like>),
    /// Multi-edition tokens with per-id balances.
    Erc1155(Box<dyn Erc1155Like>),
}

impl std::fmt::Debug for NftContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Erc721(_) => f.write_str("NftContract::Erc721"),
            Self::Erc1155(_) => f.write_str("NftContract::Erc1155"),
        }
    }
}

impl NftContract {
    /// Metadata URI for a token, dispatched by capability tag.
    ///
    /// # Errors
    ///
    /// Propagates the underlying contract error.
    pub async fn media_uri(&self, token_id: u64) -> BackendResult<String> {
        match self {
            Self::Erc721(contract) => contract.token_uri(token_id).await,
            Self::Erc1155(contract) => contract.uri(token_id).await,
        }
    }

    /// Balance of `owner` for a token, dispatched by capability tag.
    ///
    /// For ERC721-style contracts the token id is ignored — balances are
    /// per-owner, not per-id.
    ///
    /// # Errors
    ///
    /// Propagates the underlying contract error.
    pub async fn balance_of(&self, owner: &str, token_id: u64) -> BackendResult<u64> {
        match self {
            Self::Erc721(contract) => contract.balance_of(owner).await,
            Self::Erc1155(contract) => contract.balance_of(owner, token_id).await,
        }
    }
}

/// Opaque contract read/write collaborator.
///
/// Implementations require an existing smart wallet for writes; reads may
/// be served without one.
#[async_trait]
pub trait ContractIo: Send + Sync {
    /// Call a read-only contract method.
    async fn read(&self, method: &str, args: &[serde_json::Value]) -> BackendResult<serde_json::Value>;
    /// Submit a state-changing contract call; returns the transaction hash.
    async fn write(&self, method: &str, args: &[serde_json::Value]) -> BackendResult<String>;
}

/// Opaque media storage collaborator (IPFS-style).
#[async_trait]
pub trait StorageIo: Send + Sync {
    /// Upload bytes; returns the content URI.
    async fn upload(&self, bytes: &[u8]) -> BackendResult<String>;
    /// Download the content behind a URI.
    async fn download(&self, uri: &str) -> BackendResult<Vec<u8>>;
}
