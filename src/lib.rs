//! # openlotto-client
//!
//! Typed alloy client for the OpenLotto lottery contracts.
//!
//! ## Core Features
//!
//! - **Entity Codec**: `LotteryItem` / `TicketItem` records with zero-valued templates,
//!   converted to and from the contract's positional tuples
//! - **Creation Ids**: ids of new lotteries and tickets recovered from `CreatedItem` logs
//! - **Revert Decoding**: custom errors resolved against an ordered interface registry
//! - **Temporal Model**: activity window and current round derived from block numbers
//! - **Block Sync**: optional background refresh of an entity's current block
//!
//! ## Usage
//!
//! ```ignore
//! use openlotto_client::prelude::*;
//!
//! let provider = ProviderBuilder::new().wallet(wallet).connect_http(rpc_url);
//! let client = OpenLotto::connect(address, provider).await?;
//! let id = client.create_lottery_and_wait(&lottery).await?;
//! ```

// ============================================================================
// Internal Module Declarations
// ============================================================================

/// Entry-point client and its configuration
mod client;

/// Revert payload extraction and resolution
mod contract_error;

/// Lottery and ticket records with their tuple codec
mod entity;

/// Error taxonomy
mod error;

/// Live entity handles with client back-reference
mod model;

/// Creation-id extraction from receipts
mod pending_tx;

/// Ordered contract interface registry
mod registry;

/// Background block-number synchronization
mod sync;

/// Activity window and round arithmetic
mod temporal;

/// Test fixtures and mocked provider (compiled only in test mode)
#[cfg(test)]
pub mod test_harness;

// ============================================================================
// Public Exports
// ============================================================================

/// Solidity interfaces of the OpenLotto contracts.
pub mod bindings;

/// Re-export of alloy so callers can build providers without a direct dependency.
pub use alloy;

#[doc(hidden)]
pub mod __private {
    pub use alloy::sol_types::{SolEventInterface, SolInterface};
    pub use inventory;
    pub use paste;
}

/// Everything needed to talk to an OpenLotto deployment:
///
/// - `OpenLotto` / `ClientConfig` - client facade
/// - `LotteryItem` / `TicketItem` / `Entity` - records and codec
/// - `Lottery` / `Ticket` / `Model` - live handles
/// - `InterfaceRegistry` / `ContractInterface` - decoding descriptors
/// - `LottoError` - error taxonomy
pub mod prelude {
    pub use super::client::*;
    pub use super::contract_error::*;
    pub use super::entity::*;
    pub use super::error::*;
    pub use super::model::*;
    pub use super::pending_tx::*;
    pub use super::registry::*;
    pub use super::sync::*;
    pub use alloy::providers::{Provider, ProviderBuilder};
}
