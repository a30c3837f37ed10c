//! Error taxonomy of the OpenLotto client.
//!
//! Every public async operation resolves to a fully decoded value or to one
//! of the `LottoError` kinds below. Node-side rejections are classified by
//! message so callers can tell a funding problem from a nonce race; reverts
//! carry the decoded custom error when any registered interface knows it.

use alloy::{
    contract::Error as ContractError,
    primitives::{Bytes, B256, U256},
    providers::PendingTransactionError,
    transports::{RpcError, TransportError},
};

use crate::contract_error::{resolve, revert_data, Resolution};
use crate::prelude::{DecodedError, InterfaceRegistry};

pub type Result<T, E = LottoError> = std::result::Result<T, E>;

// ============================================================================
// LottoError
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LottoError {
    /// The node refused the transaction before it reached a block.
    #[error("transaction rejected ({reason:?}): {message}")]
    TransactionRejected { reason: RejectReason, message: String },

    /// The call reverted.
    #[error("contract reverted: {0}")]
    ContractReverted(Revert),

    /// The transaction was mined but its receipt reports failure.
    #[error("transaction {tx_hash} failed on chain")]
    TransactionFailed { tx_hash: B256 },

    /// The transaction succeeded without emitting a matching creation event.
    #[error("no CreatedItem event for {kind} in transaction {tx_hash}")]
    CreatedItemNotFound { kind: &'static str, tx_hash: B256 },

    /// A block-dependent query ran before the first sync completed.
    #[error("{kind} {id} has not been synchronized yet")]
    NotSynchronized { kind: &'static str, id: U256 },

    /// Returned data does not decode as the declared return type.
    #[error("malformed contract result: {0}")]
    MalformedResult(String),

    /// Auto-sync was started outside of a tokio runtime.
    #[error("auto-sync requires a running tokio runtime")]
    RuntimeUnavailable,

    /// A live handle outlived the client it was read through.
    #[error("client handle has been released")]
    ClientReleased,

    #[error(transparent)]
    Transport(TransportError),

    #[error(transparent)]
    PendingTransaction(PendingTransactionError),

    #[error(transparent)]
    Contract(ContractError),
}

impl LottoError {
    /// Map a failed read, decoding revert payloads with `registry`.
    pub fn from_contract(err: ContractError, registry: &InterfaceRegistry) -> Self {
        match err {
            ContractError::TransportError(err) => Self::from_transport(err, registry),
            ContractError::AbiError(err) => LottoError::MalformedResult(err.to_string()),
            err => LottoError::Contract(err),
        }
    }

    /// Map a failed `send()`. Error responses that are not reverts are the
    /// node refusing the transaction.
    pub fn from_send(err: ContractError, registry: &InterfaceRegistry) -> Self {
        match err {
            ContractError::TransportError(err) => Self::from_submission(err, registry),
            err => Self::from_contract(err, registry),
        }
    }

    /// Map a transport failure outside of a submission.
    ///
    /// Error responses are decoded whenever they carry data or name a
    /// revert; everything else is passed through unchanged.
    pub fn from_transport(err: TransportError, registry: &InterfaceRegistry) -> Self {
        match as_revert(&err, registry) {
            Some(revert) => LottoError::ContractReverted(revert),
            None => LottoError::Transport(err),
        }
    }

    /// Map a transport failure of a transaction submission.
    ///
    /// Reverts are decoded as in `from_transport`; any other error response
    /// becomes `TransactionRejected` with a classified reason.
    pub fn from_submission(err: TransportError, registry: &InterfaceRegistry) -> Self {
        if let Some(revert) = as_revert(&err, registry) {
            return LottoError::ContractReverted(revert);
        }
        match err {
            RpcError::ErrorResp(payload) => {
                let message = payload.message.to_string();
                LottoError::TransactionRejected {
                    reason: classify_rejection(&message),
                    message,
                }
            }
            err => LottoError::Transport(err),
        }
    }

    /// Map a failure while waiting for a receipt.
    pub fn from_pending(err: PendingTransactionError, registry: &InterfaceRegistry) -> Self {
        match err {
            PendingTransactionError::TransportError(err) => Self::from_transport(err, registry),
            err => LottoError::PendingTransaction(err),
        }
    }

    /// Decoded custom error, if this is a recognized revert.
    pub fn decoded(&self) -> Option<&DecodedError> {
        match self {
            LottoError::ContractReverted(revert) => revert.decoded(),
            _ => None,
        }
    }
}

// ============================================================================
// Revert
// ============================================================================

/// A reverted call: the decoded custom error when available, always alongside
/// the node's own message so neither channel is lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revert {
    pub resolution: Resolution,
    pub message: String,
}

impl Revert {
    pub fn decoded(&self) -> Option<&DecodedError> {
        self.resolution.decoded()
    }

    pub fn name(&self) -> Option<&str> {
        self.decoded().map(|error| error.name.as_str())
    }

    pub fn data(&self) -> Option<&Bytes> {
        self.resolution.data()
    }
}

impl std::fmt::Display for Revert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.resolution {
            Resolution::Decoded { error, .. } => {
                write!(f, "{} ({}), causedBy: {}", self.message, error, error.detail)
            }
            Resolution::Unrecognized(data) => write!(f, "{} (data: {})", self.message, data),
            Resolution::NoData => f.write_str(&self.message),
        }
    }
}

// ============================================================================
// Rejection classification
// ============================================================================

/// Why the node refused a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Nonce already used on chain
    NonceTooLow,
    /// Nonce leaves a gap
    NonceTooHigh,
    /// Gas price too low to enter or replace in the mempool
    Underpriced,
    /// Balance cannot cover gas * price + value
    InsufficientFunds,
    /// Gas limit below intrinsic cost
    IntrinsicGasTooLow,
    /// Identical transaction already in the mempool
    AlreadyKnown,
    Other,
}

/// Revert carried by an error response: payload data is decoded whenever
/// present, without data the message has to name a revert.
fn as_revert(err: &TransportError, registry: &InterfaceRegistry) -> Option<Revert> {
    let RpcError::ErrorResp(payload) = err else {
        return None;
    };
    let message = payload.message.to_string();
    let resolution = resolve(registry, revert_data(payload));
    if !resolution.has_data() && !is_revert_message(&message) {
        return None;
    }
    if resolution.has_data() && resolution.decoded().is_none() {
        tracing::warn!(
            data = ?resolution.data(),
            %message,
            "revert payload not recognized by any registered interface"
        );
    }
    Some(Revert {
        resolution,
        message,
    })
}

fn is_revert_message(message: &str) -> bool {
    message.to_lowercase().contains("revert")
}

/// Classify a node error message. Wording differs between node
/// implementations, so several patterns are checked per kind.
pub fn classify_rejection(message: &str) -> RejectReason {
    let message = message.to_lowercase();

    if message.contains("nonce too low")
        || message.contains("nonce is too low")
        || (message.contains("invalid nonce") && message.contains("expected"))
    {
        return RejectReason::NonceTooLow;
    }

    if message.contains("nonce too high")
        || message.contains("nonce is too high")
        || message.contains("nonce gap")
    {
        return RejectReason::NonceTooHigh;
    }

    if message.contains("underpriced")
        || message.contains("gas price too low")
        || message.contains("max fee per gas less than block base fee")
    {
        return RejectReason::Underpriced;
    }

    if message.contains("insufficient funds")
        || message.contains("insufficient balance")
        || message.contains("exceeds balance")
    {
        return RejectReason::InsufficientFunds;
    }

    if message.contains("intrinsic gas too low") || message.contains("gas limit too low") {
        return RejectReason::IntrinsicGasTooLow;
    }

    if message.contains("already known")
        || message.contains("already imported")
        || message.contains("known transaction")
    {
        return RejectReason::AlreadyKnown;
    }

    RejectReason::Other
}
