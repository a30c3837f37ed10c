//! Creation-id resolution from transaction receipts.
//!
//! `CreateLottery` and `BuyTicket` return the new id, but a transaction's
//! return value is not observable off-chain. The database contracts emit
//! `CreatedItem(itemType, id)` instead, so the id is recovered by waiting for
//! the receipt and scanning its logs.
//!
//! ## Flow
//!
//! ```text
//! send() ──► PendingCreation<E>
//!                 │ created_id()
//!                 ▼
//!           get_receipt()            ── TransactionFailed if status == 0
//!                 │
//!                 ▼
//!   for log in receipt.logs          (emission order)
//!     for iface in registry.accepting(log.address)
//!       decode_log → "CreatedItem"?  ── itemType == E::KIND → id
//!                 │
//!                 ▼
//!     CreatedItemNotFound if nothing matched
//! ```

use std::{marker::PhantomData, sync::Arc, time::Duration};

use alloy::{
    network::{Ethereum, ReceiptResponse},
    primitives::{Log, B256, U256},
    providers::PendingTransactionBuilder,
    sol_types::SolEvent,
};

use crate::bindings::CreatedItem;
use crate::prelude::{Entity, InterfaceRegistry, LottoError, Result};

const CREATED_ITEM: &str = "CreatedItem";

// ============================================================================
// PendingCreation
// ============================================================================

/// A submitted creation transaction whose id has not been resolved yet.
///
/// Dropping it does not cancel anything: the transaction is already in the
/// mempool and may still be mined.
pub struct PendingCreation<E: Entity> {
    pending: PendingTransactionBuilder<Ethereum>,
    registry: Arc<InterfaceRegistry>,
    _entity: PhantomData<E>,
}

impl<E: Entity> PendingCreation<E> {
    pub(crate) fn new(
        pending: PendingTransactionBuilder<Ethereum>,
        registry: Arc<InterfaceRegistry>,
    ) -> Self {
        Self {
            pending,
            registry,
            _entity: PhantomData,
        }
    }

    pub fn tx_hash(&self) -> B256 {
        *self.pending.tx_hash()
    }

    /// Wait for the receipt and extract the created id.
    pub async fn created_id(self, confirmations: u64, timeout: Option<Duration>) -> Result<U256> {
        let tx_hash = self.tx_hash();
        let receipt = wait_for_success(self.pending, &self.registry, confirmations, timeout).await?;

        let id = scan_created_id::<E, _>(
            receipt.inner.logs().iter().map(|log| &log.inner),
            &self.registry,
            tx_hash,
        )?;
        tracing::debug!(kind = E::KIND, %id, %tx_hash, "resolved created id");
        Ok(id)
    }
}

// ============================================================================
// Receipt handling
// ============================================================================

/// Wait for `pending` to be mined with the given number of confirmations and
/// fail unless the receipt reports success.
pub(crate) async fn wait_for_success(
    pending: PendingTransactionBuilder<Ethereum>,
    registry: &InterfaceRegistry,
    confirmations: u64,
    timeout: Option<Duration>,
) -> Result<<Ethereum as alloy::network::Network>::ReceiptResponse> {
    let tx_hash = *pending.tx_hash();
    let receipt = pending
        .with_required_confirmations(confirmations)
        .with_timeout(timeout)
        .get_receipt()
        .await
        .map_err(|err| LottoError::from_pending(err, registry))?;

    if !receipt.status() {
        tracing::warn!(%tx_hash, block = ?receipt.block_number(), "transaction failed on chain");
        return Err(LottoError::TransactionFailed { tx_hash });
    }

    tracing::debug!(
        %tx_hash,
        block = ?receipt.block_number(),
        gas_used = receipt.gas_used(),
        "transaction confirmed"
    );
    Ok(receipt)
}

/// Find the id of the first `CreatedItem` event for `E` among `logs`.
///
/// Logs are visited in the order given, which for a receipt is emission
/// order. Each log is offered to the registry interfaces accepting its
/// emitter and belongs to the first one that decodes it.
pub fn scan_created_id<'a, E, I>(
    logs: I,
    registry: &InterfaceRegistry,
    tx_hash: B256,
) -> Result<U256>
where
    E: Entity,
    I: IntoIterator<Item = &'a Log>,
{
    for log in logs {
        let Some(decoded) = registry
            .accepting(log.address)
            .find_map(|interface| interface.decode_log(&log.data))
        else {
            continue;
        };

        if decoded.name != CREATED_ITEM {
            continue;
        }

        match CreatedItem::decode_log_data(&log.data) {
            Ok(event) if event.itemType == E::KIND => return Ok(event.id),
            Ok(event) => {
                tracing::trace!(
                    %tx_hash,
                    interface = decoded.interface,
                    item_type = %event.itemType,
                    "skipping CreatedItem of another kind"
                );
            }
            Err(err) => {
                tracing::warn!(%tx_hash, interface = decoded.interface, %err, "undecodable CreatedItem");
            }
        }
    }

    Err(LottoError::CreatedItemNotFound {
        kind: E::KIND,
        tx_hash,
    })
}
