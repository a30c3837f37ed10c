//! Live handles over entities read through a client.
//!
//! A `Model` pairs an entity record with its id and a weak reference to the
//! client that produced it. The reference is only used for lookups (reserves,
//! jackpot, block number) and for the client-owned sync slot of the entity;
//! it never keeps the client alive.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use alloy::{primitives::U256, providers::Provider};

use crate::client::ClientInner;
use crate::prelude::{
    Entity, EntityKey, LotteryItem, LottoError, OpenLotto, Result, TicketItem,
};

/// Entity record plus id and client back-reference.
pub struct Model<E: Entity, P: Provider> {
    id: U256,
    entity: E,
    client: Weak<ClientInner<P>>,
}

pub type Lottery<P> = Model<LotteryItem, P>;
pub type Ticket<P> = Model<TicketItem, P>;

impl<E: Entity, P: Provider> Clone for Model<E, P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            entity: self.entity.clone(),
            client: self.client.clone(),
        }
    }
}

impl<E, P> std::fmt::Debug for Model<E, P>
where
    E: Entity + std::fmt::Debug,
    P: Provider,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("kind", &E::KIND)
            .field("id", &self.id)
            .field("entity", &self.entity)
            .finish()
    }
}

impl<E: Entity, P: Provider> std::ops::Deref for Model<E, P> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.entity
    }
}

impl<E, P> Model<E, P>
where
    E: Entity,
    P: Provider + Clone + 'static,
{
    pub(crate) fn new(id: U256, entity: E, client: Weak<ClientInner<P>>) -> Self {
        Self { id, entity, client }
    }

    pub fn id(&self) -> U256 {
        self.id
    }

    pub fn key(&self) -> EntityKey {
        EntityKey {
            kind: E::KIND,
            id: self.id,
        }
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn into_entity(self) -> E {
        self.entity
    }

    /// The client this handle was read through, if still alive.
    pub fn client(&self) -> Result<OpenLotto<P>> {
        self.inner().map(OpenLotto::from_inner)
    }

    fn inner(&self) -> Result<Arc<ClientInner<P>>> {
        self.client.upgrade().ok_or(LottoError::ClientReleased)
    }

    // ------------------------------------------------------------------------
    // Block sync
    // ------------------------------------------------------------------------

    /// Refresh the cached block on the client's configured interval.
    pub fn start_auto_sync(&self) -> Result<()> {
        let interval = self.inner()?.config.sync_interval;
        self.start_auto_sync_every(interval)
    }

    /// Refresh the cached block now and then every `interval`, until
    /// `stop_auto_sync` or the client is dropped.
    pub fn start_auto_sync_every(&self, interval: Duration) -> Result<()> {
        let inner = self.inner()?;
        let provider = inner.contract.provider().clone();
        inner.sync.start(self.key(), provider, interval)
    }

    /// Cancel auto-sync. Idempotent; a released client has no timers left.
    pub fn stop_auto_sync(&self) {
        if let Ok(inner) = self.inner() {
            inner.sync.stop(&self.key());
        }
    }

    /// Cancel auto-sync and release the cached block of this entity.
    pub fn forget_sync(&self) {
        if let Ok(inner) = self.inner() {
            inner.sync.forget(&self.key());
        }
    }

    pub fn is_synced(&self) -> bool {
        self.synced_block().is_some()
    }

    /// Block number cached by the last successful sync.
    pub fn synced_block(&self) -> Option<u64> {
        self.inner()
            .ok()
            .and_then(|inner| inner.sync.block(&self.key()))
    }

    /// Suspend until the first sync has completed, then hand the handle back.
    pub async fn wait_until_first_sync(self) -> Result<Self> {
        let inner = self.inner()?;
        inner
            .sync
            .wait_first(&self.key(), inner.config.first_sync_poll)
            .await?;
        Ok(self)
    }

    fn require_synced_block(&self) -> Result<u64> {
        self.synced_block().ok_or(LottoError::NotSynchronized {
            kind: E::KIND,
            id: self.id,
        })
    }

    /// Latest block number, queried now regardless of sync state.
    pub async fn current_block(&self) -> Result<u64> {
        self.inner()?.block_number().await
    }
}

impl<P> Model<LotteryItem, P>
where
    P: Provider + Clone + 'static,
{
    /// Whether the lottery is active at the last synced block.
    pub fn is_active(&self) -> Result<bool> {
        Ok(self.entity.is_active_at(self.require_synced_block()?))
    }

    /// Round at the last synced block, zero when inactive.
    pub fn current_round(&self) -> Result<U256> {
        Ok(self.entity.round_at(self.require_synced_block()?))
    }

    pub async fn reserves(&self) -> Result<U256> {
        self.client()?.lottery_reserves(self.id).await
    }

    pub async fn jackpot(&self, round: U256) -> Result<U256> {
        self.client()?.lottery_jackpot(self.id, round).await
    }

    /// Jackpot of the round at the last synced block.
    pub async fn current_jackpot(&self) -> Result<U256> {
        let round = self.current_round()?;
        self.jackpot(round).await
    }
}

impl<P> Model<TicketItem, P>
where
    P: Provider + Clone + 'static,
{
    pub async fn prizes(&self, round: U256) -> Result<U256> {
        self.client()?.ticket_prizes(self.id, round).await
    }

    /// Read the lottery this ticket was bought for.
    pub async fn lottery(&self) -> Result<Model<LotteryItem, P>> {
        self.client()?.read_lottery(self.entity.lottery_id).await
    }
}
