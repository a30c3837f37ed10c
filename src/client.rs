//! OpenLotto client facade.
//!
//! `OpenLotto` wraps a provider and the entry-point contract address and
//! exposes every supported operation explicitly. It is cheap to clone; all
//! clones share one interface registry and one set of sync timers.
//!
//! ## Construction
//!
//! ```text
//! OpenLotto::new(address, provider)
//!     registry: IOpenLotto, ILotteryDatabase*, ITicketDatabase*, extras
//!     (* unbound: CreatedItem accepted from any emitter)
//!
//! OpenLotto::connect(address, provider).await
//!     1. LotteryDatabase(), TicketDatabase() on the entry point
//!     2. registry: IOpenLotto, ILotteryDatabase@addr, ITicketDatabase@addr, extras
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let client = OpenLotto::connect(address, provider).await?;
//!
//! let mut lottery = client.new_empty_lottery();
//! lottery.name = "weekly".into();
//! let id = client.create_lottery_and_wait(&lottery).await?;
//!
//! let lottery = client.read_lottery(id).await?;
//! lottery.start_auto_sync();
//! let lottery = lottery.wait_until_first_sync().await?;
//! println!("round {}", lottery.current_round()?);
//! ```

use std::{sync::Arc, time::Duration};

use alloy::{
    primitives::{Address, B256, U256},
    providers::Provider,
};

use crate::bindings::{
    lottery_database_interface, open_lotto_interface, ticket_database_interface,
    IOpenLotto::{self, IOpenLottoInstance},
};
use crate::pending_tx::wait_for_success;
use crate::prelude::{
    BlockSync, Entity, InterfaceRegistry, Lottery, LotteryItem, LottoError, Model,
    PendingCreation, Result, Ticket, TicketItem,
};

// ============================================================================
// Client Configuration
// ============================================================================

/// Behavior knobs of an `OpenLotto` client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Confirmations required before a receipt is scanned (default: 1)
    pub required_confirmations: u64,
    /// Give up waiting for a receipt after this long (default: wait forever)
    pub receipt_timeout: Option<Duration>,
    /// Refresh interval used by `Model::start_auto_sync` (default: 12 seconds)
    pub sync_interval: Duration,
    /// Poll interval of `Model::wait_until_first_sync` (default: 1 second)
    pub first_sync_poll: Duration,
    /// Append interfaces submitted with `register_contract_interface!` to the
    /// registry (default: true)
    pub include_registered_interfaces: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            required_confirmations: 1,
            receipt_timeout: None,
            sync_interval: Duration::from_secs(12),
            first_sync_poll: Duration::from_secs(1),
            include_registered_interfaces: true,
        }
    }
}

impl ClientConfig {
    pub fn with_required_confirmations(mut self, confirmations: u64) -> Self {
        self.required_confirmations = confirmations.max(1);
        self
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = Some(timeout);
        self
    }

    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    pub fn with_first_sync_poll(mut self, poll: Duration) -> Self {
        self.first_sync_poll = poll;
        self
    }

    pub fn with_registered_interfaces(mut self, include: bool) -> Self {
        self.include_registered_interfaces = include;
        self
    }
}

// ============================================================================
// OpenLotto
// ============================================================================

pub(crate) struct ClientInner<P: Provider> {
    pub(crate) contract: IOpenLottoInstance<P>,
    pub(crate) registry: Arc<InterfaceRegistry>,
    pub(crate) config: ClientConfig,
    pub(crate) sync: BlockSync,
}

impl<P: Provider> ClientInner<P> {
    pub(crate) fn error(&self, err: alloy::contract::Error) -> LottoError {
        LottoError::from_contract(err, &self.registry)
    }

    pub(crate) fn send_error(&self, err: alloy::contract::Error) -> LottoError {
        LottoError::from_send(err, &self.registry)
    }

    pub(crate) async fn block_number(&self) -> Result<u64> {
        self.contract
            .provider()
            .get_block_number()
            .await
            .map_err(|err| LottoError::from_transport(err, &self.registry))
    }
}

/// Client of an OpenLotto deployment.
pub struct OpenLotto<P: Provider> {
    inner: Arc<ClientInner<P>>,
}

impl<P: Provider> Clone for OpenLotto<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P> OpenLotto<P>
where
    P: Provider + Clone + 'static,
{
    /// Client over the entry point only; database interfaces are registered
    /// unbound.
    pub fn new(address: Address, provider: P) -> Self {
        Self::with_config(address, provider, ClientConfig::default())
    }

    pub fn with_config(address: Address, provider: P, config: ClientConfig) -> Self {
        let registry = InterfaceRegistry::new()
            .with(open_lotto_interface())
            .with(lottery_database_interface())
            .with(ticket_database_interface());
        Self::assemble(IOpenLotto::new(address, provider), registry, config)
    }

    /// Resolve the database addresses from the entry point, then build a
    /// client whose database interfaces are bound to them.
    pub async fn connect(address: Address, provider: P) -> Result<Self> {
        Self::connect_with_config(address, provider, ClientConfig::default()).await
    }

    pub async fn connect_with_config(
        address: Address,
        provider: P,
        config: ClientConfig,
    ) -> Result<Self> {
        let contract = IOpenLotto::new(address, provider);
        let primary = InterfaceRegistry::new().with(open_lotto_interface());
        let lottery_db = contract
            .LotteryDatabase()
            .call()
            .await
            .map_err(|err| LottoError::from_contract(err, &primary))?;
        let ticket_db = contract
            .TicketDatabase()
            .call()
            .await
            .map_err(|err| LottoError::from_contract(err, &primary))?;

        tracing::info!(%address, %lottery_db, %ticket_db, "connected to OpenLotto");

        let registry = primary
            .with(lottery_database_interface().bound(lottery_db))
            .with(ticket_database_interface().bound(ticket_db));
        Ok(Self::assemble(contract, registry, config))
    }

    pub(crate) fn from_inner(inner: Arc<ClientInner<P>>) -> Self {
        Self { inner }
    }

    fn assemble(
        contract: IOpenLottoInstance<P>,
        registry: InterfaceRegistry,
        config: ClientConfig,
    ) -> Self {
        let registry = if config.include_registered_interfaces {
            registry.with_registered()
        } else {
            registry
        };
        Self {
            inner: Arc::new(ClientInner {
                contract,
                registry: Arc::new(registry),
                config,
                sync: BlockSync::new(),
            }),
        }
    }

    pub fn address(&self) -> Address {
        *self.inner.contract.address()
    }

    pub fn provider(&self) -> &P {
        self.inner.contract.provider()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &InterfaceRegistry {
        &self.inner.registry
    }

    /// Number of sync timers currently running for entities of this client.
    pub fn running_syncs(&self) -> usize {
        self.inner.sync.running()
    }

    // ------------------------------------------------------------------------
    // Lotteries
    // ------------------------------------------------------------------------

    pub fn new_empty_lottery(&self) -> LotteryItem {
        LotteryItem::empty()
    }

    /// Submit `CreateLottery` without waiting for it to be mined.
    pub async fn create_lottery(&self, lottery: &LotteryItem) -> Result<PendingCreation<LotteryItem>> {
        let pending = self
            .inner
            .contract
            .CreateLottery(lottery.to_request_tuple())
            .send()
            .await
            .map_err(|err| self.inner.send_error(err))?;
        tracing::debug!(tx_hash = %pending.tx_hash(), name = %lottery.name, "submitted CreateLottery");
        Ok(PendingCreation::new(pending, self.inner.registry.clone()))
    }

    /// Create a lottery and return its id once the transaction is mined.
    pub async fn create_lottery_and_wait(&self, lottery: &LotteryItem) -> Result<U256> {
        self.create_lottery(lottery)
            .await?
            .created_id(
                self.inner.config.required_confirmations,
                self.inner.config.receipt_timeout,
            )
            .await
    }

    pub async fn read_lottery(&self, id: U256) -> Result<Lottery<P>> {
        let tuple = self
            .inner
            .contract
            .ReadLottery(id)
            .call()
            .await
            .map_err(|err| self.inner.error(err))?;
        Ok(self.model(id, LotteryItem::from_result_tuple(tuple)))
    }

    pub async fn lottery_reserves(&self, id: U256) -> Result<U256> {
        self.inner
            .contract
            .LotteryReserves(id)
            .call()
            .await
            .map_err(|err| self.inner.error(err))
    }

    pub async fn lottery_jackpot(&self, id: U256, round: U256) -> Result<U256> {
        self.inner
            .contract
            .LotteryJackpot(id, round)
            .call()
            .await
            .map_err(|err| self.inner.error(err))
    }

    // ------------------------------------------------------------------------
    // Tickets
    // ------------------------------------------------------------------------

    pub fn new_empty_ticket(&self) -> TicketItem {
        TicketItem::empty()
    }

    /// Submit `BuyTicket` paying `value` wei, without waiting for it to be
    /// mined.
    pub async fn buy_ticket(&self, ticket: &TicketItem, value: U256) -> Result<PendingCreation<TicketItem>> {
        let pending = self
            .inner
            .contract
            .BuyTicket(ticket.to_request_tuple())
            .value(value)
            .send()
            .await
            .map_err(|err| self.inner.send_error(err))?;
        tracing::debug!(
            tx_hash = %pending.tx_hash(),
            lottery_id = %ticket.lottery_id,
            %value,
            "submitted BuyTicket"
        );
        Ok(PendingCreation::new(pending, self.inner.registry.clone()))
    }

    /// Buy a ticket and return its id once the transaction is mined.
    pub async fn buy_ticket_and_wait(&self, ticket: &TicketItem, value: U256) -> Result<U256> {
        self.buy_ticket(ticket, value)
            .await?
            .created_id(
                self.inner.config.required_confirmations,
                self.inner.config.receipt_timeout,
            )
            .await
    }

    pub async fn read_ticket(&self, id: U256) -> Result<Ticket<P>> {
        let tuple = self
            .inner
            .contract
            .ReadTicket(id)
            .call()
            .await
            .map_err(|err| self.inner.error(err))?;
        Ok(self.model(id, TicketItem::from_result_tuple(tuple)))
    }

    /// Prize won by ticket `id` in `round`.
    pub async fn ticket_prizes(&self, id: U256, round: U256) -> Result<U256> {
        self.inner
            .contract
            .TicketPrizes(id, round)
            .call()
            .await
            .map_err(|err| self.inner.error(err))
    }

    /// Withdraw the prize of ticket `id` for `round` and wait until mined.
    pub async fn withdraw_ticket(&self, id: U256, round: U256) -> Result<B256> {
        let pending = self
            .inner
            .contract
            .WithdrawTicket(id, round)
            .send()
            .await
            .map_err(|err| self.inner.send_error(err))?;
        let tx_hash = *pending.tx_hash();
        tracing::debug!(%tx_hash, %id, %round, "submitted WithdrawTicket");

        wait_for_success(
            pending,
            &self.inner.registry,
            self.inner.config.required_confirmations,
            self.inner.config.receipt_timeout,
        )
        .await?;
        Ok(tx_hash)
    }

    // ------------------------------------------------------------------------
    // Chain
    // ------------------------------------------------------------------------

    /// One-shot query of the latest block number.
    pub async fn block_number(&self) -> Result<u64> {
        self.inner.block_number().await
    }

    fn model<E: Entity>(&self, id: U256, entity: E) -> Model<E, P> {
        Model::new(id, entity, Arc::downgrade(&self.inner))
    }
}
