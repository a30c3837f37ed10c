//! Lottery and ticket records and their contract tuple codec.
//!
//! The contract speaks in positional tuples (`IOpenLotto::Lottery`,
//! `IOpenLotto::Ticket`); callers work with the named records below. Both
//! directions are total: the tuple types are fixed by the interface
//! definition, so arity mismatches are compile errors and malformed return
//! data is rejected by the ABI decoder before it reaches `from_result_tuple`.

use alloy::primitives::{Address, FixedBytes, U256};
use serde::{Deserialize, Serialize};

use crate::bindings::IOpenLotto;

/// Number of distribution pool recipients of a lottery.
pub const DISTRIBUTION_POOL_SIZE: usize = 5;
/// Number of prize tiers of a lottery.
pub const PRIZE_POOL_SIZE: usize = 20;

/// An on-chain record with a contract tuple representation.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Discriminator used by `CreatedItem` events.
    const KIND: &'static str;

    /// Positional representation used by the contract.
    type Tuple;

    /// Zero-valued template to populate before submission.
    fn empty() -> Self;

    fn to_request_tuple(&self) -> Self::Tuple;

    fn from_result_tuple(tuple: Self::Tuple) -> Self;
}

// ============================================================================
// LotteryItem
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryItem {
    pub name: String,
    pub init_block: U256,
    pub rounds: U256,
    pub round_blocks: U256,
    /// Price of a single bet in wei
    pub bet_price: U256,
    pub jackpot_min: U256,
    pub distribution_pool_to: [Address; DISTRIBUTION_POOL_SIZE],
    pub distribution_pool_share: [U256; DISTRIBUTION_POOL_SIZE],
    pub prize_pool_share: [U256; PRIZE_POOL_SIZE],
    pub prize_pool_attributes: [FixedBytes<8>; PRIZE_POOL_SIZE],
    pub operator: Address,
    pub attributes: FixedBytes<16>,
}

impl Default for LotteryItem {
    fn default() -> Self {
        Self::empty()
    }
}

impl Entity for LotteryItem {
    const KIND: &'static str = "Lottery";

    type Tuple = IOpenLotto::Lottery;

    fn empty() -> Self {
        Self {
            name: String::new(),
            init_block: U256::ZERO,
            rounds: U256::ZERO,
            round_blocks: U256::ZERO,
            bet_price: U256::ZERO,
            jackpot_min: U256::ZERO,
            distribution_pool_to: [Address::ZERO; DISTRIBUTION_POOL_SIZE],
            distribution_pool_share: [U256::ZERO; DISTRIBUTION_POOL_SIZE],
            prize_pool_share: [U256::ZERO; PRIZE_POOL_SIZE],
            prize_pool_attributes: [FixedBytes::ZERO; PRIZE_POOL_SIZE],
            operator: Address::ZERO,
            attributes: FixedBytes::ZERO,
        }
    }

    fn to_request_tuple(&self) -> IOpenLotto::Lottery {
        IOpenLotto::Lottery {
            Name: self.name.clone(),
            InitBlock: self.init_block,
            Rounds: self.rounds,
            RoundBlocks: self.round_blocks,
            BetPrice: self.bet_price,
            JackpotMin: self.jackpot_min,
            DistributionPoolTo: self.distribution_pool_to,
            DistributionPoolShare: self.distribution_pool_share,
            PrizePoolShare: self.prize_pool_share,
            PrizePoolAttributes: self.prize_pool_attributes,
            Operator: self.operator,
            Attributes: self.attributes,
        }
    }

    fn from_result_tuple(tuple: IOpenLotto::Lottery) -> Self {
        let mut lottery = Self::empty();
        lottery.name = tuple.Name;
        lottery.init_block = tuple.InitBlock;
        lottery.rounds = tuple.Rounds;
        lottery.round_blocks = tuple.RoundBlocks;
        lottery.bet_price = tuple.BetPrice;
        lottery.jackpot_min = tuple.JackpotMin;
        lottery
            .distribution_pool_to
            .copy_from_slice(&tuple.DistributionPoolTo);
        lottery
            .distribution_pool_share
            .copy_from_slice(&tuple.DistributionPoolShare);
        lottery.prize_pool_share.copy_from_slice(&tuple.PrizePoolShare);
        lottery
            .prize_pool_attributes
            .copy_from_slice(&tuple.PrizePoolAttributes);
        lottery.operator = tuple.Operator;
        lottery.attributes = tuple.Attributes;
        lottery
    }
}

// ============================================================================
// TicketItem
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketItem {
    pub lottery_id: U256,
    /// First round covered, 1-based
    pub lottery_round_init: U256,
    /// Last round covered, inclusive
    pub lottery_round_fini: U256,
    pub num_bets: U256,
    pub attributes: FixedBytes<8>,
}

impl Default for TicketItem {
    fn default() -> Self {
        Self::empty()
    }
}

impl TicketItem {
    /// Whether the round range lies within `[1, lottery.rounds]` and is not
    /// inverted. The contract enforces the same rule on `BuyTicket`.
    pub fn fits_lottery(&self, lottery: &LotteryItem) -> bool {
        !self.lottery_round_init.is_zero()
            && self.lottery_round_init <= self.lottery_round_fini
            && self.lottery_round_fini <= lottery.rounds
    }

    /// Number of rounds the ticket takes part in.
    pub fn rounds_covered(&self) -> U256 {
        if self.lottery_round_fini < self.lottery_round_init {
            return U256::ZERO;
        }
        self.lottery_round_fini - self.lottery_round_init + U256::from(1)
    }
}

impl Entity for TicketItem {
    const KIND: &'static str = "Ticket";

    type Tuple = IOpenLotto::Ticket;

    fn empty() -> Self {
        Self {
            lottery_id: U256::ZERO,
            lottery_round_init: U256::ZERO,
            lottery_round_fini: U256::ZERO,
            num_bets: U256::ZERO,
            attributes: FixedBytes::ZERO,
        }
    }

    fn to_request_tuple(&self) -> IOpenLotto::Ticket {
        IOpenLotto::Ticket {
            LotteryID: self.lottery_id,
            LotteryRoundInit: self.lottery_round_init,
            LotteryRoundFini: self.lottery_round_fini,
            NumBets: self.num_bets,
            Attributes: self.attributes,
        }
    }

    fn from_result_tuple(tuple: IOpenLotto::Ticket) -> Self {
        Self {
            lottery_id: tuple.LotteryID,
            lottery_round_init: tuple.LotteryRoundInit,
            lottery_round_fini: tuple.LotteryRoundFini,
            num_bets: tuple.NumBets,
            attributes: tuple.Attributes,
        }
    }
}
