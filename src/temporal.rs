//! Block-indexed activity window of a lottery.
//!
//! A lottery is active on blocks `[init_block, init_block + rounds * round_blocks)`
//! and the window is cut into `rounds` consecutive rounds of `round_blocks`
//! blocks each, numbered from 1. Everything here is integer arithmetic on
//! `U256`; the current block is always an argument, never fetched.

use alloy::primitives::U256;

use crate::prelude::LotteryItem;

impl LotteryItem {
    /// First block after the activity window.
    ///
    /// Saturates instead of overflowing, which only matters for parameters no
    /// contract would accept.
    pub fn end_block(&self) -> U256 {
        self.init_block
            .saturating_add(self.rounds.saturating_mul(self.round_blocks))
    }

    pub fn is_active_at(&self, block: u64) -> bool {
        let block = U256::from(block);
        self.init_block <= block && block < self.end_block()
    }

    /// 1-based round containing `block`, or zero outside the activity window.
    pub fn round_at(&self, block: u64) -> U256 {
        if !self.is_active_at(block) {
            return U256::ZERO;
        }
        // active implies round_blocks > 0
        (U256::from(block) - self.init_block) / self.round_blocks + U256::from(1)
    }

    /// First block of `round`, if the lottery has such a round.
    pub fn round_start(&self, round: U256) -> Option<U256> {
        if round.is_zero() || round > self.rounds || self.round_blocks.is_zero() {
            return None;
        }
        Some(self.init_block + (round - U256::from(1)) * self.round_blocks)
    }
}
