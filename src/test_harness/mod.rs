//! Fixtures and a mocked provider for exercising the client without a node.
//!
//! The provider is an alloy `RootProvider` over a mock transport: every RPC
//! request pops the next response pushed on the paired `Asserter`, in order.
//!
//! # Example
//!
//! ```ignore
//! let (provider, asserter) = mocked_provider();
//! asserter.push_success(&U64::from(109));
//! assert_eq!(provider.get_block_number().await?, 109);
//! ```

#[cfg(test)]
mod tests;

use alloy::{
    primitives::{address, Address, Bloom, Bytes, Log, B256, U256},
    providers::{ProviderBuilder, RootProvider},
    rpc::json_rpc::ErrorPayload,
    sol_types::{SolEvent, SolValue},
    transports::mock::Asserter,
};

use serde_json::{json, Value};

use crate::bindings::CreatedItem;
use crate::prelude::{Entity, LotteryItem, TicketItem};

pub const OPEN_LOTTO: Address = address!("0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0");
pub const LOTTERY_DB: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
pub const TICKET_DB: Address = address!("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512");
pub const OPERATOR: Address = address!("0x2279B7A0a67DB372996a5FaB50D91eAA73d2eBe6");

alloy::sol! {
    #[sol(all_derives)]
    event Transfer(address indexed from, address indexed to, uint256 value);
}

// ============================================================================
// Provider
// ============================================================================

/// Provider answering from a scripted queue of responses.
pub fn mocked_provider() -> (RootProvider, Asserter) {
    let asserter = Asserter::new();
    let provider = ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_mocked_client(asserter.clone());
    (provider, asserter)
}

/// Queue the return data of an `eth_call`.
pub fn push_return<T: SolValue>(asserter: &Asserter, value: &T) {
    asserter.push_success(&Bytes::from(value.abi_encode()));
}

// ============================================================================
// Entities
// ============================================================================

/// Lottery with InitBlock=10, Rounds=10, RoundBlocks=100.
pub fn filled_lottery(operator: Address) -> LotteryItem {
    let mut lottery = LotteryItem::empty();
    lottery.name = "dummy".into();
    lottery.init_block = U256::from(10);
    lottery.rounds = U256::from(10);
    lottery.round_blocks = U256::from(100);
    lottery.bet_price = U256::from(10_000_000_000_000_000u128);
    lottery.prize_pool_share[0] = U256::from(1_000_000_000_000_000_000u128);
    lottery.operator = operator;
    lottery
}

/// Single-bet ticket for round 1 of `lottery_id`.
pub fn filled_ticket(lottery_id: U256) -> TicketItem {
    let mut ticket = TicketItem::empty();
    ticket.lottery_id = lottery_id;
    ticket.lottery_round_init = U256::from(1);
    ticket.lottery_round_fini = U256::from(1);
    ticket.num_bets = U256::from(1);
    ticket
}

// ============================================================================
// Chain data
// ============================================================================

/// JSON-RPC error response of a reverted call carrying `data`.
pub fn revert_payload(data: Bytes) -> ErrorPayload {
    ErrorPayload {
        code: 3,
        message: "execution reverted".into(),
        data: Some(serde_json::value::to_raw_value(&data).unwrap()),
    }
}

/// JSON-RPC error response without revert data.
pub fn rejection_payload(message: &'static str) -> ErrorPayload {
    ErrorPayload {
        code: -32000,
        message: message.into(),
        data: None,
    }
}

pub fn created_item_log(emitter: Address, item_type: &str, id: u64) -> Log {
    let event = CreatedItem {
        itemType: item_type.to_owned(),
        id: U256::from(id),
    };
    Log {
        address: emitter,
        data: event.encode_log_data(),
    }
}

/// An ERC-20 transfer, declared by none of the OpenLotto interfaces.
pub fn unrelated_log(emitter: Address) -> Log {
    let event = Transfer {
        from: OPERATOR,
        to: emitter,
        value: U256::from(1),
    };
    Log {
        address: emitter,
        data: event.encode_log_data(),
    }
}

/// Receipt of `tx_hash` mined in block 16 with `logs` in emission order.
pub fn receipt_json(tx_hash: B256, success: bool, logs: &[Log]) -> Value {
    let block_hash = B256::repeat_byte(0x0b);
    let logs: Vec<Value> = logs
        .iter()
        .enumerate()
        .map(|(index, log)| {
            json!({
                "address": log.address,
                "topics": log.data.topics(),
                "data": log.data.data,
                "blockHash": block_hash,
                "blockNumber": "0x10",
                "transactionHash": tx_hash,
                "transactionIndex": "0x0",
                "logIndex": format!("{index:#x}"),
                "removed": false,
            })
        })
        .collect();

    json!({
        "type": "0x2",
        "status": if success { "0x1" } else { "0x0" },
        "cumulativeGasUsed": "0x5208",
        "logs": logs,
        "logsBloom": Bloom::ZERO,
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": block_hash,
        "blockNumber": "0x10",
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "from": OPERATOR,
        "to": OPEN_LOTTO,
        "contractAddress": null,
    })
}

/// Queue the responses of a submitted transaction that gets mined: the hash
/// for `eth_sendTransaction`, then its receipt. The receipt is queued twice
/// since the provider's block watcher may poll once before the receipt is
/// fetched.
pub fn push_mined(asserter: &Asserter, tx_hash: B256, success: bool, logs: &[Log]) {
    asserter.push_success(&tx_hash);
    let receipt = receipt_json(tx_hash, success, logs);
    asserter.push_success(&receipt);
    asserter.push_success(&receipt);
}
