use std::time::Duration;

use alloy::{
    primitives::{B256, U256, U64},
    sol_types::SolError,
};

use super::*;
use crate::bindings::{ILotteryDatabase, IOpenLotto, ITicketDatabase};
use crate::prelude::{ClientConfig, LottoError, OpenLotto, RejectReason, Resolution};

fn client(provider: RootProvider) -> OpenLotto<RootProvider> {
    OpenLotto::with_config(
        OPEN_LOTTO,
        provider,
        ClientConfig::default().with_first_sync_poll(Duration::from_millis(5)),
    )
}

#[tokio::test]
async fn test_read_lottery() -> anyhow::Result<()> {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    let expected = filled_lottery(OPERATOR);
    push_return(&asserter, &expected.to_request_tuple());

    let lottery = client.read_lottery(U256::from(1)).await?;
    assert_eq!(lottery.id(), U256::from(1));
    assert_eq!(lottery.entity(), &expected);
    assert_eq!(lottery.name, "dummy");
    assert_eq!(lottery.key().kind, "Lottery");
    Ok(())
}

#[tokio::test]
async fn test_read_ticket_and_its_lottery() -> anyhow::Result<()> {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    let expected = filled_ticket(U256::from(4));
    push_return(&asserter, &expected.to_request_tuple());
    push_return(&asserter, &filled_lottery(OPERATOR).to_request_tuple());

    let ticket = client.read_ticket(U256::from(2)).await?;
    assert_eq!(ticket.entity(), &expected);

    let lottery = ticket.lottery().await?;
    assert_eq!(lottery.id(), U256::from(4));
    assert_eq!(lottery.operator, OPERATOR);
    Ok(())
}

#[tokio::test]
async fn test_scalar_reads() -> anyhow::Result<()> {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    push_return(&asserter, &U256::from(500));
    push_return(&asserter, &U256::from(75));
    push_return(&asserter, &U256::from(3));
    asserter.push_success(&U64::from(1234));

    assert_eq!(client.lottery_reserves(U256::from(1)).await?, U256::from(500));
    assert_eq!(
        client.lottery_jackpot(U256::from(1), U256::from(2)).await?,
        U256::from(75)
    );
    assert_eq!(
        client.ticket_prizes(U256::from(9), U256::from(1)).await?,
        U256::from(3)
    );
    assert_eq!(client.block_number().await?, 1234);
    Ok(())
}

#[tokio::test]
async fn test_read_revert_is_decoded() {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    asserter.push_failure(revert_payload(ITicketDatabase::InvalidLottery {}.abi_encode().into()));

    let err = client.read_ticket(U256::from(99)).await.unwrap_err();
    let decoded = err.decoded().expect("decoded revert");
    assert_eq!(decoded.name, "InvalidLottery");
    assert_eq!(decoded.interface, "ITicketDatabase");
}

#[tokio::test]
async fn test_create_revert_from_second_interface() {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    asserter.push_failure(revert_payload(ILotteryDatabase::InvalidName {}.abi_encode().into()));

    let mut lottery = filled_lottery(OPERATOR);
    lottery.name.clear();
    let err = client.create_lottery_and_wait(&lottery).await.unwrap_err();

    let LottoError::ContractReverted(revert) = &err else {
        panic!("expected revert, got {err:?}");
    };
    assert_eq!(revert.name(), Some("InvalidName"));
    assert_eq!(revert.decoded().unwrap().interface, "ILotteryDatabase");
}

#[tokio::test]
async fn test_buy_rejection_is_classified() {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    asserter.push_failure(rejection_payload("insufficient funds for gas * price + value"));

    let err = client
        .buy_ticket_and_wait(&filled_ticket(U256::from(1)), U256::from(10))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            LottoError::TransactionRejected {
                reason: RejectReason::InsufficientFunds,
                ..
            }
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_withdraw_unknown_revert_keeps_raw_data() {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    let data = Bytes::from(vec![0xca, 0xfe, 0xba, 0xbe]);
    asserter.push_failure(revert_payload(data.clone()));

    let err = client
        .withdraw_ticket(U256::from(1), U256::from(1))
        .await
        .unwrap_err();
    let LottoError::ContractReverted(revert) = err else {
        panic!("expected revert");
    };
    assert_eq!(revert.resolution, Resolution::Unrecognized(data));
}

#[tokio::test]
async fn test_malformed_result_fails_fast() {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    asserter.push_success(&Bytes::from(vec![0x01, 0x02, 0x03]));

    let err = client.read_lottery(U256::from(1)).await.unwrap_err();
    assert!(matches!(err, LottoError::MalformedResult(_)), "got {err:?}");
}

#[tokio::test]
async fn test_connect_binds_databases() -> anyhow::Result<()> {
    let (provider, asserter) = mocked_provider();
    push_return(&asserter, &LOTTERY_DB);
    push_return(&asserter, &TICKET_DB);

    let client = OpenLotto::connect(OPEN_LOTTO, provider).await?;
    let interfaces = client.registry().all();

    assert_eq!(interfaces[0].name, "IOpenLotto");
    assert_eq!(interfaces[0].address, None);
    assert_eq!(interfaces[1].name, "ILotteryDatabase");
    assert_eq!(interfaces[1].address, Some(LOTTERY_DB));
    assert_eq!(interfaces[2].name, "ITicketDatabase");
    assert_eq!(interfaces[2].address, Some(TICKET_DB));
    assert_eq!(client.address(), OPEN_LOTTO);
    Ok(())
}

#[tokio::test]
async fn test_connect_failure_returns_no_client() {
    let (provider, asserter) = mocked_provider();
    push_return(&asserter, &LOTTERY_DB);
    asserter.push_failure(rejection_payload("header not found"));

    let err = OpenLotto::connect(OPEN_LOTTO, provider).await.err().unwrap();
    assert!(matches!(err, LottoError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_registry_without_extras() {
    let (provider, _asserter) = mocked_provider();
    let client = OpenLotto::with_config(
        OPEN_LOTTO,
        provider,
        ClientConfig::default().with_registered_interfaces(false),
    );
    let names: Vec<_> = client.registry().all().iter().map(|i| i.name).collect();
    assert_eq!(names, ["IOpenLotto", "ILotteryDatabase", "ITicketDatabase"]);
    assert!(client.registry().all().iter().all(|i| i.address.is_none()));
}

#[tokio::test]
async fn test_lottery_sync_lifecycle() -> anyhow::Result<()> {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    push_return(&asserter, &filled_lottery(OPERATOR).to_request_tuple());
    let lottery = client.read_lottery(U256::from(1)).await?;

    assert!(!lottery.is_synced());
    assert!(matches!(
        lottery.is_active(),
        Err(LottoError::NotSynchronized { kind: "Lottery", .. })
    ));

    asserter.push_success(&U64::from(109));
    lottery.start_auto_sync_every(Duration::from_secs(3600))?;
    let lottery = lottery.wait_until_first_sync().await?;

    assert!(lottery.is_synced());
    assert_eq!(lottery.synced_block(), Some(109));
    assert!(lottery.is_active()?);
    assert_eq!(lottery.current_round()?, U256::from(1));
    assert_eq!(client.running_syncs(), 1);

    push_return(&asserter, &U256::from(42));
    assert_eq!(lottery.current_jackpot().await?, U256::from(42));

    lottery.stop_auto_sync();
    lottery.stop_auto_sync();
    assert_eq!(client.running_syncs(), 0);
    Ok(())
}

#[tokio::test]
async fn test_wait_without_auto_sync_is_not_synchronized() -> anyhow::Result<()> {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    push_return(&asserter, &filled_ticket(U256::from(1)).to_request_tuple());
    let ticket = client.read_ticket(U256::from(5)).await?;

    let err = ticket.wait_until_first_sync().await.unwrap_err();
    assert!(matches!(err, LottoError::NotSynchronized { kind: "Ticket", .. }));
    Ok(())
}

#[tokio::test]
async fn test_model_outliving_client() -> anyhow::Result<()> {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    push_return(&asserter, &filled_lottery(OPERATOR).to_request_tuple());
    let lottery = client.read_lottery(U256::from(1)).await?;
    drop(client);

    assert!(matches!(lottery.reserves().await, Err(LottoError::ClientReleased)));
    assert!(matches!(lottery.start_auto_sync(), Err(LottoError::ClientReleased)));
    lottery.stop_auto_sync();
    assert!(!lottery.is_synced());
    assert_eq!(lottery.entity().name, "dummy");
    Ok(())
}

#[tokio::test]
async fn test_empty_templates() {
    let (provider, _asserter) = mocked_provider();
    let client = client(provider);
    assert_eq!(client.new_empty_lottery(), LotteryItem::empty());
    assert_eq!(client.new_empty_ticket(), TicketItem::empty());
}

#[tokio::test]
async fn test_entry_point_errors_are_registered_first() {
    let (provider, _asserter) = mocked_provider();
    let client = client(provider);
    let data = IOpenLotto::TicketAlreadyWithdrawn {}.abi_encode();
    let decoded = crate::prelude::resolve_error(client.registry(), &data).unwrap();
    assert_eq!(decoded.interface, "IOpenLotto");
}

#[tokio::test]
async fn test_create_lottery_resolves_id_from_receipt() -> anyhow::Result<()> {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    let tx_hash = B256::repeat_byte(0x01);
    let logs = [
        unrelated_log(LOTTERY_DB),
        created_item_log(LOTTERY_DB, "Lottery", 1),
    ];
    push_mined(&asserter, tx_hash, true, &logs);

    let pending = client.create_lottery(&filled_lottery(OPERATOR)).await?;
    assert_eq!(pending.tx_hash(), tx_hash);
    assert_eq!(pending.created_id(1, None).await?, U256::from(1));
    Ok(())
}

#[tokio::test]
async fn test_sequential_creates_yield_contiguous_ids() -> anyhow::Result<()> {
    let mut ids = Vec::new();
    for n in 1..=3u64 {
        let (provider, asserter) = mocked_provider();
        let client = client(provider);

        let logs = [
            unrelated_log(OPERATOR),
            created_item_log(LOTTERY_DB, "Lottery", n),
        ];
        push_mined(&asserter, B256::repeat_byte(n as u8), true, &logs);
        ids.push(client.create_lottery_and_wait(&filled_lottery(OPERATOR)).await?);
    }

    assert_eq!(ids, [U256::from(1), U256::from(2), U256::from(3)]);
    Ok(())
}

#[tokio::test]
async fn test_buy_ticket_resolves_ticket_id() -> anyhow::Result<()> {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    let logs = [
        created_item_log(TICKET_DB, "Ticket", 12),
        created_item_log(LOTTERY_DB, "Lottery", 3),
    ];
    push_mined(&asserter, B256::repeat_byte(0x07), true, &logs);

    let id = client
        .buy_ticket_and_wait(&filled_ticket(U256::from(3)), U256::from(10))
        .await?;
    assert_eq!(id, U256::from(12));
    Ok(())
}

#[tokio::test]
async fn test_failed_receipt_status() {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    let tx_hash = B256::repeat_byte(0x09);
    push_mined(&asserter, tx_hash, false, &[]);

    let err = client
        .create_lottery_and_wait(&filled_lottery(OPERATOR))
        .await
        .unwrap_err();
    assert!(
        matches!(err, LottoError::TransactionFailed { tx_hash: hash } if hash == tx_hash),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_mined_without_created_item() {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    push_mined(&asserter, B256::repeat_byte(0x0a), true, &[unrelated_log(LOTTERY_DB)]);

    let err = client
        .create_lottery_and_wait(&filled_lottery(OPERATOR))
        .await
        .unwrap_err();
    assert!(matches!(err, LottoError::CreatedItemNotFound { kind: "Lottery", .. }));
}

#[tokio::test]
async fn test_withdraw_returns_tx_hash() -> anyhow::Result<()> {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    let tx_hash = B256::repeat_byte(0x0c);
    push_mined(&asserter, tx_hash, true, &[]);

    assert_eq!(client.withdraw_ticket(U256::from(1), U256::from(1)).await?, tx_hash);
    Ok(())
}

#[tokio::test]
async fn test_non_revert_read_errors_pass_through() {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    asserter.push_failure(rejection_payload("header not found"));
    asserter.push_failure(rejection_payload("rate limit exceeded"));

    let err = client.block_number().await.unwrap_err();
    assert!(matches!(err, LottoError::Transport(_)), "got {err:?}");

    let err = client.read_lottery(U256::from(1)).await.unwrap_err();
    assert!(matches!(err, LottoError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_forget_sync_releases_slot() -> anyhow::Result<()> {
    let (provider, asserter) = mocked_provider();
    let client = client(provider);

    push_return(&asserter, &filled_ticket(U256::from(1)).to_request_tuple());
    let ticket = client.read_ticket(U256::from(5)).await?;

    asserter.push_success(&U64::from(300));
    ticket.start_auto_sync_every(Duration::from_secs(3600))?;
    let ticket = ticket.wait_until_first_sync().await?;
    assert_eq!(ticket.synced_block(), Some(300));

    ticket.forget_sync();
    assert!(!ticket.is_synced());
    assert_eq!(client.running_syncs(), 0);
    Ok(())
}
