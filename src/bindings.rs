//! Solidity interfaces of the OpenLotto contracts.
//!
//! `IOpenLotto` is the entry point users talk to. Lotteries and tickets are
//! stored in two database contracts whose addresses the entry point exposes;
//! the databases are the ones emitting `CreatedItem`, so their events and
//! errors must be decodable even though calls never target them directly.

use crate::prelude::ContractInterface;

alloy::sol! {
    #[sol(rpc, all_derives)]
    interface IOpenLotto {
        struct Lottery {
            string Name;
            uint256 InitBlock;
            uint256 Rounds;
            uint256 RoundBlocks;
            uint256 BetPrice;
            uint256 JackpotMin;
            address[5] DistributionPoolTo;
            uint256[5] DistributionPoolShare;
            uint256[20] PrizePoolShare;
            bytes8[20] PrizePoolAttributes;
            address Operator;
            bytes16 Attributes;
        }

        struct Ticket {
            uint256 LotteryID;
            uint256 LotteryRoundInit;
            uint256 LotteryRoundFini;
            uint256 NumBets;
            bytes8 Attributes;
        }

        error InsufficientFunds();
        error InvalidTicketOwner();
        error InvalidRound();
        error LotteryNotActive();
        error TicketAlreadyWithdrawn();

        function LotteryDatabase() external view returns (address);
        function TicketDatabase() external view returns (address);

        function CreateLottery(Lottery calldata lottery) external returns (uint256 id);
        function ReadLottery(uint256 id) external view returns (Lottery memory lottery);
        function LotteryReserves(uint256 id) external view returns (uint256 reserves);
        function LotteryJackpot(uint256 id, uint256 round) external view returns (uint256 jackpot);

        function BuyTicket(Ticket calldata ticket) external payable returns (uint256 id);
        function ReadTicket(uint256 id) external view returns (Ticket memory ticket);
        function TicketPrizes(uint256 id, uint256 round) external view returns (uint256 prize);
        function WithdrawTicket(uint256 id, uint256 round) external;
    }
}

alloy::sol! {
    #[sol(all_derives)]
    interface ILotteryDatabase {
        event CreatedItem(string itemType, uint256 id);
        event UpdatedItem(string itemType, uint256 id);

        error InvalidID();
        error InvalidName();
        error InvalidRoundsConfiguration();
        error InvalidDistributionPool();
        error InvalidPrizePool();
        error InvalidOperator();
    }
}

alloy::sol! {
    #[sol(all_derives)]
    interface ITicketDatabase {
        event CreatedItem(string itemType, uint256 id);
        event UpdatedItem(string itemType, uint256 id);

        error InvalidID();
        error InvalidLottery();
        error InvalidRounds();
        error InvalidNumBets();
    }
}

alloy::sol! {
    /// Creation event shared by every database contract.
    #[sol(all_derives)]
    event CreatedItem(string itemType, uint256 id);
}

/// Descriptor of the entry-point contract.
pub fn open_lotto_interface() -> ContractInterface {
    crate::contract_interface!(IOpenLotto)
}

/// Descriptor of the lottery database.
pub fn lottery_database_interface() -> ContractInterface {
    crate::contract_interface!(ILotteryDatabase, events)
}

/// Descriptor of the ticket database.
pub fn ticket_database_interface() -> ContractInterface {
    crate::contract_interface!(ITicketDatabase, events)
}
