//! Ordered registry of contract interface descriptors.
//!
//! Errors and logs coming back from the chain carry no indication of which
//! contract ABI they belong to. The registry keeps every interface the client
//! knows about in a fixed order and lets the error resolver and the receipt
//! scanner try them one after another, first match wins.
//!
//! ## Ordering
//!
//! ```text
//! IOpenLotto            (primary, always first)
//! ILotteryDatabase      (auxiliary, fixed order)
//! ITicketDatabase
//! <registered extras>   (inventory, sorted by name)
//! ```
//!
//! Descriptors are plain function tables produced by `contract_interface!`,
//! so they can also be submitted to the link-time `inventory` collection with
//! `register_contract_interface!` and picked up by every client.

use alloy::primitives::{Address, LogData};

// ============================================================================
// Decoded outputs
// ============================================================================

/// A custom error recognized by one of the registered interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedError {
    /// Interface that recognized the payload
    pub interface: &'static str,
    /// Solidity error name, e.g. `InvalidName`
    pub name: String,
    /// Debug rendering of the decoded error including its arguments
    pub detail: String,
}

impl DecodedError {
    #[doc(hidden)]
    pub fn from_debug(interface: &'static str, detail: String) -> Self {
        Self {
            interface,
            name: variant_name(&detail).to_owned(),
            detail,
        }
    }
}

impl std::fmt::Display for DecodedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.interface, self.name)
    }
}

/// An event recognized by one of the registered interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog {
    pub interface: &'static str,
    /// Solidity event name, e.g. `CreatedItem`
    pub name: String,
}

impl DecodedLog {
    #[doc(hidden)]
    pub fn from_debug(interface: &'static str, detail: String) -> Self {
        Self {
            interface,
            name: variant_name(&detail).to_owned(),
        }
    }
}

/// `Variant(Inner { .. })` -> `Variant`
///
/// Relies on the `Debug` output derived by `sol!` for its error and event
/// enums, which always starts with the variant name.
fn variant_name(debug: &str) -> &str {
    debug
        .split(|c: char| c == '(' || c == '{' || c.is_whitespace())
        .next()
        .unwrap_or(debug)
}

// ============================================================================
// ContractInterface
// ============================================================================

/// Decodable description of one contract's custom errors and events.
///
/// Build with `contract_interface!`. An interface may be bound to the address
/// of a deployed contract, in which case it only claims logs that contract
/// emitted; unbound interfaces claim logs from any emitter.
#[derive(Clone, Copy)]
pub struct ContractInterface {
    pub name: &'static str,
    pub address: Option<Address>,
    pub error_decoder: fn(&[u8]) -> Option<DecodedError>,
    pub log_decoder: fn(&LogData) -> Option<DecodedLog>,
}

inventory::collect!(ContractInterface);

impl std::fmt::Debug for ContractInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractInterface")
            .field("name", &self.name)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl ContractInterface {
    /// Bind the interface to a deployed contract address.
    pub fn bound(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Whether logs emitted by `emitter` may belong to this interface.
    pub fn accepts(&self, emitter: Address) -> bool {
        self.address.map_or(true, |address| address == emitter)
    }

    pub fn decode_error(&self, data: &[u8]) -> Option<DecodedError> {
        (self.error_decoder)(data)
    }

    pub fn decode_log(&self, log: &LogData) -> Option<DecodedLog> {
        (self.log_decoder)(log)
    }
}

// ============================================================================
// InterfaceRegistry
// ============================================================================

/// Ordered, append-only list of interface descriptors.
#[derive(Debug, Clone, Default)]
pub struct InterfaceRegistry {
    interfaces: Vec<ContractInterface>,
}

impl InterfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interface. Registration order is lookup order.
    pub fn register(&mut self, interface: ContractInterface) -> &mut Self {
        self.interfaces.push(interface);
        self
    }

    /// Builder-style `register`.
    pub fn with(mut self, interface: ContractInterface) -> Self {
        self.register(interface);
        self
    }

    /// Append every interface submitted with `register_contract_interface!`
    /// whose name is not registered yet, sorted by name so the resulting order
    /// does not depend on link order.
    pub fn with_registered(mut self) -> Self {
        let mut extras: Vec<ContractInterface> = inventory::iter::<ContractInterface>
            .into_iter()
            .filter(|extra| !self.contains(extra.name))
            .copied()
            .collect();
        extras.sort_by_key(|extra| extra.name);
        extras.dedup_by_key(|extra| extra.name);
        self.interfaces.extend(extras);
        self
    }

    pub fn all(&self) -> &[ContractInterface] {
        &self.interfaces
    }

    pub fn contains(&self, name: &str) -> bool {
        self.interfaces.iter().any(|interface| interface.name == name)
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Interfaces that may have emitted a log at `emitter`, in registry order.
    pub fn accepting(&self, emitter: Address) -> impl Iterator<Item = &ContractInterface> {
        self.interfaces
            .iter()
            .filter(move |interface| interface.accepts(emitter))
    }
}

// ============================================================================
// Macros
// ============================================================================

/// Build a `ContractInterface` for an interface generated by `alloy::sol!`.
///
/// Pass `events` when the interface declares events, so its logs can be
/// decoded too.
///
/// ```ignore
/// alloy::sol! {
///     #[sol(all_derives)]
///     interface ILotteryDatabase { ... }
/// }
///
/// let lotteries = contract_interface!(ILotteryDatabase, events);
/// ```
#[macro_export]
macro_rules! contract_interface {
    ($contract:ident) => {
        $crate::__private::paste::paste! {
            $crate::prelude::ContractInterface {
                name: stringify!($contract),
                address: None,
                error_decoder: |data| {
                    <$contract::[<$contract Errors>] as $crate::__private::SolInterface>::abi_decode(data)
                        .ok()
                        .map(|error| {
                            $crate::prelude::DecodedError::from_debug(
                                stringify!($contract),
                                format!("{:?}", error),
                            )
                        })
                },
                log_decoder: |_| None,
            }
        }
    };
    ($contract:ident, events) => {
        $crate::__private::paste::paste! {
            $crate::prelude::ContractInterface {
                name: stringify!($contract),
                address: None,
                error_decoder: |data| {
                    <$contract::[<$contract Errors>] as $crate::__private::SolInterface>::abi_decode(data)
                        .ok()
                        .map(|error| {
                            $crate::prelude::DecodedError::from_debug(
                                stringify!($contract),
                                format!("{:?}", error),
                            )
                        })
                },
                log_decoder: |log| {
                    <$contract::[<$contract Events>] as $crate::__private::SolEventInterface>::decode_raw_log(
                        log.topics(),
                        &log.data,
                    )
                    .ok()
                    .map(|event| {
                        $crate::prelude::DecodedLog::from_debug(
                            stringify!($contract),
                            format!("{:?}", event),
                        )
                    })
                },
            }
        }
    };
}

/// Submit an interface to the global collection appended to every client's
/// registry.
///
/// ```ignore
/// register_contract_interface!(IPrizeVault, events);
/// ```
#[macro_export]
macro_rules! register_contract_interface {
    ($($args:tt)*) => {
        $crate::__private::inventory::submit! {
            $crate::contract_interface!($($args)*)
        }
    };
}
