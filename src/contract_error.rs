//! Revert payload resolution.
//!
//! A failed call comes back from the node as a JSON-RPC error whose `data`
//! field, when present, holds the ABI-encoded custom error. Resolution walks
//! the interface registry in order and keeps the first decode.
//!
//! ```text
//! RpcError::ErrorResp { message, data: "0x<selector><args>" }
//!     │
//!     ▼ revert_data()
//! Some(Bytes) ──► resolve_error(registry, &bytes)
//!     │              │
//!     │              ├─ IOpenLotto       ✗
//!     │              ├─ ILotteryDatabase ✓ → ILotteryDatabase::InvalidName
//!     │              └─ ...
//!     ▼
//! Resolution::{NoData, Unrecognized, Decoded}
//! ```

use alloy::{
    primitives::Bytes,
    rpc::json_rpc::ErrorPayload,
};

use crate::prelude::{DecodedError, InterfaceRegistry};

/// Outcome of looking up a revert payload.
///
/// `NoData` and `Unrecognized` are kept apart: the first means the node gave
/// nothing to decode (plain revert, rejection), the second that a payload was
/// present but none of the registered interfaces declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NoData,
    Unrecognized(Bytes),
    Decoded { error: DecodedError, data: Bytes },
}

impl Resolution {
    pub fn decoded(&self) -> Option<&DecodedError> {
        match self {
            Resolution::Decoded { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&Bytes> {
        match self {
            Resolution::NoData => None,
            Resolution::Unrecognized(data) => Some(data),
            Resolution::Decoded { data, .. } => Some(data),
        }
    }

    pub fn has_data(&self) -> bool {
        !matches!(self, Resolution::NoData)
    }
}

/// Try every registered interface in order and return the first decode.
pub fn resolve_error(registry: &InterfaceRegistry, data: &[u8]) -> Option<DecodedError> {
    registry
        .all()
        .iter()
        .find_map(|interface| interface.decode_error(data))
}

/// Resolve an optional revert payload.
pub fn resolve(registry: &InterfaceRegistry, data: Option<Bytes>) -> Resolution {
    match data {
        None => Resolution::NoData,
        Some(data) if data.is_empty() => Resolution::NoData,
        Some(data) => match resolve_error(registry, &data) {
            Some(error) => Resolution::Decoded { error, data },
            None => Resolution::Unrecognized(data),
        },
    }
}

/// Extract the revert payload carried by a JSON-RPC error response.
///
/// The payload is looked at whenever it parses as hex bytes; the numeric error
/// code differs between node implementations and is ignored.
pub fn revert_data(payload: &ErrorPayload) -> Option<Bytes> {
    let data = payload.data.as_ref()?;
    serde_json::from_str::<Bytes>(data.get()).ok()
}
