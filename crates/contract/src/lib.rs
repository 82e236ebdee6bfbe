//! The engine lifecycle ledger contract.
//!
//! [`EngineLifecycle`] holds the state transitions (create, read, update,
//! delete, ownership transfer, service history, listing) over any
//! [`WorldState`](enginelife_state::WorldState). [`invoke`] dispatches
//! by operation name, and [`LedgerHost`] serializes submitted transactions
//! and commits their write sets.

pub mod canonical;
mod contract;
mod error;
mod host;
mod invoke;
mod record;
mod seed;

pub use contract::EngineLifecycle;
pub use error::ContractError;
pub use host::{LedgerHost, Receipt};
pub use invoke::{invoke, Function, Invocation};
pub use record::{EngineAttributes, EngineRecord, ListEntry, DOC_TYPE};
pub use seed::bootstrap_engines;
