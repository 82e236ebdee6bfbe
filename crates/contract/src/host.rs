use std::sync::Arc;

use enginelife_state::{TxWorldState, WorldState, WriteSet};
use tokio::sync::Mutex;
use tracing::info;

use crate::error::ContractError;
use crate::invoke::{invoke, Invocation};

/// The outcome of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// The operation's success payload.
    pub payload: Vec<u8>,
    /// Writes applied to the store, in execution order.
    pub write_set: WriteSet,
}

/// Runs contract invocations against a shared world state.
///
/// ## Submit vs. evaluate
///
/// - [`submit`](Self::submit) executes one transaction at a time. Writes are
///   buffered in a [`TxWorldState`] overlay and applied to the store in a
///   single batch only if the operation succeeds. A failed transaction
///   leaves the store untouched.
/// - [`evaluate`](Self::evaluate) executes against an overlay and discards
///   whatever it wrote. Use it for queries.
#[derive(Debug)]
pub struct LedgerHost<S> {
    state: Arc<S>,
    tx_lock: Mutex<()>,
}

impl<S: WorldState> LedgerHost<S> {
    pub fn new(state: S) -> Self {
        Self::from_shared(Arc::new(state))
    }

    pub fn from_shared(state: Arc<S>) -> Self {
        Self {
            state,
            tx_lock: Mutex::new(()),
        }
    }

    /// The underlying store.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Execute and commit `invocation`.
    pub async fn submit(&self, invocation: &Invocation) -> Result<Receipt, ContractError> {
        let _serialized = self.tx_lock.lock().await;

        let tx = TxWorldState::new(Arc::clone(&self.state));
        let payload = invoke(&tx, invocation).await?;
        let write_set = tx.into_write_set();

        self.state.apply(write_set.clone()).await?;
        info!(
            function = %invocation.function,
            writes = write_set.len(),
            digest = %write_set.digest(),
            "transaction committed"
        );
        Ok(Receipt { payload, write_set })
    }

    /// Execute `invocation` without committing anything.
    pub async fn evaluate(&self, invocation: &Invocation) -> Result<Vec<u8>, ContractError> {
        let tx = TxWorldState::new(Arc::clone(&self.state));
        invoke(&tx, invocation).await
    }
}
