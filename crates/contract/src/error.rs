use enginelife_state::StateError;

/// Errors returned by engine lifecycle transitions and invocation dispatch.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// `Create` was invoked with an ID that is already present.
    #[error("the engine {id} already exists")]
    AlreadyExists { id: String },

    /// The operation needs an existing record and none (or an empty value)
    /// is stored under `id`.
    #[error("the engine {id} does not exist")]
    NotFound { id: String },

    /// A stored value needed for read-modify-write is not a valid record.
    #[error("the engine {id} has an unreadable record: {source}")]
    Decode {
        id: String,
        source: serde_json::Error,
    },

    #[error("failed to encode engine record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("unknown function {0:?}")]
    UnknownFunction(String),

    #[error("{function} expects {expected} argument(s), got {got}")]
    Arity {
        function: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid {name} for {function}: {reason}")]
    InvalidArgument {
        function: &'static str,
        name: &'static str,
        reason: String,
    },
}
