//! Name-based dispatch: the surface a gateway or CLI calls into.
//!
//! Callers name an operation and pass positional string arguments, the way
//! a ledger client submits a transaction proposal. Both the short operation
//! names and the legacy chaincode names are accepted.

use std::fmt;
use std::str::FromStr;

use enginelife_state::WorldState;

use crate::contract::EngineLifecycle;
use crate::error::ContractError;
use crate::record::EngineAttributes;

/// A contract operation addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Init,
    Create,
    Read,
    Update,
    Delete,
    Exists,
    TransferOwner,
    AddServiceRecord,
    ListAll,
}

impl Function {
    pub const ALL: [Function; 9] = [
        Function::Init,
        Function::Create,
        Function::Read,
        Function::Update,
        Function::Delete,
        Function::Exists,
        Function::TransferOwner,
        Function::AddServiceRecord,
        Function::ListAll,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Function::Init => "Init",
            Function::Create => "Create",
            Function::Read => "Read",
            Function::Update => "Update",
            Function::Delete => "Delete",
            Function::Exists => "Exists",
            Function::TransferOwner => "TransferOwner",
            Function::AddServiceRecord => "AddServiceRecord",
            Function::ListAll => "ListAll",
        }
    }

    /// The chaincode name existing gateways submit.
    pub fn legacy_name(self) -> &'static str {
        match self {
            Function::Init => "InitLedger",
            Function::Create => "CreateEngine",
            Function::Read => "ReadEngine",
            Function::Update => "UpdateEngine",
            Function::Delete => "DeleteEngine",
            Function::Exists => "EngineExists",
            Function::TransferOwner => "TransferEngineOwnership",
            Function::AddServiceRecord => "AddServiceRecord",
            Function::ListAll => "GetAllEngines",
        }
    }

    /// Number of positional arguments the operation takes.
    pub fn arity(self) -> usize {
        match self {
            Function::Init | Function::ListAll => 0,
            Function::Read | Function::Delete | Function::Exists => 1,
            Function::TransferOwner | Function::AddServiceRecord => 2,
            Function::Create | Function::Update => 6,
        }
    }

    /// Queries never write; everything else is submitted for commit.
    pub fn is_read_only(self) -> bool {
        matches!(self, Function::Read | Function::Exists | Function::ListAll)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Function::ALL
            .into_iter()
            .find(|f| f.name() == s || f.legacy_name() == s)
            .ok_or_else(|| ContractError::UnknownFunction(s.to_string()))
    }
}

/// A named call with positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub function: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, A>(function: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            function: function.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolve the function name and check the argument count.
    pub fn resolve(&self) -> Result<Function, ContractError> {
        let function: Function = self.function.parse()?;
        if self.args.len() != function.arity() {
            return Err(ContractError::Arity {
                function: function.name(),
                expected: function.arity(),
                got: self.args.len(),
            });
        }
        Ok(function)
    }
}

/// Execute `invocation` against `state` and return the success payload.
///
/// | Function | Payload |
/// |---|---|
/// | `Create`, `Read`, `Update`, `AddServiceRecord` | record bytes |
/// | `TransferOwner` | previous owner |
/// | `Exists` | `true` / `false` |
/// | `ListAll` | JSON array of entries |
/// | `Init`, `Delete` | empty |
pub async fn invoke<S: WorldState>(
    state: &S,
    invocation: &Invocation,
) -> Result<Vec<u8>, ContractError> {
    let function = invocation.resolve()?;
    let args = &invocation.args;
    let contract = EngineLifecycle::new(state);
    tracing::debug!(function = %function, args = args.len(), "invoking");

    match function {
        Function::Init => {
            contract.init().await?;
            Ok(Vec::new())
        }
        Function::Create => {
            let attrs = attributes(function, &args[1..])?;
            contract.create(&args[0], attrs).await
        }
        Function::Read => contract.read(&args[0]).await,
        Function::Update => {
            let attrs = attributes(function, &args[1..])?;
            contract.update(&args[0], attrs).await
        }
        Function::Delete => {
            contract.delete(&args[0]).await?;
            Ok(Vec::new())
        }
        Function::Exists => {
            let exists = contract.exists(&args[0]).await?;
            Ok(exists.to_string().into_bytes())
        }
        Function::TransferOwner => {
            let old_owner = contract.transfer_owner(&args[0], &args[1]).await?;
            Ok(old_owner.into_bytes())
        }
        Function::AddServiceRecord => contract.add_service_record(&args[0], &args[1]).await,
        Function::ListAll => contract.list_all_encoded().await,
    }
}

/// Build attributes from `[make, model, age, condition, owner]`.
fn attributes(function: Function, args: &[String]) -> Result<EngineAttributes, ContractError> {
    let age = args[2]
        .trim()
        .parse::<u32>()
        .map_err(|e| ContractError::InvalidArgument {
            function: function.name(),
            name: "age",
            reason: format!("{:?} is not a non-negative integer ({e})", args[2]),
        })?;
    Ok(EngineAttributes::new(
        args[0].as_str(),
        args[1].as_str(),
        age,
        args[3].as_str(),
        args[4].as_str(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_legacy_names_resolve_to_the_same_function() {
        for f in Function::ALL {
            assert_eq!(f.name().parse::<Function>().unwrap(), f);
            assert_eq!(f.legacy_name().parse::<Function>().unwrap(), f);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(matches!(
            "MintEngine".parse::<Function>(),
            Err(ContractError::UnknownFunction(name)) if name == "MintEngine"
        ));
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!("read".parse::<Function>().is_err());
    }

    #[test]
    fn wrong_argument_count_is_rejected() {
        let inv = Invocation::new("TransferOwner", ["e1"]);
        match inv.resolve() {
            Err(ContractError::Arity {
                function,
                expected,
                got,
            }) => {
                assert_eq!(function, "TransferOwner");
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("expected Arity, got {other:?}"),
        }
    }

    #[test]
    fn only_queries_are_read_only() {
        let read_only: Vec<Function> = Function::ALL
            .into_iter()
            .filter(|f| f.is_read_only())
            .collect();
        assert_eq!(
            read_only,
            vec![Function::Read, Function::Exists, Function::ListAll]
        );
    }

    #[test]
    fn negative_age_is_an_invalid_argument() {
        let args: Vec<String> = ["RR", "T", "-1", "ok", "A"].map(String::from).to_vec();
        assert!(matches!(
            attributes(Function::Create, &args),
            Err(ContractError::InvalidArgument { name: "age", .. })
        ));
    }
}
