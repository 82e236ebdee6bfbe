use enginelife_contract::{Function, Invocation, LedgerHost};
use enginelife_state::FileWorldState;
use serde_json::{json, Value};

use crate::config::Config;
use crate::OutputFormat;

/// An operation name plus its positional arguments, as typed on the
/// command line.
pub(crate) struct Call {
    pub function: String,
    pub args: Vec<String>,
}

impl Call {
    fn into_invocation(self) -> Invocation {
        Invocation::new(self.function, self.args)
    }
}

pub(crate) async fn cmd_submit(
    config: &Config,
    call: Call,
    output: OutputFormat,
    quiet: bool,
) -> Result<(), String> {
    let invocation = call.into_invocation();
    let function = invocation.resolve().map_err(|e| e.to_string())?;

    let store = FileWorldState::open(&config.state_path).map_err(|e| e.to_string())?;
    let seed =
        seeds_before(config, function) && store.is_empty().map_err(|e| e.to_string())?;
    let host = LedgerHost::new(store);

    if seed {
        let init = Invocation::new(Function::Init.name(), Vec::<String>::new());
        let receipt = host.submit(&init).await.map_err(|e| e.to_string())?;
        tracing::info!(writes = receipt.write_set.len(), "seeded empty world state");
    }

    let receipt = host.submit(&invocation).await.map_err(|e| e.to_string())?;
    let writes = receipt.write_set.len();
    let digest = receipt.write_set.digest();

    match output {
        OutputFormat::Json => {
            let doc = json!({
                "payload": payload_value(function, &receipt.payload),
                "writes": writes,
                "digest": digest,
            });
            println!("{}", pretty(&doc));
        }
        OutputFormat::Text => {
            print_payload(function, &receipt.payload);
            if !quiet {
                println!("committed {} write(s) digest={}", writes, digest);
            }
        }
    }
    Ok(())
}

pub(crate) async fn cmd_evaluate(
    config: &Config,
    call: Call,
    output: OutputFormat,
) -> Result<(), String> {
    let invocation = call.into_invocation();
    let function = invocation.resolve().map_err(|e| e.to_string())?;
    if !function.is_read_only() {
        tracing::warn!(
            function = %function,
            "evaluating a submit-only function; writes are discarded"
        );
    }

    let store = FileWorldState::open(&config.state_path).map_err(|e| e.to_string())?;
    let host = LedgerHost::new(store);
    let payload = host.evaluate(&invocation).await.map_err(|e| e.to_string())?;

    match output {
        OutputFormat::Json => {
            let doc = json!({ "payload": payload_value(function, &payload) });
            println!("{}", pretty(&doc));
        }
        OutputFormat::Text => print_payload(function, &payload),
    }
    Ok(())
}

/// Whether `function` is preceded by an `Init` transaction when the store
/// is empty. Queries and `Init` itself never are.
fn seeds_before(config: &Config, function: Function) -> bool {
    config.seed_on_empty && function != Function::Init && !function.is_read_only()
}

/// The payload as a JSON value, typed by the function that produced it.
///
/// `Init` and `Delete` return nothing, `TransferOwner` returns the previous
/// owner as plain text, and everything else returns JSON. A JSON payload
/// that fails to parse is passed through as a string.
fn payload_value(function: Function, payload: &[u8]) -> Value {
    match function {
        Function::Init | Function::Delete => Value::Null,
        Function::TransferOwner => Value::String(text(payload)),
        _ => serde_json::from_slice(payload).unwrap_or_else(|_| Value::String(text(payload))),
    }
}

fn print_payload(function: Function, payload: &[u8]) {
    match payload_value(function, payload) {
        Value::Null => {}
        Value::String(s) => println!("{}", s),
        v @ (Value::Object(_) | Value::Array(_)) => println!("{}", pretty(&v)),
        other => println!("{}", other),
    }
}

fn text(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload).into_owned()
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("serialization error: {}", e))
}
