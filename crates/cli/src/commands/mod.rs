mod conformance;
mod invoke;

pub(crate) use conformance::cmd_conformance;
pub(crate) use invoke::{cmd_evaluate, cmd_submit, Call};
