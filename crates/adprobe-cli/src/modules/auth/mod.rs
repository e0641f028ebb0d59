mod actions;
pub(crate) mod args;

pub(crate) use actions::{handle_flow, handle_probe, ProbeContext};
#[cfg(test)]
pub(crate) use actions::{ensure_offered, operation_for};
