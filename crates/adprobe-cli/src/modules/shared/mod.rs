mod render;

pub(crate) use render::{print_flow, print_result, OutputFormat};
#[cfg(test)]
pub(crate) use render::{render_flow_json, render_text};
