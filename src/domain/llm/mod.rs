//! Call-level domain models: options, normalized results and stream events

mod coercion;
mod request;
mod response;
mod stream;

pub use coercion::{coerce_param, param_kind, ParamKind};
pub use request::{CallOptions, TEMPERATURE_RANGE};
pub use response::{
    format_references, parse_reference_block, CompletionResult, Reference, REFERENCES_HEADER,
};
pub use stream::{EventStream, StreamEvent};
