//! Provider-facing plumbing: transport, family adapters, clients and the registry

mod chat;
mod client;
mod family;
mod http_client;
mod line_decoder;
mod registry;
mod request_log;
mod search;

pub use chat::ChatAdapter;
pub use client::LlmClient;
pub use family::{adapter_for, FamilyAdapter, LineOutcome, BUFFERED_TIMEOUT};
pub use http_client::{ByteStream, HttpClient, HttpClientTrait};
pub use line_decoder::{LineDecoder, MAX_LINE_BYTES};
pub use registry::{CallOutput, ClientRegistry};
pub use request_log::{mask_headers, RequestLogger};
pub use search::{parse_references, truncate_question, SearchAdapter, MAX_QUESTION_CHARS};
