//! Unified LLM client
//!
//! One interface over two structurally different text-generation backends:
//! - OpenAI-compatible chat completion endpoints
//! - Search/answer endpoints that return text with citations
//!
//! Backends are described by provider profiles loaded from configuration, so
//! adding one means editing data rather than code. Calls are either buffered
//! or streamed as a pull-driven sequence of [`StreamEvent`]s.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    CallOptions, CompletionResult, DomainError, EventStream, ProfileCatalog, ProfileConfig,
    ProviderFamily, ProviderProfile, Reference, StreamEvent,
};
pub use infrastructure::llm::{CallOutput, ClientRegistry, LlmClient};
