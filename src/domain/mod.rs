//! Domain layer - profiles, call models, secrets and errors

pub mod credentials;
pub mod error;
pub mod llm;
pub mod profile;

pub use credentials::{Credential, CredentialProvider, StaticCredentialProvider};
pub use error::DomainError;
pub use llm::{
    CallOptions, CompletionResult, EventStream, Reference, StreamEvent,
};
pub use profile::{AuthScheme, ProfileCatalog, ProfileConfig, ProviderFamily, ProviderProfile};
