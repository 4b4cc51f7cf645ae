//! Secret resolution domain

mod credential;
mod provider;

pub use credential::{mask_secret, Credential};
pub use provider::{CredentialProvider, StaticCredentialProvider};
