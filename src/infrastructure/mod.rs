//! Infrastructure layer - transport, credentials and logging

pub mod credentials;
pub mod llm;
pub mod logging;
