//! Provider profiles - declarative descriptions of callable backends

mod catalog;
mod entity;
mod validation;

pub use catalog::ProfileCatalog;
pub use entity::{AuthScheme, ProfileConfig, ProviderFamily, ProviderProfile};
pub use validation::{validate_profile_config, ProfileValidationError};
