pub mod cache;
pub mod controller;
pub mod loader;
pub mod validator;

pub use cache::RuleRegistry;
pub use controller::RegistryController;
pub use validator::{validate, validate_at, ValidationError};
