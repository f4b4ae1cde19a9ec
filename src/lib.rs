pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod observability;
pub mod registry;
pub mod storage;

pub use config::Config;
pub use domain::{AlertRule, AlertRuleForm, RuleExpression};
pub use error::RegistryError;
pub use registry::{RegistryController, RuleRegistry, ValidationError};
pub use storage::RuleStore;
