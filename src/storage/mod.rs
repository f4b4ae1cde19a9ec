// src/storage/mod.rs
pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::MemoryRuleStore;
pub use postgres::PostgresRuleStore;
pub use traits::RuleStore;
