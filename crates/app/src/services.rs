//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod execution_service;
pub mod rule_service;

pub use execution_service::ExecutionService;
pub use rule_service::RuleService;
