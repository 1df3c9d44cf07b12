//! Storage Layer
//!
//! Handles configuration loading and prompt library persistence.

pub mod config;
pub mod gateway;
pub mod memory;

pub use config::ConfigService;
pub use gateway::PersistenceGateway;
pub use memory::InMemoryGateway;
