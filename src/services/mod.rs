//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod generation;
pub mod library;

pub use generation::{GenerateOptions, GenerationService};
pub use library::LibraryService;
